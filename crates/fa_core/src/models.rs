use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Comparable instant every date expression is normalized into.
pub type Timestamp = DateTime<Utc>;

/// A month is approximated as 30 calendar days when computing cutoffs.
pub const DAYS_PER_MONTH: i64 = 30;

/// Hard ceiling on listing pages (or load-more iterations) per run.
pub const MAX_PAGES: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    Exame,
    InfoMoney,
}

impl SourceType {
    /// Tag stored alongside every persisted article.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Exame => "EXAME",
            SourceType::InfoMoney => "INFO_MONEY",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "EXAME" => Some(SourceType::Exame),
            "INFO_MONEY" => Some(SourceType::InfoMoney),
            _ => None,
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything deduplicated by its URL.
pub trait UrlKeyed {
    fn url(&self) -> &str;
}

/// A candidate article found on a listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleLink {
    pub url: String,
    pub display_title: String,
    pub approximate_published_at: Option<Timestamp>,
}

impl UrlKeyed for ArticleLink {
    fn url(&self) -> &str {
        &self.url
    }
}

/// The fields extracted from one article page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub url: String,
    pub title: String,
    pub subheadline: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<Timestamp>,
    pub body_text: String,
}

impl ArticleRecord {
    /// True only when the publication date is known and falls before `cutoff`.
    pub fn is_older_than(&self, cutoff: Timestamp) -> bool {
        matches!(self.published_at, Some(published) if published < cutoff)
    }
}

impl UrlKeyed for ArticleRecord {
    fn url(&self) -> &str {
        &self.url
    }
}

/// Immutable per-run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeWindow {
    pub ticker_symbol: String,
    pub company_display_name: String,
    pub started_at: Timestamp,
    pub cutoff_timestamp: Timestamp,
    pub max_pages_or_iterations: u32,
}

impl ScrapeWindow {
    pub fn new(ticker_symbol: &str, company_display_name: &str, months_back: u32) -> Self {
        Self::starting_at(ticker_symbol, company_display_name, months_back, Utc::now())
    }

    /// Builds a window anchored at an explicit instant instead of the wall clock.
    pub fn starting_at(
        ticker_symbol: &str,
        company_display_name: &str,
        months_back: u32,
        started_at: Timestamp,
    ) -> Self {
        let cutoff_timestamp = Duration::try_days(i64::from(months_back) * DAYS_PER_MONTH)
            .and_then(|back| started_at.checked_sub_signed(back))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self {
            ticker_symbol: ticker_symbol.to_string(),
            company_display_name: company_display_name.to_string(),
            started_at,
            cutoff_timestamp,
            max_pages_or_iterations: MAX_PAGES,
        }
    }

    /// Lowers the page/iteration ceiling. Values above [`MAX_PAGES`] are clamped.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages_or_iterations = max_pages.clamp(1, MAX_PAGES);
        self
    }
}

/// URL-keyed accumulator that keeps insertion order and rejects duplicates.
#[derive(Debug, Clone)]
pub struct CollectedSet<T> {
    seen: HashSet<String>,
    items: Vec<T>,
}

impl<T: UrlKeyed> CollectedSet<T> {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }

    /// Returns false (and drops `item`) when its URL is already present.
    pub fn insert(&mut self, item: T) -> bool {
        if self.seen.contains(item.url()) {
            return false;
        }
        self.seen.insert(item.url().to_string());
        self.items.push(item);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: UrlKeyed> Default for CollectedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: UrlKeyed> Extend<T> for CollectedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenizedText {
    pub tokens: Vec<String>,
    pub stems: Vec<String>,
    pub lemmas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSections {
    pub title: String,
    pub subheadline: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenizedSections {
    pub title: TokenizedText,
    pub subheadline: TokenizedText,
    pub body: TokenizedText,
}

/// Everything the persistence collaborator needs to store one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    pub ticker_id: i64,
    pub url: String,
    pub published_at: Option<Timestamp>,
    pub author: Option<String>,
    pub source_type: SourceType,
    pub sections: TextSections,
    pub tokens: TokenizedSections,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedArticle {
    pub article_id: i64,
    pub is_new: bool,
}

use chrono::FixedOffset;
use fa_core::SourceType;

use crate::dates::offset_from_secs;
use crate::selectors::Strategy;

pub mod brazil;

/// How a source's listing is traversed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingMode {
    /// Page 1 is the listing URL itself; page N appends `page_template`
    /// with `{page}` replaced by N.
    Paginated { page_template: &'static str },
    /// One URL, more cards revealed by clicking a button labelled `load_more_label`.
    Interactive { load_more_label: &'static str },
}

/// Where a card's link comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardLink {
    /// The card selector already matches the anchor.
    SelfAnchor,
    /// First descendant matching this selector.
    Descendant(&'static str),
}

/// Which element the card timestamp lookup runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampScope {
    Card,
    /// Nearest ancestor with this tag name.
    NearestAncestor(&'static str),
}

#[derive(Debug, Clone)]
pub struct CardProfile {
    pub card: &'static str,
    pub link: CardLink,
    /// Title lookup inside the card; falls back to the link text.
    pub title: &'static [Strategy],
    pub timestamp_scope: TimestampScope,
    /// Every candidate is tried until one resolves to a date.
    pub timestamp: &'static [Strategy],
}

#[derive(Debug, Clone)]
pub struct ArticleProfile {
    pub title: &'static [Strategy],
    pub subheadline: &'static [Strategy],
    pub subheadline_falls_back_to_title: bool,
    pub author: &'static [Strategy],
    pub published_at: &'static [Strategy],
    /// Candidate main-content containers, first match wins.
    pub body: &'static [&'static str],
    /// Non-content nodes removed from the body before reading paragraphs.
    pub noise: &'static [&'static str],
}

/// Everything that differs between two news sources, kept as data.
#[derive(Debug, Clone)]
pub struct SourceProfile {
    pub source_type: SourceType,
    pub name: &'static str,
    pub emoji: &'static str,
    pub cli_name: &'static str,
    pub base_url: String,
    /// Path appended to `base_url`; `{slug}` is replaced by the company slug.
    pub listing_path: &'static str,
    pub listing: ListingMode,
    pub cards: CardProfile,
    pub article: ArticleProfile,
    /// Local time of the site, in seconds east of UTC.
    pub utc_offset_secs: i32,
}

impl SourceProfile {
    /// Points the profile at another host (mirrors, local test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn listing_url(&self, slug: &str) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.listing_path.replace("{slug}", slug)
        )
    }

    pub fn utc_offset(&self) -> FixedOffset {
        offset_from_secs(self.utc_offset_secs)
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self.listing, ListingMode::Interactive { .. })
    }
}

/// Every configured source, in run order.
pub fn get_scrapers() -> Vec<SourceProfile> {
    brazil::get_scrapers()
}

/// Looks a source up by CLI name or source tag, case-insensitively.
pub fn find_source(name: &str) -> Option<SourceProfile> {
    let wanted = name.trim().to_lowercase();
    get_scrapers().into_iter().find(|profile| {
        profile.cli_name == wanted || profile.source_type.as_str().eq_ignore_ascii_case(&wanted)
    })
}

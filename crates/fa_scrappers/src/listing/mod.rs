//! Listing walkers enumerate candidate articles from a source's topic page
//! without fetching the articles themselves.

use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use chrono::FixedOffset;
use fa_core::{ArticleLink, CollectedSet, Timestamp};
use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};
use url::Url;

use crate::dates::resolve_timestamp;
use crate::error::WalkError;
use crate::scrapers::{CardLink, CardProfile, TimestampScope};
use crate::selectors::{all_matches_within, element_text, first_match_within, parse_selector};

pub mod interactive;
pub mod paginated;

#[cfg(feature = "browser")]
pub mod chromium;

pub use interactive::{BrowserDriver, BrowserLauncher, ClickOutcome, InteractiveOptions, InteractiveWalker};
pub use paginated::{parse_listing_page, ListingPage, PaginatedWalker};

/// Why a walk ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The listing rendered no cards at all.
    NoCards,
    /// Every card on screen had already been seen.
    NoNewCards,
    /// A card older than the cutoff was found; later content is older still.
    CrossedCutoff,
    /// The page/iteration ceiling was reached.
    PageCeiling,
    /// The load-more control is gone or never became clickable.
    LoadMoreUnavailable,
    /// The browser failed mid-walk. Links gathered so far are kept.
    InteractionError(String),
    /// A listing page after the first could not be fetched.
    FetchFailed(String),
}

impl StopReason {
    /// True when the walk ended early on an error rather than on a content signal.
    pub fn is_partial(&self) -> bool {
        matches!(self, StopReason::InteractionError(_) | StopReason::FetchFailed(_))
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::NoCards => write!(f, "no cards found"),
            StopReason::NoNewCards => write!(f, "no new cards"),
            StopReason::CrossedCutoff => write!(f, "reached content older than the cutoff"),
            StopReason::PageCeiling => write!(f, "page ceiling reached"),
            StopReason::LoadMoreUnavailable => write!(f, "load-more button unavailable"),
            StopReason::InteractionError(e) => write!(f, "browser interaction failed: {}", e),
            StopReason::FetchFailed(e) => write!(f, "listing fetch failed: {}", e),
        }
    }
}

#[async_trait]
pub trait ListingWalker: Send {
    /// Produces the next batch of accepted links.
    async fn next_batch(&mut self) -> Result<Vec<ArticleLink>, WalkError>;

    /// Whether another call to `next_batch` can yield anything.
    fn has_more(&self) -> bool;

    /// Set once the walk is over.
    fn stop_reason(&self) -> Option<&StopReason>;

    /// Releases any held resources. Called exactly once by [`drain`].
    async fn finish(&mut self) {}
}

#[derive(Debug)]
pub struct WalkOutcome {
    pub links: CollectedSet<ArticleLink>,
    pub stop: StopReason,
}

impl WalkOutcome {
    pub fn is_partial(&self) -> bool {
        self.stop.is_partial()
    }
}

/// Runs a walker to completion, deduplicating links by URL.
/// `finish` is called on every exit path.
pub async fn drain(walker: &mut dyn ListingWalker) -> Result<WalkOutcome, WalkError> {
    let mut links = CollectedSet::new();
    let mut batches = 0usize;

    let result = loop {
        if !walker.has_more() {
            break Ok(());
        }
        match walker.next_batch().await {
            Ok(batch) => {
                batches += 1;
                debug!(batch = batches, size = batch.len(), "📦 Listing batch");
                links.extend(batch);
            }
            Err(e) => break Err(e),
        }
    };
    walker.finish().await;
    result?;

    let stop = walker
        .stop_reason()
        .cloned()
        .unwrap_or(StopReason::NoCards);
    if stop.is_partial() {
        warn!(links = links.len(), "⚠️ Walk ended early ({}), keeping partial results", stop);
    } else {
        info!(links = links.len(), "🧭 Walk finished: {}", stop);
    }
    Ok(WalkOutcome { links, stop })
}

/// Extracts every card of a rendered listing page. Relative links are
/// resolved against `page_url`; repeated URLs on one page are dropped.
pub fn parse_cards(
    html: &str,
    page_url: &Url,
    profile: &CardProfile,
    now: Timestamp,
    offset: FixedOffset,
) -> Vec<ArticleLink> {
    let document = Html::parse_document(html);
    let Some(card_selector) = parse_selector(profile.card) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for card in document.select(&card_selector) {
        let Some(anchor) = card_anchor(card, profile.link) else {
            continue;
        };
        let Some(url) = anchor.value().attr("href").and_then(|href| absolute_url(page_url, href)) else {
            continue;
        };
        if !seen.insert(url.clone()) {
            continue;
        }

        let display_title = first_match_within(card, profile.title).unwrap_or_else(|| element_text(anchor));
        let scope = match profile.timestamp_scope {
            TimestampScope::Card => card,
            TimestampScope::NearestAncestor(tag) => card
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == tag)
                .unwrap_or(card),
        };
        let approximate_published_at = all_matches_within(scope, profile.timestamp)
            .iter()
            .find_map(|text| resolve_timestamp(text, now, offset));

        links.push(ArticleLink {
            url,
            display_title,
            approximate_published_at,
        });
    }
    links
}

fn card_anchor(card: ElementRef<'_>, link: CardLink) -> Option<ElementRef<'_>> {
    match link {
        CardLink::SelfAnchor => Some(card),
        CardLink::Descendant(css) => {
            let selector = parse_selector(css)?;
            card.select(&selector).find(|el| el.value().attr("href").is_some())
        }
    }
}

fn absolute_url(page_url: &Url, href: &str) -> Option<String> {
    let mut url = page_url.join(href.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}

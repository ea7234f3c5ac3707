//! Load-more driven listing walk over a scriptable browser.
//!
//! ```text
//! Opening -> Loading -> Loading (new recent cards, clicked load-more)
//!                    -> Done(NoCards | NoNewCards | CrossedCutoff
//!                            | LoadMoreUnavailable | PageCeiling
//!                            | InteractionError)
//! ```

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::FixedOffset;
use fa_core::{ArticleLink, ScrapeWindow, Timestamp};
use tracing::{debug, info, warn};
use url::Url;

use super::{parse_cards, ListingWalker, StopReason};
use crate::error::{DriverError, WalkError};
use crate::scrapers::CardProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Clicked,
    /// No clickable control showed up within the wait.
    Unavailable,
}

/// The browser primitives the interactive walk needs.
#[async_trait]
pub trait BrowserDriver: Send {
    async fn open(&mut self, url: &str) -> Result<(), DriverError>;

    /// Current rendered HTML.
    async fn page_source(&mut self) -> Result<String, DriverError>;

    /// Waits up to `wait` for a button whose text contains `label`, then clicks it.
    async fn click_load_more(&mut self, label: &str, wait: Duration) -> Result<ClickOutcome, DriverError>;

    async fn close(&mut self) -> Result<(), DriverError>;
}

/// Starts browser sessions. One session per interactive walk.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserDriver>, DriverError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractiveOptions {
    /// Bound on waiting for the load-more control to become clickable.
    pub wait_timeout: Duration,
    /// Pause after a click so new cards can render.
    pub render_pause: Duration,
}

impl Default for InteractiveOptions {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(10),
            render_pause: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum WalkState {
    Opening,
    Loading,
    Done(StopReason),
}

pub struct InteractiveWalker {
    driver: Box<dyn BrowserDriver>,
    listing_url: Url,
    load_more_label: &'static str,
    cards: CardProfile,
    cutoff: Timestamp,
    now: Timestamp,
    offset: FixedOffset,
    max_iterations: u32,
    options: InteractiveOptions,
    iterations: u32,
    seen: HashSet<String>,
    state: WalkState,
    closed: bool,
}

impl InteractiveWalker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        driver: Box<dyn BrowserDriver>,
        listing_url: &str,
        load_more_label: &'static str,
        cards: CardProfile,
        window: &ScrapeWindow,
        offset: FixedOffset,
        options: InteractiveOptions,
    ) -> Result<Self, WalkError> {
        let listing_url = Url::parse(listing_url).map_err(|e| WalkError::InvalidUrl {
            url: listing_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            driver,
            listing_url,
            load_more_label,
            cards,
            cutoff: window.cutoff_timestamp,
            now: window.started_at,
            offset,
            max_iterations: window.max_pages_or_iterations,
            options,
            iterations: 0,
            seen: HashSet::new(),
            state: WalkState::Opening,
            closed: false,
        })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    fn done(&mut self, reason: StopReason) {
        debug!(iteration = self.iterations, "⏹️ Interactive walk done: {}", reason);
        self.state = WalkState::Done(reason);
    }

    async fn load_iteration(&mut self) -> Vec<ArticleLink> {
        if self.iterations >= self.max_iterations {
            self.done(StopReason::PageCeiling);
            return Vec::new();
        }
        self.iterations += 1;

        let html = match self.driver.page_source().await {
            Ok(html) => html,
            Err(e) => {
                warn!(iteration = self.iterations, error = %e, "⚠️ Could not read rendered page");
                self.done(StopReason::InteractionError(e.to_string()));
                return Vec::new();
            }
        };

        let rendered = parse_cards(&html, &self.listing_url, &self.cards, self.now, self.offset);
        if rendered.is_empty() {
            self.done(StopReason::NoCards);
            return Vec::new();
        }

        let fresh: Vec<ArticleLink> = rendered
            .into_iter()
            .filter(|link| self.seen.insert(link.url.clone()))
            .collect();
        info!(iteration = self.iterations, new_cards = fresh.len(), "🃏 Cards rendered");
        if fresh.is_empty() {
            self.done(StopReason::NoNewCards);
            return Vec::new();
        }

        let oldest = fresh.iter().filter_map(|link| link.approximate_published_at).min();
        if matches!(oldest, Some(oldest) if oldest < self.cutoff) {
            self.done(StopReason::CrossedCutoff);
            let cutoff = self.cutoff;
            return fresh
                .into_iter()
                .filter(|link| !matches!(link.approximate_published_at, Some(at) if at < cutoff))
                .collect();
        }

        match self
            .driver
            .click_load_more(self.load_more_label, self.options.wait_timeout)
            .await
        {
            Ok(ClickOutcome::Clicked) => {
                debug!(iteration = self.iterations, "👆 Clicked '{}'", self.load_more_label);
                if !self.options.render_pause.is_zero() {
                    tokio::time::sleep(self.options.render_pause).await;
                }
                if self.iterations >= self.max_iterations {
                    self.done(StopReason::PageCeiling);
                }
            }
            Ok(ClickOutcome::Unavailable) => self.done(StopReason::LoadMoreUnavailable),
            Err(e) => {
                warn!(iteration = self.iterations, error = %e, "⚠️ Load-more interaction failed");
                self.done(StopReason::InteractionError(e.to_string()));
            }
        }
        fresh
    }
}

#[async_trait]
impl ListingWalker for InteractiveWalker {
    async fn next_batch(&mut self) -> Result<Vec<ArticleLink>, WalkError> {
        match self.state {
            WalkState::Done(_) => Ok(Vec::new()),
            WalkState::Opening => {
                info!(url = %self.listing_url, "🌍 Opening listing in browser");
                if let Err(e) = self.driver.open(self.listing_url.as_str()).await {
                    self.done(StopReason::InteractionError(e.to_string()));
                    return Err(WalkError::Browser(e));
                }
                self.state = WalkState::Loading;
                Ok(self.load_iteration().await)
            }
            WalkState::Loading => Ok(self.load_iteration().await),
        }
    }

    fn has_more(&self) -> bool {
        !matches!(self.state, WalkState::Done(_))
    }

    fn stop_reason(&self) -> Option<&StopReason> {
        match &self.state {
            WalkState::Done(reason) => Some(reason),
            _ => None,
        }
    }

    async fn finish(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.driver.close().await {
            warn!(error = %e, "⚠️ Browser session did not close cleanly");
        }
    }
}

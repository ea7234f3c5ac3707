use std::sync::Arc;

use fa_core::{NewsStore, Result, SourceType, TextProcessor, MAX_PAGES};
use tracing::{error, info};

use crate::collector::Collector;
use crate::fetch::HttpFetcher;
use crate::listing::{BrowserLauncher, InteractiveOptions};
use crate::scrapers::{get_scrapers, SourceProfile};

/// Outcome of one source within a manager run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRun {
    pub source: SourceType,
    pub success: bool,
}

/// Runs every configured source for one ticker, one after another.
pub struct ScraperManager {
    store: Arc<dyn NewsStore>,
    nlp: Arc<dyn TextProcessor>,
    fetcher: HttpFetcher,
    launcher: Option<Arc<dyn BrowserLauncher>>,
    interactive: InteractiveOptions,
    profiles: Vec<SourceProfile>,
    max_pages: u32,
}

impl ScraperManager {
    pub fn new(store: Arc<dyn NewsStore>, nlp: Arc<dyn TextProcessor>) -> Result<Self> {
        let fetcher = HttpFetcher::new().map_err(|e| fa_core::Error::Config(e.to_string()))?;
        Ok(Self {
            store,
            nlp,
            fetcher,
            launcher: default_launcher(),
            interactive: InteractiveOptions::default(),
            profiles: get_scrapers(),
            max_pages: MAX_PAGES,
        })
    }

    /// Replaces the configured sources, e.g. to run only one of them.
    pub fn with_profiles(mut self, profiles: Vec<SourceProfile>) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn with_launcher(mut self, launcher: Option<Arc<dyn BrowserLauncher>>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn with_interactive_options(mut self, options: InteractiveOptions) -> Self {
        self.interactive = options;
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.clamp(1, MAX_PAGES);
        self
    }

    fn collector(&self, profile: SourceProfile) -> Collector {
        let collector = Collector::new(profile, self.store.clone(), self.nlp.clone(), self.fetcher.clone())
            .with_interactive_options(self.interactive)
            .with_max_pages(self.max_pages);
        match &self.launcher {
            Some(launcher) => collector.with_launcher(launcher.clone()),
            None => collector,
        }
    }

    /// Registers the ticker, then collects from every source. A failing
    /// source does not prevent the others from running.
    pub async fn scrape_ticker(&self, ticker: &str, company_name: &str, months_ago: u32) -> Result<Vec<SourceRun>> {
        let ticker_id = self.store.upsert_ticker(ticker, company_name).await?;
        info!(ticker, company = company_name, ticker_id, months_ago, "🚀 Starting collection");

        let mut runs = Vec::with_capacity(self.profiles.len());
        for profile in &self.profiles {
            let source = profile.source_type;
            let success = self
                .collector(profile.clone())
                .collect(ticker, ticker_id, company_name, months_ago)
                .await;
            if !success {
                error!(%source, ticker, "❌ Source failed");
            }
            runs.push(SourceRun { source, success });
        }
        Ok(runs)
    }
}

#[cfg(feature = "browser")]
fn default_launcher() -> Option<Arc<dyn BrowserLauncher>> {
    Some(Arc::new(crate::listing::chromium::ChromiumLauncher::default()))
}

#[cfg(not(feature = "browser"))]
fn default_launcher() -> Option<Arc<dyn BrowserLauncher>> {
    None
}

pub mod cli;
pub mod collector;
pub mod dates;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod listing;
pub mod logging;
pub mod manager;
pub mod scrapers;
pub mod selectors;
pub mod slug;

pub use cli::{handle_command, ScrapeArgs, ScraperCommands};
pub use collector::{CollectSummary, Collector};
pub use error::{CollectError, DriverError, ExtractError, FetchError, WalkError};
pub use extractor::ArticleExtractor;
pub use fetch::HttpFetcher;
pub use listing::{ListingWalker, StopReason};
pub use logging::{init_logging, Logger};
pub use manager::{ScraperManager, SourceRun};
pub use scrapers::SourceProfile;

pub mod prelude {
    pub use super::collector::Collector;
    pub use super::listing::{BrowserDriver, BrowserLauncher, ListingWalker};
    pub use super::scrapers::SourceProfile;
    pub use fa_core::{Error, Result};
}

pub mod analysis;
pub mod error;
pub mod models;
pub mod nlp;
pub mod storage;

pub use analysis::FundamentalAnalyst;
pub use error::{Error, Result};
pub use models::{
    ArticleLink, ArticleRecord, CollectedSet, NewArticle, SavedArticle, ScrapeWindow, SourceType,
    TextSections, Timestamp, TokenizedSections, TokenizedText, UrlKeyed, DAYS_PER_MONTH,
    MAX_PAGES,
};
pub use nlp::TextProcessor;
pub use storage::NewsStore;

pub mod prelude {
    pub use super::{
        ArticleLink, ArticleRecord, Error, NewsStore, Result, ScrapeWindow, SourceType,
        TextProcessor,
    };
}

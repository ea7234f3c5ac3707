use async_trait::async_trait;
use crate::models::{NewArticle, SavedArticle, Timestamp};
use crate::Result;

#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Returns the id of `symbol`, creating the ticker when it is unknown
    async fn upsert_ticker(&self, symbol: &str, company_name: &str) -> Result<i64>;

    /// Company name recorded for `symbol`, `None` when the ticker is unknown
    async fn company_name(&self, symbol: &str) -> Result<Option<String>>;

    /// Stores an article and its text sections. Idempotent on `url`:
    /// saving a known URL again is a no-op reporting `is_new = false`
    async fn save_article(&self, article: &NewArticle) -> Result<SavedArticle>;

    /// Raw text sections of a ticker's articles published since `since`, newest first.
    /// Articles without a known publication date are included.
    async fn recent_texts(&self, symbol: &str, since: Timestamp) -> Result<Vec<String>>;
}

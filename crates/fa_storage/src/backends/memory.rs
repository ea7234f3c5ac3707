use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use fa_core::{Error, NewArticle, NewsStore, Result, SavedArticle, Timestamp};
use tokio::sync::RwLock;
use tracing::debug;

use crate::StorageBackend;

#[derive(Debug, Clone)]
struct Ticker {
    id: i64,
    symbol: String,
    company_name: String,
}

#[derive(Debug, Default)]
struct MemoryStore {
    tickers: Vec<Ticker>,
    articles: Vec<(i64, NewArticle)>,
    ids_by_url: HashMap<String, i64>,
}

impl MemoryStore {
    fn upsert_ticker(&mut self, symbol: &str, company_name: &str) -> i64 {
        if let Some(existing) = self.tickers.iter().find(|t| t.symbol == symbol) {
            return existing.id;
        }
        let id = self.tickers.len() as i64 + 1;
        self.tickers.push(Ticker {
            id,
            symbol: symbol.to_string(),
            company_name: company_name.to_string(),
        });
        debug!(symbol, company = company_name, id, "New ticker");
        id
    }

    fn save_article(&mut self, article: &NewArticle) -> Result<SavedArticle> {
        if let Some(&article_id) = self.ids_by_url.get(&article.url) {
            return Ok(SavedArticle { article_id, is_new: false });
        }
        if !self.tickers.iter().any(|t| t.id == article.ticker_id) {
            return Err(Error::Storage(format!("Unknown ticker id {}", article.ticker_id)));
        }
        let article_id = self.articles.len() as i64 + 1;
        self.ids_by_url.insert(article.url.clone(), article_id);
        self.articles.push((article_id, article.clone()));
        Ok(SavedArticle { article_id, is_new: true })
    }

    fn recent_texts(&self, symbol: &str, since: Timestamp) -> Vec<String> {
        let Some(ticker) = self.tickers.iter().find(|t| t.symbol == symbol) else {
            return Vec::new();
        };
        let mut recent: Vec<&NewArticle> = self
            .articles
            .iter()
            .map(|(_, article)| article)
            .filter(|a| a.ticker_id == ticker.id)
            .filter(|a| a.published_at.map_or(true, |published| published >= since))
            .collect();
        // Stable: equal dates keep insertion order, undated articles go last.
        recent.sort_by_key(|a| Reverse(a.published_at));

        recent
            .into_iter()
            .flat_map(|a| {
                [&a.sections.title, &a.sections.subheadline, &a.sections.body]
                    .into_iter()
                    .filter(|text| !text.trim().is_empty())
                    .cloned()
            })
            .collect()
    }

    fn company_name(&self, symbol: &str) -> Option<String> {
        self.tickers
            .iter()
            .find(|t| t.symbol == symbol)
            .map(|t| t.company_name.clone())
    }
}

/// Process-local store, lost on exit. Cheap to clone; clones share data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

}

impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }
}

#[async_trait]
impl NewsStore for MemoryStorage {
    async fn upsert_ticker(&self, symbol: &str, company_name: &str) -> Result<i64> {
        let mut store = self.store.write().await;
        Ok(store.upsert_ticker(symbol, company_name))
    }

    async fn company_name(&self, symbol: &str) -> Result<Option<String>> {
        Ok(self.store.read().await.company_name(symbol))
    }

    async fn save_article(&self, article: &NewArticle) -> Result<SavedArticle> {
        let mut store = self.store.write().await;
        store.save_article(article)
    }

    async fn recent_texts(&self, symbol: &str, since: Timestamp) -> Result<Vec<String>> {
        let store = self.store.read().await;
        Ok(store.recent_texts(symbol, since))
    }
}

use std::collections::HashSet;

use fa_core::{FundamentalAnalyst, NewsStore, Result, Timestamp};
use tracing::{info, warn};

mod prompt;

pub use prompt::build_prompt;

/// Upper bound on the news corpus handed to the model, in characters.
pub const MAX_NEWS_CHARS: usize = 500_000;

pub const FRAGMENT_SEPARATOR: &str = "\n\n---\n\n";

/// Drops repeated fragments (first occurrence wins), joins the rest and
/// truncates the result to [`MAX_NEWS_CHARS`].
pub fn consolidate_texts(texts: &[String]) -> String {
    let mut seen = HashSet::new();
    let unique: Vec<&str> = texts
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(*t))
        .collect();
    let joined = unique.join(FRAGMENT_SEPARATOR);

    match joined.char_indices().nth(MAX_NEWS_CHARS) {
        Some((cut, _)) => {
            warn!(chars = joined.chars().count(), max = MAX_NEWS_CHARS, "Truncating news text");
            joined[..cut].to_string()
        }
        None => joined,
    }
}

/// Loads a ticker's recent corpus and asks the analyst for a judgement.
/// Returns `None` when nothing was stored since `since`.
pub async fn analyze_recent_news(
    store: &dyn NewsStore,
    analyst: &dyn FundamentalAnalyst,
    ticker: &str,
    company_name: &str,
    since: Timestamp,
    language: &str,
) -> Result<Option<String>> {
    let texts = store.recent_texts(ticker, since).await?;
    if texts.is_empty() {
        warn!(ticker, %since, "No recent news text found");
        return Ok(None);
    }
    info!(ticker, fragments = texts.len(), model = analyst.name(), "🧠 Analyzing news corpus");

    let corpus = consolidate_texts(&texts);
    analyst
        .analyze(company_name, ticker, &corpus, language)
        .await
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dummy::DummyModel;
    use chrono::{Duration, Utc};
    use fa_core::{NewArticle, SourceType, TextSections, TokenizedSections};
    use fa_storage::MemoryStorage;

    #[test]
    fn test_consolidate_dedups_and_joins() {
        let texts = vec![
            "Lucro sobe".to_string(),
            "  ".to_string(),
            "Dividendos".to_string(),
            "Lucro sobe ".to_string(),
        ];
        assert_eq!(consolidate_texts(&texts), "Lucro sobe\n\n---\n\nDividendos");
        assert_eq!(consolidate_texts(&[]), "");
    }

    #[test]
    fn test_consolidate_truncates_by_characters() {
        let texts = vec!["ç".repeat(MAX_NEWS_CHARS + 10)];
        let out = consolidate_texts(&texts);
        assert_eq!(out.chars().count(), MAX_NEWS_CHARS);
    }

    #[tokio::test]
    async fn test_analyze_recent_news() {
        let store = MemoryStorage::new();
        let ticker_id = store.upsert_ticker("WEGE3", "WEG").await.unwrap();
        let analyst = DummyModel::new();
        let since = Utc::now() - Duration::days(30);

        let empty = analyze_recent_news(&store, &analyst, "WEGE3", "WEG", since, "English").await.unwrap();
        assert!(empty.is_none());

        store
            .save_article(&NewArticle {
                ticker_id,
                url: "https://exame.com/weg/".to_string(),
                published_at: Some(Utc::now()),
                author: None,
                source_type: SourceType::Exame,
                sections: TextSections {
                    title: "WEG compra fábrica".to_string(),
                    subheadline: "WEG compra fábrica".to_string(),
                    body: "A WEG anunciou a compra de uma fábrica.".to_string(),
                },
                tokens: TokenizedSections::default(),
            })
            .await
            .unwrap();

        let report = analyze_recent_news(&store, &analyst, "WEGE3", "WEG", since, "English")
            .await
            .unwrap()
            .unwrap();
        assert!(report.contains("## Key Event Summary"));
        assert!(report.contains("WEG compra fábrica"));
        assert!(report.contains("2 fragments"));
    }
}

use std::fmt;

use async_trait::async_trait;
use fa_core::{FundamentalAnalyst, Result};

use crate::analysis::FRAGMENT_SEPARATOR;

const MAX_EVENTS: usize = 5;

/// Offline analyst: lists the first fragments as events, never calls out.
#[derive(Default)]
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FundamentalAnalyst for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn analyze(&self, company_name: &str, ticker: &str, news_text: &str, _language: &str) -> Result<String> {
        let fragments: Vec<&str> = news_text
            .split(FRAGMENT_SEPARATOR)
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        let events: String = fragments
            .iter()
            .take(MAX_EVENTS)
            .map(|f| {
                let first_line = f.lines().next().unwrap_or_default();
                let words: Vec<&str> = first_line.split_whitespace().take(20).collect();
                format!("* {}\n", words.join(" "))
            })
            .collect();

        Ok(format!(
            "## Fundamental Analysis\nNO, the dummy model does not judge {} ({}); based on {} fragments.\n\n## Key Event Summary\n{}",
            company_name,
            ticker,
            fragments.len(),
            events
        ))
    }
}

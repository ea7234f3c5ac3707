use std::fmt;

pub mod analysis;
pub mod models;
pub mod nlp;
pub mod rate_limit;

pub use analysis::{analyze_recent_news, build_prompt, consolidate_texts, MAX_NEWS_CHARS};
pub use models::create_model;
pub use nlp::BasicTextProcessor;
pub use rate_limit::RateLimiter;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Settings for the LLM analyst. Without an API key the dummy model is used.
#[derive(Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
}

impl Config {
    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::{BasicTextProcessor, Config};
    pub use fa_core::{Error, FundamentalAnalyst, Result, TextProcessor};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_and_redaction() {
        let config = Config {
            api_key: Some("sk-secret".to_string()),
            base_url: Some("http://localhost:8080/v1/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.model_name(), DEFAULT_MODEL);
        assert_eq!(config.base_url(), "http://localhost:8080/v1");
        assert!(!format!("{:?}", config).contains("sk-secret"));
    }
}

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::FetchError;

/// Per-request timeout for plain HTTP fetches.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Desktop browser identity; both sites serve trimmed pages to unknown agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Thin HTML GET client shared by the extractor and the paginated walker.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns its body. Any non-2xx status is an error.
    pub async fn get_html(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "🌐 GET");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, "pt-BR,pt;q=0.9,en;q=0.6")
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })
    }
}

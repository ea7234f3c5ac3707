use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use fa_core::{Error, FundamentalAnalyst, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::analysis::{build_prompt, MAX_NEWS_CHARS};
use crate::rate_limit::RateLimiter;
use crate::Config;

const REQUESTS_PER_MINUTE: u32 = 14;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// How often and how long to back off between attempts. Rate-limit
/// failures wait 5x the base delay per attempt, empty answers 1x and
/// other errors 2x.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    fn delay(&self, factor: u32, attempt: u32) -> Duration {
        self.base_delay * factor * (attempt + 1)
    }
}

enum AttemptError {
    RateLimited(String),
    Empty,
    Failed(String),
}

/// Any OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    limiter: Mutex<RateLimiter>,
    retry: RetryPolicy,
}

impl ChatModel {
    pub fn new(config: Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Inference("LLM API key is required".to_string()))?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: config.base_url().to_string(),
            model: config.model_name().to_string(),
            limiter: Mutex::new(RateLimiter::per_minute(REQUESTS_PER_MINUTE)),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    async fn attempt(&self, prompt: &str) -> std::result::Result<String, AttemptError> {
        self.limiter.lock().await.wait_if_needed().await;

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.2,
            max_tokens: 4096,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AttemptError::Failed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AttemptError::RateLimited(status.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let lowered = body.to_lowercase();
            if lowered.contains("rate") || lowered.contains("quota") {
                return Err(AttemptError::RateLimited(format!("{}: {}", status, body)));
            }
            return Err(AttemptError::Failed(format!("{}: {}", status, body)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::Failed(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .unwrap_or_default();
        if content.is_empty() {
            return Err(AttemptError::Empty);
        }
        Ok(content)
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let mut last_error = String::from("empty response");
        for attempt in 0..=self.retry.max_retries {
            info!(model = %self.model, attempt = attempt + 1, "Generating content");
            let (factor, reason) = match self.attempt(prompt).await {
                Ok(text) => return Ok(text),
                Err(AttemptError::RateLimited(reason)) => (5, reason),
                Err(AttemptError::Empty) => (1, "empty response".to_string()),
                Err(AttemptError::Failed(reason)) => (2, reason),
            };
            warn!(model = %self.model, attempt = attempt + 1, error = %reason, "LLM attempt failed");
            last_error = reason;
            if attempt < self.retry.max_retries {
                tokio::time::sleep(self.retry.delay(factor, attempt)).await;
            }
        }
        Err(Error::Inference(format!(
            "{} gave no answer after {} attempts: {}",
            self.model,
            self.retry.max_retries + 1,
            last_error
        )))
    }
}

impl fmt::Debug for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl FundamentalAnalyst for ChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn analyze(&self, company_name: &str, ticker: &str, news_text: &str, language: &str) -> Result<String> {
        let news_text = match news_text.char_indices().nth(MAX_NEWS_CHARS) {
            Some((cut, _)) => &news_text[..cut],
            None => news_text,
        };
        let prompt = build_prompt(company_name, ticker, news_text, language);
        self.complete(&prompt).await
    }
}

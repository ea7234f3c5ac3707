use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::interactive::{BrowserDriver, BrowserLauncher, ClickOutcome};
use crate::error::DriverError;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launches a headless Chromium per interactive walk.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    pub request_timeout: Duration,
    /// Uses the auto-detected Chrome when unset.
    pub executable: Option<PathBuf>,
}

impl Default for ChromiumLauncher {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            executable: None,
        }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserDriver>, DriverError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(self.request_timeout)
            .window_size(1920, 1080)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(DriverError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        info!("🧭 Headless browser started");

        Ok(Box::new(ChromiumDriver {
            browser: Some(browser),
            page: None,
            handler_task,
        }))
    }
}

pub struct ChromiumDriver {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
}

impl ChromiumDriver {
    fn page(&self) -> Result<&Page, DriverError> {
        self.page.as_ref().ok_or(DriverError::Closed)
    }

    async fn try_click(&self, label_literal: &str) -> Result<bool, DriverError> {
        let script = format!(
            r#"(() => {{
                const label = {label_literal};
                const button = Array.from(document.querySelectorAll('button'))
                    .find(b => b.textContent.includes(label) && !b.disabled && b.offsetParent !== null);
                if (!button) return false;
                button.scrollIntoView(true);
                button.click();
                return true;
            }})()"#
        );
        self.page()?
            .evaluate(script)
            .await
            .map_err(|e| DriverError::Script(e.to_string()))?
            .into_value::<bool>()
            .map_err(|e| DriverError::Script(e.to_string()))
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn open(&mut self, url: &str) -> Result<(), DriverError> {
        let browser = self.browser.as_ref().ok_or(DriverError::Closed)?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        page.goto(url).await.map_err(|e| DriverError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        self.page = Some(page);
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, DriverError> {
        self.page()?
            .content()
            .await
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn click_load_more(&mut self, label: &str, wait: Duration) -> Result<ClickOutcome, DriverError> {
        let label_literal =
            serde_json::to_string(label).map_err(|e| DriverError::Script(e.to_string()))?;
        let deadline = Instant::now() + wait;
        loop {
            if self.try_click(&label_literal).await? {
                return Ok(ClickOutcome::Clicked);
            }
            if Instant::now() >= deadline {
                debug!(label, "No clickable load-more button within {:?}", wait);
                return Ok(ClickOutcome::Unavailable);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.page = None;
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };
        let closed = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| DriverError::Script(e.to_string()));
        let _ = browser.wait().await;
        self.handler_task.abort();
        info!("🧭 Headless browser closed");
        closed
    }
}

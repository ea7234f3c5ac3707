use std::sync::Arc;

use fa_core::{FundamentalAnalyst, Result};
use tracing::{info, warn};

use crate::Config;

pub mod chat;
pub mod dummy;

pub use chat::{ChatModel, RetryPolicy};
pub use dummy::DummyModel;

/// The OpenAI-compatible chat model when an API key is configured, the
/// dummy model otherwise.
pub fn create_model(config: Option<Config>) -> Result<Arc<dyn FundamentalAnalyst>> {
    let config = config.unwrap_or_default();
    if config.api_key.is_none() {
        warn!("No LLM API key configured, using the dummy model");
        return Ok(Arc::new(DummyModel::new()));
    }
    let model = ChatModel::new(config)?;
    info!(model = model.model_name(), "✅ LLM analyst configured");
    Ok(Arc::new(model))
}

use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait FundamentalAnalyst: Send + Sync {
    fn name(&self) -> &str;

    /// Produces a long-term fundamental judgement from the consolidated news corpus
    async fn analyze(
        &self,
        company_name: &str,
        ticker: &str,
        news_text: &str,
        language: &str,
    ) -> Result<String>;
}

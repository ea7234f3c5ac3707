use crate::models::TokenizedText;

/// Pure text → tokens transform applied to every saved text section.
pub trait TextProcessor: Send + Sync {
    fn process(&self, text: &str) -> TokenizedText;
}

//! Mock completion adapter for dry runs without API calls.
//!
//! Answers with the first category token found in the message, or "otro".

use crate::domain::{Category, DomainError};
use crate::ports::CompletionPort;
use std::time::Duration;
use tracing::info;

/// Mock completion adapter.
///
/// Simulates network latency with configurable delay.
pub struct MockAiAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockAiAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self { delay_ms: 100 }
    }

    /// Create a mock adapter with custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}

impl Default for MockAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CompletionPort for MockAiAdapter {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        info!(prompt_len = prompt.len(), "[MOCK] Simulating completion");

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        // Only look at the enquiry, not the instruction that lists every token.
        let message = prompt
            .split_once(": ")
            .map(|(_, m)| m)
            .unwrap_or(prompt)
            .to_lowercase();
        let token = Category::ALL
            .iter()
            .map(|c| c.token())
            .find(|t| message.contains(t))
            .unwrap_or(Category::Other.token());
        Ok(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_echoes_token_from_message() {
        let adapter = MockAiAdapter::with_delay(0);
        let prompt = "Clasifica el mensaje como \"venta\", \"alquiler\" o \"otro\": Busco ALQUILER";
        assert_eq!(adapter.complete(prompt).await.unwrap(), "alquiler");
    }

    #[tokio::test]
    async fn test_mock_defaults_to_other() {
        let adapter = MockAiAdapter::with_delay(0);
        let prompt = "Clasifica el mensaje como \"venta\", \"alquiler\" o \"otro\": hola";
        assert_eq!(adapter.complete(prompt).await.unwrap(), "otro");
    }
}

//! AI adapter module. Implements CompletionPort for LLM integration.
//!
//! Provides OpenAI-compatible adapter and mock adapter for dry runs.

pub mod mock_adapter;
pub mod openai_adapter;

pub use mock_adapter::MockAiAdapter;
pub use openai_adapter::OpenAiAdapter;

//! Infrastructure adapters. Implement outbound ports.
//!
//! Telegram, LLM completion, terminal prompts. Map errors to DomainError.

pub mod ai;
pub mod telegram;
pub mod ui;

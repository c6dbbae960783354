//! lead-triage: classify inbound Telegram enquiries with an LLM and answer with canned text and media.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;

//! Core domain layer. No external I/O dependencies.
//!
//! Entities, the canned reply table and errors live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod responses;

pub use entities::{
    CannedResponse, Category, DispatchOutcome, IgnoreReason, InboundMessage, MediaPayload,
    NonEmptyText, OutboundPayload, SignInResult,
};
pub use errors::{DomainError, SendStage};
pub use responses::canned_response;

//! Application use cases. Orchestrate domain logic via ports.

pub mod auth_service;
pub mod classifier;
pub mod dispatch;
pub mod listener;

pub use auth_service::{AuthService, LoginMethod};
pub use classifier::Classifier;
pub use dispatch::DispatchService;
pub use listener::Listener;

//! Inbound port. The transport listener calls into the application.

use crate::domain::{DispatchOutcome, DomainError, InboundMessage};

/// Entry point for one inbound message. Invoked once per message, in arrival order;
/// invocations may overlap.
#[async_trait::async_trait]
pub trait MessageHandler: Send + Sync {
    async fn on_inbound_message(&self, msg: InboundMessage)
    -> Result<DispatchOutcome, DomainError>;
}

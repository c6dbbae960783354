//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use std::fmt;
use thiserror::Error;

/// Which of the two replies failed to go out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStage {
    Text,
    Media,
}

impl fmt::Display for SendStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendStage::Text => f.write_str("text"),
            SendStage::Media => f.write_str("media"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    /// A required credential is missing. Recurs for every message, so it stops the listener.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Classification service error: {0}")]
    ClassificationService(String),

    #[error("Send failed ({stage}): {reason}")]
    Send { stage: SendStage, reason: String },

    #[error("Telegram gateway error: {0}")]
    TgGateway(String),

    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl DomainError {
    /// True for errors that will repeat on every message and should stop the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DomainError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(DomainError::Configuration("key".into()).is_fatal());
        assert!(!DomainError::ClassificationService("timeout".into()).is_fatal());
        assert!(
            !DomainError::Send {
                stage: SendStage::Media,
                reason: "x".into()
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_send_error_display_names_stage() {
        let e = DomainError::Send {
            stage: SendStage::Text,
            reason: "peer flood".into(),
        };
        assert_eq!(e.to_string(), "Send failed (text): peer flood");
    }
}

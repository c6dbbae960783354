//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, InboundMessage, OutboundPayload, SignInResult};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Text-completion service (LLM). Takes a prompt, returns free-form text.
#[async_trait::async_trait]
pub trait CompletionPort: Send + Sync {
    /// Run one completion.
    ///
    /// # Errors
    /// `DomainError::Configuration` if the API credential is missing,
    /// `DomainError::ClassificationService` on transport failure, timeout or a malformed response.
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;
}

/// Messaging transport. Must be safe for concurrent use by several in-flight handlers.
#[async_trait::async_trait]
pub trait MessengerPort: Send + Sync {
    /// Send one message (text or media) to the chat a message arrived from.
    async fn send(&self, chat_id: i64, payload: &OutboundPayload) -> Result<(), DomainError>;

    /// Id of the logged-in account, used to drop our own messages.
    async fn self_id(&self) -> Result<i64, DomainError>;
}

/// Source of inbound messages.
#[async_trait::async_trait]
pub trait InboundSource: Send + Sync {
    /// Start delivering inbound messages. Ordered by arrival.
    async fn subscribe(&self) -> Result<Subscription, DomainError>;
}

/// Live inbound stream. Cancelling (or dropping) stops the pump task feeding it.
pub struct Subscription {
    rx: mpsc::Receiver<InboundMessage>,
    pump: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wrap a channel fed by `pump`. The pump is aborted on cancel/drop.
    pub fn new(rx: mpsc::Receiver<InboundMessage>, pump: JoinHandle<()>) -> Self {
        Self {
            rx,
            pump: Some(pump),
        }
    }

    /// Subscription without a pump task; the stream ends when all senders are dropped.
    pub fn from_channel(rx: mpsc::Receiver<InboundMessage>) -> Self {
        Self { rx, pump: None }
    }

    /// Next inbound message, or `None` once the stream is closed or cancelled.
    pub async fn recv(&mut self) -> Option<InboundMessage> {
        self.rx.recv().await
    }

    /// Stop the pump and close the stream. Buffered messages are discarded.
    pub fn cancel(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

/// Telegram authentication (session bootstrap).
#[async_trait::async_trait]
pub trait AuthPort: Send + Sync {
    async fn is_authenticated(&self) -> Result<bool, DomainError>;

    /// Ask Telegram to send a login code to `phone`.
    async fn request_login_code(&self, phone: &str, api_hash: &str) -> Result<(), DomainError>;

    /// Sign in with the code from `request_login_code`.
    async fn sign_in(&self, code: &str) -> Result<SignInResult, DomainError>;

    /// Complete 2FA after `sign_in` returned `PasswordRequired`.
    async fn check_password(&self, password: &[u8]) -> Result<(), DomainError>;

    /// Sign in as a bot account.
    async fn bot_sign_in(&self, token: &str, api_hash: &str) -> Result<(), DomainError>;
}

/// Interactive prompts needed during user login.
pub trait PromptPort: Send + Sync {
    fn phone(&self) -> Result<String, DomainError>;
    fn login_code(&self) -> Result<String, DomainError>;
    fn password(&self, hint: Option<&str>) -> Result<String, DomainError>;
}

//! Per-message pipeline: filter -> classify -> look up canned reply -> send text -> send media.
//!
//! Stateless across messages. The media send only starts after the text send succeeded.

use crate::domain::{
    DispatchOutcome, DomainError, IgnoreReason, InboundMessage, NonEmptyText, OutboundPayload,
    SendStage, canned_response,
};
use crate::ports::{MessageHandler, MessengerPort};
use crate::usecases::classifier::Classifier;
use std::sync::Arc;
use tracing::{debug, info};

pub struct DispatchService {
    classifier: Classifier,
    messenger: Arc<dyn MessengerPort>,
    /// Our own account id, if known. Messages from it are dropped even when the
    /// transport does not flag them as outgoing (e.g. sent from another device).
    self_id: Option<i64>,
}

impl DispatchService {
    pub fn new(
        classifier: Classifier,
        messenger: Arc<dyn MessengerPort>,
        self_id: Option<i64>,
    ) -> Self {
        Self {
            classifier,
            messenger,
            self_id,
        }
    }

    fn is_own(&self, msg: &InboundMessage) -> bool {
        msg.is_from_self || self.self_id == Some(msg.sender_id)
    }

    async fn send(
        &self,
        chat_id: i64,
        payload: OutboundPayload,
        stage: SendStage,
    ) -> Result<(), DomainError> {
        self.messenger
            .send(chat_id, &payload)
            .await
            .map_err(|e| match e {
                DomainError::Send { .. } => e,
                other => DomainError::Send {
                    stage,
                    reason: other.to_string(),
                },
            })
    }
}

#[async_trait::async_trait]
impl MessageHandler for DispatchService {
    async fn on_inbound_message(
        &self,
        msg: InboundMessage,
    ) -> Result<DispatchOutcome, DomainError> {
        if self.is_own(&msg) {
            return Ok(DispatchOutcome::Ignored(IgnoreReason::FromSelf));
        }
        let Some(body) = msg.body_text.and_then(NonEmptyText::new) else {
            debug!(chat_id = msg.chat_id, "no text body; ignoring");
            return Ok(DispatchOutcome::Ignored(IgnoreReason::EmptyBody));
        };

        let category = self.classifier.classify(&body).await?;
        let response = canned_response(category);

        self.send(
            msg.chat_id,
            OutboundPayload::Text(response.text.to_string()),
            SendStage::Text,
        )
        .await?;
        self.send(
            msg.chat_id,
            OutboundPayload::Media(response.media.clone()),
            SendStage::Media,
        )
        .await?;

        info!(
            chat_id = msg.chat_id,
            sender_id = msg.sender_id,
            category = %category,
            media = response.media.kind(),
            "replied"
        );
        Ok(DispatchOutcome::Replied(category))
    }
}

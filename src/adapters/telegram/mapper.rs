//! Map Grammers types to domain entities and back.
//!
//! Extracts InboundMessage from grammers messages; builds InputMessage from outbound payloads.

use crate::domain::{InboundMessage, MediaPayload};
use grammers_client::message::InputMessage;
use grammers_client::message::Message;

/// Build a domain message from the pieces the transport exposes.
///
/// `sender_id` is absent for anonymous channel posts; the chat id stands in for it.
/// Empty text (media without caption, stickers) maps to `None`.
pub fn inbound_from_parts(
    chat_id: i64,
    sender_id: Option<i64>,
    outgoing: bool,
    text: &str,
) -> InboundMessage {
    InboundMessage {
        chat_id,
        sender_id: sender_id.unwrap_or(chat_id),
        is_from_self: outgoing,
        body_text: (!text.is_empty()).then(|| text.to_string()),
    }
}

/// Map a grammers message from the update stream to a domain message.
pub fn message_to_inbound(message: &Message) -> InboundMessage {
    inbound_from_parts(
        message.peer_id().bot_api_dialog_id_unchecked(),
        message.sender().map(|s| s.id().bot_api_dialog_id_unchecked()),
        message.outgoing(),
        message.text(),
    )
}

/// Build the outgoing message for media referenced by URL (Telegram fetches it).
/// Documents are uploaded by the client instead, see `GrammersTransport`.
pub fn external_media_message(media: &MediaPayload) -> Option<InputMessage> {
    match media {
        MediaPayload::Image { url, caption } => {
            Some(InputMessage::new().text(*caption).photo_url(*url))
        }
        MediaPayload::Video { url, caption } => {
            Some(InputMessage::new().text(*caption).document_url(*url))
        }
        MediaPayload::Document { .. } => None,
    }
}

//! Domain entities. Pure data structures for the triage pipeline.
//!
//! No Telegram/IO types here; adapters map into these.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Intent of an inbound enquiry. Closed set; the classifier always resolves to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sale,
    Rental,
    Other,
}

impl Category {
    /// Every category, in classifier priority order (the catch-all last).
    pub const ALL: [Category; 3] = [Category::Sale, Category::Rental, Category::Other];

    /// Token the classification prompt asks the model to answer with.
    pub fn token(self) -> &'static str {
        match self {
            Category::Sale => "venta",
            Category::Rental => "alquiler",
            Category::Other => "otro",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Sale => "sale",
            Category::Rental => "rental",
            Category::Other => "other",
        };
        f.write_str(name)
    }
}

/// Media attached to a canned reply. Each kind carries only its own fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPayload {
    Image {
        url: &'static str,
        caption: &'static str,
    },
    Video {
        url: &'static str,
        caption: &'static str,
    },
    Document {
        url: &'static str,
        mime_type: &'static str,
        file_name: &'static str,
    },
}

impl MediaPayload {
    pub fn url(&self) -> &'static str {
        match self {
            MediaPayload::Image { url, .. }
            | MediaPayload::Video { url, .. }
            | MediaPayload::Document { url, .. } => url,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MediaPayload::Image { .. } => "image",
            MediaPayload::Video { .. } => "video",
            MediaPayload::Document { .. } => "document",
        }
    }
}

/// Reply for one category: a text message followed by a media message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedResponse {
    pub text: &'static str,
    pub media: MediaPayload,
}

/// What a single outbound `send` carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundPayload {
    Text(String),
    Media(MediaPayload),
}

/// A message delivered by the transport. Consumed once, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Chat the message arrived in; replies go here.
    pub chat_id: i64,
    pub sender_id: i64,
    pub is_from_self: bool,
    /// `None` for non-text messages (stickers, media without caption, service messages).
    pub body_text: Option<String>,
}

/// Text that is guaranteed to contain at least one non-whitespace character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a message was skipped without classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    FromSelf,
    EmptyBody,
}

/// Result of handling one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Ignored(IgnoreReason),
    /// Both the text and the media reply were delivered.
    Replied(Category),
}

/// Result of signing in with a login code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInResult {
    Success,
    /// Account has 2FA enabled; `hint` is the password hint if one was set.
    PasswordRequired { hint: Option<String> },
}

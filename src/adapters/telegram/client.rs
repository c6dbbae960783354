//! Implements MessengerPort and InboundSource using grammers Client.
//!
//! The update stream is pumped into a bounded channel. Peers seen on inbound messages
//! are cached by chat id so replies can be addressed without calling iter_dialogs.

use crate::adapters::telegram::mapper;
use crate::domain::{DomainError, InboundMessage, MediaPayload, OutboundPayload};
use crate::ports::{InboundSource, MessengerPort, Subscription};
use async_trait::async_trait;
use grammers_client::peer::Peer;
use grammers_client::client::UpdateStream;
use grammers_client::message::InputMessage;
use grammers_client::update::Update;
use grammers_client::Client;
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info};

/// Inbound messages buffered between the update pump and the listener.
const INBOUND_BUFFER: usize = 256;

/// Chats whose peers are remembered for replies; the oldest entry is evicted first.
const MAX_CACHED_PEERS: usize = 10_000;

/// Reply addresses by chat id. Only chats that wrote to us are remembered.
struct PeerCache<P> {
    peers: HashMap<i64, P>,
    order: VecDeque<i64>,
    capacity: usize,
}

impl<P: Clone> PeerCache<P> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            peers: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn remember(&mut self, msg: &InboundMessage, peer: P) {
        if msg.is_from_self {
            return;
        }
        if self.peers.insert(msg.chat_id, peer).is_none() {
            self.order.push_back(msg.chat_id);
        }
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.peers.remove(&oldest);
            }
        }
    }

    fn get(&self, chat_id: i64) -> Option<P> {
        self.peers.get(&chat_id).cloned()
    }
}

/// Telegram transport adapter. Clone of the client shared with the auth adapter.
pub struct GrammersTransport {
    client: Client,
    /// Taken by the first `subscribe`.
    updates: Mutex<Option<UpdateStream>>,
    peer_cache: Arc<Mutex<PeerCache<Peer>>>,
    /// Fetches document bodies before upload.
    http: reqwest::Client,
}

impl GrammersTransport {
    pub fn new(client: Client, updates: UpdateStream) -> Self {
        Self {
            client,
            updates: Mutex::new(Some(updates)),
            peer_cache: Arc::new(Mutex::new(PeerCache::with_capacity(MAX_CACHED_PEERS))),
            http: reqwest::Client::new(),
        }
    }

    async fn resolve_peer(&self, chat_id: i64) -> Result<Peer, DomainError> {
        self.peer_cache
            .lock()
            .await
            .get(chat_id)
            .ok_or_else(|| DomainError::TgGateway(format!("peer {} not seen yet", chat_id)))
    }

    /// Download a document and upload it to Telegram so file name and MIME type are kept.
    async fn document_message(
        &self,
        url: &str,
        mime_type: &str,
        file_name: &str,
    ) -> Result<InputMessage, DomainError> {
        let bytes = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DomainError::TgGateway(format!("fetch {}: {}", url, e)))?
            .bytes()
            .await
            .map_err(|e| DomainError::TgGateway(format!("read {}: {}", url, e)))?;
        let size = bytes.len();
        let mut stream = Cursor::new(bytes.to_vec());
        let uploaded = self
            .client
            .upload_stream(&mut stream, size, file_name.to_string())
            .await
            .map_err(|e| DomainError::TgGateway(format!("upload {}: {}", file_name, e)))?;
        debug!(file_name, size, "document uploaded");
        Ok(InputMessage::new().document(uploaded).mime_type(mime_type))
    }

    async fn build_message(&self, payload: &OutboundPayload) -> Result<InputMessage, DomainError> {
        match payload {
            OutboundPayload::Text(text) => Ok(InputMessage::new().text(text.as_str())),
            OutboundPayload::Media(MediaPayload::Document {
                url,
                mime_type,
                file_name,
            }) => self.document_message(url, mime_type, file_name).await,
            OutboundPayload::Media(media) => mapper::external_media_message(media)
                .ok_or_else(|| DomainError::TgGateway("unsupported media".into())),
        }
    }
}

#[async_trait]
impl MessengerPort for GrammersTransport {
    async fn send(&self, chat_id: i64, payload: &OutboundPayload) -> Result<(), DomainError> {
        let peer = self.resolve_peer(chat_id).await?;
        let peer_ref = peer
            .to_ref()
            .await
            .map_err(|e| DomainError::TgGateway(e.to_string()))?
            .ok_or_else(|| DomainError::TgGateway("peer not in session cache".into()))?;
        let message = self.build_message(payload).await?;
        self.client
            .send_message(peer_ref, message)
            .await
            .map_err(|e| DomainError::TgGateway(e.to_string()))?;
        Ok(())
    }

    async fn self_id(&self) -> Result<i64, DomainError> {
        let me = self
            .client
            .get_me()
            .await
            .map_err(|e| DomainError::TgGateway(e.to_string()))?;
        Ok(me.id().bot_api_dialog_id_unchecked())
    }
}

#[async_trait]
impl InboundSource for GrammersTransport {
    async fn subscribe(&self) -> Result<Subscription, DomainError> {
        let mut updates = self
            .updates
            .lock()
            .await
            .take()
            .ok_or_else(|| DomainError::TgGateway("update stream already subscribed".into()))?;
        let peers = Arc::clone(&self.peer_cache);
        let (tx, rx) = mpsc::channel(INBOUND_BUFFER);

        let pump = tokio::spawn(async move {
            loop {
                let update = match updates.next().await {
                    Ok(update) => update,
                    Err(e) => {
                        error!(error = %e, "update stream failed");
                        break;
                    }
                };
                let Update::NewMessage(message) = update else {
                    continue;
                };
                let inbound = mapper::message_to_inbound(&message);
                if let Some(peer) = message.peer() {
                    peers.lock().await.remember(&inbound, peer.clone());
                }
                if tx.send(inbound).await.is_err() {
                    break;
                }
            }
            let _ = updates.sync_update_state().await;
            info!("update pump stopped");
        });

        Ok(Subscription::new(rx, pump))
    }
}

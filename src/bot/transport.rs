use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::path::Path;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::bot::model::{ChatInfo, Contact, IncomingMessage, QuotedMessage};
use crate::encode::sticker::StickerArtifact;
use crate::foundation::error::{QuoteError, QuoteResult};

/// Capability object for the messaging client the bot runs on.
///
/// Constructed once at startup and shared by reference with the handler. Session and login
/// handling live entirely behind this trait.
pub trait Transport: Send + Sync + 'static {
    /// Wait for the next incoming message. `None` means the client has shut down.
    fn next_message(&self) -> impl Future<Output = QuoteResult<Option<IncomingMessage>>> + Send;

    fn quoted_message(
        &self,
        msg: &IncomingMessage,
    ) -> impl Future<Output = QuoteResult<Option<QuotedMessage>>> + Send;

    fn contact(&self, quoted: &QuotedMessage) -> impl Future<Output = QuoteResult<Contact>> + Send;

    fn chat(&self, msg: &IncomingMessage) -> impl Future<Output = QuoteResult<ChatInfo>> + Send;

    /// Reply to `msg` with plain text.
    fn reply(
        &self,
        msg: &IncomingMessage,
        text: &str,
    ) -> impl Future<Output = QuoteResult<()>> + Send;

    /// Send `sticker` to `chat_id` as sticker media.
    fn send_sticker(
        &self,
        chat_id: &str,
        sticker: &StickerArtifact,
    ) -> impl Future<Output = QuoteResult<()>> + Send;
}

/// One recorded incoming message plus the metadata the client would return for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayEvent {
    pub message: IncomingMessage,
    #[serde(default)]
    pub quoted: Option<QuotedMessage>,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub chat: ChatInfo,
}

/// Something the bot asked the transport to deliver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outbound {
    Reply {
        message_id: String,
        text: String,
    },
    Sticker {
        chat_id: String,
        mime_type: &'static str,
        bytes: Vec<u8>,
    },
}

/// In-memory transport that replays recorded events and captures everything sent.
#[derive(Debug, Default)]
pub struct ReplayTransport {
    pending: Mutex<VecDeque<IncomingMessage>>,
    events: HashMap<String, ReplayEvent>,
    contacts: HashMap<String, Contact>,
    outbox: Mutex<Vec<Outbound>>,
}

impl ReplayTransport {
    /// Quoted messages recorded without an id get `<message id>:quoted`, so each contact stays
    /// tied to the event it was recorded with.
    pub fn new(events: Vec<ReplayEvent>) -> Self {
        let pending = events.iter().map(|e| e.message.clone()).collect();
        let mut contacts = HashMap::new();
        let events = events
            .into_iter()
            .map(|mut e| {
                if let Some(quoted) = e.quoted.as_mut() {
                    if quoted.id.is_empty() {
                        quoted.id = format!("{}:quoted", e.message.id);
                    }
                    contacts.insert(quoted.id.clone(), e.contact.clone());
                }
                (e.message.id.clone(), e)
            })
            .collect();
        Self {
            pending: Mutex::new(pending),
            events,
            contacts,
            outbox: Mutex::new(Vec::new()),
        }
    }

    /// Load a JSON array of [`ReplayEvent`]s.
    pub fn from_json_file(path: &Path) -> QuoteResult<Self> {
        let raw = std::fs::read(path).map_err(|e| {
            QuoteError::transport(format!("read events '{}': {e}", path.display()))
        })?;
        let events: Vec<ReplayEvent> = serde_json::from_slice(&raw).map_err(|e| {
            QuoteError::transport(format!("parse events '{}': {e}", path.display()))
        })?;
        Ok(Self::new(events))
    }

    /// Everything sent so far, in send order.
    pub fn outbox(&self) -> QuoteResult<Vec<Outbound>> {
        Ok(self.lock_outbox()?.clone())
    }

    fn event(&self, msg: &IncomingMessage) -> QuoteResult<&ReplayEvent> {
        self.events
            .get(&msg.id)
            .ok_or_else(|| QuoteError::transport(format!("unknown message id '{}'", msg.id)))
    }

    fn lock_outbox(&self) -> QuoteResult<std::sync::MutexGuard<'_, Vec<Outbound>>> {
        self.outbox
            .lock()
            .map_err(|_| QuoteError::transport("outbox lock poisoned"))
    }
}

impl Transport for ReplayTransport {
    async fn next_message(&self) -> QuoteResult<Option<IncomingMessage>> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| QuoteError::transport("event queue lock poisoned"))?;
        Ok(pending.pop_front())
    }

    async fn quoted_message(&self, msg: &IncomingMessage) -> QuoteResult<Option<QuotedMessage>> {
        Ok(self.event(msg)?.quoted.clone())
    }

    async fn contact(&self, quoted: &QuotedMessage) -> QuoteResult<Contact> {
        self.contacts.get(&quoted.id).cloned().ok_or_else(|| {
            QuoteError::transport(format!(
                "no contact recorded for quoted message '{}'",
                quoted.id
            ))
        })
    }

    async fn chat(&self, msg: &IncomingMessage) -> QuoteResult<ChatInfo> {
        Ok(self.event(msg)?.chat.clone())
    }

    async fn reply(&self, msg: &IncomingMessage, text: &str) -> QuoteResult<()> {
        self.lock_outbox()?.push(Outbound::Reply {
            message_id: msg.id.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_sticker(&self, chat_id: &str, sticker: &StickerArtifact) -> QuoteResult<()> {
        self.lock_outbox()?.push(Outbound::Sticker {
            chat_id: chat_id.to_string(),
            mime_type: StickerArtifact::MIME_TYPE,
            bytes: sticker.bytes.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bot/transport.rs"]
mod tests;

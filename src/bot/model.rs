//! Messaging-client data consumed by the quote command.

use serde::{Deserialize, Serialize};

/// A message delivered by the transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: String,
    /// Chat the message arrived in; stickers are sent back here.
    pub chat_id: String,
    pub body: String,
    #[serde(default)]
    pub has_quoted_msg: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotedMessage {
    /// Client-side message id. Transports use it to look up the author's contact.
    #[serde(default)]
    pub id: String,
    pub body: String,
    /// Serialized id of the author; only set in group chats.
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub pushname: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatInfo {
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantId {
    #[serde(rename = "_serialized")]
    pub serialized: String,
    pub user: String,
}

/// Pick the label shown on the card: push name, then saved name, then (in groups) the
/// participant's user id. Blank values count as missing.
pub fn resolve_sender_name(contact: &Contact, chat: &ChatInfo, quoted: &QuotedMessage) -> String {
    let non_blank = |s: &Option<String>| {
        s.as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string)
    };

    if let Some(name) = non_blank(&contact.pushname).or_else(|| non_blank(&contact.name)) {
        return name;
    }
    if !chat.is_group {
        return String::new();
    }
    let Some(author) = quoted.author.as_deref() else {
        return String::new();
    };
    chat.participants
        .iter()
        .find(|p| p.id.serialized == author)
        .map(|p| p.id.user.clone())
        .filter(|user| !user.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/bot/model.rs"]
mod tests;

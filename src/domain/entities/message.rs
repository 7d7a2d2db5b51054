use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Room, User};

/// A message the host reports as sent, read-only to the relay
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: String,
    pub sender: User,
    pub room: Room,
    pub text: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub raw: Option<serde_json::Value>,
}

impl InboundMessage {
    pub fn new(sender: User, room: Room) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            room,
            text: None,
            timestamp: Utc::now(),
            raw: None,
        }
    }

    pub fn from_text(sender: User, room: Room, text: impl Into<String>) -> Self {
        Self::new(sender, room).with_text(text)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }
}

/// Identity a relayed message is posted under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotPersona {
    pub user: User,
    pub alias: String,
    pub avatar: String,
}

/// A message to be created by the host.
///
/// There is no field that could carry the inbound sender: the only
/// identity attached is the bot persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub room: Room,
    pub text: String,
    pub sender: BotPersona,
    pub groupable: bool,
    pub thread_id: Option<String>,
}

impl OutboundMessage {
    pub fn new(room: Room, sender: BotPersona, text: impl Into<String>) -> Self {
        Self {
            room,
            text: text.into(),
            sender,
            groupable: false,
            thread_id: None,
        }
    }
}

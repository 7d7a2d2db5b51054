use serde::{Deserialize, Serialize};

/// Kind of room as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    /// Public channel
    Channel,
    /// Invite-only group
    PrivateGroup,
    /// Two-participant conversation
    DirectMessage,
    /// Visitor chat
    Livechat,
}

impl RoomKind {
    pub fn as_str(&self) -> &str {
        match self {
            RoomKind::Channel => "channel",
            RoomKind::PrivateGroup => "private_group",
            RoomKind::DirectMessage => "direct_message",
            RoomKind::Livechat => "livechat",
        }
    }
}

/// Opaque room handle returned by the room directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: Option<String>,
    pub kind: RoomKind,
}

impl Room {
    pub fn new(id: impl Into<String>, kind: RoomKind) -> Self {
        Self {
            id: id.into(),
            name: None,
            kind,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn direct(id: impl Into<String>) -> Self {
        Self::new(id, RoomKind::DirectMessage)
    }

    pub fn is_direct(&self) -> bool {
        self.kind == RoomKind::DirectMessage
    }

    /// DM room ids embed both participant ids.
    pub fn involves(&self, user_id: &str) -> bool {
        !user_id.is_empty() && self.id.contains(user_id)
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

//! Events the host feeds into the relay

use crate::domain::entities::{InboundMessage, SettingId};

/// Something happened on the host
#[derive(Debug, Clone)]
pub enum RelayEvent {
    /// A message was sent somewhere the bot can see
    MessageSent(InboundMessage),
    /// A setting changed; `None` means it was cleared
    SettingUpdated { id: SettingId, value: Option<String> },
}

impl RelayEvent {
    pub fn setting(id: SettingId, value: impl Into<String>) -> Self {
        RelayEvent::SettingUpdated {
            id,
            value: Some(value.into()),
        }
    }
}

impl From<InboundMessage> for RelayEvent {
    fn from(message: InboundMessage) -> Self {
        RelayEvent::MessageSent(message)
    }
}

/// Result of handling one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Not relay traffic, or nothing to relay
    Ignored,
    /// Sender is not in the members room
    NotMember,
    /// Posted to the post room under the bot persona
    Forwarded { message_id: String },
}

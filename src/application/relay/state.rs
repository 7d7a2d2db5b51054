//! Resolved configuration the relay decides with

use crate::domain::entities::{BotIdentity, InboundMessage, RoomBinding};

use super::decision::is_eligible;

/// Bot identity and both room bindings.
///
/// Treated as immutable once shared: configuration changes build a new
/// value and the engine swaps it in whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayState {
    pub bot: BotIdentity,
    pub members_room: RoomBinding,
    pub post_room: RoomBinding,
}

impl RelayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bot(mut self, bot: BotIdentity) -> Self {
        self.bot = bot;
        self
    }

    pub fn with_members_room(mut self, binding: RoomBinding) -> Self {
        self.members_room = binding;
        self
    }

    pub fn with_post_room(mut self, binding: RoomBinding) -> Self {
        self.post_room = binding;
        self
    }

    pub fn is_eligible(&self, message: &InboundMessage) -> bool {
        is_eligible(message, &self.bot, &self.members_room, &self.post_room)
    }

    /// Everything needed to relay is resolved
    pub fn is_complete(&self) -> bool {
        self.bot.is_resolved() && self.members_room.is_resolved() && self.post_room.is_resolved()
    }

    /// Something is configured by name but its lookup has not succeeded
    pub fn has_pending(&self) -> bool {
        self.bot.is_pending() || self.members_room.is_pending() || self.post_room.is_pending()
    }
}

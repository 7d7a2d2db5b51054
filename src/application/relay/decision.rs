//! Pure relay rules: the eligibility gate and the forward decision

use crate::domain::entities::{BotIdentity, InboundMessage, OutboundMessage, RoomBinding, User};

use super::state::RelayState;

/// What to do with an eligible message once members are known
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayDecision {
    /// Post this message
    Forward(OutboundMessage),
    /// Sender is not in the members room
    NotMember,
    /// Message carries no text at all
    NoText,
    /// Post room or bot persona is not available at forward time
    Misconfigured(String),
}

/// Whether a message is relay traffic at all.
///
/// Runs on every message event, so it does no lookups.
pub fn is_eligible(
    message: &InboundMessage,
    bot: &BotIdentity,
    members_room: &RoomBinding,
    post_room: &RoomBinding,
) -> bool {
    let Some(bot_id) = bot.user_id() else {
        return false;
    };

    post_room.is_resolved()
        && members_room.is_resolved()
        && message.room.is_direct()
        && message.sender.id != bot_id
        && message.room.involves(bot_id)
}

/// Membership is decided by username.
pub fn is_member(sender: &User, members: &[User]) -> bool {
    match sender.username.as_deref() {
        Some(username) => members.iter().any(|m| m.has_username(username)),
        None => false,
    }
}

/// Decide how to handle an eligible message.
///
/// The outbound message is built from the bot persona and the text only;
/// the sender never reaches it.
pub fn decide(message: &InboundMessage, state: &RelayState, members: &[User]) -> RelayDecision {
    let Some(post_room) = state.post_room.handle() else {
        return RelayDecision::Misconfigured("post room is not resolved".to_string());
    };
    let Some(persona) = state.bot.persona() else {
        return RelayDecision::Misconfigured("bot user is not resolved".to_string());
    };

    if !is_member(&message.sender, members) {
        return RelayDecision::NotMember;
    }

    // an empty string is still text and goes out as-is
    match message.text.as_deref() {
        Some(text) => RelayDecision::Forward(OutboundMessage::new(post_room.clone(), persona, text)),
        None => RelayDecision::NoText,
    }
}

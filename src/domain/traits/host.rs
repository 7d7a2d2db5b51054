use async_trait::async_trait;

use crate::application::errors::HostError;
use crate::domain::entities::{OutboundMessage, Room, SettingId, User};

/// Reads current setting values from the host
#[async_trait]
pub trait SettingsReader: Send + Sync {
    /// Current value, `None` when unset
    async fn get_setting(&self, id: SettingId) -> Result<Option<String>, HostError>;
}

/// Room lookups
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Resolve a room by name
    async fn room_by_name(&self, name: &str) -> Result<Option<Room>, HostError>;

    /// List the current members of a room
    async fn members(&self, room: &Room) -> Result<Vec<User>, HostError>;
}

/// User lookups
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a user by username
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, HostError>;
}

/// Message creation
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Create the message in its target room, returning the new message id
    async fn send(&self, message: OutboundMessage) -> Result<String, HostError>;
}

/// Everything the relay needs from its host platform
pub trait Host: SettingsReader + RoomDirectory + UserDirectory + MessageSender {}

impl<T> Host for T where T: SettingsReader + RoomDirectory + UserDirectory + MessageSender {}

//! Domain entities - Core business objects with no external dependencies

pub mod user;
pub mod room;
pub mod message;
pub mod identity;
pub mod setting;

pub use user::User;
pub use room::{Room, RoomKind};
pub use message::{InboundMessage, OutboundMessage, BotPersona};
pub use identity::{BotIdentity, RoomBinding, DEFAULT_BOT_ALIAS, DEFAULT_BOT_AVATAR};
pub use setting::{SettingId, SettingDefinition, setting_definitions};

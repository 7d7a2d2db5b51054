use std::fmt;
use std::str::FromStr;

use super::identity::{DEFAULT_BOT_ALIAS, DEFAULT_BOT_AVATAR};

/// Host settings the relay reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingId {
    MembersRoomName,
    PostRoomName,
    BotUser,
    BotAlias,
    BotEmojiAvatar,
}

impl SettingId {
    pub const ALL: [SettingId; 5] = [
        SettingId::MembersRoomName,
        SettingId::PostRoomName,
        SettingId::BotUser,
        SettingId::BotAlias,
        SettingId::BotEmojiAvatar,
    ];

    /// Key under which the host stores the setting
    pub fn key(&self) -> &'static str {
        match self {
            SettingId::MembersRoomName => "Members_Room_Name",
            SettingId::PostRoomName => "Post_Room_Name",
            SettingId::BotUser => "Bot_Username",
            SettingId::BotAlias => "Bot_Alias",
            SettingId::BotEmojiAvatar => "Bot_Emoji_Avatar",
        }
    }

    pub fn definition(&self) -> SettingDefinition {
        match self {
            SettingId::MembersRoomName => SettingDefinition::new(*self)
                .with_label("Members room")
                .with_description("Only members of this room can post anonymously")
                .required(),
            SettingId::PostRoomName => SettingDefinition::new(*self)
                .with_label("Post room")
                .with_description("Room where anonymous messages are posted")
                .required(),
            SettingId::BotUser => SettingDefinition::new(*self)
                .with_label("Bot username")
                .with_description("Account that receives direct messages and posts them")
                .required(),
            SettingId::BotAlias => SettingDefinition::new(*self)
                .with_label("Bot alias")
                .with_default(DEFAULT_BOT_ALIAS),
            SettingId::BotEmojiAvatar => SettingDefinition::new(*self)
                .with_label("Bot emoji avatar")
                .with_default(DEFAULT_BOT_AVATAR),
        }
    }
}

impl fmt::Display for SettingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SettingId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingId::ALL
            .into_iter()
            .find(|id| id.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown setting: {}", s))
    }
}

/// A setting as registered with the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingDefinition {
    pub id: SettingId,
    pub label: String,
    pub description: Option<String>,
    pub default: Option<String>,
    pub required: bool,
}

impl SettingDefinition {
    pub fn new(id: SettingId) -> Self {
        Self {
            id,
            label: id.key().to_string(),
            description: None,
            default: None,
            required: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Every setting the relay registers, in display order
pub fn setting_definitions() -> Vec<SettingDefinition> {
    SettingId::ALL.iter().map(|id| id.definition()).collect()
}

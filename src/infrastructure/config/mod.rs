//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::errors::ConfigError;
use crate::application::relay::{RelayOptions, StartupPolicy, DEFAULT_MEMBERS_TTL_SECS};
use crate::domain::entities::{SettingId, DEFAULT_BOT_ALIAS, DEFAULT_BOT_AVATAR};

/// Longest accepted member cache TTL (one week)
const MAX_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub relay: RelayConfig,
    pub settings: SettingsConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RelayConfig {
    pub cache_ttl_seconds: u64,
    #[serde(default)]
    pub startup_policy: StartupPolicy,
}

/// Initial values for the host settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SettingsConfig {
    pub members_room_name: Option<String>,
    pub post_room_name: Option<String>,
    pub bot_username: Option<String>,
    pub bot_alias: Option<String>,
    pub bot_emoji_avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub console: Option<ConsoleConfig>,
}

/// Dev-mode directory served by the console adapter
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub bot_user_id: String,
    pub rooms: Vec<ConsoleRoomConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleRoomConfig {
    pub name: String,
    pub id: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "anonymizer-bot".to_string(),
            },
            relay: RelayConfig {
                cache_ttl_seconds: DEFAULT_MEMBERS_TTL_SECS,
                startup_policy: StartupPolicy::Tolerant,
            },
            settings: SettingsConfig {
                members_room_name: Some("team".to_string()),
                post_room_name: Some("suggestions".to_string()),
                bot_username: Some("anonymizer".to_string()),
                bot_alias: Some(DEFAULT_BOT_ALIAS.to_string()),
                bot_emoji_avatar: Some(DEFAULT_BOT_AVATAR.to_string()),
            },
            adapters: AdaptersConfig {
                console: Some(ConsoleConfig {
                    enabled: true,
                    bot_user_id: "bot1".to_string(),
                    rooms: vec![
                        ConsoleRoomConfig {
                            name: "team".to_string(),
                            id: None,
                            members: vec!["alice".to_string(), "bob".to_string()],
                        },
                        ConsoleRoomConfig {
                            name: "suggestions".to_string(),
                            id: None,
                            members: Vec::new(),
                        },
                    ],
                }),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relay.cache_ttl_seconds > MAX_CACHE_TTL_SECS {
            return Err(ConfigError::InvalidValue(format!(
                "cache-ttl-seconds out of range: {}",
                self.relay.cache_ttl_seconds
            )));
        }
        Ok(())
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Environment variables override file values
    pub fn apply_env(&mut self) {
        let overrides = [
            ("ANONYMIZER_MEMBERS_ROOM", &mut self.settings.members_room_name),
            ("ANONYMIZER_POST_ROOM", &mut self.settings.post_room_name),
            ("ANONYMIZER_BOT_USERNAME", &mut self.settings.bot_username),
            ("ANONYMIZER_BOT_ALIAS", &mut self.settings.bot_alias),
            ("ANONYMIZER_BOT_AVATAR", &mut self.settings.bot_emoji_avatar),
        ];
        for (key, field) in overrides {
            if let Ok(value) = std::env::var(key) {
                *field = Some(value);
            }
        }

        if let Ok(ttl) = std::env::var("ANONYMIZER_CACHE_TTL") {
            match ttl.parse::<u64>() {
                Ok(secs) if secs <= MAX_CACHE_TTL_SECS => self.relay.cache_ttl_seconds = secs,
                _ => tracing::warn!("Ignoring invalid ANONYMIZER_CACHE_TTL: {}", ttl),
            }
        }
    }

    pub fn relay_options(&self) -> RelayOptions {
        RelayOptions {
            cache_ttl: chrono::Duration::seconds(self.relay.cache_ttl_seconds as i64),
            startup_policy: self.relay.startup_policy,
        }
    }

    /// Configured setting values, in host key form
    pub fn initial_settings(&self) -> Vec<(SettingId, String)> {
        let values = [
            (SettingId::MembersRoomName, &self.settings.members_room_name),
            (SettingId::PostRoomName, &self.settings.post_room_name),
            (SettingId::BotUser, &self.settings.bot_username),
            (SettingId::BotAlias, &self.settings.bot_alias),
            (SettingId::BotEmojiAvatar, &self.settings.bot_emoji_avatar),
        ];
        values
            .into_iter()
            .filter_map(|(id, value)| value.clone().map(|v| (id, v)))
            .collect()
    }
}

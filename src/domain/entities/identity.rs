use super::{BotPersona, Room, User};

/// Default alias relayed messages are posted under
pub const DEFAULT_BOT_ALIAS: &str = "Anonymizer";

/// Default emoji avatar for relayed messages
pub const DEFAULT_BOT_AVATAR: &str = ":bust_in_silhouette:";

/// Bot account plus the persona it posts with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub username: Option<String>,
    pub user: Option<User>,
    pub alias: String,
    pub avatar: String,
}

impl BotIdentity {
    pub fn new() -> Self {
        Self {
            username: None,
            user: None,
            alias: DEFAULT_BOT_ALIAS.to_string(),
            avatar: DEFAULT_BOT_AVATAR.to_string(),
        }
    }

    pub fn resolved(user: User) -> Self {
        Self {
            username: user.username.clone(),
            user: Some(user),
            ..Self::new()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }

    /// Resolved bot user id, if any
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str()).filter(|id| !id.is_empty())
    }

    pub fn is_resolved(&self) -> bool {
        self.user_id().is_some()
    }

    /// Wanted but not found: a username is configured and lookup failed.
    pub fn is_pending(&self) -> bool {
        has_text(&self.username) && self.user.is_none()
    }

    pub fn persona(&self) -> Option<BotPersona> {
        let user = self.user.clone()?;
        Some(BotPersona {
            user,
            alias: self.alias.clone(),
            avatar: self.avatar.clone(),
        })
    }
}

impl Default for BotIdentity {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured room name together with its resolved handle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomBinding {
    pub configured_name: Option<String>,
    pub room: Option<Room>,
}

impl RoomBinding {
    pub fn unset() -> Self {
        Self::default()
    }

    /// Binding for a name whose lookup has not succeeded (yet)
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            configured_name: Some(name.into()),
            room: None,
        }
    }

    pub fn resolved(name: impl Into<String>, room: Room) -> Self {
        Self {
            configured_name: Some(name.into()),
            room: Some(room),
        }
    }

    /// The handle only counts when it was looked up from a non-empty name.
    pub fn handle(&self) -> Option<&Room> {
        if has_text(&self.configured_name) {
            self.room.as_ref()
        } else {
            None
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.handle().is_some()
    }

    pub fn is_pending(&self) -> bool {
        has_text(&self.configured_name) && self.room.is_none()
    }

    pub fn name(&self) -> Option<&str> {
        self.configured_name.as_deref().filter(|n| !n.is_empty())
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

//! Relay engine - runs the relay rules against the host

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::application::errors::{BotError, ConfigError};
use crate::domain::entities::{
    BotIdentity, InboundMessage, RoomBinding, SettingId, User, DEFAULT_BOT_ALIAS, DEFAULT_BOT_AVATAR,
};
use crate::domain::traits::{Clock, Host, SystemClock};

use super::cache::{default_members_ttl, MembersCache};
use super::decision::{decide, RelayDecision};
use super::event::{RelayEvent, RelayOutcome};
use super::state::RelayState;

/// What `bootstrap` does when settings are missing or do not resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartupPolicy {
    /// Start anyway; messages are ignored until the settings resolve
    #[default]
    Tolerant,
    /// Refuse to start
    Strict,
}

/// Engine tunables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOptions {
    pub cache_ttl: Duration,
    pub startup_policy: StartupPolicy,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            cache_ttl: default_members_ttl(),
            startup_policy: StartupPolicy::Tolerant,
        }
    }
}

/// Relays direct messages from members of one room into another room.
///
/// Holds the current [`RelayState`] and the member cache; everything else
/// comes from the injected host.
pub struct RelayEngine<H: Host> {
    host: Arc<H>,
    clock: Arc<dyn Clock>,
    options: RelayOptions,
    state: RwLock<Arc<RelayState>>,
    cache: RwLock<Option<Arc<MembersCache>>>,
    /// Latest update issued per setting
    revisions: Mutex<HashMap<SettingId, u64>>,
}

impl<H: Host> RelayEngine<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self {
            host,
            clock: Arc::new(SystemClock),
            options: RelayOptions::default(),
            state: RwLock::new(Arc::new(RelayState::new())),
            cache: RwLock::new(None),
            revisions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_options(mut self, options: RelayOptions) -> Self {
        self.options = options;
        self
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn options(&self) -> &RelayOptions {
        &self.options
    }

    /// Current configuration snapshot
    pub async fn state(&self) -> Arc<RelayState> {
        self.state.read().await.clone()
    }

    pub async fn cached_members(&self) -> Option<Arc<MembersCache>> {
        self.cache.read().await.clone()
    }

    pub async fn cache_is_valid(&self) -> bool {
        let now = self.clock.now();
        self.cache
            .read()
            .await
            .as_ref()
            .is_some_and(|cache| cache.is_valid_at(now))
    }

    /// Read every setting and resolve the bindings
    pub async fn bootstrap(&self) -> Result<Arc<RelayState>, BotError> {
        let members_name = self.read_setting(SettingId::MembersRoomName).await;
        let post_name = self.read_setting(SettingId::PostRoomName).await;
        let bot_username = self.read_setting(SettingId::BotUser).await;
        let alias = self
            .read_setting(SettingId::BotAlias)
            .await
            .unwrap_or_else(|| DEFAULT_BOT_ALIAS.to_string());
        let avatar = self
            .read_setting(SettingId::BotEmojiAvatar)
            .await
            .unwrap_or_else(|| DEFAULT_BOT_AVATAR.to_string());

        let members_room = self.resolve_room(SettingId::MembersRoomName, members_name).await;
        let post_room = self.resolve_room(SettingId::PostRoomName, post_name).await;
        let bot_user = self.resolve_bot_user(bot_username.as_deref()).await;

        let bot = BotIdentity {
            username: bot_username,
            user: bot_user,
            ..BotIdentity::new()
        };
        let state = RelayState::new()
            .with_bot(bot.with_alias(alias).with_avatar(avatar))
            .with_members_room(members_room)
            .with_post_room(post_room);

        if self.options.startup_policy == StartupPolicy::Strict {
            check_complete(&state)?;
        }

        if state.is_complete() {
            tracing::info!("Relay ready");
        } else {
            tracing::warn!("Relay is not fully configured, direct messages are ignored until settings resolve");
        }

        let state = Arc::new(state);
        *self.state.write().await = state.clone();
        Ok(state)
    }

    /// Apply one changed setting, resolving rooms and users as needed.
    ///
    /// When updates to the same setting overlap, the one issued last wins.
    pub async fn apply_setting(&self, id: SettingId, value: Option<String>) -> Arc<RelayState> {
        let value = value.filter(|v| !v.trim().is_empty());
        let revision = self.issue_revision(id).await;
        tracing::info!("Setting updated: {}", id);

        match id {
            SettingId::MembersRoomName => {
                let binding = self.resolve_room(id, value).await;
                self.update_setting(id, revision, |state| state.members_room = binding)
                    .await
            }
            SettingId::PostRoomName => {
                let binding = self.resolve_room(id, value).await;
                self.update_setting(id, revision, |state| state.post_room = binding)
                    .await
            }
            SettingId::BotUser => {
                let user = self.resolve_bot_user(value.as_deref()).await;
                self.update_setting(id, revision, |state| {
                    state.bot.username = value;
                    state.bot.user = user;
                })
                .await
            }
            SettingId::BotAlias => {
                self.update_setting(id, revision, |state| {
                    state.bot.alias = value.unwrap_or_else(|| DEFAULT_BOT_ALIAS.to_string());
                })
                .await
            }
            SettingId::BotEmojiAvatar => {
                self.update_setting(id, revision, |state| {
                    state.bot.avatar = value.unwrap_or_else(|| DEFAULT_BOT_AVATAR.to_string());
                })
                .await
            }
        }
    }

    /// Event boundary: failures end here as log lines
    pub async fn handle_event(&self, event: RelayEvent) {
        match event {
            RelayEvent::MessageSent(message) => match self.handle_message(&message).await {
                Ok(outcome) => {
                    tracing::debug!("Message {} handled: {:?}", message.id, outcome);
                }
                Err(BotError::Misconfigured(reason)) => {
                    tracing::error!("Relay misconfigured, message {} dropped: {}", message.id, reason);
                }
                Err(e) => {
                    tracing::warn!("Failed to relay message {}: {}", message.id, e);
                }
            },
            RelayEvent::SettingUpdated { id, value } => {
                self.apply_setting(id, value).await;
            }
        }
    }

    /// Relay one message if it qualifies
    pub async fn handle_message(&self, message: &InboundMessage) -> Result<RelayOutcome, BotError> {
        let mut state = self.state().await;
        if state.has_pending() {
            state = self.refresh_pending(&state).await;
        }

        if !state.is_eligible(message) {
            return Ok(RelayOutcome::Ignored);
        }

        let members = self.resolve_members(&state.members_room).await;

        // settings may have changed while members were fetched
        let current = self.state().await;
        match decide(message, &current, &members) {
            RelayDecision::Forward(outbound) => {
                let room = outbound.room.label().to_string();
                let message_id = self.host.send(outbound).await?;
                tracing::info!("Relayed message to {}", room);
                Ok(RelayOutcome::Forwarded { message_id })
            }
            RelayDecision::NotMember => Ok(RelayOutcome::NotMember),
            RelayDecision::NoText => Ok(RelayOutcome::Ignored),
            RelayDecision::Misconfigured(reason) => Err(BotError::Misconfigured(reason)),
        }
    }

    /// Members of the bound room, from cache while it is valid.
    ///
    /// A failed fetch falls back to the previous snapshot of the same room,
    /// stale or not. Snapshots of any other room are never used.
    pub async fn resolve_members(&self, binding: &RoomBinding) -> Vec<User> {
        let Some(room) = binding.handle() else {
            tracing::warn!("Members room is not resolved");
            return Vec::new();
        };

        let previous = self
            .cache
            .read()
            .await
            .clone()
            .filter(|cache| cache.belongs_to(&room.id));
        if let Some(cache) = previous.as_ref().filter(|c| c.is_valid_at(self.clock.now())) {
            return cache.members().to_vec();
        }

        match self.host.members(room).await {
            Ok(members) => {
                let fresh = MembersCache::new(members.clone(), self.options.cache_ttl, self.clock.now())
                    .for_room(room.id.clone());
                tracing::debug!(
                    "Fetched {} members of {}, cached until {}",
                    members.len(),
                    room.label(),
                    fresh.expires_at()
                );
                *self.cache.write().await = Some(Arc::new(fresh));
                members
            }
            Err(e) => {
                tracing::warn!("Failed to fetch members of {}: {}", room.label(), e);
                previous.map(|cache| cache.members().to_vec()).unwrap_or_default()
            }
        }
    }

    async fn update_state<F>(&self, apply: F) -> Arc<RelayState>
    where
        F: FnOnce(&mut RelayState),
    {
        let mut guard = self.state.write().await;
        let mut next = (**guard).clone();
        apply(&mut next);
        let next = Arc::new(next);
        *guard = next.clone();
        next
    }

    async fn issue_revision(&self, id: SettingId) -> u64 {
        let mut revisions = self.revisions.lock().await;
        let next = revisions.get(&id).copied().unwrap_or(0) + 1;
        revisions.insert(id, next);
        next
    }

    /// Like `update_state`, but dropped if a later update to `id` was issued meanwhile
    async fn update_setting<F>(&self, id: SettingId, revision: u64, apply: F) -> Arc<RelayState>
    where
        F: FnOnce(&mut RelayState),
    {
        let mut guard = self.state.write().await;
        let latest = self.revisions.lock().await.get(&id).copied();
        if latest != Some(revision) {
            tracing::debug!("Update {} of {} superseded, skipping", revision, id);
            return Arc::clone(&guard);
        }

        let mut next = (**guard).clone();
        apply(&mut next);
        let next = Arc::new(next);
        *guard = next.clone();
        next
    }

    /// Retry lookups for names that are set but did not resolve
    async fn refresh_pending(&self, seen: &RelayState) -> Arc<RelayState> {
        let members_room = if seen.members_room.is_pending() {
            Some(self.resolve_room(SettingId::MembersRoomName, seen.members_room.configured_name.clone()).await)
        } else {
            None
        };
        let post_room = if seen.post_room.is_pending() {
            Some(self.resolve_room(SettingId::PostRoomName, seen.post_room.configured_name.clone()).await)
        } else {
            None
        };
        let bot_user = if seen.bot.is_pending() {
            self.resolve_bot_user(seen.bot.username.as_deref()).await
        } else {
            None
        };

        // only fill in what has not been reconfigured in the meantime
        self.update_state(|current| {
            if let Some(binding) = members_room {
                if binding.is_resolved() && binding.configured_name == current.members_room.configured_name {
                    current.members_room = binding;
                }
            }
            if let Some(binding) = post_room {
                if binding.is_resolved() && binding.configured_name == current.post_room.configured_name {
                    current.post_room = binding;
                }
            }
            if let Some(user) = bot_user {
                if current.bot.user.is_none() && current.bot.username == seen.bot.username {
                    current.bot.user = Some(user);
                }
            }
        })
        .await
    }

    async fn read_setting(&self, id: SettingId) -> Option<String> {
        match self.host.get_setting(id).await {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read setting {}: {}", id, e);
                None
            }
        }
    }

    async fn resolve_room(&self, id: SettingId, name: Option<String>) -> RoomBinding {
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            return RoomBinding::unset();
        };

        match self.host.room_by_name(&name).await {
            Ok(Some(room)) => {
                tracing::info!("{} resolved to {} {}", id, room.kind.as_str(), room.id);
                RoomBinding::resolved(name, room)
            }
            Ok(None) => {
                tracing::warn!("{}: room '{}' not found", id, name);
                RoomBinding::named(name)
            }
            Err(e) => {
                tracing::warn!("{}: failed to look up room '{}': {}", id, name, e);
                RoomBinding::named(name)
            }
        }
    }

    async fn resolve_bot_user(&self, username: Option<&str>) -> Option<User> {
        let username = username.filter(|u| !u.is_empty())?;

        match self.host.user_by_username(username).await {
            Ok(Some(user)) => {
                tracing::info!("Bot user resolved: {}", user.id);
                Some(user)
            }
            Ok(None) => {
                tracing::warn!("Bot user '{}' not found", username);
                None
            }
            Err(e) => {
                tracing::warn!("Failed to look up bot user '{}': {}", username, e);
                None
            }
        }
    }
}

/// Strict startup: every required setting present and resolved
fn check_complete(state: &RelayState) -> Result<(), ConfigError> {
    let rooms = [
        (SettingId::MembersRoomName, &state.members_room),
        (SettingId::PostRoomName, &state.post_room),
    ];
    for (id, binding) in rooms {
        let Some(name) = binding.name() else {
            return Err(ConfigError::MissingField(id.key().to_string()));
        };
        if !binding.is_resolved() {
            return Err(ConfigError::InvalidValue(format!("{}: room '{}' not found", id, name)));
        }
    }

    let Some(username) = state.bot.username.as_deref() else {
        return Err(ConfigError::MissingField(SettingId::BotUser.key().to_string()));
    };
    if !state.bot.is_resolved() {
        return Err(ConfigError::InvalidValue(format!(
            "{}: user '{}' not found",
            SettingId::BotUser,
            username
        )));
    }

    Ok(())
}

//! In-memory host for development and testing

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};

use crate::application::errors::HostError;
use crate::domain::entities::{OutboundMessage, Room, SettingId, User};
use crate::domain::traits::{MessageSender, RoomDirectory, SettingsReader, UserDirectory};

/// Host directory kept in process memory
#[derive(Default)]
pub struct InMemoryHost {
    settings: RwLock<HashMap<SettingId, String>>,
    rooms: RwLock<HashMap<String, Room>>,
    members: RwLock<HashMap<String, Vec<User>>>,
    users: RwLock<HashMap<String, User>>,
    sent: RwLock<Vec<OutboundMessage>>,
    outbox: Option<mpsc::Sender<OutboundMessage>>,
    member_fetches: AtomicUsize,
    fail_member_fetch: AtomicBool,
    fail_send: AtomicBool,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also push every sent message to this channel
    pub fn with_outbox(mut self, outbox: mpsc::Sender<OutboundMessage>) -> Self {
        self.outbox = Some(outbox);
        self
    }

    pub async fn set_setting(&self, id: SettingId, value: impl Into<String>) {
        self.settings.write().await.insert(id, value.into());
    }

    pub async fn clear_setting(&self, id: SettingId) {
        self.settings.write().await.remove(&id);
    }

    pub async fn add_user(&self, user: User) {
        if let Some(username) = user.username.clone() {
            self.users.write().await.insert(username, user);
        }
    }

    /// Register a room under its name with an initial member list
    pub async fn add_room(&self, room: Room, members: Vec<User>) {
        for member in &members {
            self.add_user(member.clone()).await;
        }
        self.members.write().await.insert(room.id.clone(), members);
        if let Some(name) = room.name.clone() {
            self.rooms.write().await.insert(name, room);
        }
    }

    pub async fn set_members(&self, room_id: &str, members: Vec<User>) {
        self.members.write().await.insert(room_id.to_string(), members);
    }

    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.read().await.clone()
    }

    /// Number of member-list fetches served so far, failed ones included
    pub fn member_fetch_count(&self) -> usize {
        self.member_fetches.load(Ordering::SeqCst)
    }

    pub fn fail_member_fetches(&self, fail: bool) {
        self.fail_member_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SettingsReader for InMemoryHost {
    async fn get_setting(&self, id: SettingId) -> Result<Option<String>, HostError> {
        let settings = self.settings.read().await;
        Ok(settings.get(&id).cloned())
    }
}

#[async_trait]
impl RoomDirectory for InMemoryHost {
    async fn room_by_name(&self, name: &str) -> Result<Option<Room>, HostError> {
        let rooms = self.rooms.read().await;
        Ok(rooms.get(name).cloned())
    }

    async fn members(&self, room: &Room) -> Result<Vec<User>, HostError> {
        self.member_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_member_fetch.load(Ordering::SeqCst) {
            return Err(HostError::Unavailable("member lookup failed".to_string()));
        }

        let members = self.members.read().await;
        members
            .get(&room.id)
            .cloned()
            .ok_or_else(|| HostError::NotFound(room.id.clone()))
    }
}

#[async_trait]
impl UserDirectory for InMemoryHost {
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, HostError> {
        let users = self.users.read().await;
        Ok(users.get(username).cloned())
    }
}

#[async_trait]
impl MessageSender for InMemoryHost {
    async fn send(&self, message: OutboundMessage) -> Result<String, HostError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(HostError::Rejected("message creation failed".to_string()));
        }

        self.sent.write().await.push(message.clone());
        if let Some(outbox) = &self.outbox {
            if outbox.send(message).await.is_err() {
                tracing::debug!("Outbox closed, message kept in memory only");
            }
        }
        Ok(uuid::Uuid::new_v4().to_string())
    }
}

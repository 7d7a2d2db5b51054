//! End-to-end relay scenarios
//! Run with: cargo test --test relay_scenario_test

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;

use anonymizer_bot::application::errors::HostError;
use anonymizer_bot::application::relay::{RelayEngine, RelayEvent, RelayOutcome};
use anonymizer_bot::domain::entities::{
    InboundMessage, OutboundMessage, Room, RoomKind, SettingId, User,
};
use anonymizer_bot::domain::traits::{MessageSender, RoomDirectory, SettingsReader, UserDirectory};
use anonymizer_bot::infrastructure::adapters::InMemoryHost;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Host with fixed answers that records what the relay asks for
struct ScriptedHost {
    settings: HashMap<SettingId, String>,
    rooms: HashMap<String, Room>,
    members: Vec<User>,
    users: HashMap<String, User>,
    sent: Mutex<Vec<OutboundMessage>>,
    member_fetches: AtomicUsize,
}

impl ScriptedHost {
    fn new() -> Self {
        let bot = User::new("user:bot1").with_username("anonymizer").as_bot();
        let alice = User::new("user:alice").with_username("alice");
        let bob = User::new("user:bob").with_username("bob");

        let settings = HashMap::from([
            (SettingId::MembersRoomName, "team".to_string()),
            (SettingId::PostRoomName, "suggestions".to_string()),
            (SettingId::BotUser, "anonymizer".to_string()),
        ]);
        let rooms = HashMap::from([
            (
                "team".to_string(),
                Room::new("room:members1", RoomKind::PrivateGroup).with_name("team"),
            ),
            (
                "suggestions".to_string(),
                Room::new("room:post1", RoomKind::Channel).with_name("suggestions"),
            ),
        ]);
        let users = HashMap::from([("anonymizer".to_string(), bot)]);

        Self {
            settings,
            rooms,
            members: vec![alice, bob],
            users,
            sent: Mutex::new(Vec::new()),
            member_fetches: AtomicUsize::new(0),
        }
    }

    fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SettingsReader for ScriptedHost {
    async fn get_setting(&self, id: SettingId) -> Result<Option<String>, HostError> {
        Ok(self.settings.get(&id).cloned())
    }
}

#[async_trait]
impl RoomDirectory for ScriptedHost {
    async fn room_by_name(&self, name: &str) -> Result<Option<Room>, HostError> {
        Ok(self.rooms.get(name).cloned())
    }

    async fn members(&self, room: &Room) -> Result<Vec<User>, HostError> {
        self.member_fetches.fetch_add(1, Ordering::SeqCst);
        if room.id == "room:members1" {
            Ok(self.members.clone())
        } else {
            Err(HostError::NotFound(room.id.clone()))
        }
    }
}

#[async_trait]
impl UserDirectory for ScriptedHost {
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, HostError> {
        Ok(self.users.get(username).cloned())
    }
}

#[async_trait]
impl MessageSender for ScriptedHost {
    async fn send(&self, message: OutboundMessage) -> Result<String, HostError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(message);
        Ok(format!("msg:{}", sent.len()))
    }
}

fn alice() -> User {
    User::new("user:alice").with_username("alice")
}

/// The DM room id embeds both participants
fn alice_dm(text: &str) -> InboundMessage {
    InboundMessage::from_text(alice(), Room::direct("user:bot1user:alice_dm"), text)
}

#[tokio::test]
async fn test_member_direct_message_reaches_post_room() {
    ensure_init();

    let host = Arc::new(ScriptedHost::new());
    let engine = RelayEngine::new(host.clone());
    engine.bootstrap().await.expect("bootstrap should succeed");

    engine.handle_event(RelayEvent::MessageSent(alice_dm("hello"))).await;

    let sent = host.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].room.id, "room:post1");
    assert_eq!(sent[0].text, "hello");
    assert_eq!(sent[0].sender.user.id, "user:bot1");
    assert_eq!(sent[0].sender.alias, "Anonymizer");
    assert_eq!(sent[0].sender.avatar, ":bust_in_silhouette:");
    assert!(!sent[0].groupable);
    assert!(sent[0].thread_id.is_none());
}

#[tokio::test]
async fn test_forwarded_text_is_untouched_and_anonymous() {
    ensure_init();

    let host = Arc::new(ScriptedHost::new());
    let engine = RelayEngine::new(host.clone());
    engine.bootstrap().await.unwrap();

    let texts = [
        "hello",
        "  leading and trailing  ",
        "multi\nline\n\nmessage",
        "emoji 🙈 and ünïcödé",
        "mentions @alice and user:alice stay as typed",
    ];
    for text in texts {
        let outcome = engine.handle_message(&alice_dm(text)).await.unwrap();
        assert!(matches!(outcome, RelayOutcome::Forwarded { .. }));
    }

    let sent = host.sent();
    assert_eq!(sent.len(), texts.len());
    for (message, text) in sent.iter().zip(texts) {
        assert_eq!(message.text, text);
        assert_eq!(message.sender.user.id, "user:bot1");
        assert_ne!(message.sender.user, alice());
        assert_eq!(message.sender.alias, "Anonymizer");
    }
}

#[tokio::test]
async fn test_two_messages_one_member_lookup() {
    ensure_init();

    let host = Arc::new(ScriptedHost::new());
    let engine = RelayEngine::new(host.clone());
    engine.bootstrap().await.unwrap();

    engine.handle_event(alice_dm("first").into()).await;
    engine.handle_event(alice_dm("second").into()).await;

    assert_eq!(host.member_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(host.sent().len(), 2);
}

#[tokio::test]
async fn test_non_member_gets_nothing_posted() {
    ensure_init();

    let host = Arc::new(ScriptedHost::new());
    let engine = RelayEngine::new(host.clone());
    engine.bootstrap().await.unwrap();

    let carol = User::new("user:carol").with_username("carol");
    let message = InboundMessage::from_text(carol, Room::direct("user:bot1user:carol"), "hi");

    assert_eq!(engine.handle_message(&message).await.unwrap(), RelayOutcome::NotMember);
    assert!(host.sent().is_empty());
}

#[tokio::test]
async fn test_in_memory_host_scenario() {
    ensure_init();

    let host = Arc::new(InMemoryHost::new());
    host.add_user(User::new("bot1").with_username("anonymizer").as_bot()).await;
    host.add_room(
        Room::new("room:members1", RoomKind::PrivateGroup).with_name("team"),
        vec![
            User::new("alice").with_username("alice"),
            User::new("bob").with_username("bob"),
        ],
    )
    .await;
    host.add_room(Room::new("room:post1", RoomKind::Channel).with_name("suggestions"), vec![])
        .await;

    // nothing configured yet: the tolerant start still succeeds
    let engine = RelayEngine::new(host.clone());
    engine.bootstrap().await.unwrap();

    let dm = InboundMessage::from_text(
        User::new("alice").with_username("alice"),
        Room::direct("bot1alice_dm"),
        "hello",
    );
    engine.handle_event(dm.clone().into()).await;
    assert!(host.sent_messages().await.is_empty());

    engine.handle_event(RelayEvent::setting(SettingId::MembersRoomName, "team")).await;
    engine.handle_event(RelayEvent::setting(SettingId::PostRoomName, "suggestions")).await;
    engine.handle_event(RelayEvent::setting(SettingId::BotUser, "anonymizer")).await;
    engine.handle_event(dm.into()).await;

    let sent = host.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].room.id, "room:post1");
    assert_eq!(sent[0].text, "hello");
    assert_eq!(sent[0].sender.user.id, "bot1");
}

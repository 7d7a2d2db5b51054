//! Console adapter for development/testing
//!
//! Serves an in-memory host directory and turns stdin lines into host
//! events, so the relay can be exercised without a chat server.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::errors::BotError;
use crate::application::relay::{RelayEngine, RelayEvent};
use crate::domain::entities::{
    setting_definitions, InboundMessage, OutboundMessage, Room, RoomKind, SettingId, User,
};
use crate::domain::traits::{SettingsReader, UserDirectory};
use crate::infrastructure::adapters::memory::InMemoryHost;
use crate::infrastructure::config::{Config, ConsoleConfig};

/// One parsed line of console input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    /// `<username>: <text>` - a direct message to the bot
    Message { username: String, text: String },
    /// `/set <Setting_Key> [value]`
    Set { id: SettingId, value: Option<String> },
    /// `/settings`
    Settings,
    /// `/help`
    Help,
    /// `/quit`
    Quit,
    Invalid(String),
}

impl ConsoleInput {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(command) = line.strip_prefix('/') {
            let mut parts = command.splitn(3, ' ');
            let input = match parts.next().unwrap_or("") {
                "quit" | "exit" => ConsoleInput::Quit,
                "help" => ConsoleInput::Help,
                "settings" => ConsoleInput::Settings,
                "set" => match parts.next().map(str::parse::<SettingId>) {
                    Some(Ok(id)) => ConsoleInput::Set {
                        id,
                        value: parts.next().map(|v| v.trim().to_string()).filter(|v| !v.is_empty()),
                    },
                    Some(Err(e)) => ConsoleInput::Invalid(e),
                    None => ConsoleInput::Invalid("Usage: /set <Setting_Key> [value]".to_string()),
                },
                other => ConsoleInput::Invalid(format!("Unknown command: /{}", other)),
            };
            return Some(input);
        }

        match line.split_once(':') {
            Some((username, text)) if !username.trim().is_empty() && !username.contains(' ') => {
                Some(ConsoleInput::Message {
                    username: username.trim().to_string(),
                    text: text.trim_start().to_string(),
                })
            }
            _ => Some(ConsoleInput::Invalid("Expected '<username>: <text>'".to_string())),
        }
    }
}

const HELP: &str = "<username>: <text>        send a direct message to the bot
/set <Setting_Key> [value]  change a setting (no value clears it)
/settings                   show settings
/quit                       exit";

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    host: Arc<InMemoryHost>,
    engine: RelayEngine<InMemoryHost>,
    outbox: Option<mpsc::Receiver<OutboundMessage>>,
    fallback_bot_id: String,
}

impl ConsoleAdapter {
    pub async fn from_config(config: &Config) -> Self {
        let console = config.adapters.console.clone().unwrap_or_else(|| ConsoleConfig {
            enabled: true,
            bot_user_id: "bot1".to_string(),
            rooms: Vec::new(),
        });

        let (tx, rx) = mpsc::channel(64);
        let host = Arc::new(InMemoryHost::new().with_outbox(tx));
        seed_directory(&host, config, &console).await;

        let engine = RelayEngine::new(host.clone()).with_options(config.relay_options());

        Self {
            host,
            engine,
            outbox: Some(rx),
            fallback_bot_id: console.bot_user_id,
        }
    }

    pub fn engine(&self) -> &RelayEngine<InMemoryHost> {
        &self.engine
    }

    pub fn host(&self) -> &Arc<InMemoryHost> {
        &self.host
    }

    /// Resolve settings, as the host does when the bot is enabled
    pub async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode)");
        self.engine.bootstrap().await?;
        Ok(())
    }

    /// Handle one input line; returns false once the session should end
    pub async fn handle_line(&self, line: &str) -> bool {
        let Some(input) = ConsoleInput::parse(line) else {
            return true;
        };

        match input {
            ConsoleInput::Quit => return false,
            ConsoleInput::Help => println!("{}", HELP),
            ConsoleInput::Settings => self.print_settings().await,
            ConsoleInput::Invalid(reason) => println!("{}", reason),
            ConsoleInput::Set { id, value } => {
                match &value {
                    Some(v) => self.host.set_setting(id, v.clone()).await,
                    None => self.host.clear_setting(id).await,
                }
                self.engine
                    .handle_event(RelayEvent::SettingUpdated { id, value })
                    .await;
            }
            ConsoleInput::Message { username, text } => {
                let message = self.direct_message(&username, text).await;
                self.engine.handle_event(RelayEvent::MessageSent(message)).await;
            }
        }
        true
    }

    /// Print relayed messages as they are sent.
    ///
    /// The task ends once the adapter is dropped and the queue is drained;
    /// it yields the number of lines printed. `None` if already started.
    pub fn spawn_printer(&mut self) -> Option<JoinHandle<usize>> {
        let mut outbox = self.outbox.take()?;
        Some(tokio::spawn(async move {
            let mut printed = 0;
            while let Some(message) = outbox.recv().await {
                println!("{}", format_relayed(&message));
                printed += 1;
            }
            printed
        }))
    }

    /// Read stdin until EOF or `/quit`
    pub async fn run(mut self) -> Result<(), BotError> {
        self.start().await?;
        println!("{}", HELP);

        let printer = self.spawn_printer();
        let result = self.read_stdin().await;

        // closes the outbox so the printer finishes what is queued
        drop(self);
        if let Some(printer) = printer {
            if let Err(e) = printer.await {
                tracing::warn!("Outbox printer failed: {}", e);
            }
        }

        tracing::info!("Console session ended");
        result
    }

    async fn read_stdin(&self) -> Result<(), BotError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if !self.handle_line(&line).await {
                break;
            }
        }
        Ok(())
    }

    /// A DM from `username` to the bot, in a room whose id embeds both
    async fn direct_message(&self, username: &str, text: String) -> InboundMessage {
        let sender = match self.host.user_by_username(username).await {
            Ok(Some(user)) => user,
            _ => User::new(username).with_username(username),
        };

        let state = self.engine.state().await;
        let bot_id = state.bot.user_id().unwrap_or(&self.fallback_bot_id);
        let room = Room::direct(format!("{}{}", bot_id, sender.id));

        let raw = serde_json::json!({
            "source": "console",
            "username": username,
            "text": &text,
        });
        InboundMessage::from_text(sender, room, text).with_raw(raw)
    }

    async fn print_settings(&self) {
        for def in setting_definitions() {
            let value = self.host.get_setting(def.id).await.ok().flatten();
            let shown = value.or(def.default).unwrap_or_else(|| "(unset)".to_string());
            let marker = if def.required { "*" } else { " " };
            println!("{}{:<18} {:<22} {}", marker, def.id.key(), def.label, shown);
        }
    }
}

/// Render a relayed message the way the post room shows it
pub fn format_relayed(message: &OutboundMessage) -> String {
    format!(
        "[#{}] {} {}: {}",
        message.room.label(),
        message.sender.alias,
        message.sender.avatar,
        message.text
    )
}

async fn seed_directory(host: &InMemoryHost, config: &Config, console: &ConsoleConfig) {
    for (id, value) in config.initial_settings() {
        host.set_setting(id, value).await;
    }

    if let Some(username) = config.settings.bot_username.clone() {
        host.add_user(User::new(console.bot_user_id.clone()).with_username(username).as_bot())
            .await;
    }

    for room in &console.rooms {
        let id = room.id.clone().unwrap_or_else(|| format!("room:{}", room.name));
        let members = room
            .members
            .iter()
            .map(|name| User::new(name.clone()).with_username(name.clone()))
            .collect();
        host.add_room(Room::new(id, RoomKind::PrivateGroup).with_name(room.name.clone()), members)
            .await;
    }
}

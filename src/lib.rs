//! Anonymous suggestion-box relay bot.
//!
//! Direct messages sent to the bot by members of one room are reposted,
//! under the bot's alias and avatar only, into another room.

pub mod domain;
pub mod application;
pub mod infrastructure;

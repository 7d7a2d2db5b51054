//! Domain traits - Abstractions for host platform implementations

pub mod clock;
pub mod host;

pub use clock::{Clock, ManualClock, SystemClock};
pub use host::{Host, MessageSender, RoomDirectory, SettingsReader, UserDirectory};

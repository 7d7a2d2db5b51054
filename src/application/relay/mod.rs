//! Anonymous relay - member cache, relay rules and the engine running them

pub mod cache;
pub mod decision;
pub mod engine;
pub mod event;
pub mod state;


pub use cache::{default_members_ttl, MembersCache, DEFAULT_MEMBERS_TTL_SECS};
pub use decision::{decide, is_eligible, is_member, RelayDecision};
pub use engine::{RelayEngine, RelayOptions, StartupPolicy};
pub use event::{RelayEvent, RelayOutcome};
pub use state::RelayState;

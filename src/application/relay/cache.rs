//! Time-bounded snapshot of a room's member list

use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::User;

/// How long a member list is reused before asking the host again
pub const DEFAULT_MEMBERS_TTL_SECS: u64 = 300;

pub fn default_members_ttl() -> Duration {
    Duration::seconds(DEFAULT_MEMBERS_TTL_SECS as i64)
}

/// Member list snapshot with an absolute expiry.
///
/// Never mutated or cleared: a fresh fetch builds a new value that
/// replaces the old one. A snapshot only answers for the room it was
/// fetched from.
#[derive(Debug, Clone)]
pub struct MembersCache {
    room_id: Option<String>,
    members: Vec<User>,
    expires_at: DateTime<Utc>,
}

impl MembersCache {
    pub fn new(members: Vec<User>, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            room_id: None,
            members,
            expires_at: now + ttl,
        }
    }

    pub fn for_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    /// Fetched from this room
    pub fn belongs_to(&self, room_id: &str) -> bool {
        self.room_id.as_deref() == Some(room_id)
    }

    /// Valid strictly before `expires_at`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn members(&self) -> &[User] {
        &self.members
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

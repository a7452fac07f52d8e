//! Anonymous user entity.

use crate::{AnonymousUserId, Entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pseudonymous participant identified by a browser fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousUser {
    /// Unique identifier handed back to the browser.
    pub id: AnonymousUserId,

    /// Device fingerprint; unique across users.
    pub fingerprint: String,

    /// When the fingerprint was first seen.
    pub first_seen: DateTime<Utc>,

    /// Last time the fingerprint checked in.
    pub last_active: DateTime<Utc>,
}

impl AnonymousUser {
    /// Creates a user first seen at `now`.
    #[must_use]
    pub fn new(fingerprint: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: AnonymousUserId::new(),
            fingerprint: fingerprint.into(),
            first_seen: now,
            last_active: now,
        }
    }

    /// Records activity at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active = now;
    }
}

impl Entity<AnonymousUserId> for AnonymousUser {
    fn id(&self) -> &AnonymousUserId {
        &self.id
    }
}

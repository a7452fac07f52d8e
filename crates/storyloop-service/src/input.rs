//! Parsing of loosely typed request fields.

use storyloop_core::{AnonymousUserId, SessionKey, StoryError, StoryResult};

pub(crate) const MISSING_FIELDS: &str = "Missing required fields";
pub(crate) const INVALID_SESSION: &str = "Invalid session parameters";
pub(crate) const INVALID_USER: &str = "Invalid user ID";

/// Session slot from a `YYYY-MM-DD` date and a slot index.
pub(crate) fn session_key(date: &str, slot: i64) -> StoryResult<SessionKey> {
    SessionKey::parse(date.trim(), slot).map_err(|_| StoryError::validation(INVALID_SESSION))
}

/// Session slot from query strings; both parts are required.
pub(crate) fn session_key_from_query(date: Option<&str>, slot: Option<&str>) -> StoryResult<SessionKey> {
    let (Some(date), Some(slot)) = (crate::dto::present(date), crate::dto::present(slot)) else {
        return Err(StoryError::validation("sessionDate and sessionTime are required"));
    };
    let slot = slot.parse::<i64>().map_err(|_| StoryError::validation(INVALID_SESSION))?;
    session_key(date, slot)
}

pub(crate) fn user_id(value: &str) -> StoryResult<AnonymousUserId> {
    AnonymousUserId::parse(value).map_err(|_| StoryError::validation(INVALID_USER))
}

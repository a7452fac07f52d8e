//! Session slots and the key identifying one slot on one day.

use crate::{StoryError, StoryResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message used for every malformed date/slot pair.
pub const INVALID_SESSION_MESSAGE: &str = "Invalid session parameters";

/// One of the four daily two-hour voting windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SessionSlot {
    /// 08:00 to 10:00.
    Morning = 0,
    /// 10:00 to 12:00.
    LateMorning = 1,
    /// 12:00 to 14:00.
    Midday = 2,
    /// 14:00 to 16:00.
    Afternoon = 3,
}

impl SessionSlot {
    /// All slots in chronological order.
    pub const ALL: [Self; 4] = [Self::Morning, Self::LateMorning, Self::Midday, Self::Afternoon];

    /// Length of every slot.
    pub const DURATION_HOURS: i64 = 2;

    /// Zero-based index of the slot within the day.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Local hour at which the slot opens.
    #[must_use]
    pub const fn start_hour(self) -> i64 {
        8 + Self::DURATION_HOURS * self as i64
    }

    /// Phrase category prompted during this slot.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Morning => Category::CharacterSubject,
            Self::LateMorning => Category::ActionVerb,
            Self::Midday => Category::ObjectSetting,
            Self::Afternoon => Category::MoodTwist,
        }
    }

    /// Looks a slot up by index.
    #[must_use]
    pub const fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Morning),
            1 => Some(Self::LateMorning),
            2 => Some(Self::Midday),
            3 => Some(Self::Afternoon),
            _ => None,
        }
    }
}

impl TryFrom<u8> for SessionSlot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(i64::from(value)).ok_or_else(|| format!("session slot out of range: {value}"))
    }
}

impl TryFrom<i16> for SessionSlot {
    type Error = StoryError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::from_index(i64::from(value))
            .ok_or_else(|| StoryError::internal(format!("stored session slot out of range: {value}")))
    }
}

impl From<SessionSlot> for u8 {
    fn from(slot: SessionSlot) -> Self {
        slot.index()
    }
}

impl From<SessionSlot> for i16 {
    fn from(slot: SessionSlot) -> Self {
        i16::from(slot.index())
    }
}

impl fmt::Display for SessionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Kind of phrase a slot asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Category {
    #[serde(rename = "Character/Subject")]
    CharacterSubject,
    #[serde(rename = "Action/Verb")]
    ActionVerb,
    #[serde(rename = "Object/Setting")]
    ObjectSetting,
    #[serde(rename = "Mood/Twist")]
    MoodTwist,
}

impl Category {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CharacterSubject => "Character/Subject",
            Self::ActionVerb => "Action/Verb",
            Self::ObjectSetting => "Object/Setting",
            Self::MoodTwist => "Mood/Twist",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A slot on a specific local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey {
    pub date: NaiveDate,
    pub slot: SessionSlot,
}

impl SessionKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(date: NaiveDate, slot: SessionSlot) -> Self {
        Self { date, slot }
    }

    /// Parses a `YYYY-MM-DD` date and a slot index.
    ///
    /// # Errors
    ///
    /// Returns a validation error when either part is malformed.
    pub fn parse(date: &str, slot: i64) -> StoryResult<Self> {
        let date = parse_session_date(date).ok_or_else(|| StoryError::validation(INVALID_SESSION_MESSAGE))?;
        let slot = SessionSlot::from_index(slot).ok_or_else(|| StoryError::validation(INVALID_SESSION_MESSAGE))?;
        Ok(Self { date, slot })
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.date.format("%Y-%m-%d"), self.slot)
    }
}

/// Strict `YYYY-MM-DD` parsing.
#[must_use]
pub fn parse_session_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_hours_and_categories() {
        let hours: Vec<i64> = SessionSlot::ALL.iter().map(|s| s.start_hour()).collect();
        assert_eq!(hours, vec![8, 10, 12, 14]);
        assert_eq!(SessionSlot::Morning.category().label(), "Character/Subject");
        assert_eq!(SessionSlot::Afternoon.category().label(), "Mood/Twist");
    }

    #[test]
    fn test_slot_serializes_as_index() {
        assert_eq!(serde_json::to_string(&SessionSlot::Midday).unwrap(), "2");
        let slot: SessionSlot = serde_json::from_str("3").unwrap();
        assert_eq!(slot, SessionSlot::Afternoon);
        assert!(serde_json::from_str::<SessionSlot>("4").is_err());
    }

    #[test]
    fn test_parse_session_key() {
        let key = SessionKey::parse("2024-05-01", 1).unwrap();
        assert_eq!(key.slot, SessionSlot::LateMorning);
        assert_eq!(key.to_string(), "2024-05-01:1");
    }

    #[test]
    fn test_parse_session_key_rejects_malformed_input() {
        for (date, slot) in [("2024-5-1", 0), ("2024-02-30", 0), ("20240501", 0), ("2024-05-01", 4), ("2024-05-01", -1)] {
            let err = SessionKey::parse(date, slot).unwrap_err();
            assert_eq!(err.to_string(), INVALID_SESSION_MESSAGE, "{date} {slot}");
        }
    }
}

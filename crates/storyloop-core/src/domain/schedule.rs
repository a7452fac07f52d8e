//! Session window arithmetic.
//!
//! Slots are laid out on the local calendar of a fixed UTC offset. Windows are
//! half-open, so the instant a slot closes already belongs to the next one.

use super::session::{Category, SessionKey, SessionSlot};
use crate::{StoryError, StoryResult};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use serde::Serialize;

/// A concrete session window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VotingSession {
    pub date: NaiveDate,
    #[serde(rename = "time")]
    pub slot: SessionSlot,
    pub starts_at: DateTime<FixedOffset>,
    pub ends_at: DateTime<FixedOffset>,
    pub is_active: bool,
    pub category: Category,
}

impl VotingSession {
    /// Key of the slot this window belongs to.
    #[must_use]
    pub const fn key(&self) -> SessionKey {
        SessionKey::new(self.date, self.slot)
    }

    /// Whether `now` falls inside the window.
    #[must_use]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && now < self.ends_at
    }
}

/// Everything a client needs to render the session banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub current_session: Option<VotingSession>,
    pub next_session: VotingSession,
    pub time_until_next: Duration,
    pub time_until_end: Duration,
}

/// The daily schedule in a given local offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSchedule {
    offset: FixedOffset,
}

impl Default for SessionSchedule {
    fn default() -> Self {
        Self::utc()
    }
}

impl SessionSchedule {
    /// Creates a schedule in `offset`.
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Schedule on the UTC calendar.
    #[must_use]
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Creates a schedule from an offset in minutes east of UTC.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for offsets outside +/- 24h.
    pub fn from_offset_minutes(minutes: i32) -> StoryResult<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
            .ok_or_else(|| StoryError::Configuration(format!("invalid UTC offset: {minutes} minutes")))
    }

    /// The local offset.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local calendar date of `now`.
    #[must_use]
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// Window of `key`, not flagged active.
    #[must_use]
    pub fn window(&self, key: SessionKey) -> VotingSession {
        let local_midnight = key.date.and_time(NaiveTime::default());
        let starts_local = local_midnight + Duration::hours(key.slot.start_hour());
        let starts_utc = starts_local - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        let starts_at = DateTime::<FixedOffset>::from_naive_utc_and_offset(starts_utc, self.offset);

        VotingSession {
            date: key.date,
            slot: key.slot,
            starts_at,
            ends_at: starts_at + Duration::hours(SessionSlot::DURATION_HOURS),
            is_active: false,
            category: key.slot.category(),
        }
    }

    /// The open session at `now`, if any.
    #[must_use]
    pub fn current_session(&self, now: DateTime<Utc>) -> Option<VotingSession> {
        let today = self.local_date(now);
        SessionSlot::ALL
            .iter()
            .map(|slot| self.window(SessionKey::new(today, *slot)))
            .find(|window| window.contains(now))
            .map(|window| VotingSession {
                is_active: true,
                ..window
            })
    }

    /// The first session that opens after `now`.
    #[must_use]
    pub fn next_session(&self, now: DateTime<Utc>) -> VotingSession {
        let today = self.local_date(now);
        SessionSlot::ALL
            .iter()
            .map(|slot| self.window(SessionKey::new(today, *slot)))
            .find(|window| window.starts_at > now)
            .unwrap_or_else(|| {
                let tomorrow = today.succ_opt().unwrap_or(today);
                self.window(SessionKey::new(tomorrow, SessionSlot::Morning))
            })
    }

    /// Time until the next session opens.
    #[must_use]
    pub fn time_until_next(&self, now: DateTime<Utc>) -> Duration {
        (self.next_session(now).starts_at.with_timezone(&Utc) - now).max(Duration::zero())
    }

    /// Time until the open session closes, zero when none is open.
    #[must_use]
    pub fn time_until_end(&self, now: DateTime<Utc>) -> Duration {
        self.current_session(now)
            .map_or_else(Duration::zero, |session| session.ends_at.with_timezone(&Utc) - now)
    }

    /// Whether `key` is the session open at `now`.
    #[must_use]
    pub fn is_open(&self, key: SessionKey, now: DateTime<Utc>) -> bool {
        self.window(key).contains(now)
    }

    /// Combined view of the schedule at `now`.
    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> SessionStatus {
        SessionStatus {
            current_session: self.current_session(now),
            next_session: self.next_session(now),
            time_until_next: self.time_until_next(now),
            time_until_end: self.time_until_end(now),
        }
    }
}

/// Formats a countdown as `HH:MM:SS`.
#[must_use]
pub fn format_time_remaining(remaining: Duration) -> String {
    if remaining <= Duration::zero() {
        return "00:00:00".to_string();
    }
    let total = remaining.num_seconds();
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap()
    }

    fn may(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn test_current_session_inside_window() {
        let schedule = SessionSchedule::utc();
        let session = schedule.current_session(at(9, 15, 0)).unwrap();
        assert_eq!(session.slot, SessionSlot::Morning);
        assert!(session.is_active);
        assert_eq!(session.category, Category::CharacterSubject);
        assert_eq!(session.date, may(1));
    }

    #[test]
    fn test_boundary_belongs_to_the_later_slot() {
        let schedule = SessionSchedule::utc();
        assert_eq!(schedule.current_session(at(10, 0, 0)).unwrap().slot, SessionSlot::LateMorning);
        assert_eq!(schedule.current_session(at(8, 0, 0)).unwrap().slot, SessionSlot::Morning);
        assert!(schedule.current_session(at(16, 0, 0)).is_none());
        assert!(schedule.current_session(at(7, 59, 59)).is_none());
    }

    #[test]
    fn test_next_session_same_day_and_rollover() {
        let schedule = SessionSchedule::utc();

        let next = schedule.next_session(at(6, 0, 0));
        assert_eq!((next.date, next.slot), (may(1), SessionSlot::Morning));
        assert!(!next.is_active);

        let next = schedule.next_session(at(11, 30, 0));
        assert_eq!((next.date, next.slot), (may(1), SessionSlot::Midday));

        let next = schedule.next_session(at(14, 0, 0));
        assert_eq!((next.date, next.slot), (may(2), SessionSlot::Morning));

        let next = schedule.next_session(at(23, 0, 0));
        assert_eq!((next.date, next.slot), (may(2), SessionSlot::Morning));
    }

    #[test]
    fn test_countdowns() {
        let schedule = SessionSchedule::utc();
        let now = at(9, 15, 30);
        assert_eq!(schedule.time_until_end(now), Duration::seconds(44 * 60 + 30));
        assert_eq!(schedule.time_until_next(now), Duration::seconds(44 * 60 + 30));

        let evening = at(20, 0, 0);
        assert_eq!(schedule.time_until_end(evening), Duration::zero());
        assert_eq!(schedule.time_until_next(evening), Duration::hours(12));
    }

    #[test]
    fn test_offset_moves_windows_and_local_date() {
        // UTC-5: 13:30 UTC is 08:30 local.
        let schedule = SessionSchedule::from_offset_minutes(-300).unwrap();
        let session = schedule.current_session(at(13, 30, 0)).unwrap();
        assert_eq!(session.slot, SessionSlot::Morning);
        assert_eq!(session.starts_at.with_timezone(&Utc), at(13, 0, 0));

        // 02:00 UTC on May 1st is still April 30th locally.
        assert_eq!(schedule.local_date(at(2, 0, 0)), NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
    }

    #[test]
    fn test_invalid_offset_is_rejected() {
        assert!(SessionSchedule::from_offset_minutes(24 * 60).is_err());
        assert!(SessionSchedule::from_offset_minutes(i32::MAX).is_err());
    }

    #[test]
    fn test_is_open() {
        let schedule = SessionSchedule::utc();
        let key = SessionKey::new(may(1), SessionSlot::Midday);
        assert!(schedule.is_open(key, at(12, 0, 0)));
        assert!(!schedule.is_open(key, at(14, 0, 0)));
    }

    #[test]
    fn test_status_without_open_session() {
        let status = SessionSchedule::utc().status(at(17, 0, 0));
        assert!(status.current_session.is_none());
        assert_eq!(status.time_until_end, Duration::zero());
        assert_eq!(status.next_session.date, may(2));
    }

    #[test]
    fn test_format_time_remaining() {
        assert_eq!(format_time_remaining(Duration::seconds(3725)), "01:02:05");
        assert_eq!(format_time_remaining(Duration::milliseconds(59_999)), "00:00:59");
        assert_eq!(format_time_remaining(Duration::zero()), "00:00:00");
        assert_eq!(format_time_remaining(Duration::seconds(-5)), "00:00:00");
    }
}

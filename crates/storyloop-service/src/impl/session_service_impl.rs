//! Session schedule service implementation.

use crate::dto::SessionStatusResponse;
use crate::session_service::SessionService;
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use storyloop_core::{Clock, SessionSchedule, StoryResult};

#[derive(Component)]
#[shaku(interface = SessionService)]
pub struct SessionServiceImpl {
    schedule: SessionSchedule,
    clock: Arc<dyn Clock>,
}

impl SessionServiceImpl {
    pub fn new(schedule: SessionSchedule, clock: Arc<dyn Clock>) -> Self {
        Self { schedule, clock }
    }
}

#[async_trait]
impl SessionService for SessionServiceImpl {
    async fn status(&self) -> StoryResult<SessionStatusResponse> {
        let now = self.clock.now();
        Ok(SessionStatusResponse::new(self.schedule.status(now), now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use storyloop_core::{Category, FixedClock};

    #[tokio::test]
    async fn test_status_inside_session() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap();
        let service = SessionServiceImpl::new(SessionSchedule::utc(), Arc::new(FixedClock::new(now)));

        let status = service.status().await.unwrap();
        let current = status.current_session.expect("session open at 10:30");
        assert_eq!(current.time, 1);
        assert_eq!(current.category, Category::ActionVerb);
        assert!(current.is_active);
        assert_eq!(status.time_until_end, "01:30:00");
        assert_eq!(status.next_session.time, 2);
        assert_eq!(status.time_until_next_seconds, 90 * 60);
    }

    #[tokio::test]
    async fn test_status_after_last_session() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 17, 0, 0).unwrap();
        let service = SessionServiceImpl::new(SessionSchedule::utc(), Arc::new(FixedClock::new(now)));

        let status = service.status().await.unwrap();
        assert!(status.current_session.is_none());
        assert_eq!(status.time_until_end, "00:00:00");
        assert_eq!(status.next_session.time, 0);
        assert_eq!(status.next_session.date.to_string(), "2024-05-02");
        assert_eq!(status.time_until_next, "15:00:00");
    }
}

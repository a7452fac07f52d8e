//! In-process window store.

use super::{RateDecision, WindowRateLimiter};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use storyloop_core::{Clock, StoryResult, SystemClock};
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Window counters held in a process-local map.
///
/// Clones share the same counters.
#[derive(Clone)]
pub struct MemoryWindowStore {
    windows: Arc<Mutex<HashMap<String, Window>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryWindowStore {
    /// Creates an empty store on the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store reading time from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Drops windows that have ended and returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut windows = self.windows.lock();
        let before = windows.len();
        windows.retain(|_, w| now <= w.reset_at);
        before - windows.len()
    }

    /// Number of tracked keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.lock().len()
    }

    /// Whether no key is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.lock().is_empty()
    }

    /// Sweeps expired windows every `interval` until the task is aborted.
    pub fn spawn_cleanup(&self, interval: std::time::Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = store.cleanup_expired();
                if removed > 0 {
                    debug!("Removed {} expired rate limit windows", removed);
                }
            }
        })
    }
}

impl Default for MemoryWindowStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryWindowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryWindowStore").field("keys", &self.len()).finish_non_exhaustive()
    }
}

#[async_trait]
impl WindowRateLimiter for MemoryWindowStore {
    async fn check(&self, key: &str, max: u32, window: Duration) -> StoryResult<RateDecision> {
        let now = self.clock.now();
        let mut windows = self.windows.lock();

        match windows.get_mut(key) {
            Some(current) if now <= current.reset_at => {
                if current.count >= max {
                    return Ok(RateDecision {
                        allowed: false,
                        count: current.count,
                        remaining: 0,
                        reset_at: current.reset_at,
                    });
                }
                current.count += 1;
                Ok(RateDecision::new(current.count, max, current.reset_at))
            }
            _ => {
                let opened = Window {
                    count: 1,
                    reset_at: now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC),
                };
                windows.insert(key.to_string(), opened);
                Ok(RateDecision::new(1, max, opened.reset_at))
            }
        }
    }
}

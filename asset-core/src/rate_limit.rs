//! Fixed-window request limiter keyed by user.
//!
//! Windows reset fully once their duration elapses; there is no sliding or
//! weighted carry-over. State lives in process memory, so each replica
//! enforces its own quota.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    window_start: Instant,
    count: u32,
}

/// Outcome of a limiter check, carrying what response headers need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub retry_after_secs: u64,
}

pub struct FixedWindowLimiter {
    limit: u32,
    window: Duration,
    windows: DashMap<Uuid, RateWindow>,
}

impl FixedWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: DashMap::new(),
        }
    }

    pub fn check(&self, key: Uuid) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    /// Check with an explicit clock, counting the request when allowed.
    /// The map entry guard makes the read-reset-increment sequence atomic
    /// per key.
    pub fn check_at(&self, key: Uuid, now: Instant) -> RateDecision {
        let mut entry = self.windows.entry(key).or_insert(RateWindow {
            window_start: now,
            count: 0,
        });
        let window = entry.value_mut();

        if now.duration_since(window.window_start) >= self.window {
            window.window_start = now;
            window.count = 0;
        }

        if window.count >= self.limit {
            let elapsed = now.duration_since(window.window_start);
            let retry_after = self.window.saturating_sub(elapsed).as_secs().max(1);
            return RateDecision {
                allowed: false,
                limit: self.limit,
                remaining: 0,
                retry_after_secs: retry_after,
            };
        }

        window.count += 1;
        RateDecision {
            allowed: true,
            limit: self.limit,
            remaining: self.limit - window.count,
            retry_after_secs: 0,
        }
    }
}

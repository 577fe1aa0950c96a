//! Per-caller request quotas.
//!
//! Routes only see the [`QuotaCheck`] trait, so the in-process
//! [`FixedWindowLimiter`] can be replaced by a shared store without
//! touching handlers. Precision is not required: concurrent requests from
//! one caller may race on the same window.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Result of one quota check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the caller's window resets
    pub retry_after: Duration,
}

/// Allow/deny decision keyed by caller identity
pub trait QuotaCheck: Send + Sync {
    fn check(&self, key: &str) -> QuotaDecision;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter. Expired windows are reset lazily on access.
pub struct FixedWindowLimiter {
    window: Duration,
    max_requests: u32,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Check and count one request at `now`.
    pub fn check_at(&self, key: &str, now: Instant) -> QuotaDecision {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        let retry_after = self
            .window
            .saturating_sub(now.saturating_duration_since(entry.started));
        if entry.count >= self.max_requests {
            return QuotaDecision {
                allowed: false,
                limit: self.max_requests,
                remaining: 0,
                retry_after,
            };
        }

        entry.count += 1;
        QuotaDecision {
            allowed: true,
            limit: self.max_requests,
            remaining: self.max_requests - entry.count,
            retry_after,
        }
    }
}

impl QuotaCheck for FixedWindowLimiter {
    fn check(&self, key: &str) -> QuotaDecision {
        self.check_at(key, Instant::now())
    }
}

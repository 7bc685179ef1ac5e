//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Wall-clock and monotonic-clock abstraction.
//!
//! The core never calls `chrono::Utc::now()` or `tokio::time::Instant::now()`
//! directly so that session bookkeeping (login-time, counters, timeouts) can
//! be driven deterministically in tests.

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// A source of wall-clock and monotonic time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current wall-clock time, used for session `login-time` and similar
    /// user-visible timestamps.
    fn now_wall(&self) -> DateTime<Utc>;

    /// Current monotonic time, used for idle timers and RPC deadlines.
    fn now_mono(&self) -> Instant;
}

/// The real clock, backed by the system clock and the Tokio runtime clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_wall(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_mono(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that can be advanced manually, for deterministic tests.
#[derive(Debug)]
pub struct FakeClock {
    wall: std::sync::Mutex<DateTime<Utc>>,
}

impl FakeClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        FakeClock {
            wall: std::sync::Mutex::new(start),
        }
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut wall = self.wall.lock().unwrap();
        *wall += duration;
    }
}

impl Clock for FakeClock {
    fn now_wall(&self) -> DateTime<Utc> {
        *self.wall.lock().unwrap()
    }

    fn now_mono(&self) -> Instant {
        // Tokio's `Instant` cannot be constructed from an arbitrary point in
        // tests without the `test-util` feature; callers that need monotonic
        // control should enable `tokio::time::pause()` in their test instead.
        Instant::now()
    }
}

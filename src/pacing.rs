//! # Pacing Module
//!
//! Advisory spacing between consecutive API calls
//!
//! ## Key Components
//! - [`PacingPolicy`] - Burst allowance followed by a minimum call interval

use std::time::{Duration, Instant};

/// Calls allowed before the interval check starts to apply.
pub const RATE_LIMIT_BURST: u32 = 30;

/// Minimum spacing between calls once the burst is spent.
pub const MIN_CALL_INTERVAL: Duration = Duration::from_secs(2);

/// Decides how long to wait before each call. The caller supplies the clock
/// and performs the sleep, so the policy itself never blocks.
pub struct PacingPolicy {
    free_calls: u32,
    min_interval: Duration,
    calls_made: u32,
    last_call: Option<Instant>,
}

impl PacingPolicy {
    pub fn new(free_calls: u32, min_interval: Duration) -> Self {
        Self {
            free_calls,
            min_interval,
            calls_made: 0,
            last_call: None,
        }
    }

    /// How long the caller should wait before its next call, if at all.
    pub fn delay_before_call(&self, now: Instant) -> Option<Duration> {
        if self.calls_made < self.free_calls {
            return None;
        }
        let last = self.last_call?;
        let elapsed = now.duration_since(last);
        if elapsed < self.min_interval {
            Some(self.min_interval - elapsed)
        } else {
            None
        }
    }

    pub fn record_call(&mut self, now: Instant) {
        self.calls_made += 1;
        self.last_call = Some(now);
    }
}

//! # Window Planner Module
//!
//! Splits a query time range into API-sized sub-windows
//!
//! ## Key Components
//! - [`TimeWindow`] - One contiguous [start, end) slice of the range
//! - [`plan_windows`] - Split a range into windows no wider than [`MAX_WINDOW_SECS`]

use crate::errors::FlowError;

/// Widest range the topxdata API answers at full resolution, in seconds.
pub const MAX_WINDOW_SECS: i64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn duration_secs(&self) -> i64 {
        self.end - self.start
    }
}

/// Split [start, end) into consecutive windows of at most max_window seconds.
pub fn plan_windows(start: i64, end: i64, max_window: i64) -> Result<Vec<TimeWindow>, FlowError> {
    if end <= start {
        return Err(FlowError::InvalidRange { start, end });
    }

    // A nonpositive width would never advance the cursor.
    let max_window = max_window.max(1);

    let mut windows = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let window_end = (cursor + max_window).min(end);
        windows.push(TimeWindow {
            start: cursor,
            end: window_end,
        });
        cursor = window_end;
    }

    Ok(windows)
}

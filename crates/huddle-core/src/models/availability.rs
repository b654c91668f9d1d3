// ABOUTME: Availability windows contributed by guests and meeting slots derived from them
// ABOUTME: Holds the interval invariants (start < end, at least 30 minutes unless all-day)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::constants::limits::MIN_INTERVAL_MINUTES;

/// Start of the window an all-day answer expands to (08:00)
pub const DAY_START: NaiveTime = match NaiveTime::from_hms_opt(8, 0, 0) {
    Some(time) => time,
    None => unreachable!(),
};

/// End of the window an all-day answer expands to (23:59)
pub const DAY_END: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 0) {
    Some(time) => time,
    None => unreachable!(),
};

/// A parsed (date, start, end) answer not yet tied to a guest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Calendar date
    pub date: NaiveDate,
    /// Start time
    pub start: NaiveTime,
    /// End time
    pub end: NaiveTime,
    /// Whether the guest said "all day"
    pub all_day: bool,
}

impl TimeWindow {
    /// Timed window on one date
    #[must_use]
    pub const fn timed(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            date,
            start,
            end,
            all_day: false,
        }
    }

    /// All-day window, expanded to 08:00-23:59
    #[must_use]
    pub const fn all_day(date: NaiveDate) -> Self {
        Self {
            date,
            start: DAY_START,
            end: DAY_END,
            all_day: true,
        }
    }

    /// Length of the window in minutes (negative when inverted)
    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether the window honours the interval invariants
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.all_day || (self.start < self.end && self.duration_minutes() >= MIN_INTERVAL_MINUTES)
    }
}

/// A stored availability interval for one guest of one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityInterval {
    /// Opaque interval id
    pub id: String,
    /// Owning event
    pub event_id: String,
    /// Guest who contributed it
    pub guest_id: String,
    /// Calendar date
    pub date: NaiveDate,
    /// Start time
    pub start: NaiveTime,
    /// End time
    pub end: NaiveTime,
    /// All-day flag
    pub all_day: bool,
}

impl AvailabilityInterval {
    /// Attach a parsed window to a guest
    #[must_use]
    pub fn from_window(event_id: &str, guest_id: &str, window: &TimeWindow) -> Self {
        Self {
            id: super::new_id(),
            event_id: event_id.to_owned(),
            guest_id: guest_id.to_owned(),
            date: window.date,
            start: window.start,
            end: window.end,
            all_day: window.all_day,
        }
    }

    /// The window this interval covers
    #[must_use]
    pub const fn window(&self) -> TimeWindow {
        TimeWindow {
            date: self.date,
            start: self.start,
            end: self.end,
            all_day: self.all_day,
        }
    }
}

/// A ranked meeting slot produced by the overlap engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Calendar date
    pub date: NaiveDate,
    /// Start time
    pub start: NaiveTime,
    /// End time
    pub end: NaiveTime,
    /// Whether every contributing guest was free all day
    pub all_day: bool,
    /// Number of guests free for the whole slot
    pub guest_count: usize,
    /// Names of those guests, sorted
    pub guest_names: Vec<String>,
}

impl Slot {
    /// Length of the slot in minutes
    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

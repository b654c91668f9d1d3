// ABOUTME: Canonical text rendering for dates, clock times and availability windows
// ABOUTME: Shared by the date summary and every outbound message
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{NaiveDate, NaiveTime, Timelike};
use huddle_core::models::{Slot, TimeWindow};

/// `Friday 10/17`
#[must_use]
pub fn date_label(date: NaiveDate) -> String {
    date.format("%A %-m/%-d").to_string()
}

/// `2pm`, `2:30pm`, `12pm`, `12am`, `11:59pm`
#[must_use]
pub fn time_label(time: NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    let suffix = if is_pm { "pm" } else { "am" };
    match time.minute() {
        0 => format!("{hour}{suffix}"),
        minute => format!("{hour}:{minute:02}{suffix}"),
    }
}

/// `2pm-6pm`, or `all day`
#[must_use]
pub fn range_label(start: NaiveTime, end: NaiveTime, all_day: bool) -> String {
    if all_day {
        "all day".to_owned()
    } else {
        format!("{}-{}", time_label(start), time_label(end))
    }
}

/// `Friday 10/17: 2pm-6pm`
#[must_use]
pub fn window_label(window: &TimeWindow) -> String {
    format!(
        "{}: {}",
        date_label(window.date),
        range_label(window.start, window.end, window.all_day)
    )
}

/// `Friday 10/17, 4pm-11:59pm`
#[must_use]
pub fn slot_label(slot: &Slot) -> String {
    format!(
        "{}, {}",
        date_label(slot.date),
        range_label(slot.start, slot.end, slot.all_day)
    )
}

/// `Friday 10/17, Saturday 10/18`
#[must_use]
pub fn dates_summary(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(|date| date_label(*date))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
    }

    #[test]
    fn test_time_labels() {
        assert_eq!(time_label(t(14, 0)), "2pm");
        assert_eq!(time_label(t(14, 30)), "2:30pm");
        assert_eq!(time_label(t(12, 0)), "12pm");
        assert_eq!(time_label(t(0, 0)), "12am");
        assert_eq!(time_label(t(23, 59)), "11:59pm");
        assert_eq!(time_label(t(9, 5)), "9:05am");
    }

    #[test]
    fn test_date_label_has_no_leading_zero() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 2).unwrap_or_default();
        assert_eq!(date_label(date), "Friday 10/2");
    }

    #[test]
    fn test_range_label() {
        assert_eq!(range_label(t(14, 0), t(18, 0), false), "2pm-6pm");
        assert_eq!(range_label(t(8, 0), t(23, 59), true), "all day");
    }
}

// ABOUTME: Overlap engine ranking meeting slots from per-guest availability
// ABOUTME: Per-date endpoint sweep, guest-set dedup, global ranking capped at five slots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Overlap Engine
//!
//! For every proposed date the engine considers each pair of distinct
//! interval endpoints `(t_i, t_j)` and asks which guests are free for all of
//! `[t_i, t_j)`. A pair becomes a candidate slot when enough guests are free
//! for long enough. Candidates sharing a guest set keep only the longest
//! window, then every date's candidates are ranked together.
//!
//! Output depends only on the set of input windows, never on their order.

use chrono::{NaiveDate, NaiveTime};
use huddle_core::constants::limits::{MAX_SLOTS, MIN_GROUP_SLOT_MINUTES, MIN_SOLO_SLOT_MINUTES};
use huddle_core::models::{Slot, TimeWindow, DAY_END, DAY_START};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// One availability window tagged with its guest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestWindow {
    /// Stable guest identity used for grouping
    pub guest_id: String,
    /// Name shown on slots
    pub guest_name: String,
    /// The window
    pub window: TimeWindow,
}

/// Knobs the planner workflow passes per call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlapOptions {
    /// Emit a lone guest's windows verbatim on dates nobody else answered
    pub show_individual: bool,
    /// The event has exactly one invited guest; relax to one guest and one hour
    pub single_invited: bool,
}

impl OverlapOptions {
    const fn min_guests(self) -> usize {
        if self.single_invited {
            1
        } else {
            2
        }
    }

    const fn min_minutes(self) -> i64 {
        if self.single_invited {
            MIN_SOLO_SLOT_MINUTES
        } else {
            MIN_GROUP_SLOT_MINUTES
        }
    }
}

/// Per-guest view of one date
#[derive(Debug, Default)]
struct DayGuest<'a> {
    name: &'a str,
    all_day: bool,
    timed: Vec<(NaiveTime, NaiveTime)>,
}

impl DayGuest<'_> {
    fn covers(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.all_day || self.timed.iter().any(|(s, e)| *s <= start && end <= *e)
    }
}

/// Compute ranked meeting slots, at most [`MAX_SLOTS`]
#[must_use]
pub fn compute_overlaps(windows: &[GuestWindow], options: OverlapOptions) -> Vec<Slot> {
    let mut by_date: BTreeMap<NaiveDate, BTreeMap<&str, DayGuest<'_>>> = BTreeMap::new();
    for entry in windows {
        let guest = by_date
            .entry(entry.window.date)
            .or_default()
            .entry(entry.guest_id.as_str())
            .or_insert_with(|| DayGuest {
                name: entry.guest_name.as_str(),
                ..DayGuest::default()
            });
        if entry.window.all_day {
            guest.all_day = true;
        } else {
            guest.timed.push((entry.window.start, entry.window.end));
        }
    }

    let mut slots: Vec<Slot> = by_date
        .iter()
        .flat_map(|(date, guests)| slots_for_date(*date, guests, options))
        .collect();

    slots.sort_by(|a, b| {
        b.guest_count
            .cmp(&a.guest_count)
            .then(a.date.cmp(&b.date))
            .then(a.start.cmp(&b.start))
            .then(a.end.cmp(&b.end))
    });
    slots.truncate(MAX_SLOTS);
    debug!(slots = slots.len(), inputs = windows.len(), "computed overlaps");
    slots
}

fn slots_for_date(
    date: NaiveDate,
    guests: &BTreeMap<&str, DayGuest<'_>>,
    options: OverlapOptions,
) -> Vec<Slot> {
    if guests.len() == 1 && !options.single_invited {
        return if options.show_individual {
            individual_slots(date, guests)
        } else {
            Vec::new()
        };
    }

    let all_day_count = guests.values().filter(|guest| guest.all_day).count();
    let has_timed = guests.values().any(|guest| !guest.timed.is_empty());

    if !has_timed {
        return if all_day_count >= options.min_guests() {
            vec![make_slot(date, DAY_START, DAY_END, true, guests.values())]
        } else {
            Vec::new()
        };
    }

    let mut endpoints: BTreeSet<NaiveTime> = guests
        .values()
        .flat_map(|guest| guest.timed.iter().flat_map(|(s, e)| [*s, *e]))
        .collect();
    if all_day_count > 0 {
        endpoints.insert(DAY_START);
        endpoints.insert(DAY_END);
    }
    let endpoints: Vec<NaiveTime> = endpoints.into_iter().collect();

    // Keyed by guest-id set; keeps the longest window (earliest on ties)
    let mut best: BTreeMap<Vec<&str>, (NaiveTime, NaiveTime)> = BTreeMap::new();
    for (i, start) in endpoints.iter().enumerate() {
        for end in &endpoints[i + 1..] {
            if (*end - *start).num_minutes() < options.min_minutes() {
                continue;
            }
            let free: Vec<&str> = guests
                .iter()
                .filter(|(_, guest)| guest.covers(*start, *end))
                .map(|(id, _)| *id)
                .collect();
            if free.len() < options.min_guests() {
                continue;
            }
            let shorter_or_equal = matches!(
                best.get(&free),
                Some((s, e)) if (*e - *s) >= (*end - *start)
            );
            if !shorter_or_equal {
                best.insert(free, (*start, *end));
            }
        }
    }

    best.into_iter()
        .map(|(ids, (start, end))| {
            let members = ids.iter().filter_map(|id| guests.get(id));
            let everyone_all_day = ids
                .iter()
                .filter_map(|id| guests.get(id))
                .all(|guest| guest.all_day);
            let all_day = everyone_all_day && start == DAY_START && end == DAY_END;
            make_slot(date, start, end, all_day, members)
        })
        .collect()
}

fn individual_slots(date: NaiveDate, guests: &BTreeMap<&str, DayGuest<'_>>) -> Vec<Slot> {
    let mut slots = Vec::new();
    for guest in guests.values() {
        if guest.all_day {
            slots.push(make_slot(date, DAY_START, DAY_END, true, [guest]));
        }
        for (start, end) in &guest.timed {
            slots.push(make_slot(date, *start, *end, false, [guest]));
        }
    }
    slots
}

fn make_slot<'a, 'b: 'a>(
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    all_day: bool,
    members: impl IntoIterator<Item = &'a DayGuest<'b>>,
) -> Slot {
    let mut guest_names: Vec<String> = members
        .into_iter()
        .map(|guest| guest.name.to_owned())
        .collect();
    guest_names.sort();
    Slot {
        date,
        start,
        end,
        all_day,
        guest_count: guest_names.len(),
        guest_names,
    }
}

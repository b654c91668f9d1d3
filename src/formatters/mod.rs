// ABOUTME: Canonical SMS bodies for planners and guests
// ABOUTME: Pure functions from entity references to exact message text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Message Formatting
//!
//! Every outbound SMS body is built here. The state machines decide *which*
//! message to send; the wording, numbering, emoji and whitespace live in
//! these functions and are pinned by tests.
//!
//! - [`planner`]: prompts and menus shown to the person organizing
//! - [`guest`]: availability, preference and RSVP prompts for invitees
//! - [`notifications`]: planner notifications triggered by guest replies

/// Planner-facing prompts and menus
pub mod planner;

/// Guest-facing prompts and menus
pub mod guest;

/// Planner notifications triggered by guest replies
pub mod notifications;

use huddle_core::models::{Event, Guest};
use huddle_parsers::render::{date_label, range_label, time_label};

/// Reply sent when a handler aborts on a store or internal error
pub const GENERIC_FAILURE: &str =
    "Sorry, something went wrong on our end. Please try again in a moment.";

/// Generic failure reply
#[must_use]
pub fn generic_failure() -> String {
    GENERIC_FAILURE.to_owned()
}

/// `Sam, Alex and Jo`
#[must_use]
pub fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    match names {
        [] => String::new(),
        [only] => only.as_ref().to_owned(),
        [init @ .., last] => format!(
            "{} and {}",
            init.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", "),
            last.as_ref()
        ),
    }
}

/// Comma-separated guest names in list order
#[must_use]
pub fn guest_names(guests: &[Guest]) -> String {
    guests
        .iter()
        .map(|guest| guest.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `guest` or `guests`
#[must_use]
pub const fn plural(count: usize, singular: &'static str, plural: &'static str) -> &'static str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

/// The chosen date and time lines for an event, when set
fn when_lines(event: &Event) -> String {
    let mut lines = String::new();
    if let Some(date) = event.selected_date {
        lines.push_str(&format!("📅 {}\n", date_label(date)));
    }
    match (event.start_time, event.end_time) {
        (Some(start), Some(end)) => {
            lines.push_str(&format!("🕐 {}\n", range_label(start, end, false)));
        }
        (Some(start), None) => lines.push_str(&format!("🕐 {}\n", time_label(start))),
        _ => {}
    }
    lines
}

/// Venue line, falling back to the location
fn place_line(event: &Event) -> Option<String> {
    match (event.venue.as_deref(), event.location.as_deref()) {
        (Some(venue), Some(location)) => Some(format!("📍 {venue}, {location}")),
        (Some(venue), None) => Some(format!("📍 {venue}")),
        (None, Some(location)) => Some(format!("📍 {location}")),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_names() {
        assert_eq!(join_names::<&str>(&[]), "");
        assert_eq!(join_names(&["Sam"]), "Sam");
        assert_eq!(join_names(&["Sam", "Alex"]), "Sam and Alex");
        assert_eq!(join_names(&["Sam", "Alex", "Jo"]), "Sam, Alex and Jo");
    }
}

// ABOUTME: Planner notifications sent when a guest responds, is busy, or RSVPs
// ABOUTME: Wording depends on whether everyone invited has now answered
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use huddle_core::models::RsvpStatus;

use crate::database::guests::ResponseCounts;

fn progress(counts: ResponseCounts) -> String {
    if counts.all_responded() {
        "Everyone has responded! 🎉 Text 1 to see the best times.".to_owned()
    } else {
        format!(
            "{}/{} responded so far. Text 1 to see time options.",
            counts.responded, counts.total
        )
    }
}

/// A guest confirmed their availability
#[must_use]
pub fn guest_responded(guest_name: &str, counts: ResponseCounts) -> String {
    format!(
        "{guest_name} shared their availability.\n{}",
        progress(counts)
    )
}

/// A guest said none of the dates work
#[must_use]
pub fn guest_busy(guest_name: &str, counts: ResponseCounts) -> String {
    format!(
        "{guest_name} isn't available on any of the proposed dates.\n{}",
        progress(counts)
    )
}

/// A guest answered the invitation
#[must_use]
pub fn guest_rsvp(guest_name: &str, status: RsvpStatus) -> String {
    match status {
        RsvpStatus::Accepted => format!("{guest_name} is in! ✅"),
        RsvpStatus::Declined => format!("{guest_name} can't make it. ❌"),
        RsvpStatus::Maybe | RsvpStatus::Pending => format!("{guest_name} is a maybe. 🤔"),
    }
}

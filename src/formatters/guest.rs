// ABOUTME: Guest-facing SMS bodies: availability requests, confirmations, preferences, invitations, RSVP
// ABOUTME: Parse failures map to a specific re-prompt per error variant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use huddle_core::models::{Event, Planner, RsvpStatus, TimeWindow};
use huddle_parsers::render::{date_label, dates_summary, window_label};
use huddle_parsers::TimeParseError;

use super::{place_line, when_lines};

/// Example reply shown in availability prompts
fn availability_example(proposed: &[chrono::NaiveDate]) -> &'static str {
    if proposed.len() == 1 {
        "\"2-6pm\", \"after 5\" or \"all day\""
    } else {
        "\"Friday 2-6pm\", \"Saturday afternoon\" or \"Sunday all day\""
    }
}

/// First message to a guest asking when they are free
#[must_use]
pub fn availability_request(planner: &Planner, event: &Event, guest_name: &str) -> String {
    let dates = &event.proposed_dates;
    let when = match dates.as_slice() {
        [only] => format!("When are you free on {}?", date_label(*only)),
        _ => format!("Proposed dates: {}\nWhen are you free?", dates_summary(dates)),
    };
    format!(
        "Hi {guest_name}! {} is planning {} and wants to find a time that works.\n\n{when}\n\n\
         Reply with your availability, like {}. Reply \"busy\" if none of these work.",
        planner.display_name(),
        event.label(),
        availability_example(dates)
    )
}

/// Availability reply could not be used
#[must_use]
pub fn availability_parse_error(error: &TimeParseError, proposed: &[chrono::NaiveDate]) -> String {
    let example = availability_example(proposed);
    match error {
        TimeParseError::NeedsDay(range) => format!(
            "Which day is \"{range}\" for? Try something like \"Friday {range}\". \
             The dates are {}.",
            dates_summary(proposed)
        ),
        TimeParseError::NoMatchingDate => format!(
            "Those days aren't on the list. The proposed dates are {}. Try {example}.",
            dates_summary(proposed)
        ),
        TimeParseError::Invalid(offenders) => format!(
            "Those times don't work: {}. Try {example}.",
            offenders.join("; ")
        ),
        _ => format!(
            "Sorry, I couldn't read that. Try {example}. Reply \"busy\" if none of the dates work."
        ),
    }
}

/// Parsed windows with the 1/2 confirmation menu
#[must_use]
pub fn availability_confirmation(windows: &[TimeWindow]) -> String {
    let mut body = String::from("Got it! Here's what I have:\n");
    for window in windows {
        body.push_str(&format!("• {}\n", window_label(window)));
    }
    body.push_str("\n1. Confirm\n2. Change");
    body
}

/// Confirmation menu re-printed after an unexpected reply
#[must_use]
pub fn availability_confirmation_reprompt(windows: &[TimeWindow]) -> String {
    format!(
        "Please reply 1 or 2.\n\n{}",
        availability_confirmation(windows)
    )
}

/// `2` at the confirmation menu
#[must_use]
pub fn availability_retry(proposed: &[chrono::NaiveDate]) -> String {
    format!(
        "No problem. When are you free? Try {}.",
        availability_example(proposed)
    )
}

/// Ask for preferences
#[must_use]
pub fn preferences_request(planner: &Planner) -> String {
    format!(
        "Thanks! Any preferences {} should know about? (food, budget, neighborhood...) \
         Reply \"none\" if you're easy.",
        planner.display_name()
    )
}

/// Summary with the 1/2/3 final guest menu
#[must_use]
pub fn final_guest_confirmation(
    planner: &Planner,
    windows: &[TimeWindow],
    preferences: Option<&str>,
) -> String {
    let mut body = format!("Here's what I'll send to {}:\n", planner.display_name());
    for window in windows {
        body.push_str(&format!("📅 {}\n", window_label(window)));
    }
    body.push_str(&format!(
        "💬 Preferences: {}\n\n1. Send\n2. Change availability\n3. Change preferences",
        preferences.unwrap_or("none")
    ));
    body
}

/// Final menu re-printed after an unexpected reply
#[must_use]
pub fn final_guest_reprompt(
    planner: &Planner,
    windows: &[TimeWindow],
    preferences: Option<&str>,
) -> String {
    format!(
        "Please reply 1, 2 or 3.\n\n{}",
        final_guest_confirmation(planner, windows, preferences)
    )
}

/// Guest finished sharing availability
#[must_use]
pub fn availability_sent(planner: &Planner) -> String {
    format!(
        "Thanks! I've sent your availability to {}. 🙌",
        planner.display_name()
    )
}

/// Guest said none of the dates work
#[must_use]
pub fn busy_acknowledgement(planner: &Planner) -> String {
    format!(
        "No problem! I'll let {} know you can't make it.",
        planner.display_name()
    )
}

/// The invitation sent at dispatch
#[must_use]
pub fn invitation(planner: &Planner, event: &Event, guest_name: &str) -> String {
    let mut body = format!(
        "Hi {guest_name}! 🎉 You're invited: {} is hosting {}\n",
        planner.display_name(),
        event.label()
    );
    body.push_str(&when_lines(event));
    if let Some(place) = place_line(event) {
        body.push_str(&place);
        body.push('\n');
    }
    body.push_str("\nCan you make it? Reply yes, no, or maybe.");
    body
}

/// RSVP not understood
#[must_use]
pub fn rsvp_reprompt() -> String {
    "Sorry, I didn't get that. Can you make it? Reply yes, no, or maybe.".to_owned()
}

/// RSVP recorded
#[must_use]
pub fn rsvp_acknowledgement(status: RsvpStatus, planner: &Planner) -> String {
    let name = planner.display_name();
    match status {
        RsvpStatus::Accepted => format!("Awesome, see you there! I'll let {name} know."),
        RsvpStatus::Declined => format!("Sorry you can't make it. I'll let {name} know."),
        RsvpStatus::Maybe | RsvpStatus::Pending => {
            format!("Got it, I'll let {name} know you're a maybe.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn friday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap_or_default()
    }

    fn planner() -> Planner {
        let mut planner = Planner::new("4155550101");
        planner.name = Some("Jordan".to_owned());
        planner
    }

    #[test]
    fn test_confirmation_menu_lists_windows() {
        let window = TimeWindow::timed(
            friday(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap_or_default(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
        );
        assert_eq!(
            availability_confirmation(&[window]),
            "Got it! Here's what I have:\n• Friday 10/16: 2pm-4pm\n\n1. Confirm\n2. Change"
        );
    }

    #[test]
    fn test_final_guest_menu() {
        let body = final_guest_confirmation(&planner(), &[TimeWindow::all_day(friday())], None);
        assert_eq!(
            body,
            "Here's what I'll send to Jordan:\n📅 Friday 10/16: all day\n💬 Preferences: none\n\n\
             1. Send\n2. Change availability\n3. Change preferences"
        );
    }

    #[test]
    fn test_busy_acknowledgement_wording() {
        assert_eq!(
            busy_acknowledgement(&planner()),
            "No problem! I'll let Jordan know you can't make it."
        );
    }

    #[test]
    fn test_single_date_request_names_the_day() {
        let mut event = Event::new("planner", None);
        event.proposed_dates = vec![friday()];
        let body = availability_request(&planner(), &event, "Sam");
        assert!(body.starts_with("Hi Sam! Jordan is planning a get-together"));
        assert!(body.contains("When are you free on Friday 10/16?"));
    }

    #[test]
    fn test_needs_day_error_suggests_a_weekday() {
        let reply = availability_parse_error(
            &TimeParseError::NeedsDay("2-4".to_owned()),
            &[friday(), friday().succ_opt().unwrap_or_default()],
        );
        assert!(reply.starts_with("Which day is \"2-4\" for?"));
    }
}

// ABOUTME: Planner-facing SMS bodies: onboarding, guest list, dates, menus, slots, venues
// ABOUTME: Menus are numbered exactly as the planner state machine expects them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use huddle_core::models::{Contact, Event, Guest, Slot, VenueSuggestion};
use huddle_parsers::phone::display_phone;
use huddle_parsers::render::{slot_label, time_label};

use super::{guest_names, join_names, place_line, plural, when_lines};
use crate::database::guests::ResponseCounts;

const CONFIRMATION_MENU: &str =
    "1. Request guest availability\n2. Change the dates\n3. Add more guests";

const AVAILABILITY_MENU: &str = "1. See time options\n2. Add more guests";

const FINAL_MENU: &str = "1. Set a start time\n2. Send invitations\n3. Change the activity";

/// First reply to an unknown phone
#[must_use]
pub fn welcome() -> String {
    "Hi! I'm Huddle 👋 I help you plan get-togethers over text: tell me who's coming and \
     when, and I'll collect everyone's availability and find a time that works.\n\n\
     What's your name?"
        .to_owned()
}

/// Name reply was empty, too long or had no letters
#[must_use]
pub fn name_invalid() -> String {
    "Sorry, I didn't catch that. What's your name? (Just your first name is fine.)".to_owned()
}

/// Reply to a valid name; starts the first guest list
#[must_use]
pub fn name_accepted(name: &str, contacts: &[Contact]) -> String {
    format!(
        "Great to meet you, {name}! Let's plan something.\n\n{}",
        guest_collection_prompt(contacts)
    )
}

/// A returning planner starts a new event
#[must_use]
pub fn new_event(planner_name: Option<&str>, title: Option<&str>, contacts: &[Contact]) -> String {
    let opener = match (title, planner_name) {
        (Some(title), _) => format!("Let's plan {title}! 🎉"),
        (None, Some(name)) => format!("Welcome back, {name}! Let's plan something new."),
        (None, None) => "Let's plan something new!".to_owned(),
    };
    format!("{opener}\n\n{}", guest_collection_prompt(contacts))
}

/// Guest list instructions plus any saved contacts, numbered
#[must_use]
pub fn guest_collection_prompt(contacts: &[Contact]) -> String {
    let mut body =
        String::from("Who's coming? Text each guest's name and number, like:\nSam 510-555-0199\n");
    if !contacts.is_empty() {
        body.push_str("\nOr pick from your contacts by number (e.g. \"1, 3\"):\n");
        body.push_str(&numbered_contacts(contacts));
        body.push_str("\nText \"remove contacts\" to tidy this list.\n");
    }
    body.push_str("\nText \"done\" when your list is complete.");
    body
}

fn numbered_contacts(contacts: &[Contact]) -> String {
    contacts
        .iter()
        .enumerate()
        .map(|(index, contact)| {
            format!(
                "{}. {} {}\n",
                index + 1,
                contact.name,
                display_phone(&contact.phone)
            )
        })
        .collect()
}

/// Confirmation after guests were added
#[must_use]
pub fn guests_added(added: &[String], all: &[Guest]) -> String {
    format!(
        "Added: {}\n\nGuests so far ({}): {}\nAdd more, or text \"done\" to continue.",
        added.join(", "),
        all.len(),
        guest_names(all)
    )
}

/// No (name, phone) pair in the planner's message
#[must_use]
pub fn guest_parse_error() -> String {
    "I couldn't find a name and phone number in that. Try something like:\n\
     Sam 510-555-0199\n\nText \"done\" when your list is complete."
        .to_owned()
}

/// A guest taken off the list by name
#[must_use]
pub fn guest_removed(name: &str, remaining: &[Guest]) -> String {
    if remaining.is_empty() {
        return format!(
            "Removed {name}. Your guest list is empty now.\n\n{}",
            guest_collection_prompt(&[])
        );
    }
    format!(
        "Removed {name}.\n\nGuests so far ({}): {}",
        remaining.len(),
        guest_names(remaining)
    )
}

/// `remove <name>` matched nobody
#[must_use]
pub fn guest_not_found(name: &str, all: &[Guest]) -> String {
    format!(
        "I couldn't find {name} on the list. Guests so far: {}",
        guest_names(all)
    )
}

/// `done` with an empty guest list
#[must_use]
pub fn no_guests_yet() -> String {
    "Add at least one guest first. Text a name and number, like:\nSam 510-555-0199".to_owned()
}

/// Contact numbers outside the enumerated list
#[must_use]
pub fn invalid_contact_choice(count: usize) -> String {
    format!("Please pick contact numbers between 1 and {count}.")
}

/// The remove-contacts sub-menu
#[must_use]
pub fn removing_contacts_prompt(contacts: &[Contact]) -> String {
    if contacts.is_empty() {
        return "You don't have any saved contacts. Text \"done\" to go back.".to_owned();
    }
    format!(
        "Which contacts should I remove? Text their numbers (e.g. \"2, 4\"):\n{}\n\
         Text \"done\" when you're finished.",
        numbered_contacts(contacts)
    )
}

/// After deleting contacts
#[must_use]
pub fn contacts_removed(removed: &[String], remaining: &[Contact]) -> String {
    format!(
        "Removed: {}\n\n{}",
        removed.join(", "),
        removing_contacts_prompt(remaining)
    )
}

/// Ask for candidate dates
#[must_use]
pub fn date_prompt() -> String {
    "What dates work for you? You can say things like \"Friday or Saturday\", \
     \"next weekend\", or \"10/17-10/19\"."
        .to_owned()
}

/// Dates could not be read
#[must_use]
pub fn date_parse_error() -> String {
    "Sorry, I couldn't read those dates. Try \"Friday or Saturday\", \"this weekend\", \
     or \"10/17-10/19\"."
        .to_owned()
}

/// Plan summary with the 1/2/3 confirmation menu
#[must_use]
pub fn confirmation_menu(event: &Event, guests: &[Guest]) -> String {
    format!(
        "Here's the plan so far:\n📅 Dates: {}\n👥 Guests: {}\n\nWhat next?\n{CONFIRMATION_MENU}",
        event.date_summary.as_deref().unwrap_or("none yet"),
        guest_names(guests)
    )
}

/// Confirmation menu re-printed after an unexpected reply
#[must_use]
pub fn confirmation_reprompt(event: &Event, guests: &[Guest]) -> String {
    format!(
        "Please reply 1, 2 or 3.\n\n{}",
        confirmation_menu(event, guests)
    )
}

/// After dispatching availability requests
#[must_use]
pub fn availability_requests_sent(count: usize) -> String {
    format!(
        "Sent availability requests to {count} {}! I'll text you as people respond.\n\n\
         {AVAILABILITY_MENU}",
        plural(count, "guest", "guests")
    )
}

/// Who has answered so far
#[must_use]
pub fn availability_status(event: &Event, guests: &[Guest], counts: ResponseCounts) -> String {
    let mut body = format!(
        "Availability for {}: {}/{} responded\n",
        event.label(),
        counts.responded,
        counts.total
    );
    for guest in guests {
        let line = if guest.unavailable {
            format!("❌ {} (can't make it)", guest.name)
        } else if guest.availability_provided {
            format!("✅ {}", guest.name)
        } else {
            format!("⏳ {}", guest.name)
        };
        body.push_str(&line);
        body.push('\n');
    }
    body.push('\n');
    body.push_str(AVAILABILITY_MENU);
    body
}

/// Ranked slots; `waiting_on` lists guests who have not answered yet
#[must_use]
pub fn time_slot_list(slots: &[Slot], waiting_on: &[String]) -> String {
    let heading = if waiting_on.is_empty() {
        "Here are the best times:".to_owned()
    } else {
        format!(
            "Here are the best times so far (still waiting on {}):",
            join_names(waiting_on)
        )
    };
    let mut body = heading;
    body.push('\n');
    for (index, slot) in slots.iter().enumerate() {
        body.push_str(&format!(
            "{}. {} ({} {}: {})\n",
            index + 1,
            slot_label(slot),
            slot.guest_count,
            plural(slot.guest_count, "person", "people"),
            slot.guest_names.join(", ")
        ));
    }
    body.push_str("\nReply with a number to pick a time, or \"back\".");
    body
}

/// No slot met the overlap rules
#[must_use]
pub fn no_overlap() -> String {
    format!(
        "I couldn't find a time that works for enough people yet. \
         Wait for more responses, or add more guests.\n\n{AVAILABILITY_MENU}"
    )
}

/// Slot number outside the list
#[must_use]
pub fn invalid_slot_choice(count: usize) -> String {
    format!("Please reply with a number from 1 to {count}, or \"back\".")
}

/// Slot chosen; ask where
#[must_use]
pub fn location_prompt(slot: &Slot) -> String {
    format!(
        "Locked in: {}! 🎉\n\nWhere should this happen? A neighborhood or city works, \
         like \"Mission District\" or \"Oakland\".",
        slot_label(slot)
    )
}

/// Location reply too short
#[must_use]
pub fn location_invalid() -> String {
    "Where should this happen? A neighborhood or city works, like \"Mission District\" \
     or \"Oakland\"."
        .to_owned()
}

/// Ask what to do
#[must_use]
pub fn activity_prompt(location: &str) -> String {
    format!(
        "Got it, {location}. What do you want to do? (e.g. \"bowling\", \"tacos\", \"karaoke\")"
    )
}

/// Activity term too vague to suggest venues for
#[must_use]
pub fn activity_too_broad(activity: &str) -> String {
    format!(
        "\"{activity}\" is a little broad. Can you be more specific? For example \"ramen\" \
         instead of \"dinner\", or \"rooftop cocktails\" instead of \"drinks\"."
    )
}

/// Numbered venue suggestions
#[must_use]
pub fn venue_list(activity: &str, location: &str, suggestions: &[VenueSuggestion]) -> String {
    let mut body = format!("Here are some {activity} spots in {location}:\n");
    for (index, venue) in suggestions.iter().enumerate() {
        body.push_str(&format!("{}. {}: {}\n", index + 1, venue.name, venue.description));
        if let Some(link) = &venue.map_link {
            body.push_str(&format!("   {link}\n"));
        }
    }
    body.push_str(
        "\nReply with a number, \"new list\" for more ideas, \"skip\" to decide later, \
         or text your own venue.",
    );
    body
}

/// Venue reply not understood
#[must_use]
pub fn venue_invalid(count: usize) -> String {
    format!(
        "Reply with a number from 1 to {count}, \"new list\", \"skip\", or the name of a place."
    )
}

/// Event summary with the 1/2/3 final menu
#[must_use]
pub fn final_confirmation(event: &Event, guests: &[Guest]) -> String {
    let mut body = format!("Here's your event:\n🎉 {}\n", event.label());
    body.push_str(&when_lines(event));
    if let Some(place) = place_line(event) {
        body.push_str(&place);
        body.push('\n');
    }
    body.push_str(&format!("👥 Guests: {}\n\n{FINAL_MENU}", guest_names(guests)));
    body
}

/// Late-guest entry from the final summary
#[must_use]
pub fn adding_guest_prompt() -> String {
    "Who else should I invite? Text their name and number, like:\nSam 510-555-0199\n\n\
     Text \"done\" when you're finished."
        .to_owned()
}

/// Extra command listed in help at the final summary
#[must_use]
pub fn add_guest_hint() -> String {
    "Text \"add guest\" to invite someone else before sending.".to_owned()
}

/// Ask for a start time
#[must_use]
pub fn start_time_prompt() -> String {
    "What time should it start? (e.g. \"7pm\" or \"7:30 pm\")".to_owned()
}

/// Start time could not be read
#[must_use]
pub fn start_time_invalid() -> String {
    "Sorry, I couldn't read that time. Try \"7pm\" or \"19:30\".".to_owned()
}

/// Start time saved; shows the updated summary
#[must_use]
pub fn start_time_set(event: &Event, guests: &[Guest]) -> String {
    let start = event.start_time.map(time_label).unwrap_or_default();
    format!("Start time set to {start}.\n\n{}", final_confirmation(event, guests))
}

/// Final menu re-printed after an unexpected reply
#[must_use]
pub fn final_reprompt(event: &Event, guests: &[Guest]) -> String {
    format!("Please reply 1, 2 or 3.\n\n{}", final_confirmation(event, guests))
}

/// After dispatching invitations
#[must_use]
pub fn invitations_sent(count: usize) -> String {
    format!(
        "Invitations sent to {count} {}! 🎉 I'll let you know as people RSVP.",
        plural(count, "guest", "guests")
    )
}

/// After `reset`
#[must_use]
pub fn reset_done() -> String {
    "Okay, I've cleared that plan. Text me whenever you want to plan something new!".to_owned()
}

/// Global commands available at any stage
#[must_use]
pub fn help_footer() -> String {
    "Text \"reset\" at any time to start over.".to_owned()
}

/// `help` reply: the current prompt plus the global commands
#[must_use]
pub fn help(current_prompt: &str) -> String {
    format!("{current_prompt}\n\n{}", help_footer())
}

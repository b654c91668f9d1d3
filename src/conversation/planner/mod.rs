// ABOUTME: Planner state machine: onboarding, new events and per-stage dispatch with global commands
// ABOUTME: Stage handlers live in submodules; all of them return a TransitionResult
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Planner Workflow
//!
//! ```text
//! collecting_guests ─done→ collecting_dates → awaiting_confirmation
//!   ↑  ↕ removing_contacts                        │1
//!   └──────────────3 / 2─────────── collecting_availability / tracking_availability
//!                                                 │1
//!                    selecting_time / selecting_partial_time
//!                                                 │n
//!      collecting_location → collecting_activity → selecting_venue
//!                                                 │
//!   setting_start_time ⇄ final_confirmation ⇄ adding_guest
//!                                                 │2
//!                                             finalized
//! ```
//!
//! Every stage also accepts `reset`/`restart` and `help`; availability
//! stages accept `status`.

mod details;
mod guests;
mod schedule;

use chrono::{NaiveDateTime, Utc};
use huddle_core::constants::keywords::{GREETINGS, RESET};
use huddle_core::constants::limits::{MAX_NAME_LEN, MAX_TITLE_LEN};
use huddle_core::constants::{matches_keyword, normalize_reply};
use huddle_core::models::{
    Contact, Event, EventStage, Guest, GuestConversation, GuestStep, Planner,
};
use huddle_parsers::phone::mask_phone;
use huddle_parsers::GuestWindow;
use tracing::{debug, instrument};

use super::{Collaborators, Mutation, NextState, TransitionResult};
use crate::database::guests::ResponseCounts;
use crate::formatters::{guest as guest_text, planner as text};

/// Rows the planner machine reads, loaded inside the message's transaction
pub struct PlannerContext<'a> {
    /// The sender
    pub planner: &'a Planner,
    /// The planner's active event
    pub event: &'a Event,
    /// Guests on the event, in the order they were added
    pub guests: &'a [Guest],
    /// Saved contacts, in the order they are numbered in prompts
    pub contacts: &'a [Contact],
    /// Confirmed availability; loaded only in availability stages
    pub windows: &'a [GuestWindow],
    /// Local wall-clock time of the message
    pub now: NaiveDateTime,
}

impl PlannerContext<'_> {
    fn counts(&self) -> ResponseCounts {
        ResponseCounts::from_guests(self.guests)
    }

    fn waiting_on(&self) -> Vec<String> {
        self.guests
            .iter()
            .filter(|guest| !guest.has_responded())
            .map(|guest| guest.name.clone())
            .collect()
    }

    fn contact_for(&self, phone: &str) -> Option<&Contact> {
        self.contacts.iter().find(|contact| contact.phone == phone)
    }
}

/// Save `event` at `stage` and reply
fn move_to(mut event: Event, stage: EventStage, reply: String) -> TransitionResult {
    event.stage = stage;
    let event_id = event.id.clone();
    TransitionResult::reply(reply)
        .with_mutation(Mutation::SaveEvent(event))
        .with_next(NextState::Planner { event_id, stage })
}

/// Outbound requests to guests, opening a guest conversation for each
struct Dispatch {
    mutations: Vec<Mutation>,
    notifications: Vec<(String, String)>,
}

impl Dispatch {
    fn new() -> Self {
        Self {
            mutations: Vec::new(),
            notifications: Vec::new(),
        }
    }

    fn count(&self) -> usize {
        self.notifications.len()
    }

    /// Queue `body` for `guest` and open their conversation at `step`
    fn send(&mut self, ctx: &PlannerContext<'_>, guest: Guest, step: GuestStep, body: String) {
        if let Some(contact) = ctx.contact_for(&guest.phone) {
            let mut touched = contact.clone();
            touched.last_contacted_at = Some(Utc::now());
            self.mutations.push(Mutation::UpsertContact(touched));
        }
        self.mutations.push(Mutation::PutGuestState(GuestConversation::start(
            &guest.phone,
            &guest.event_id,
            step,
        )));
        self.notifications.push((guest.phone.clone(), body));
        self.mutations.push(Mutation::UpsertGuest(guest));
    }

    /// Availability requests for `guests`
    fn availability<'g>(
        ctx: &PlannerContext<'_>,
        event: &Event,
        guests: impl IntoIterator<Item = &'g Guest>,
    ) -> Self {
        let mut dispatch = Self::new();
        for guest in guests {
            let mut requested = guest.clone();
            requested.availability_requested = true;
            let body = guest_text::availability_request(ctx.planner, event, &guest.name);
            dispatch.send(ctx, requested, GuestStep::AwaitingAvailability, body);
        }
        dispatch
    }

    fn apply(self, result: TransitionResult) -> TransitionResult {
        self.notifications.into_iter().fold(
            result.with_mutations(self.mutations),
            |result, (to, body)| result.with_notification(to, body),
        )
    }
}

/// First contact from an unknown phone
#[must_use]
pub fn welcome(phone: &str) -> TransitionResult {
    TransitionResult::reply(text::welcome())
        .with_mutation(Mutation::CreatePlanner(Planner::new(phone)))
}

const NAME_PREFIXES: &[&str] = &["my name is ", "i'm ", "im ", "i am ", "it's ", "its ", "this is "];

fn clean_name(text: &str) -> Option<String> {
    let mut name = text.trim().trim_end_matches(['.', '!']).trim();
    let lowered = name.to_lowercase();
    if let Some(prefix) = NAME_PREFIXES.iter().find(|prefix| lowered.starts_with(*prefix)) {
        name = name.get(prefix.len()..).unwrap_or(name).trim();
    }
    let valid = !name.is_empty()
        && name.chars().count() <= MAX_NAME_LEN
        && name.chars().any(char::is_alphabetic)
        && name
            .chars()
            .all(|c| c.is_alphabetic() || matches!(c, ' ' | '\'' | '-' | '.'))
        && !matches_keyword(name, GREETINGS);
    valid.then(|| {
        name.split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    })
}

/// Reply from a planner whose name is not known yet
#[must_use]
pub fn collect_name(planner: &Planner, contacts: &[Contact], text: &str) -> TransitionResult {
    let Some(name) = clean_name(text) else {
        return TransitionResult::reply(text::name_invalid());
    };
    let event = Event::new(&planner.id, None);
    let event_id = event.id.clone();
    TransitionResult::reply(text::name_accepted(&name, contacts))
        .with_mutation(Mutation::SetPlannerName {
            planner_id: planner.id.clone(),
            name,
        })
        .with_mutation(Mutation::SaveEvent(event))
        .with_next(NextState::Planner {
            event_id,
            stage: EventStage::CollectingGuests,
        })
}

const TITLE_PREFIXES: &[&str] = &["let's plan ", "lets plan ", "plan ", "planning "];

fn event_title(text: &str) -> Option<String> {
    if matches_keyword(text, GREETINGS)
        || matches_keyword(text, RESET)
        || matches_keyword(text, &["help", "status", "done"])
    {
        return None;
    }
    let mut title = text.trim().trim_end_matches(['.', '!']).trim();
    let lowered = title.to_lowercase();
    if let Some(prefix) = TITLE_PREFIXES.iter().find(|prefix| lowered.starts_with(*prefix)) {
        title = title.get(prefix.len()..).unwrap_or(title).trim();
    }
    let title: String = title.chars().take(MAX_TITLE_LEN).collect();
    (!title.trim().is_empty()).then(|| title.trim().to_owned())
}

/// A named planner with no event in flight starts a new one
#[must_use]
pub fn start_event(planner: &Planner, contacts: &[Contact], text: &str) -> TransitionResult {
    let title = event_title(text);
    let reply = text::new_event(planner.name.as_deref(), title.as_deref(), contacts);
    let event = Event::new(&planner.id, title);
    let event_id = event.id.clone();
    TransitionResult::reply(reply)
        .with_mutation(Mutation::SaveEvent(event))
        .with_next(NextState::Planner {
            event_id,
            stage: EventStage::CollectingGuests,
        })
}

/// The prompt the planner is currently answering
#[must_use]
pub fn stage_prompt(ctx: &PlannerContext<'_>) -> String {
    let event = ctx.event;
    match event.stage {
        EventStage::CollectingGuests => text::guest_collection_prompt(ctx.contacts),
        EventStage::RemovingContacts => text::removing_contacts_prompt(ctx.contacts),
        EventStage::CollectingDates => text::date_prompt(),
        EventStage::AwaitingConfirmation => text::confirmation_menu(event, ctx.guests),
        EventStage::CollectingAvailability | EventStage::TrackingAvailability => {
            text::availability_status(event, ctx.guests, ctx.counts())
        }
        EventStage::SelectingTime | EventStage::SelectingPartialTime => {
            text::time_slot_list(&event.slot_options, &ctx.waiting_on())
        }
        EventStage::CollectingLocation => text::location_invalid(),
        EventStage::CollectingActivity => {
            text::activity_prompt(event.location.as_deref().unwrap_or("there"))
        }
        EventStage::SelectingVenue => text::venue_list(
            event.activity.as_deref().unwrap_or_default(),
            event.location.as_deref().unwrap_or_default(),
            &event.venue_suggestions,
        ),
        EventStage::SettingStartTime => text::start_time_prompt(),
        EventStage::AddingGuest => text::adding_guest_prompt(),
        EventStage::FinalConfirmation | EventStage::Finalized => format!(
            "{}\n\n{}",
            text::final_confirmation(event, ctx.guests),
            text::add_guest_hint()
        ),
    }
}

/// Handle one message for the planner's active event
#[instrument(skip_all, fields(phone = %mask_phone(&ctx.planner.phone), stage = %ctx.event.stage))]
pub async fn handle(
    ctx: &PlannerContext<'_>,
    deps: &Collaborators<'_>,
    text: &str,
) -> TransitionResult {
    if matches_keyword(text, RESET) {
        debug!(event_id = %ctx.event.id, "Planner reset event");
        return TransitionResult::reply(text::reset_done()).with_mutation(Mutation::DeleteEvent {
            event_id: ctx.event.id.clone(),
        });
    }
    let command = normalize_reply(text);
    if command == "help" {
        return TransitionResult::reply(text::help(&stage_prompt(ctx)));
    }
    if command == "status" && ctx.event.stage.is_availability_stage() {
        return TransitionResult::reply(text::availability_status(
            ctx.event,
            ctx.guests,
            ctx.counts(),
        ));
    }

    match ctx.event.stage {
        EventStage::CollectingGuests => guests::collecting_guests(ctx, text),
        EventStage::RemovingContacts => guests::removing_contacts(ctx, text),
        EventStage::AddingGuest => guests::adding_guest(ctx, text),
        EventStage::CollectingDates => schedule::collecting_dates(ctx, deps, text).await,
        EventStage::AwaitingConfirmation => schedule::awaiting_confirmation(ctx, text),
        EventStage::CollectingAvailability | EventStage::TrackingAvailability => {
            schedule::tracking_availability(ctx, text)
        }
        EventStage::SelectingTime | EventStage::SelectingPartialTime => {
            schedule::selecting_time(ctx, text)
        }
        EventStage::CollectingLocation => details::collecting_location(ctx, text),
        EventStage::CollectingActivity => details::collecting_activity(ctx, deps, text).await,
        EventStage::SelectingVenue => details::selecting_venue(ctx, deps, text).await,
        EventStage::FinalConfirmation => details::final_confirmation(ctx, text),
        EventStage::SettingStartTime => details::setting_start_time(ctx, text),
        EventStage::Finalized => TransitionResult::reply(stage_prompt(ctx)),
    }
}

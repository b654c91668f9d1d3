// ABOUTME: Guest state machine: availability collection, confirmation, preferences and RSVP
// ABOUTME: Reads a snapshot loaded by the router and returns the writes and notifications to perform
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use huddle_core::constants::keywords::{BUSY, RSVP_MAYBE, RSVP_NO, RSVP_YES};
use huddle_core::constants::matches_keyword;
use huddle_core::models::{
    Event, Guest, GuestConversation, GuestScratch, GuestStep, Planner, RsvpStatus,
};
use huddle_parsers::phone::mask_phone;
use tracing::{debug, instrument};

use super::{menu_choice, Collaborators, Mutation, NextState, TransitionResult};
use crate::database::guests::ResponseCounts;
use crate::formatters::{guest as text, notifications};
use crate::parsing;

/// Replies meaning "no preferences"
const NO_PREFERENCES: &[&str] = &["none", "no", "nope", "nothing", "n/a", "na", "skip", "no preference"];

/// Rows the guest machine reads, loaded inside the message's transaction
pub struct GuestContext<'a> {
    /// The sender's open conversation
    pub conversation: &'a GuestConversation,
    /// The sender's guest row on that event
    pub guest: &'a Guest,
    /// The event being planned
    pub event: &'a Event,
    /// The event's planner
    pub planner: &'a Planner,
    /// Every guest on the event, the sender included
    pub guests: &'a [Guest],
    /// Local date used to resolve relative day words
    pub today: NaiveDate,
}

impl GuestContext<'_> {
    /// Response counts as they will be once `updated` replaces the sender's row
    fn counts_with(&self, updated: &Guest) -> ResponseCounts {
        let guests: Vec<Guest> = self
            .guests
            .iter()
            .map(|guest| {
                if guest.id == updated.id {
                    updated.clone()
                } else {
                    guest.clone()
                }
            })
            .collect();
        ResponseCounts::from_guests(&guests)
    }

    fn stay(&self, step: GuestStep, scratch: GuestScratch) -> NextState {
        NextState::Guest(self.conversation.advance(step, scratch))
    }

    fn completed(&self) -> NextState {
        NextState::GuestCompleted {
            phone: self.conversation.phone.clone(),
        }
    }
}

/// Handle one guest message
#[instrument(skip_all, fields(phone = %mask_phone(&ctx.conversation.phone), step = %ctx.conversation.step))]
pub async fn handle(
    ctx: &GuestContext<'_>,
    deps: &Collaborators<'_>,
    text: &str,
) -> TransitionResult {
    let result = match ctx.conversation.step {
        GuestStep::AwaitingAvailability => awaiting_availability(ctx, deps, text).await,
        GuestStep::ConfirmingAvailability => confirming_availability(ctx, text),
        GuestStep::AwaitingPreferences => awaiting_preferences(ctx, text),
        GuestStep::AwaitingFinalChoice => awaiting_final_choice(ctx, text),
        GuestStep::AwaitingRsvp => awaiting_rsvp(ctx, text),
    };
    debug!(next = ?next_label(&result.next_state), "Guest transition");
    result
}

fn next_label(next: &NextState) -> &'static str {
    match next {
        NextState::Unchanged => "unchanged",
        NextState::Guest(conversation) => conversation.step.as_str(),
        NextState::GuestCompleted { .. } => "completed",
        NextState::Planner { .. } => "planner",
    }
}

async fn awaiting_availability(
    ctx: &GuestContext<'_>,
    deps: &Collaborators<'_>,
    text: &str,
) -> TransitionResult {
    if matches_keyword(text, BUSY) {
        let mut guest = ctx.guest.clone();
        guest.unavailable = true;
        guest.availability_provided = false;
        let counts = ctx.counts_with(&guest);
        return TransitionResult::reply(text::busy_acknowledgement(ctx.planner))
            .with_mutation(Mutation::ReplaceAvailability {
                event_id: ctx.event.id.clone(),
                guest_id: guest.id.clone(),
                windows: Vec::new(),
            })
            .with_notification(
                ctx.planner.phone.clone(),
                notifications::guest_busy(&guest.name, counts),
            )
            .with_mutation(Mutation::UpsertGuest(guest))
            .with_next(ctx.completed());
    }

    let proposed = &ctx.event.proposed_dates;
    match parsing::parse_availability(deps.llm, text, proposed, ctx.today).await {
        Ok(windows) => TransitionResult::reply(text::availability_confirmation(&windows)).with_next(
            ctx.stay(
                GuestStep::ConfirmingAvailability,
                GuestScratch {
                    pending: windows,
                    awaiting_menu_choice: true,
                },
            ),
        ),
        Err(e) => {
            debug!(error = %e, "Availability not understood");
            TransitionResult::reply(text::availability_parse_error(&e, proposed))
        }
    }
}

fn confirming_availability(ctx: &GuestContext<'_>, text: &str) -> TransitionResult {
    let pending = &ctx.conversation.scratch.pending;
    match menu_choice(text) {
        // Windows stay in scratch until the final send, which writes them
        // together with availability_provided so the two never disagree
        Some(1) => TransitionResult::reply(text::preferences_request(ctx.planner)).with_next(
            ctx.stay(
                GuestStep::AwaitingPreferences,
                GuestScratch {
                    pending: pending.clone(),
                    awaiting_menu_choice: false,
                },
            ),
        ),
        Some(2) => TransitionResult::reply(text::availability_retry(&ctx.event.proposed_dates))
            .with_next(ctx.stay(GuestStep::AwaitingAvailability, GuestScratch::default())),
        _ => TransitionResult::reply(text::availability_confirmation_reprompt(pending)),
    }
}

fn awaiting_preferences(ctx: &GuestContext<'_>, text: &str) -> TransitionResult {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return TransitionResult::reply(text::preferences_request(ctx.planner));
    }
    let mut guest = ctx.guest.clone();
    guest.preferences_provided = true;
    guest.preferences = (!matches_keyword(trimmed, NO_PREFERENCES)).then(|| trimmed.to_owned());

    let pending = &ctx.conversation.scratch.pending;
    TransitionResult::reply(text::final_guest_confirmation(
        ctx.planner,
        pending,
        guest.preferences.as_deref(),
    ))
    .with_next(ctx.stay(
        GuestStep::AwaitingFinalChoice,
        GuestScratch {
            pending: pending.clone(),
            awaiting_menu_choice: true,
        },
    ))
    .with_mutation(Mutation::UpsertGuest(guest))
}

fn awaiting_final_choice(ctx: &GuestContext<'_>, text: &str) -> TransitionResult {
    let pending = &ctx.conversation.scratch.pending;
    match menu_choice(text) {
        Some(1) => {
            let mut guest = ctx.guest.clone();
            guest.availability_provided = true;
            guest.unavailable = false;
            let counts = ctx.counts_with(&guest);
            TransitionResult::reply(text::availability_sent(ctx.planner))
                .with_mutation(Mutation::ReplaceAvailability {
                    event_id: ctx.event.id.clone(),
                    guest_id: guest.id.clone(),
                    windows: pending.clone(),
                })
                .with_notification(
                    ctx.planner.phone.clone(),
                    notifications::guest_responded(&guest.name, counts),
                )
                .with_mutation(Mutation::UpsertGuest(guest))
                .with_next(ctx.completed())
        }
        Some(2) => TransitionResult::reply(text::availability_retry(&ctx.event.proposed_dates))
            .with_next(ctx.stay(GuestStep::AwaitingAvailability, GuestScratch::default())),
        Some(3) => TransitionResult::reply(text::preferences_request(ctx.planner)).with_next(
            ctx.stay(
                GuestStep::AwaitingPreferences,
                GuestScratch {
                    pending: pending.clone(),
                    awaiting_menu_choice: false,
                },
            ),
        ),
        _ => TransitionResult::reply(text::final_guest_reprompt(
            ctx.planner,
            pending,
            ctx.guest.preferences.as_deref(),
        )),
    }
}

fn rsvp_from(text: &str) -> Option<RsvpStatus> {
    if matches_keyword(text, RSVP_YES) {
        Some(RsvpStatus::Accepted)
    } else if matches_keyword(text, RSVP_NO) {
        Some(RsvpStatus::Declined)
    } else if matches_keyword(text, RSVP_MAYBE) {
        Some(RsvpStatus::Maybe)
    } else {
        None
    }
}

fn awaiting_rsvp(ctx: &GuestContext<'_>, text: &str) -> TransitionResult {
    let Some(status) = rsvp_from(text) else {
        return TransitionResult::reply(text::rsvp_reprompt());
    };
    let mut guest = ctx.guest.clone();
    guest.rsvp = status;
    TransitionResult::reply(text::rsvp_acknowledgement(status, ctx.planner))
        .with_notification(
            ctx.planner.phone.clone(),
            notifications::guest_rsvp(&guest.name, status),
        )
        .with_mutation(Mutation::UpsertGuest(guest))
        .with_next(ctx.completed())
}

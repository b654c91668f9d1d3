// ABOUTME: Guest-list stages: collecting guests, pruning saved contacts and adding a late guest
// ABOUTME: Accepts contact tuples, numbered picks from saved contacts and remove-by-name
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use huddle_core::constants::keywords::{BACK, DONE};
use huddle_core::constants::{matches_keyword, normalize_reply};
use huddle_core::models::{Contact, EventStage, Guest, ReentryIntent};
use huddle_parsers::{parse_contacts, ParsedContact};

use super::{move_to, Dispatch, PlannerContext};
use crate::conversation::{Mutation, TransitionResult};
use crate::formatters::planner as text;

/// Longest token accepted as a contact number; phone fragments are longer
const MAX_PICK_DIGITS: usize = 3;

/// `"1, 3"`, `"2 and 4"` → `[1, 3]`; `None` when any token is not a small number
pub(super) fn parse_picks(input: &str) -> Option<Vec<usize>> {
    let normalized = normalize_reply(input);
    let tokens: Vec<&str> = normalized
        .split(|c: char| c == ',' || c == '&' || c.is_whitespace())
        .filter(|token| !token.is_empty() && *token != "and")
        .collect();
    if tokens.is_empty() {
        return None;
    }
    let mut picks = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.len() > MAX_PICK_DIGITS || !token.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let pick = token.parse::<usize>().ok()?;
        if !picks.contains(&pick) {
            picks.push(pick);
        }
    }
    Some(picks)
}

/// Resolve 1-based picks against `contacts`
fn picked<'c>(contacts: &'c [Contact], picks: &[usize]) -> Option<Vec<&'c Contact>> {
    picks
        .iter()
        .map(|pick| pick.checked_sub(1).and_then(|index| contacts.get(index)))
        .collect()
}

/// Guests and contacts after adding `entries`; reply lists the added names
fn add_guests(
    ctx: &PlannerContext<'_>,
    entries: &[ParsedContact],
    save_contacts: bool,
) -> TransitionResult {
    let mut all: Vec<Guest> = ctx.guests.to_vec();
    let mut mutations = Vec::new();
    let mut added = Vec::new();

    for entry in entries {
        let guest = match all.iter_mut().find(|guest| guest.phone == entry.phone) {
            Some(existing) => {
                existing.name.clone_from(&entry.name);
                existing.clone()
            }
            None => {
                let guest = Guest::new(&ctx.event.id, &entry.name, &entry.phone);
                all.push(guest.clone());
                guest
            }
        };
        mutations.push(Mutation::UpsertGuest(guest));

        if save_contacts {
            let contact = ctx.contact_for(&entry.phone).map_or_else(
                || Contact::new(&ctx.planner.id, &entry.name, &entry.phone),
                |existing| Contact {
                    name: entry.name.clone(),
                    ..existing.clone()
                },
            );
            mutations.push(Mutation::UpsertContact(contact));
        }
        added.push(entry.name.clone());
    }

    TransitionResult::reply(text::guests_added(&added, &all)).with_mutations(mutations)
}

/// Contact tuples or numbered contact picks; shared by guest collection and late additions
fn add_from_input(ctx: &PlannerContext<'_>, input: &str) -> TransitionResult {
    if let Some(picks) = parse_picks(input) {
        if ctx.contacts.is_empty() {
            return TransitionResult::reply(text::guest_parse_error());
        }
        let Some(chosen) = picked(ctx.contacts, &picks) else {
            return TransitionResult::reply(text::invalid_contact_choice(ctx.contacts.len()));
        };
        let entries: Vec<ParsedContact> = chosen
            .into_iter()
            .map(|contact| ParsedContact {
                name: contact.name.clone(),
                phone: contact.phone.clone(),
            })
            .collect();
        return add_guests(ctx, &entries, false);
    }

    match parse_contacts(input) {
        Ok(entries) => add_guests(ctx, &entries, true),
        Err(_) => TransitionResult::reply(text::guest_parse_error()),
    }
}

fn remove_guest(ctx: &PlannerContext<'_>, name: &str) -> TransitionResult {
    let Some(guest) = ctx
        .guests
        .iter()
        .find(|guest| guest.name.eq_ignore_ascii_case(name))
    else {
        return TransitionResult::reply(text::guest_not_found(name, ctx.guests));
    };
    let remaining: Vec<Guest> = ctx
        .guests
        .iter()
        .filter(|other| other.id != guest.id)
        .cloned()
        .collect();
    TransitionResult::reply(text::guest_removed(&guest.name, &remaining)).with_mutation(
        Mutation::DeleteGuest {
            guest_id: guest.id.clone(),
            phone: guest.phone.clone(),
            event_id: guest.event_id.clone(),
        },
    )
}

/// `done` in guest collection: resume a detour or move on to dates
fn finish_guests(ctx: &PlannerContext<'_>) -> TransitionResult {
    if ctx.guests.is_empty() {
        return TransitionResult::reply(text::no_guests_yet());
    }
    let mut event = ctx.event.clone();
    match event.take_reentry() {
        None => move_to(event, EventStage::CollectingDates, text::date_prompt()),
        Some(ReentryIntent::ReturnToConfirmation) => {
            let reply = text::confirmation_menu(&event, ctx.guests);
            move_to(event, EventStage::AwaitingConfirmation, reply)
        }
        Some(ReentryIntent::AutoSendAvailability) => {
            let fresh = ctx.guests.iter().filter(|guest| !guest.availability_requested);
            let dispatch = Dispatch::availability(ctx, &event, fresh);
            let reply = if dispatch.count() == 0 {
                text::availability_status(ctx.event, ctx.guests, ctx.counts())
            } else {
                text::availability_requests_sent(dispatch.count())
            };
            dispatch.apply(move_to(event, EventStage::TrackingAvailability, reply))
        }
    }
}

pub(super) fn collecting_guests(ctx: &PlannerContext<'_>, input: &str) -> TransitionResult {
    let command = normalize_reply(input);
    if command == "remove contact" || command == "remove contacts" {
        return move_to(
            ctx.event.clone(),
            EventStage::RemovingContacts,
            text::removing_contacts_prompt(ctx.contacts),
        );
    }
    if let Some(name) = command.strip_prefix("remove ") {
        return remove_guest(ctx, name.trim());
    }
    if matches_keyword(input, DONE) {
        return finish_guests(ctx);
    }
    add_from_input(ctx, input)
}

pub(super) fn removing_contacts(ctx: &PlannerContext<'_>, input: &str) -> TransitionResult {
    if matches_keyword(input, DONE) || matches_keyword(input, BACK) {
        return move_to(
            ctx.event.clone(),
            EventStage::CollectingGuests,
            text::guest_collection_prompt(ctx.contacts),
        );
    }
    let Some(picks) = parse_picks(input) else {
        return TransitionResult::reply(text::removing_contacts_prompt(ctx.contacts));
    };
    let Some(chosen) = picked(ctx.contacts, &picks) else {
        return TransitionResult::reply(text::invalid_contact_choice(ctx.contacts.len()));
    };

    let removed: Vec<String> = chosen.iter().map(|contact| contact.name.clone()).collect();
    let remaining: Vec<Contact> = ctx
        .contacts
        .iter()
        .filter(|contact| chosen.iter().all(|gone| gone.id != contact.id))
        .cloned()
        .collect();
    TransitionResult::reply(text::contacts_removed(&removed, &remaining)).with_mutations(
        chosen.into_iter().map(|contact| Mutation::DeleteContact {
            contact_id: contact.id.clone(),
        }),
    )
}

pub(super) fn adding_guest(ctx: &PlannerContext<'_>, input: &str) -> TransitionResult {
    if matches_keyword(input, DONE) || matches_keyword(input, BACK) {
        let reply = text::final_confirmation(ctx.event, ctx.guests);
        return move_to(ctx.event.clone(), EventStage::FinalConfirmation, reply);
    }
    add_from_input(ctx, input)
}

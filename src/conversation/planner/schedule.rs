// ABOUTME: Scheduling stages: proposing dates, the confirmation menu, tracking availability and slot choice
// ABOUTME: Availability requests are dispatched here and overlaps are computed from confirmed windows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use huddle_core::constants::keywords::BACK;
use huddle_core::constants::matches_keyword;
use huddle_core::models::{EventStage, ReentryIntent};
use huddle_parsers::{compute_overlaps, OverlapOptions};
use tracing::debug;

use super::{move_to, Dispatch, PlannerContext};
use crate::conversation::{menu_choice, Collaborators, TransitionResult};
use crate::formatters::planner as text;
use crate::parsing;

pub(super) async fn collecting_dates(
    ctx: &PlannerContext<'_>,
    deps: &Collaborators<'_>,
    input: &str,
) -> TransitionResult {
    match parsing::parse_dates(deps.llm, input, ctx.now, &ctx.event.proposed_dates).await {
        Ok(parsed) => {
            let mut event = ctx.event.clone();
            event.proposed_dates = parsed.dates;
            event.date_summary = Some(parsed.summary);
            let reply = text::confirmation_menu(&event, ctx.guests);
            move_to(event, EventStage::AwaitingConfirmation, reply)
        }
        Err(e) => {
            debug!(error = %e, "Dates not understood");
            TransitionResult::reply(text::date_parse_error())
        }
    }
}

pub(super) fn awaiting_confirmation(ctx: &PlannerContext<'_>, input: &str) -> TransitionResult {
    match menu_choice(input) {
        Some(1) => {
            if ctx.guests.is_empty() {
                return move_to(
                    ctx.event.clone(),
                    EventStage::CollectingGuests,
                    text::no_guests_yet(),
                );
            }
            let dispatch = Dispatch::availability(ctx, ctx.event, ctx.guests);
            let reply = text::availability_requests_sent(dispatch.count());
            dispatch.apply(move_to(
                ctx.event.clone(),
                EventStage::CollectingAvailability,
                reply,
            ))
        }
        Some(2) => move_to(
            ctx.event.clone(),
            EventStage::CollectingDates,
            text::date_prompt(),
        ),
        Some(3) => {
            let mut event = ctx.event.clone();
            event.begin_reentry(ReentryIntent::ReturnToConfirmation);
            move_to(
                event,
                EventStage::CollectingGuests,
                text::guest_collection_prompt(ctx.contacts),
            )
        }
        _ => TransitionResult::reply(text::confirmation_reprompt(ctx.event, ctx.guests)),
    }
}

pub(super) fn tracking_availability(ctx: &PlannerContext<'_>, input: &str) -> TransitionResult {
    match menu_choice(input) {
        Some(1) => show_slots(ctx),
        Some(2) => {
            let mut event = ctx.event.clone();
            event.begin_reentry(ReentryIntent::AutoSendAvailability);
            move_to(
                event,
                EventStage::CollectingGuests,
                text::guest_collection_prompt(ctx.contacts),
            )
        }
        _ => TransitionResult::reply(text::availability_status(
            ctx.event,
            ctx.guests,
            ctx.counts(),
        )),
    }
}

fn show_slots(ctx: &PlannerContext<'_>) -> TransitionResult {
    let provided = ctx
        .guests
        .iter()
        .filter(|guest| guest.availability_provided)
        .count();
    let options = OverlapOptions {
        show_individual: provided == 1,
        single_invited: ctx.guests.len() == 1,
    };
    let slots = compute_overlaps(ctx.windows, options);
    debug!(slots = slots.len(), provided, "Computed overlaps");
    if slots.is_empty() {
        return TransitionResult::reply(text::no_overlap());
    }

    let counts = ctx.counts();
    let stage = if counts.all_responded() {
        EventStage::SelectingTime
    } else {
        EventStage::SelectingPartialTime
    };
    let reply = text::time_slot_list(&slots, &ctx.waiting_on());
    let mut event = ctx.event.clone();
    event.slot_options = slots;
    move_to(event, stage, reply)
}

pub(super) fn selecting_time(ctx: &PlannerContext<'_>, input: &str) -> TransitionResult {
    let options = &ctx.event.slot_options;
    if matches_keyword(input, BACK) || options.is_empty() {
        let reply = text::availability_status(ctx.event, ctx.guests, ctx.counts());
        return move_to(ctx.event.clone(), EventStage::TrackingAvailability, reply);
    }
    let Some(slot) = menu_choice(input)
        .and_then(|choice| choice.checked_sub(1))
        .and_then(|index| options.get(index))
    else {
        return TransitionResult::reply(text::invalid_slot_choice(options.len()));
    };

    let mut event = ctx.event.clone();
    event.selected_date = Some(slot.date);
    if slot.all_day {
        event.start_time = None;
        event.end_time = None;
    } else {
        event.start_time = Some(slot.start);
        event.end_time = Some(slot.end);
    }
    move_to(event, EventStage::CollectingLocation, text::location_prompt(slot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Mutation, NextState};
    use chrono::{NaiveDate, NaiveTime};
    use huddle_core::models::{Contact, Event, Guest, Planner, TimeWindow};
    use huddle_parsers::GuestWindow;

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
    }

    fn friday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap_or_default()
    }

    struct Fixture {
        planner: Planner,
        event: Event,
        guests: Vec<Guest>,
        windows: Vec<GuestWindow>,
    }

    impl Fixture {
        fn two_guests(stage: EventStage) -> Self {
            let planner = Planner::new("4155550101");
            let mut event = Event::new(&planner.id, None);
            event.stage = stage;
            event.proposed_dates = vec![friday()];
            event.date_summary = Some("Friday 10/16".to_owned());
            let guests = vec![
                Guest::new(&event.id, "A", "5105550199"),
                Guest::new(&event.id, "B", "5105550100"),
            ];
            Self {
                planner,
                event,
                guests,
                windows: Vec::new(),
            }
        }

        fn respond(&mut self, index: usize, start: NaiveTime, end: NaiveTime) {
            let guest = &mut self.guests[index];
            guest.availability_provided = true;
            self.windows.push(GuestWindow {
                guest_id: guest.id.clone(),
                guest_name: guest.name.clone(),
                window: TimeWindow::timed(friday(), start, end),
            });
        }

        fn ctx(&self) -> PlannerContext<'_> {
            const NO_CONTACTS: &[Contact] = &[];
            PlannerContext {
                planner: &self.planner,
                event: &self.event,
                guests: &self.guests,
                contacts: NO_CONTACTS,
                windows: &self.windows,
                now: friday().and_hms_opt(9, 0, 0).unwrap_or_default(),
            }
        }
    }

    #[test]
    fn test_request_availability_dispatches_to_every_guest() {
        let fx = Fixture::two_guests(EventStage::AwaitingConfirmation);
        let result = awaiting_confirmation(&fx.ctx(), "1");
        assert_eq!(result.side_effects.len(), 2);
        assert_eq!(
            result
                .mutations
                .iter()
                .filter(|m| matches!(m, Mutation::PutGuestState(_)))
                .count(),
            2
        );
        assert!(result.reply.starts_with("Sent availability requests to 2 guests!"));
    }

    #[test]
    fn test_option_three_marks_reentry() {
        let fx = Fixture::two_guests(EventStage::AwaitingConfirmation);
        let result = awaiting_confirmation(&fx.ctx(), "3");
        assert!(result.mutations.iter().any(|m| matches!(
            m,
            Mutation::SaveEvent(event)
                if event.reentry == Some(ReentryIntent::ReturnToConfirmation)
                    && event.previous_stage == Some(EventStage::AwaitingConfirmation)
        )));
    }

    #[test]
    fn test_overlap_ranking_picks_shared_window() {
        let mut fx = Fixture::two_guests(EventStage::CollectingAvailability);
        fx.respond(0, time(14, 0), time(23, 59));
        fx.respond(1, time(16, 0), time(23, 59));
        let result = tracking_availability(&fx.ctx(), "1");
        assert!(matches!(
            result.next_state,
            NextState::Planner {
                stage: EventStage::SelectingTime,
                ..
            }
        ));
        let saved = result.mutations.iter().find_map(|m| match m {
            Mutation::SaveEvent(event) => Some(event.slot_options.clone()),
            _ => None,
        });
        let slots = saved.unwrap_or_default();
        assert_eq!(slots.len(), 1);
        assert_eq!((slots[0].start, slots[0].end), (time(16, 0), time(23, 59)));
        assert_eq!(slots[0].guest_names, vec!["A".to_owned(), "B".to_owned()]);
    }

    #[test]
    fn test_no_overlap_stays() {
        let mut fx = Fixture::two_guests(EventStage::CollectingAvailability);
        fx.respond(0, time(9, 0), time(10, 0));
        fx.respond(1, time(18, 0), time(20, 0));
        let result = tracking_availability(&fx.ctx(), "1");
        assert_eq!(result.next_state, NextState::Unchanged);
        assert!(result.reply.starts_with("I couldn't find a time"));
    }

    #[test]
    fn test_slot_choice_writes_selected_time() {
        let mut fx = Fixture::two_guests(EventStage::SelectingTime);
        fx.respond(0, time(14, 0), time(23, 59));
        fx.respond(1, time(16, 0), time(23, 59));
        fx.event.slot_options = compute_overlaps(&fx.windows, OverlapOptions::default());

        let bad = selecting_time(&fx.ctx(), "4");
        assert_eq!(bad.reply, "Please reply with a number from 1 to 1, or \"back\".");

        let result = selecting_time(&fx.ctx(), "1");
        assert!(result.mutations.iter().any(|m| matches!(
            m,
            Mutation::SaveEvent(event)
                if event.selected_date == Some(friday()) && event.start_time == Some(time(16, 0))
        )));
        assert!(result.reply.starts_with("Locked in: Friday 10/16, 4pm-11:59pm!"));
    }
}

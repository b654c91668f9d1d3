// ABOUTME: Detail stages: location, activity with the broad-term guard, venue choice, start time
// ABOUTME: Also owns the final summary menu and invitation dispatch
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use huddle_core::constants::keywords::{BACK, BROAD_ACTIVITIES};
use huddle_core::constants::limits::{MAX_TITLE_LEN, MIN_CUSTOM_VENUE_LEN};
use huddle_core::constants::{matches_keyword, normalize_reply};
use huddle_core::models::{EventStage, GuestStep};
use huddle_parsers::parse_single_time;
use tracing::debug;

use super::{move_to, Dispatch, PlannerContext};
use crate::conversation::{menu_choice, Collaborators, TransitionResult};
use crate::formatters::{guest as guest_text, planner as text};

/// Lead-in verbs stripped before the broad-activity check
const ACTIVITY_LEAD_INS: &[&str] = &["get ", "grab ", "go for ", "go to ", "have ", "some ", "just "];

/// Whether `activity` is too vague to suggest venues for
pub(super) fn is_too_broad(activity: &str) -> bool {
    let mut normalized = normalize_reply(activity);
    for lead_in in ACTIVITY_LEAD_INS {
        if let Some(rest) = normalized.strip_prefix(lead_in) {
            normalized = rest.to_owned();
        }
    }
    BROAD_ACTIVITIES.contains(&normalized.as_str())
}

fn clean_free_text(input: &str) -> Option<String> {
    let trimmed = input.trim().trim_end_matches(['.', '!']).trim();
    let valid = trimmed.chars().count() >= 2
        && trimmed.chars().count() <= MAX_TITLE_LEN
        && trimmed.chars().any(char::is_alphabetic);
    valid.then(|| trimmed.to_owned())
}

pub(super) fn collecting_location(ctx: &PlannerContext<'_>, input: &str) -> TransitionResult {
    let Some(location) = clean_free_text(input) else {
        return TransitionResult::reply(text::location_invalid());
    };
    let reply = text::activity_prompt(&location);
    let mut event = ctx.event.clone();
    event.location = Some(location);
    move_to(event, EventStage::CollectingActivity, reply)
}

pub(super) async fn collecting_activity(
    ctx: &PlannerContext<'_>,
    deps: &Collaborators<'_>,
    input: &str,
) -> TransitionResult {
    let location = ctx.event.location.clone().unwrap_or_default();
    let Some(activity) = clean_free_text(input) else {
        return TransitionResult::reply(text::activity_prompt(&location));
    };
    if is_too_broad(&activity) {
        debug!(activity = %activity, "Activity too broad");
        return TransitionResult::reply(text::activity_too_broad(&activity));
    }

    let suggestions = deps.venues.suggest(&activity, &location, &[]).await;
    let mut event = ctx.event.clone();
    event.activity = Some(activity.clone());
    event.venue = None;
    if suggestions.is_empty() {
        let reply = text::final_confirmation(&event, ctx.guests);
        return move_to(event, EventStage::FinalConfirmation, reply);
    }
    let reply = text::venue_list(&activity, &location, &suggestions);
    event.venue_suggestions = suggestions;
    move_to(event, EventStage::SelectingVenue, reply)
}

pub(super) async fn selecting_venue(
    ctx: &PlannerContext<'_>,
    deps: &Collaborators<'_>,
    input: &str,
) -> TransitionResult {
    let suggestions = &ctx.event.venue_suggestions;
    let mut event = ctx.event.clone();

    if let Some(choice) = menu_choice(input) {
        let Some(venue) = choice.checked_sub(1).and_then(|index| suggestions.get(index)) else {
            return TransitionResult::reply(text::venue_invalid(suggestions.len()));
        };
        event.venue = Some(venue.name.clone());
        let reply = text::final_confirmation(&event, ctx.guests);
        return move_to(event, EventStage::FinalConfirmation, reply);
    }

    match normalize_reply(input).as_str() {
        "new list" | "more" | "more ideas" => {
            let activity = event.activity.clone().unwrap_or_default();
            let location = event.location.clone().unwrap_or_default();
            let shown: Vec<String> = suggestions.iter().map(|venue| venue.name.clone()).collect();
            let fresh = deps.venues.suggest(&activity, &location, &shown).await;
            let reply = text::venue_list(&activity, &location, &fresh);
            event.venue_suggestions = fresh;
            move_to(event, EventStage::SelectingVenue, reply)
        }
        "skip" => {
            event.venue = None;
            let reply = text::final_confirmation(&event, ctx.guests);
            move_to(event, EventStage::FinalConfirmation, reply)
        }
        _ => {
            let custom = input.trim();
            if custom.chars().count() < MIN_CUSTOM_VENUE_LEN {
                return TransitionResult::reply(text::venue_invalid(suggestions.len()));
            }
            event.venue = Some(custom.to_owned());
            let reply = text::final_confirmation(&event, ctx.guests);
            move_to(event, EventStage::FinalConfirmation, reply)
        }
    }
}

/// Invitations to every guest who has not said they are unavailable
fn send_invitations(ctx: &PlannerContext<'_>) -> TransitionResult {
    let mut dispatch = Dispatch::new();
    for guest in ctx.guests.iter().filter(|guest| !guest.unavailable) {
        let body = guest_text::invitation(ctx.planner, ctx.event, &guest.name);
        dispatch.send(ctx, guest.clone(), GuestStep::AwaitingRsvp, body);
    }
    let reply = text::invitations_sent(dispatch.count());
    dispatch.apply(move_to(ctx.event.clone(), EventStage::Finalized, reply))
}

pub(super) fn final_confirmation(ctx: &PlannerContext<'_>, input: &str) -> TransitionResult {
    let command = normalize_reply(input);
    if command == "add guest" || command == "add guests" {
        return move_to(
            ctx.event.clone(),
            EventStage::AddingGuest,
            text::adding_guest_prompt(),
        );
    }
    match menu_choice(input) {
        Some(1) => move_to(
            ctx.event.clone(),
            EventStage::SettingStartTime,
            text::start_time_prompt(),
        ),
        Some(2) => send_invitations(ctx),
        Some(3) => {
            let location = ctx.event.location.clone().unwrap_or_default();
            move_to(
                ctx.event.clone(),
                EventStage::CollectingActivity,
                text::activity_prompt(&location),
            )
        }
        _ => TransitionResult::reply(text::final_reprompt(ctx.event, ctx.guests)),
    }
}

pub(super) fn setting_start_time(ctx: &PlannerContext<'_>, input: &str) -> TransitionResult {
    if matches_keyword(input, BACK) {
        let reply = text::final_confirmation(ctx.event, ctx.guests);
        return move_to(ctx.event.clone(), EventStage::FinalConfirmation, reply);
    }
    match parse_single_time(input) {
        Ok(start) => {
            let mut event = ctx.event.clone();
            event.start_time = Some(start);
            event.end_time = None;
            let reply = text::start_time_set(&event, ctx.guests);
            move_to(event, EventStage::FinalConfirmation, reply)
        }
        Err(_) => TransitionResult::reply(text::start_time_invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Mutation, NextState};
    use crate::venues::CuratedVenues;
    use chrono::{NaiveDate, NaiveTime};
    use huddle_core::models::{Event, Guest, Planner, VenueSuggestion};

    struct Fixture {
        planner: Planner,
        event: Event,
        guests: Vec<Guest>,
    }

    impl Fixture {
        fn at(stage: EventStage) -> Self {
            let mut planner = Planner::new("4155550101");
            planner.name = Some("Jordan".to_owned());
            let mut event = Event::new(&planner.id, None);
            event.stage = stage;
            event.location = Some("Oakland".to_owned());
            event.selected_date = NaiveDate::from_ymd_opt(2026, 10, 16);
            let guests = vec![Guest::new(&event.id, "Sam", "5105550199")];
            Self {
                planner,
                event,
                guests,
            }
        }

        fn ctx(&self) -> PlannerContext<'_> {
            PlannerContext {
                planner: &self.planner,
                event: &self.event,
                guests: &self.guests,
                contacts: &[],
                windows: &[],
                now: NaiveDate::from_ymd_opt(2026, 10, 13)
                    .and_then(|date| date.and_hms_opt(9, 0, 0))
                    .unwrap_or_default(),
            }
        }
    }

    fn deps() -> Collaborators<'static> {
        Collaborators {
            llm: None,
            venues: &CuratedVenues,
        }
    }

    fn saved_event(result: &TransitionResult) -> Option<&Event> {
        result.mutations.iter().find_map(|m| match m {
            Mutation::SaveEvent(event) => Some(event),
            _ => None,
        })
    }

    #[test]
    fn test_broad_terms() {
        assert!(is_too_broad("dinner"));
        assert!(is_too_broad("Grab drinks"));
        assert!(is_too_broad("hang out"));
        assert!(is_too_broad("Sushi!"));
        assert!(!is_too_broad("ramen"));
        assert!(!is_too_broad("rooftop cocktails"));
    }

    #[tokio::test]
    async fn test_broad_activity_does_not_advance() {
        let fx = Fixture::at(EventStage::CollectingActivity);
        let result = collecting_activity(&fx.ctx(), &deps(), "food").await;
        assert_eq!(result.next_state, NextState::Unchanged);
        assert!(result.reply.contains("a little broad"));
    }

    #[tokio::test]
    async fn test_activity_fetches_venues() {
        let fx = Fixture::at(EventStage::CollectingActivity);
        let result = collecting_activity(&fx.ctx(), &deps(), "bowling").await;
        assert!(matches!(
            result.next_state,
            NextState::Planner {
                stage: EventStage::SelectingVenue,
                ..
            }
        ));
        assert_eq!(
            saved_event(&result).map(|event| event.venue_suggestions.len()),
            Some(3)
        );
        assert!(result.reply.starts_with("Here are some bowling spots in Oakland:"));
    }

    #[tokio::test]
    async fn test_venue_choice_and_custom_name() {
        let mut fx = Fixture::at(EventStage::SelectingVenue);
        fx.event.activity = Some("bowling".to_owned());
        fx.event.venue_suggestions = vec![VenueSuggestion {
            name: "Lanes".to_owned(),
            description: "Bowling".to_owned(),
            map_link: None,
        }];
        let picked = selecting_venue(&fx.ctx(), &deps(), "1").await;
        assert_eq!(
            saved_event(&picked).and_then(|event| event.venue.clone()),
            Some("Lanes".to_owned())
        );

        let custom = selecting_venue(&fx.ctx(), &deps(), "Mission Bowling Club").await;
        assert_eq!(
            saved_event(&custom).and_then(|event| event.venue.clone()),
            Some("Mission Bowling Club".to_owned())
        );

        let out_of_range = selecting_venue(&fx.ctx(), &deps(), "7").await;
        assert_eq!(out_of_range.next_state, NextState::Unchanged);
    }

    #[tokio::test]
    async fn test_new_list_excludes_shown_names() {
        let mut fx = Fixture::at(EventStage::SelectingVenue);
        fx.event.activity = Some("bowling".to_owned());
        fx.event.venue_suggestions = CuratedVenues::list("bowling", "Oakland", &[]);
        let result = selecting_venue(&fx.ctx(), &deps(), "new list").await;
        let fresh = saved_event(&result)
            .map(|event| event.venue_suggestions.clone())
            .unwrap_or_default();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].name, "Arcade and bowling hall in Oakland");
    }

    #[test]
    fn test_start_time_clears_end() {
        let mut fx = Fixture::at(EventStage::SettingStartTime);
        fx.event.end_time = NaiveTime::from_hms_opt(23, 59, 0);
        let result = setting_start_time(&fx.ctx(), "7:30 pm");
        let event = saved_event(&result);
        assert_eq!(
            event.and_then(|event| event.start_time),
            NaiveTime::from_hms_opt(19, 30, 0)
        );
        assert_eq!(event.and_then(|event| event.end_time), None);
        assert!(result.reply.starts_with("Start time set to 7:30pm."));

        let invalid = setting_start_time(&fx.ctx(), "whenever");
        assert_eq!(invalid.next_state, NextState::Unchanged);
    }

    #[test]
    fn test_send_invitations_finalizes() {
        let mut fx = Fixture::at(EventStage::FinalConfirmation);
        let mut busy = Guest::new(&fx.event.id, "Jo", "2125550000");
        busy.unavailable = true;
        fx.guests.push(busy);
        let result = final_confirmation(&fx.ctx(), "2");
        assert_eq!(result.side_effects.len(), 1);
        assert!(result.mutations.iter().any(|m| matches!(
            m,
            Mutation::PutGuestState(state) if state.step == GuestStep::AwaitingRsvp
        )));
        assert!(matches!(
            result.next_state,
            NextState::Planner {
                stage: EventStage::Finalized,
                ..
            }
        ));
    }
}

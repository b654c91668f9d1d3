// ABOUTME: Planner workflow tests from guest list through invitations and RSVPs
// ABOUTME: Covers global commands, re-entry into guest collection and contact reuse
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::NaiveTime;
use common::{date, harness, ALEX, PLANNER, SAM};
use huddle_sms::database::{contacts, guest_states};
use huddle_sms::models::{EventStage, GuestStep, RsvpStatus};

fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

#[tokio::test]
async fn test_full_event_from_slot_to_rsvp() {
    let h = harness().await;
    h.request_availability("Sam, 510-555-0199").await;
    h.guest_confirms(SAM, "2-4").await;
    let event_id = h.active_event().await.unwrap().id;

    let slots = h.text(PLANNER, "1").await;
    assert!(slots.starts_with("Here are the best times:"));

    let locked = h.text(PLANNER, "1").await;
    assert!(locked.starts_with("Locked in: Friday 10/16, 2pm-4pm!"));
    let event = h.event(&event_id).await.unwrap();
    assert_eq!(event.stage, EventStage::CollectingLocation);
    assert_eq!(event.selected_date, Some(date(16)));
    assert_eq!((event.start_time, event.end_time), (Some(t(14, 0)), Some(t(16, 0))));

    h.text(PLANNER, "Oakland").await;
    let broad = h.text(PLANNER, "dinner").await;
    assert!(broad.contains("a little broad"));
    assert_eq!(
        h.event(&event_id).await.unwrap().stage,
        EventStage::CollectingActivity
    );

    let venues = h.text(PLANNER, "bowling").await;
    assert!(venues.starts_with("Here are some bowling spots in Oakland:"));
    let summary = h.text(PLANNER, "1").await;
    assert!(summary.starts_with("Here's your event:"));
    let event = h.event(&event_id).await.unwrap();
    assert_eq!(event.stage, EventStage::FinalConfirmation);
    assert_eq!(event.venue.as_deref(), Some("Bowling alley with a bar in Oakland"));

    h.text(PLANNER, "1").await;
    let start = h.text(PLANNER, "7pm").await;
    assert!(start.starts_with("Start time set to 7pm."));
    let event = h.event(&event_id).await.unwrap();
    assert_eq!((event.start_time, event.end_time), (Some(t(19, 0)), None));

    let sent = h.text(PLANNER, "2").await;
    assert!(sent.starts_with("Invitations sent to 1 guest!"));
    assert_eq!(h.event(&event_id).await.unwrap().stage, EventStage::Finalized);
    let invitation = h.sender.last_to(SAM).unwrap();
    assert!(invitation.starts_with("Hi Sam! 🎉 You're invited: Jordan is hosting"));

    let ack = h.text(SAM, "yes").await;
    assert!(ack.starts_with("Awesome, see you there!"));
    assert_eq!(h.sender.last_to(PLANNER).as_deref(), Some("Sam is in! ✅"));
    let guests = h.guests(&event_id).await;
    assert_eq!(guests[0].rsvp, RsvpStatus::Accepted);
}

#[tokio::test]
async fn test_partial_responses_offer_partial_selection() {
    let h = harness().await;
    h.request_availability("A 510-555-0199, B 415-555-0102, C 212-555-0000").await;
    h.guest_confirms(SAM, "after 2pm").await;
    h.guest_confirms(ALEX, "after 4pm").await;

    let reply = h.text(PLANNER, "1").await;

    assert!(reply.contains("still waiting on C"));
    assert_eq!(
        h.active_event().await.unwrap().stage,
        EventStage::SelectingPartialTime
    );
    let back = h.text(PLANNER, "back").await;
    assert!(back.starts_with("Availability for"));
    assert_eq!(
        h.active_event().await.unwrap().stage,
        EventStage::TrackingAvailability
    );
}

#[tokio::test]
async fn test_no_overlap_stays_in_tracking() {
    let h = harness().await;
    h.request_availability("A 510-555-0199, B 415-555-0102").await;
    h.guest_confirms(SAM, "9am-11am").await;
    h.guest_confirms(ALEX, "after 4pm").await;

    let reply = h.text(PLANNER, "1").await;

    assert!(reply.starts_with("I couldn't find a time that works"));
    assert_eq!(
        h.active_event().await.unwrap().stage,
        EventStage::TrackingAvailability
    );
}

#[tokio::test]
async fn test_status_and_unknown_input_reprint_summary() {
    let h = harness().await;
    h.request_availability("A 510-555-0199, B 415-555-0102").await;
    h.text(SAM, "busy").await;

    let status = h.text(PLANNER, "status").await;
    let other = h.text(PLANNER, "how's it going").await;

    assert!(status.contains("1/2 responded"));
    assert!(status.contains("❌ A (can't make it)"));
    assert!(status.contains("⏳ B"));
    assert_eq!(status, other);
}

#[tokio::test]
async fn test_adding_guests_mid_tracking_auto_sends() {
    let h = harness().await;
    h.request_availability("Sam, 510-555-0199").await;

    h.text(PLANNER, "2").await;
    assert_eq!(
        h.active_event().await.unwrap().stage,
        EventStage::CollectingGuests
    );
    h.text(PLANNER, "Alex 415-555-0102").await;
    let reply = h.text(PLANNER, "done").await;

    assert!(reply.starts_with("Sent availability requests to 1 guest!"));
    let event = h.active_event().await.unwrap();
    assert_eq!(event.stage, EventStage::TrackingAvailability);
    assert_eq!(event.reentry, None);
    assert!(h.sender.last_to(ALEX).unwrap().starts_with("Hi Alex!"));
    assert_eq!(h.sender.to(SAM).len(), 1);
}

#[tokio::test]
async fn test_add_more_guests_returns_to_confirmation() {
    let h = harness().await;
    h.onboard_planner().await;
    h.text(PLANNER, "Sam, 510-555-0199").await;
    h.text(PLANNER, "done").await;
    h.text(PLANNER, "Friday").await;

    h.text(PLANNER, "3").await;
    h.text(PLANNER, "Alex 415-555-0102").await;
    let reply = h.text(PLANNER, "done").await;

    assert!(reply.starts_with("Here's the plan so far:"));
    assert!(reply.contains("👥 Guests: Sam, Alex"));
    assert_eq!(
        h.active_event().await.unwrap().stage,
        EventStage::AwaitingConfirmation
    );
}

#[tokio::test]
async fn test_reset_clears_event_and_guest_states() {
    let h = harness().await;
    h.request_availability("Sam, 510-555-0199").await;

    let reply = h.text(PLANNER, "reset").await;

    assert!(reply.starts_with("Okay, I've cleared that plan."));
    assert!(h.active_event().await.is_none());
    let mut conn = h.resources.database.pool().acquire().await.unwrap();
    assert!(guest_states::find_by_phone(&mut conn, SAM).await.unwrap().is_none());
}

#[tokio::test]
async fn test_help_reprints_stage_prompt() {
    let h = harness().await;
    h.onboard_planner().await;
    h.text(PLANNER, "Sam, 510-555-0199").await;
    h.text(PLANNER, "done").await;

    let reply = h.text(PLANNER, "help").await;

    assert!(reply.starts_with("What dates"));
    assert!(reply.ends_with("Text \"reset\" at any time to start over."));
}

#[tokio::test]
async fn test_returning_planner_picks_saved_contacts() {
    let h = harness().await;
    h.onboard_planner().await;
    h.text(PLANNER, "Sam 510-555-0199, Alex 415-555-0102").await;
    h.text(PLANNER, "reset").await;

    let opener = h.text(PLANNER, "Game night").await;
    assert!(opener.starts_with("Let's plan Game night!"));
    assert!(opener.contains("1. Alex (415) 555-0102\n2. Sam (510) 555-0199"));

    let reply = h.text(PLANNER, "2").await;

    assert!(reply.starts_with("Added: Sam"));
    let event = h.active_event().await.unwrap();
    assert_eq!(event.title.as_deref(), Some("Game night"));
    let guests = h.guests(&event.id).await;
    assert_eq!(guests.len(), 1);
    assert_eq!(guests[0].phone, SAM);
}

#[tokio::test]
async fn test_removing_contacts() {
    let h = harness().await;
    h.onboard_planner().await;
    h.text(PLANNER, "Sam 510-555-0199, Alex 415-555-0102").await;

    h.text(PLANNER, "remove contacts").await;
    assert_eq!(
        h.active_event().await.unwrap().stage,
        EventStage::RemovingContacts
    );
    let reply = h.text(PLANNER, "1").await;
    assert!(reply.starts_with("Removed: Alex"));
    h.text(PLANNER, "done").await;

    let planner = h.planner().await.unwrap();
    let mut conn = h.resources.database.pool().acquire().await.unwrap();
    let remaining = contacts::list_for_planner(&mut conn, &planner.id).await.unwrap();
    drop(conn);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].phone, SAM);
    assert_eq!(
        h.active_event().await.unwrap().stage,
        EventStage::CollectingGuests
    );
}

#[tokio::test]
async fn test_late_guest_gets_invitation() {
    let h = harness().await;
    h.request_availability("Sam, 510-555-0199").await;
    h.guest_confirms(SAM, "2-4").await;
    h.text(PLANNER, "1").await;
    h.text(PLANNER, "1").await;
    h.text(PLANNER, "Oakland").await;
    h.text(PLANNER, "bowling").await;
    h.text(PLANNER, "skip").await;

    let prompt = h.text(PLANNER, "add guest").await;
    assert!(prompt.starts_with("Who else should I invite?"));
    h.text(PLANNER, "Alex 415-555-0102").await;
    let back = h.text(PLANNER, "done").await;
    assert!(back.starts_with("Here's your event:"));

    let sent = h.text(PLANNER, "2").await;

    assert!(sent.starts_with("Invitations sent to 2 guests!"));
    let mut conn = h.resources.database.pool().acquire().await.unwrap();
    let alex = guest_states::find_by_phone(&mut conn, ALEX).await.unwrap().unwrap();
    assert_eq!(alex.step, GuestStep::AwaitingRsvp);
}

#[tokio::test]
async fn test_busy_guest_is_not_invited() {
    let h = harness().await;
    h.request_availability("Sam 510-555-0199, Alex 415-555-0102").await;
    h.text(SAM, "busy").await;
    h.guest_confirms(ALEX, "2-4").await;
    h.text(PLANNER, "1").await;
    h.text(PLANNER, "1").await;
    h.text(PLANNER, "Oakland").await;
    h.text(PLANNER, "karaoke").await;
    h.text(PLANNER, "The Mint").await;
    h.sender.clear();

    let sent = h.text(PLANNER, "2").await;

    assert!(sent.starts_with("Invitations sent to 1 guest!"));
    assert!(h.sender.to(SAM).is_empty());
    assert_eq!(h.sender.to(ALEX).len(), 1);
}

// ABOUTME: Core data models for the Huddle SMS event coordinator
// ABOUTME: Re-exports Planner, Event, Guest, Contact, availability and conversation types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Ownership runs one way: a [`Planner`] owns its [`Event`]s and
//! [`Contact`]s; an [`Event`] owns its [`Guest`]s, [`AvailabilityInterval`]s
//! and [`GuestConversation`]s. A guest references a contact only by phone.

mod availability;
mod contact;
mod conversation;
mod event;
mod guest;
mod planner;

pub use availability::{AvailabilityInterval, Slot, TimeWindow, DAY_END, DAY_START};
pub use contact::Contact;
pub use conversation::{GuestConversation, GuestScratch, GuestStep};
pub use event::{Event, EventStage, ReentryIntent, VenueSuggestion};
pub use guest::{Guest, RsvpStatus};
pub use planner::Planner;

/// Generate a fresh opaque identifier for any entity
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

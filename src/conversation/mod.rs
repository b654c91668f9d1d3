// ABOUTME: Planner and guest conversation state machines plus the inbound message router
// ABOUTME: Handlers return a TransitionResult; only the router writes to the store and sends SMS
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Conversations
//!
//! Each inbound message is handled in three steps:
//!
//! 1. The [`router`] decides whether the sender is acting as a guest or a
//!    planner and loads the rows the handler needs inside one transaction.
//! 2. The [`guest`] or [`planner`] machine reads that snapshot and returns a
//!    [`TransitionResult`]: the reply, the typed store writes, the next state
//!    and any notifications for third parties.
//! 3. The router applies the writes, commits, and only then sends SMS.
//!
//! Handlers may call the LLM or the venue suggester. The router runs them
//! once outside the write transaction and replays their answers inside it.

/// Guest availability and RSVP workflow
pub mod guest;
/// Per-phone serialization of inbound messages
pub mod locks;
/// Planner workflow across every event stage
pub mod planner;
/// Role decision, transaction handling and side-effect dispatch
pub mod router;
/// Record and replay of collaborator answers across the turn phases
pub mod tape;

use huddle_core::models::{
    Contact, Event, EventStage, Guest, GuestConversation, Planner, TimeWindow,
};

use crate::llm::LlmClient;
use crate::venues::VenueSuggester;

pub use locks::PhoneLocks;
pub use router::ConversationRouter;

/// A typed store write requested by a handler
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert a new planner row
    CreatePlanner(Planner),
    /// Record the planner's name
    SetPlannerName {
        /// Planner id
        planner_id: String,
        /// Accepted name
        name: String,
    },
    /// Insert or update an event
    SaveEvent(Event),
    /// Delete an event with everything that hangs off it
    DeleteEvent {
        /// Event id
        event_id: String,
    },
    /// Insert or update a guest, keyed by (event, phone)
    UpsertGuest(Guest),
    /// Remove a guest, their availability and their open conversation on this event
    DeleteGuest {
        /// Guest id
        guest_id: String,
        /// Guest phone
        phone: String,
        /// Event the guest belonged to
        event_id: String,
    },
    /// Insert or refresh a planner contact, keyed by (planner, phone)
    UpsertContact(Contact),
    /// Delete a planner contact
    DeleteContact {
        /// Contact id
        contact_id: String,
    },
    /// Replace every availability row of one guest on one event
    ReplaceAvailability {
        /// Event id
        event_id: String,
        /// Guest id
        guest_id: String,
        /// The new windows; empty clears
        windows: Vec<TimeWindow>,
    },
    /// Open or replace the guest conversation for another phone
    PutGuestState(GuestConversation),
}

/// Where the sender's own conversation goes next
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NextState {
    /// No change
    #[default]
    Unchanged,
    /// Planner's event moves to `stage`
    Planner {
        /// Event id
        event_id: String,
        /// New stage
        stage: EventStage,
    },
    /// Guest conversation continues at a new step
    Guest(GuestConversation),
    /// Guest conversation ends; the row is deleted so the phone routes as a planner again
    GuestCompleted {
        /// Guest phone
        phone: String,
    },
}

/// Outbound work dispatched after commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// SMS to someone other than the sender
    Notify {
        /// Canonical phone
        to: String,
        /// Message body
        body: String,
    },
}

/// Everything a handler decided for one inbound message
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransitionResult {
    /// Reply to the sender
    pub reply: String,
    /// Sender's next state
    pub next_state: NextState,
    /// Store writes, applied in order before `next_state`
    pub mutations: Vec<Mutation>,
    /// Notifications sent after commit
    pub side_effects: Vec<SideEffect>,
}

impl TransitionResult {
    /// A reply with no state change
    #[must_use]
    pub fn reply(body: impl Into<String>) -> Self {
        Self {
            reply: body.into(),
            ..Self::default()
        }
    }

    /// Set the next state
    #[must_use]
    pub fn with_next(mut self, next_state: NextState) -> Self {
        self.next_state = next_state;
        self
    }

    /// Append a store write
    #[must_use]
    pub fn with_mutation(mut self, mutation: Mutation) -> Self {
        self.mutations.push(mutation);
        self
    }

    /// Append several store writes
    #[must_use]
    pub fn with_mutations(mut self, mutations: impl IntoIterator<Item = Mutation>) -> Self {
        self.mutations.extend(mutations);
        self
    }

    /// Queue a notification
    #[must_use]
    pub fn with_notification(mut self, to: impl Into<String>, body: impl Into<String>) -> Self {
        self.side_effects.push(SideEffect::Notify {
            to: to.into(),
            body: body.into(),
        });
        self
    }
}

/// External collaborators the handlers may call
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Optional LLM for the date and time parsers
    pub llm: Option<&'a dyn LlmClient>,
    /// Venue suggestions
    pub venues: &'a dyn VenueSuggester,
}

/// A single menu digit, tolerating surrounding whitespace and punctuation
pub(crate) fn menu_choice(text: &str) -> Option<usize> {
    let normalized = huddle_core::constants::normalize_reply(text);
    let digits = normalized.trim_start_matches('#').trim_end_matches([')', '.']);
    digits.parse::<usize>().ok()
}

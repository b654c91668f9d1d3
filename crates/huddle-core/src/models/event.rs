// ABOUTME: Event entity and the planner workflow stage enum
// ABOUTME: Carries proposed dates, the chosen slot, venue data and re-entry intent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Slot;
use crate::errors::AppError;

/// Planner workflow stage of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStage {
    /// Planner is texting guest names and numbers
    CollectingGuests,
    /// Planner is pruning the saved contact list
    RemovingContacts,
    /// Planner is proposing dates
    CollectingDates,
    /// Planner is choosing between requesting availability, changing dates, adding guests
    AwaitingConfirmation,
    /// Availability requests are out; waiting on guests
    CollectingAvailability,
    /// Waiting on guests after a mid-flow guest addition
    TrackingAvailability,
    /// Planner picks a slot; every guest responded
    SelectingTime,
    /// Planner picks a slot while some guests are outstanding
    SelectingPartialTime,
    /// Planner is naming the area
    CollectingLocation,
    /// Planner is naming the activity
    CollectingActivity,
    /// Planner is choosing from venue suggestions
    SelectingVenue,
    /// Planner is setting an explicit start time
    SettingStartTime,
    /// Planner is adding a late guest before invitations go out
    AddingGuest,
    /// Planner reviews the summary before sending invitations
    FinalConfirmation,
    /// Invitations are out; terminal
    Finalized,
}

impl EventStage {
    /// Every stage, in workflow order
    pub const ALL: [Self; 15] = [
        Self::CollectingGuests,
        Self::RemovingContacts,
        Self::CollectingDates,
        Self::AwaitingConfirmation,
        Self::CollectingAvailability,
        Self::TrackingAvailability,
        Self::SelectingTime,
        Self::SelectingPartialTime,
        Self::CollectingLocation,
        Self::CollectingActivity,
        Self::SelectingVenue,
        Self::SettingStartTime,
        Self::AddingGuest,
        Self::FinalConfirmation,
        Self::Finalized,
    ];

    /// Stable storage name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CollectingGuests => "collecting_guests",
            Self::RemovingContacts => "removing_contacts",
            Self::CollectingDates => "collecting_dates",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::CollectingAvailability => "collecting_availability",
            Self::TrackingAvailability => "tracking_availability",
            Self::SelectingTime => "selecting_time",
            Self::SelectingPartialTime => "selecting_partial_time",
            Self::CollectingLocation => "collecting_location",
            Self::CollectingActivity => "collecting_activity",
            Self::SelectingVenue => "selecting_venue",
            Self::SettingStartTime => "setting_start_time",
            Self::AddingGuest => "adding_guest",
            Self::FinalConfirmation => "final_confirmation",
            Self::Finalized => "finalized",
        }
    }

    /// Whether the stage ends the workflow
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finalized)
    }

    /// Stages in which the planner is waiting on guest availability
    #[must_use]
    pub const fn is_availability_stage(self) -> bool {
        matches!(
            self,
            Self::CollectingAvailability | Self::TrackingAvailability
        )
    }
}

impl fmt::Display for EventStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStage {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| AppError::invalid_input(format!("Unknown event stage '{s}'")))
    }
}

/// Why the planner detoured into guest collection mid-flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReentryIntent {
    /// Came from option 3 of the confirmation menu; go back there on "done"
    ReturnToConfirmation,
    /// Came from option 2 while tracking availability; request availability from new guests on "done"
    AutoSendAvailability,
}

impl ReentryIntent {
    /// Stable storage name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReturnToConfirmation => "return_to_confirmation",
            Self::AutoSendAvailability => "auto_send_availability",
        }
    }
}

impl FromStr for ReentryIntent {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "return_to_confirmation" => Ok(Self::ReturnToConfirmation),
            "auto_send_availability" => Ok(Self::AutoSendAvailability),
            other => Err(AppError::invalid_input(format!(
                "Unknown re-entry intent '{other}'"
            ))),
        }
    }
}

/// A venue idea returned by the venue collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueSuggestion {
    /// Venue name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Map link, when the collaborator provides one
    #[serde(default)]
    pub map_link: Option<String>,
}

/// The unit of planning, owned by exactly one planner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Opaque event id
    pub id: String,
    /// Owning planner
    pub planner_id: String,
    /// Optional title taken from the planner's opening message
    pub title: Option<String>,
    /// Planner-chosen area
    pub location: Option<String>,
    /// Planner-chosen activity
    pub activity: Option<String>,
    /// Chosen venue name
    pub venue: Option<String>,
    /// Venue suggestions last shown to the planner
    pub venue_suggestions: Vec<VenueSuggestion>,
    /// Final date
    pub selected_date: Option<NaiveDate>,
    /// Final start time
    pub start_time: Option<NaiveTime>,
    /// Final end time
    pub end_time: Option<NaiveTime>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Human-readable summary of the proposed dates as accepted
    pub date_summary: Option<String>,
    /// Proposed dates, in the order the planner gave them
    pub proposed_dates: Vec<NaiveDate>,
    /// Slots last shown to the planner, so a digit reply means what was displayed
    pub slot_options: Vec<Slot>,
    /// Workflow stage
    pub stage: EventStage,
    /// Stage the planner left when detouring into guest collection
    pub previous_stage: Option<EventStage>,
    /// What to do when the detour completes
    pub reentry: Option<ReentryIntent>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last write time
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// A new event at the start of guest collection
    #[must_use]
    pub fn new(planner_id: &str, title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: super::new_id(),
            planner_id: planner_id.to_owned(),
            title,
            location: None,
            activity: None,
            venue: None,
            venue_suggestions: Vec::new(),
            selected_date: None,
            start_time: None,
            end_time: None,
            notes: None,
            date_summary: None,
            proposed_dates: Vec::new(),
            slot_options: Vec::new(),
            stage: EventStage::CollectingGuests,
            previous_stage: None,
            reentry: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a detour into guest collection
    pub fn begin_reentry(&mut self, intent: ReentryIntent) {
        self.previous_stage = Some(self.stage);
        self.reentry = Some(intent);
    }

    /// Consume the pending detour, if any
    pub fn take_reentry(&mut self) -> Option<ReentryIntent> {
        self.previous_stage = None;
        self.reentry.take()
    }

    /// Short label used in messages to guests
    #[must_use]
    pub fn label(&self) -> &str {
        self.activity
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or("a get-together")
    }
}

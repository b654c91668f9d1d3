// ABOUTME: Per-phone guest conversation record that routes inbound texts to the guest workflow
// ABOUTME: Holds the guest step and a typed scratch bag for pending availability
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::TimeWindow;
use crate::errors::AppError;

/// Where a guest is in their conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestStep {
    /// Asked for availability, waiting for an answer
    AwaitingAvailability,
    /// Parsed availability shown back; waiting for 1 (confirm) or 2 (change)
    ConfirmingAvailability,
    /// Waiting for free-text preferences
    AwaitingPreferences,
    /// Waiting for 1 (send), 2 (change availability) or 3 (change preferences)
    AwaitingFinalChoice,
    /// Invitation sent, waiting for an RSVP
    AwaitingRsvp,
}

impl GuestStep {
    /// Stable storage name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingAvailability => "awaiting_availability",
            Self::ConfirmingAvailability => "confirming_availability",
            Self::AwaitingPreferences => "awaiting_preferences",
            Self::AwaitingFinalChoice => "awaiting_final_choice",
            Self::AwaitingRsvp => "awaiting_rsvp",
        }
    }
}

impl fmt::Display for GuestStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuestStep {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting_availability" => Ok(Self::AwaitingAvailability),
            "confirming_availability" => Ok(Self::ConfirmingAvailability),
            "awaiting_preferences" => Ok(Self::AwaitingPreferences),
            "awaiting_final_choice" => Ok(Self::AwaitingFinalChoice),
            "awaiting_rsvp" => Ok(Self::AwaitingRsvp),
            other => Err(AppError::invalid_input(format!(
                "Unknown guest step '{other}'"
            ))),
        }
    }
}

/// Scratch data carried between guest messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestScratch {
    /// Availability parsed but not yet confirmed
    #[serde(default)]
    pub pending: Vec<TimeWindow>,
    /// The last reply was a numbered menu
    #[serde(default)]
    pub awaiting_menu_choice: bool,
}

/// The record whose presence makes a phone a guest for routing purposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestConversation {
    /// Canonical 10-digit phone (unique across all events)
    pub phone: String,
    /// Event the guest is answering for
    pub event_id: String,
    /// Current step
    pub step: GuestStep,
    /// Scratch bag
    pub scratch: GuestScratch,
    /// Last write time
    pub updated_at: DateTime<Utc>,
}

impl GuestConversation {
    /// Start a conversation at `step` with empty scratch
    #[must_use]
    pub fn start(phone: &str, event_id: &str, step: GuestStep) -> Self {
        Self {
            phone: phone.to_owned(),
            event_id: event_id.to_owned(),
            step,
            scratch: GuestScratch::default(),
            updated_at: Utc::now(),
        }
    }

    /// Same conversation moved to `step`, scratch replaced
    #[must_use]
    pub fn advance(&self, step: GuestStep, scratch: GuestScratch) -> Self {
        Self {
            phone: self.phone.clone(),
            event_id: self.event_id.clone(),
            step,
            scratch,
            updated_at: Utc::now(),
        }
    }
}

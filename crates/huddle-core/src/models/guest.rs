// ABOUTME: Guest entity, one row per (event, phone)
// ABOUTME: Tracks RSVP status and whether availability and preferences were provided
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// RSVP answer to an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    /// No answer yet
    Pending,
    /// Coming
    Accepted,
    /// Not coming
    Declined,
    /// Undecided
    Maybe,
}

impl RsvpStatus {
    /// Stable storage name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Maybe => "maybe",
        }
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RsvpStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "maybe" => Ok(Self::Maybe),
            other => Err(AppError::invalid_input(format!(
                "Unknown RSVP status '{other}'"
            ))),
        }
    }
}

/// A person invited to one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    /// Opaque guest id
    pub id: String,
    /// Owning event
    pub event_id: String,
    /// Canonical 10-digit phone, unique per event
    pub phone: String,
    /// Display name
    pub name: String,
    /// RSVP answer
    pub rsvp: RsvpStatus,
    /// An availability request has been sent to this guest
    pub availability_requested: bool,
    /// The guest confirmed and sent their availability
    pub availability_provided: bool,
    /// The guest said none of the proposed dates work
    pub unavailable: bool,
    /// The guest sent preferences
    pub preferences_provided: bool,
    /// Free-text preferences
    pub preferences: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Guest {
    /// A freshly added guest with nothing answered yet
    #[must_use]
    pub fn new(event_id: &str, name: &str, phone: &str) -> Self {
        Self {
            id: super::new_id(),
            event_id: event_id.to_owned(),
            phone: phone.to_owned(),
            name: name.to_owned(),
            rsvp: RsvpStatus::Pending,
            availability_requested: false,
            availability_provided: false,
            unavailable: false,
            preferences_provided: false,
            preferences: None,
            created_at: Utc::now(),
        }
    }

    /// Whether the guest has answered the availability request either way
    #[must_use]
    pub const fn has_responded(&self) -> bool {
        self.availability_provided || self.unavailable
    }
}

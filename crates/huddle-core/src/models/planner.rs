// ABOUTME: Planner entity, identified by canonical phone number
// ABOUTME: Created on first inbound message from a phone with no guest conversation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The person driving an event through the planning workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Planner {
    /// Opaque planner id
    pub id: String,
    /// Canonical 10-digit phone (unique)
    pub phone: String,
    /// Display name, unknown until the planner answers the welcome prompt
    pub name: Option<String>,
    /// When the planner first texted in
    pub created_at: DateTime<Utc>,
}

impl Planner {
    /// Create a planner that has not yet told us their name
    #[must_use]
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            id: super::new_id(),
            phone: phone.into(),
            name: None,
            created_at: Utc::now(),
        }
    }

    /// Name to use in messages to guests
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Your friend")
    }
}

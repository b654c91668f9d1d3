// ABOUTME: Planner-owned contact book entry that outlives individual events
// ABOUTME: Upserted whenever a guest is added so future guest lists can reuse it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A person the planner has invited before
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Opaque contact id
    pub id: String,
    /// Owning planner
    pub planner_id: String,
    /// Canonical 10-digit phone, unique per planner
    pub phone: String,
    /// Display name
    pub name: String,
    /// Last time this contact was added to an event
    pub last_contacted_at: Option<DateTime<Utc>>,
}

impl Contact {
    /// Create a contact stamped as contacted now
    #[must_use]
    pub fn new(planner_id: &str, name: &str, phone: &str) -> Self {
        Self {
            id: super::new_id(),
            planner_id: planner_id.to_owned(),
            phone: phone.to_owned(),
            name: name.to_owned(),
            last_contacted_at: Some(Utc::now()),
        }
    }
}

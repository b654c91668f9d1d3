// ABOUTME: Natural-language parsers and the availability overlap engine for Huddle
// ABOUTME: Phone normalization, dates, time ranges, contact tuples, slot ranking, rendering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Huddle Parsers
//!
//! Every function in this crate is pure: it takes a short free-text
//! utterance (plus whatever context it needs, such as the event's proposed
//! dates or the current wall-clock time) and returns a validated structured
//! result or a typed parse error. Nothing here touches the network or the
//! store, so the state machines can call these from inside a transaction.

/// Typed parse errors, one enum per parser
pub mod errors;

/// Phone canonicalization and lookup-key alternates
pub mod phone;

/// Free-text to ordered calendar dates
pub mod dates;

/// Free-text to availability windows, plus the single-time shape
pub mod times;

/// Free-text to (name, phone) tuples
pub mod contacts;

/// Availability intervals to ranked meeting slots
pub mod overlap;

/// Canonical rendering of dates, times and windows
pub mod render;

pub use contacts::{parse_contacts, ParsedContact};
pub use dates::{parse_dates, ParsedDates};
pub use errors::{ContactParseError, DateParseError, PhoneError, TimeParseError};
pub use overlap::{compute_overlaps, GuestWindow, OverlapOptions};
pub use phone::{lookup_keys, mask_phone, normalize_phone};
pub use times::{parse_availability, parse_single_time};

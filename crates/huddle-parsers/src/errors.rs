// ABOUTME: Typed parse errors returned by the phone, date, time and contact parsers
// ABOUTME: Handlers match these variants to pick the matching reprompt
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;

/// Phone normalization failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneError {
    /// No digits at all
    #[error("phone number contains no digits")]
    Empty,

    /// Digits present but not a US 10-digit number
    #[error("expected a 10-digit phone number, found {0} digits")]
    WrongLength(usize),
}

/// Date parser failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    /// Nothing to parse
    #[error("no dates given")]
    Empty,

    /// One or two bare digits, almost always a menu choice
    #[error("'{0}' looks like a menu choice, not a date")]
    MenuChoice(String),

    /// A greeting or a menu keyword
    #[error("'{0}' is not a date")]
    Keyword(String),

    /// No weekday, month, relative word or numeric date anywhere in the text
    #[error("no date words found")]
    NoDateTokens,

    /// A piece that looks date-like but is not a valid calendar date
    #[error("could not read '{0}' as a date")]
    Unrecognized(String),

    /// A range spanning more days than a single plan can hold
    #[error("the range '{0}' covers too many days")]
    RangeTooLong(String),
}

/// Time-range parser failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    /// Nothing to parse
    #[error("no times given")]
    Empty,

    /// The event has no proposed dates to map answers onto
    #[error("the event has no proposed dates")]
    NoProposedDates,

    /// A token outside the accepted vocabulary
    #[error("did not understand '{0}'")]
    UnrecognizedToken(String),

    /// Tokens were all known but their arrangement is not an accepted shape
    #[error("could not read '{0}' as a time range")]
    UnsupportedShape(String),

    /// A bare-digit range with no day, when the event spans several dates
    #[error("which day is '{0}' for?")]
    NeedsDay(String),

    /// Days were named but none of them is a proposed date
    #[error("none of those days are proposed dates")]
    NoMatchingDate,

    /// Every produced window broke the interval rules
    #[error("invalid times: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Contact parser failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactParseError {
    /// Nothing to parse
    #[error("no contact given")]
    Empty,

    /// No (name, phone) pair found
    #[error("no name and phone number found")]
    NoContacts,
}

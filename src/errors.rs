// ABOUTME: Re-exports the unified error types from huddle-core
// ABOUTME: Keeps `crate::errors::AppError` paths stable across the service crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling
//!
//! The error types live in `huddle-core` so that the parser crate and the
//! service share one `AppError`. Parser failures are separate typed enums in
//! `huddle-parsers::errors`; handlers turn those into replies, never into
//! `AppError`s.

pub use huddle_core::errors::{
    AppError, AppResult, ErrorCode, ErrorResponse, ErrorResponseDetails,
};


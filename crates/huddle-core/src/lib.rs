// ABOUTME: Core types and constants for the Huddle SMS event coordinator
// ABOUTME: Foundation crate with error handling, entity models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Huddle Core
//!
//! Foundation crate providing shared types and constants for the Huddle
//! SMS event coordinator. This crate is designed to change infrequently,
//! enabling incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `AppResult`
//! - **models**: Planners, events, guests, contacts, availability, guest conversations
//! - **constants**: Keyword vocabularies and workflow limits shared by every crate

/// Unified error handling system with standard error codes
pub mod errors;

/// Entity models persisted by the repository layer
pub mod models;

/// Keyword vocabularies, limits, and other shared constants
pub mod constants;

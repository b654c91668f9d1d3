// ABOUTME: Main library entry point for the Huddle SMS event coordinator
// ABOUTME: Wires the conversational state engine to storage, SMS, LLM and HTTP adapters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Huddle
//!
//! An SMS-first group event coordinator. A *planner* texts the service to
//! build a guest list, propose dates, collect availability, choose a slot,
//! pick a venue and send invitations. *Guests* answer availability,
//! preference and RSVP prompts by text.
//!
//! ## Architecture
//!
//! - **conversation**: the router and the planner and guest state machines.
//!   Handlers are pure with respect to the store: they read through the
//!   request transaction and return a `TransitionResult` that the router
//!   applies, commits and dispatches.
//! - **formatters**: every outbound SMS body
//! - **database**: `SQLite` repository layer with transaction guards
//! - **parsing**: LLM-first parsing with the rule-based parsers from
//!   `huddle-parsers` as fallback and final authority
//! - **llm**, **venues**, **sms**: external collaborators behind traits
//! - **routes**, **server**: the Twilio webhook and the composition root
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use huddle_sms::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Huddle configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Unified error types re-exported from `huddle-core`
pub mod errors;

/// Environment configuration
pub mod config;

/// Structured logging setup
pub mod logging;

/// Repository layer over `SQLite`
pub mod database;

/// Canonical SMS bodies
pub mod formatters;

/// LLM completion collaborator
pub mod llm;

/// LLM-first date and time parsing with rule-based fallback
pub mod parsing;

/// Venue suggestion collaborator
pub mod venues;

/// Outbound SMS send primitive and adapters
pub mod sms;

/// Router and state machines
pub mod conversation;

/// HTTP routes
pub mod routes;

/// Composition root and server startup
pub mod server;

pub use huddle_core::models;

// ABOUTME: Configuration module for the Huddle service
// ABOUTME: Environment-driven settings read once at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! Everything is read from environment variables once, in
//! [`environment::ServerConfig::from_env`], and then passed by reference
//! into the composition root. Nothing re-reads the environment later.

/// Environment and server configuration
pub mod environment;

pub use environment::{DatabaseUrl, LlmConfig, LogLevel, ServerConfig, TwilioConfig};

// ABOUTME: HTTP route modules for the SMS webhook and health checks
// ABOUTME: Each module exposes a unit struct with a routes() constructor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Liveness and readiness
pub mod health;

/// Twilio webhook and JSON test endpoint
pub mod sms;

pub use health::HealthRoutes;
pub use sms::SmsRoutes;

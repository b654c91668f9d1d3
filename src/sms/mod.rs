// ABOUTME: Outbound SMS send primitive shared by replies and planner notifications
// ABOUTME: Defines the SmsSender trait, its outcome enum and the concrete senders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Outbound SMS
//!
//! Every outbound message goes through [`SmsSender::send`]. The router wraps
//! the configured sender in a [`Messenger`], which suppresses sends to the
//! provisioned number and retries planner notifications once.

mod log_only;
mod messenger;
mod twilio;

use async_trait::async_trait;

pub use log_only::LogOnlySender;
pub use messenger::Messenger;
pub use twilio::TwilioSender;

/// Result of one send attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Accepted by the gateway
    Sent,
    /// Timeout, connection failure or 5xx/429; worth one retry
    Transient,
    /// Rejected by the gateway; retrying will not help
    Permanent,
}

impl SendOutcome {
    /// Whether the message was accepted
    #[must_use]
    pub const fn is_sent(self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Outbound SMS transport
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Deliver `body` to the canonical 10-digit phone `to`
    async fn send(&self, to: &str, body: &str) -> SendOutcome;

    /// Transport name for logs
    fn name(&self) -> &'static str;
}

/// `+1XXXXXXXXXX` form the gateway expects for canonical phones
#[must_use]
pub fn to_e164(phone: &str) -> String {
    if phone.starts_with('+') {
        phone.to_owned()
    } else if phone.len() == 10 {
        format!("+1{phone}")
    } else {
        format!("+{phone}")
    }
}

// ABOUTME: Sender used when no gateway credentials are configured
// ABOUTME: Logs each outbound message at info level and reports success
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use huddle_parsers::phone::mask_phone;
use tracing::info;

use super::{SendOutcome, SmsSender};

/// Writes messages to the log instead of sending them
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlySender;

#[async_trait]
impl SmsSender for LogOnlySender {
    async fn send(&self, to: &str, body: &str) -> SendOutcome {
        info!(to = %mask_phone(to), chars = body.len(), body, "SMS (log only)");
        SendOutcome::Sent
    }

    fn name(&self) -> &'static str {
        "log-only"
    }
}

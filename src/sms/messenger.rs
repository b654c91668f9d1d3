// ABOUTME: Wraps the configured sender with self-send suppression and notification retry
// ABOUTME: Replies are sent once; planner notifications get a single retry on transient failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use async_trait::async_trait;
use huddle_parsers::phone::{mask_phone, normalize_phone};
use tracing::{debug, warn};

use super::{SendOutcome, SmsSender};

/// Outbound facade used by the router
#[derive(Clone)]
pub struct Messenger {
    inner: Arc<dyn SmsSender>,
    own_number: Option<String>,
}

impl Messenger {
    /// Wrap `inner`; sends to `own_number` become no-op successes
    #[must_use]
    pub fn new(inner: Arc<dyn SmsSender>, own_number: Option<&str>) -> Self {
        Self {
            inner,
            own_number: own_number.and_then(|number| normalize_phone(number).ok()),
        }
    }

    fn is_own_number(&self, to: &str) -> bool {
        self.own_number
            .as_deref()
            .is_some_and(|own| normalize_phone(to).is_ok_and(|canonical| canonical == own))
    }

    /// Send a reply to the inbound sender. Failures are logged only.
    pub async fn reply(&self, to: &str, body: &str) -> SendOutcome {
        let outcome = self.send(to, body).await;
        if !outcome.is_sent() {
            warn!(to = %mask_phone(to), ?outcome, "Reply delivery failed");
        }
        outcome
    }

    /// Send a third-party notification, retrying once on a transient failure
    pub async fn notify(&self, to: &str, body: &str) -> SendOutcome {
        let mut outcome = self.send(to, body).await;
        if outcome == SendOutcome::Transient {
            debug!(to = %mask_phone(to), "Retrying notification once");
            outcome = self.send(to, body).await;
        }
        if !outcome.is_sent() {
            warn!(to = %mask_phone(to), ?outcome, "Notification delivery failed");
        }
        outcome
    }
}

#[async_trait]
impl SmsSender for Messenger {
    async fn send(&self, to: &str, body: &str) -> SendOutcome {
        if self.is_own_number(to) {
            debug!("Skipping send to provisioned number");
            return SendOutcome::Sent;
        }
        self.inner.send(to, body).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Fails with the queued outcomes, then succeeds
    struct Scripted {
        outcomes: Mutex<Vec<SendOutcome>>,
        calls: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(outcomes: Vec<SendOutcome>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: Mutex::new(outcomes),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().map(|calls| calls.len()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl SmsSender for Scripted {
        async fn send(&self, to: &str, _body: &str) -> SendOutcome {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(to.to_owned());
            }
            self.outcomes
                .lock()
                .ok()
                .and_then(|mut queued| (!queued.is_empty()).then(|| queued.remove(0)))
                .unwrap_or(SendOutcome::Sent)
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn test_own_number_is_noop() {
        let inner = Scripted::new(vec![]);
        let messenger = Messenger::new(inner.clone(), Some("+1 415 555 0000"));
        assert_eq!(messenger.reply("4155550000", "hi").await, SendOutcome::Sent);
        assert_eq!(inner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_notification_retried_once_on_transient() {
        let inner = Scripted::new(vec![SendOutcome::Transient, SendOutcome::Transient]);
        let messenger = Messenger::new(inner.clone(), None);
        assert_eq!(
            messenger.notify("5105550199", "hi").await,
            SendOutcome::Transient
        );
        assert_eq!(inner.call_count(), 2);
    }

    #[tokio::test]
    async fn test_reply_not_retried() {
        let inner = Scripted::new(vec![SendOutcome::Transient]);
        let messenger = Messenger::new(inner.clone(), None);
        assert_eq!(messenger.reply("5105550199", "hi").await, SendOutcome::Transient);
        assert_eq!(inner.call_count(), 1);
    }

    #[tokio::test]
    async fn test_permanent_notification_not_retried() {
        let inner = Scripted::new(vec![SendOutcome::Permanent]);
        let messenger = Messenger::new(inner.clone(), None);
        assert_eq!(
            messenger.notify("5105550199", "hi").await,
            SendOutcome::Permanent
        );
        assert_eq!(inner.call_count(), 1);
    }
}

// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: In-memory database, recording SMS sender, scripted LLM and a fixed clock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `huddle_sms`

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use huddle_sms::config::environment::DatabaseUrl;
use huddle_sms::conversation::ConversationRouter;
use huddle_sms::database::{events, guests, planners, Database};
use huddle_sms::llm::LlmClient;
use huddle_sms::models::{Event, Guest, Planner};
use huddle_sms::server::AppResources;
use huddle_sms::sms::{SendOutcome, SmsSender};

static INIT_LOGGER: Once = Once::new();

/// Planner used across scenarios
pub const PLANNER: &str = "4155550101";
/// First guest
pub const SAM: &str = "5105550199";
/// Second guest
pub const ALEX: &str = "4155550102";
/// The service's provisioned number
pub const SERVICE: &str = "8005550100";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Every message handed to the send primitive, in order
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
    latency: Option<Duration>,
}

impl RecordingSender {
    /// A sender that takes `latency` to accept each message
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            latency: Some(latency),
        }
    }

    /// All (to, body) pairs
    pub fn all(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Bodies sent to one phone
    pub fn to(&self, phone: &str) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|(to, _)| to == phone)
            .map(|(_, body)| body)
            .collect()
    }

    /// Most recent body sent to one phone
    pub fn last_to(&self, phone: &str) -> Option<String> {
        self.to(phone).pop()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl SmsSender for RecordingSender {
    async fn send(&self, to: &str, body: &str) -> SendOutcome {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_owned(), body.to_owned()));
        SendOutcome::Sent
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// LLM stub returning one canned completion for every prompt
pub struct ScriptedLlm {
    /// Completion to return; `None` simulates an outage
    pub reply: Option<String>,
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Option<String> {
        self.reply.clone()
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Router plus the collaborators a test inspects
pub struct TestHarness {
    /// Router under test
    pub router: ConversationRouter,
    /// Shared resources, for direct store reads
    pub resources: Arc<AppResources>,
    /// Outbound messages
    pub sender: Arc<RecordingSender>,
}

/// Harness with an in-memory store, no LLM and the curated venue table
pub async fn harness() -> TestHarness {
    harness_with_llm(None).await
}

/// Harness with an optional scripted LLM
pub async fn harness_with_llm(llm: Option<Arc<dyn LlmClient>>) -> TestHarness {
    let database = Database::new(&DatabaseUrl::Memory).await.unwrap();
    harness_over(database, llm, RecordingSender::default())
}

/// Harness over a caller-built store and sender
pub fn harness_over(
    database: Database,
    llm: Option<Arc<dyn LlmClient>>,
    sender: RecordingSender,
) -> TestHarness {
    init_test_logging();
    let sender = Arc::new(sender);
    let resources = Arc::new(AppResources::new(
        database,
        Arc::clone(&sender) as Arc<dyn SmsSender>,
        llm,
        Some(SERVICE.to_owned()),
    ));
    TestHarness {
        router: ConversationRouter::new(Arc::clone(&resources)),
        resources,
        sender,
    }
}

/// Tuesday 2026-10-13 at `hour`:`minute`
pub fn tuesday_at(hour: u32, minute: u32) -> NaiveDateTime {
    date(13).and_hms_opt(hour, minute, 0).unwrap()
}

/// A day in October 2026
pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
}

impl TestHarness {
    /// Send one inbound message on Tuesday at noon and return the reply
    pub async fn text(&self, from: &str, body: &str) -> String {
        self.text_at(from, body, tuesday_at(12, 0)).await
    }

    /// Send one inbound message at a fixed time
    pub async fn text_at(&self, from: &str, body: &str, now: NaiveDateTime) -> String {
        self.router
            .handle_inbound_at(from, SERVICE, body, now)
            .await
            .unwrap()
    }

    /// Onboard `PLANNER` as Jordan and reach `collecting_guests`
    pub async fn onboard_planner(&self) {
        self.text(PLANNER, "hey").await;
        self.text(PLANNER, "Jordan").await;
    }

    /// Onboard, add the given guests, choose Friday and request availability
    pub async fn request_availability(&self, guest_list: &str) {
        self.onboard_planner().await;
        self.text(PLANNER, guest_list).await;
        self.text(PLANNER, "done").await;
        self.text(PLANNER, "Friday").await;
        self.text(PLANNER, "1").await;
    }

    /// Walk a guest through availability, preferences and send
    pub async fn guest_confirms(&self, guest: &str, availability: &str) {
        self.text(guest, availability).await;
        self.text(guest, "1").await;
        self.text(guest, "none").await;
        self.text(guest, "1").await;
    }

    /// The planner row for `PLANNER`
    pub async fn planner(&self) -> Option<Planner> {
        let mut conn = self.resources.database.pool().acquire().await.unwrap();
        planners::find_by_phone(&mut conn, PLANNER).await.unwrap()
    }

    /// The planner's most recent unfinished event
    pub async fn active_event(&self) -> Option<Event> {
        let planner = self.planner().await?;
        let mut conn = self.resources.database.pool().acquire().await.unwrap();
        events::active_for_planner(&mut conn, &planner.id)
            .await
            .unwrap()
    }

    /// Re-read an event by id
    pub async fn event(&self, id: &str) -> Option<Event> {
        let mut conn = self.resources.database.pool().acquire().await.unwrap();
        events::get(&mut conn, id).await.unwrap()
    }

    /// Guests of an event
    pub async fn guests(&self, event_id: &str) -> Vec<Guest> {
        let mut conn = self.resources.database.pool().acquire().await.unwrap();
        guests::list_for_event(&mut conn, event_id).await.unwrap()
    }
}

// ABOUTME: HTTP route tests for the Twilio webhook, JSON endpoint and health checks
// ABOUTME: Requests go through the full axum app with tower's oneshot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use std::sync::Arc;
use std::time::Duration;

use common::{harness, harness_over, RecordingSender, PLANNER, SERVICE};
use helpers::axum_test::AxumTestRequest;
use huddle_sms::config::environment::DatabaseUrl;
use huddle_sms::database::Database;
use huddle_sms::routes::sms::{InboundMessage, InboundReply, EMPTY_TWIML};
use huddle_sms::server::{app, app_with_timeout};

#[tokio::test]
async fn test_webhook_replies_with_empty_twiml_and_sends_sms() {
    let h = harness().await;

    let response = AxumTestRequest::post("/sms")
        .form(&[("From", "+14155550101"), ("To", "+18005550100"), ("Body", "hey there")])
        .send(app(Arc::clone(&h.resources)))
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.text(), EMPTY_TWIML);
    assert!(response.header("content-type").unwrap().starts_with("text/xml"));
    let sent = h.sender.last_to(PLANNER).unwrap();
    assert!(sent.ends_with("What's your name?"));
}

#[tokio::test]
async fn test_webhook_with_bad_sender_still_answers() {
    let h = harness().await;

    let response = AxumTestRequest::post("/sms")
        .form(&[("From", "12345"), ("Body", "hey")])
        .send(app(Arc::clone(&h.resources)))
        .await;

    assert_eq!(response.status(), 200);
    assert!(h.sender.all().is_empty());
}

#[tokio::test]
async fn test_json_endpoint_returns_reply() {
    let h = harness().await;
    let message = InboundMessage {
        from: "415-555-0101".to_owned(),
        to: SERVICE.to_owned(),
        body: "hello".to_owned(),
    };

    let response = AxumTestRequest::post("/api/messages")
        .json(&message)
        .send(app(Arc::clone(&h.resources)))
        .await;

    assert_eq!(response.status(), 200);
    let reply: InboundReply = response.json();
    assert!(reply.reply.ends_with("What's your name?"));
}

#[tokio::test]
async fn test_json_endpoint_rejects_invalid_phone() {
    let h = harness().await;
    let message = InboundMessage {
        from: "not a phone".to_owned(),
        to: String::new(),
        body: "hello".to_owned(),
    };

    let response = AxumTestRequest::post("/api/messages")
        .json(&message)
        .send(app(Arc::clone(&h.resources)))
        .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_messages_to_own_number_are_suppressed() {
    let h = harness().await;

    h.text(SERVICE, "hey").await;

    assert!(h.sender.all().is_empty());
}

#[tokio::test]
async fn test_health_and_ready() {
    let h = harness().await;

    let health = AxumTestRequest::get("/health")
        .send(app(Arc::clone(&h.resources)))
        .await;
    let ready = AxumTestRequest::get("/ready")
        .send(app(Arc::clone(&h.resources)))
        .await;

    assert_eq!(health.status(), 200);
    assert_eq!(health.json::<serde_json::Value>()["status"], "healthy");
    assert_eq!(ready.json::<serde_json::Value>()["status"], "ready");
}

#[tokio::test]
async fn test_slow_request_times_out_with_408_and_still_replies() {
    let h = harness_over(
        Database::new(&DatabaseUrl::Memory).await.unwrap(),
        None,
        RecordingSender::with_latency(Duration::from_millis(200)),
    );

    let response = AxumTestRequest::post("/sms")
        .form(&[("From", "+14155550101"), ("To", "+18005550100"), ("Body", "hey")])
        .send(app_with_timeout(
            Arc::clone(&h.resources),
            Duration::from_millis(50),
        ))
        .await;

    assert_eq!(response.status(), 408);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(h.sender.last_to(PLANNER).unwrap().ends_with("What's your name?"));
}

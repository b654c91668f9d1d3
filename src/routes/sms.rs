// ABOUTME: Twilio inbound SMS webhook plus a JSON endpoint for local testing
// ABOUTME: Replies are sent through the messenger, so the webhook answers with empty TwiML
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # SMS Routes
//!
//! - `POST /sms` accepts Twilio's form-encoded webhook (`From`, `To`,
//!   `Body`) and returns an empty `<Response/>`.
//! - `POST /api/messages` accepts `{"from", "to", "body"}` JSON and returns
//!   `{"reply"}`, which makes the engine drivable without a gateway.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Form, Json, Router};
use huddle_parsers::mask_phone;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::conversation::ConversationRouter;
use crate::errors::AppError;

/// Empty TwiML; the reply was already sent through the REST API
pub const EMPTY_TWIML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#;

/// Twilio's inbound message form
#[derive(Debug, Deserialize)]
pub struct TwilioWebhook {
    /// Sender number
    #[serde(rename = "From")]
    pub from: String,
    /// Our number
    #[serde(rename = "To", default)]
    pub to: String,
    /// Message text
    #[serde(rename = "Body", default)]
    pub body: String,
}

/// JSON inbound message
#[derive(Debug, Deserialize, Serialize)]
pub struct InboundMessage {
    /// Sender number
    pub from: String,
    /// Receiving number
    #[serde(default)]
    pub to: String,
    /// Message text
    #[serde(default)]
    pub body: String,
}

/// JSON reply
#[derive(Debug, Deserialize, Serialize)]
pub struct InboundReply {
    /// The SMS sent back to the sender
    pub reply: String,
}

/// SMS routes implementation
pub struct SmsRoutes;

impl SmsRoutes {
    /// Create the webhook routes over a conversation router
    #[must_use]
    pub fn routes(router: ConversationRouter) -> Router {
        Router::new()
            .route("/sms", post(Self::handle_webhook))
            .route("/api/messages", post(Self::handle_json))
            .with_state(router)
    }

    async fn handle_webhook(
        State(router): State<ConversationRouter>,
        Form(webhook): Form<TwilioWebhook>,
    ) -> impl IntoResponse {
        info!(from = %mask_phone(&webhook.from), "Inbound SMS webhook");
        if let Err(e) = router
            .handle_inbound(&webhook.from, &webhook.to, &webhook.body)
            .await
        {
            warn!(error = %e, "Rejected inbound SMS");
        }
        ([(header::CONTENT_TYPE, "text/xml; charset=utf-8")], EMPTY_TWIML)
    }

    async fn handle_json(
        State(router): State<ConversationRouter>,
        Json(message): Json<InboundMessage>,
    ) -> Result<Json<InboundReply>, AppError> {
        let reply = router
            .handle_inbound(&message.from, &message.to, &message.body)
            .await?;
        Ok(Json(InboundReply { reply }))
    }
}

// ABOUTME: Twilio Messages API sender using reqwest form posts with basic auth
// ABOUTME: Classifies gateway failures into transient and permanent outcomes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use async_trait::async_trait;
use huddle_parsers::phone::mask_phone;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use super::{to_e164, SendOutcome, SmsSender};
use crate::config::environment::TwilioConfig;
use crate::errors::{AppError, AppResult};

const TWILIO_API_BASE: &str = "https://api.twilio.com";
const CONNECT_TIMEOUT_SECS: u64 = 3;

/// Sends through the Twilio Messages API
pub struct TwilioSender {
    client: Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
    from: String,
}

impl TwilioSender {
    /// Build a sender from configuration; `None` when credentials are incomplete
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &TwilioConfig) -> AppResult<Option<Self>> {
        let Some((sid, token, number)) = config.credentials() else {
            return Ok(None);
        };
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Some(Self {
            client,
            api_base: TWILIO_API_BASE.to_owned(),
            account_sid: sid.to_owned(),
            auth_token: token.to_owned(),
            from: to_e164(number),
        }))
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        )
    }

    fn classify_status(status: StatusCode) -> SendOutcome {
        if status.is_success() {
            SendOutcome::Sent
        } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            SendOutcome::Transient
        } else {
            SendOutcome::Permanent
        }
    }
}

#[async_trait]
impl SmsSender for TwilioSender {
    #[instrument(skip(self, body), fields(to = %mask_phone(to)))]
    async fn send(&self, to: &str, body: &str) -> SendOutcome {
        let to = to_e164(to);
        let form = [("To", to.as_str()), ("From", self.from.as_str()), ("Body", body)];
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await;

        match response {
            Ok(response) => {
                let outcome = Self::classify_status(response.status());
                if outcome.is_sent() {
                    debug!("SMS accepted by gateway");
                } else {
                    warn!(status = %response.status(), ?outcome, "SMS rejected by gateway");
                }
                outcome
            }
            Err(e) => {
                warn!(error = %e, "SMS request failed");
                if e.is_timeout() || e.is_connect() || e.is_request() {
                    SendOutcome::Transient
                } else {
                    SendOutcome::Permanent
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "twilio"
    }
}

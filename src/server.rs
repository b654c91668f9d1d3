// ABOUTME: Composition root wiring store, SMS, LLM and venue collaborators into shared resources
// ABOUTME: Builds the axum application and runs it until Ctrl-C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server
//!
//! [`AppResources`] holds every long-lived collaborator behind an `Arc` so
//! handlers share one instance. Collaborators that lack configuration fall
//! back to their offline counterparts: a log-only SMS sender, no LLM, and
//! the curated venue table.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::StatusCode;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::environment::ServerConfig;
use crate::conversation::{ConversationRouter, PhoneLocks};
use crate::database::Database;
use crate::errors::AppResult;
use crate::llm::{LlmClient, OpenAiCompatibleClient};
use crate::routes::{HealthRoutes, SmsRoutes};
use crate::sms::{LogOnlySender, Messenger, SmsSender, TwilioSender};
use crate::venues::{CuratedVenues, LlmVenueSuggester, VenueSuggester};

/// Upper bound on one webhook request, LLM and SMS calls included
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared collaborators for every request
#[derive(Clone)]
pub struct AppResources {
    /// Store
    pub database: Database,
    /// Outbound SMS with own-number suppression and notification retry
    pub messenger: Messenger,
    /// Optional completion model
    pub llm: Option<Arc<dyn LlmClient>>,
    /// Venue ideas
    pub venues: Arc<dyn VenueSuggester>,
    /// The service's own number, canonical form
    pub provisioned_number: Option<String>,
    /// Per-sender serialization
    pub locks: PhoneLocks,
}

impl AppResources {
    /// Assemble resources from explicit collaborators
    #[must_use]
    pub fn new(
        database: Database,
        sender: Arc<dyn SmsSender>,
        llm: Option<Arc<dyn LlmClient>>,
        provisioned_number: Option<String>,
    ) -> Self {
        let venues: Arc<dyn VenueSuggester> = match &llm {
            Some(llm) => Arc::new(LlmVenueSuggester::new(Arc::clone(llm))),
            None => Arc::new(CuratedVenues),
        };
        Self {
            database,
            messenger: Messenger::new(sender, provisioned_number.as_deref()),
            llm,
            venues,
            provisioned_number,
            locks: PhoneLocks::new(),
        }
    }

    /// Connect the store and build collaborators from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated, or an
    /// HTTP client cannot be created.
    pub async fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let database = Database::new(&config.database_url).await?;

        let sender: Arc<dyn SmsSender> = match TwilioSender::from_config(&config.twilio)? {
            Some(twilio) => Arc::new(twilio),
            None => {
                warn!("Twilio credentials missing; outbound SMS will only be logged");
                Arc::new(LogOnlySender)
            }
        };
        let llm: Option<Arc<dyn LlmClient>> = match OpenAiCompatibleClient::from_config(&config.llm)? {
            Some(client) => Some(Arc::new(client)),
            None => {
                info!("LLM_API_KEY not set; using rule-based parsing and curated venues");
                None
            }
        };

        Ok(Self::new(
            database,
            sender,
            llm,
            config.twilio.phone_number.clone(),
        ))
    }
}

/// The full HTTP application
#[must_use]
pub fn app(resources: Arc<AppResources>) -> Router {
    app_with_timeout(resources, REQUEST_TIMEOUT)
}

/// The HTTP application with a custom request deadline; overruns answer 408
#[must_use]
pub fn app_with_timeout(resources: Arc<AppResources>, timeout: Duration) -> Router {
    let router = ConversationRouter::new(resources);
    Router::new()
        .merge(SmsRoutes::routes(router))
        .merge(HealthRoutes::routes())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(TraceLayer::new_for_http())
}

/// Serve until Ctrl-C
///
/// # Errors
///
/// Returns an error if resources cannot be built or the listener fails.
pub async fn run(config: &ServerConfig) -> anyhow::Result<()> {
    let resources = Arc::new(AppResources::from_config(config).await?);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        port = config.http_port,
        webhook = %format!("{}/sms", config.base_url.trim_end_matches('/')),
        "Huddle listening"
    );

    axum::serve(listener, app(resources))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated with error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    info!("Shutdown signal received");
}

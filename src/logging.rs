// ABOUTME: Logging configuration and structured logging setup for the Huddle service
// ABOUTME: Builds the tracing subscriber from the server config's level and LOG_FORMAT with noise filters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Structured logging configuration

use anyhow::Result;
use serde_json::json;
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::environment::ServerConfig;

/// Service name reported in startup logs
pub const SERVICE_NAME: &str = "huddle";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include span open/close events
    pub include_spans: bool,
    /// Service version
    pub service_version: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

impl LogFormat {
    /// Parse `LOG_FORMAT`, falling back to pretty output
    #[must_use]
    pub fn from_str_or_default(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_spans: false,
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

impl LoggingConfig {
    /// Logging for a loaded server configuration.
    ///
    /// The level is the configured `LOG_LEVEL`; a `RUST_LOG` directive
    /// string replaces it when set. `LOG_FORMAT` picks the output shape.
    #[must_use]
    pub fn from_server_config(config: &ServerConfig) -> Self {
        Self::with_overrides(
            config,
            env::var("RUST_LOG").ok(),
            env::var("LOG_FORMAT").ok(),
        )
    }

    /// Same as [`Self::from_server_config`] with the environment passed in
    #[must_use]
    pub fn with_overrides(
        config: &ServerConfig,
        rust_log: Option<String>,
        log_format: Option<String>,
    ) -> Self {
        Self {
            level: rust_log
                .filter(|directives| !directives.trim().is_empty())
                .unwrap_or_else(|| config.log_level.to_string()),
            format: log_format
                .as_deref()
                .map_or(LogFormat::Pretty, LogFormat::from_str_or_default),
            include_location: env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }

    /// Build the filter with noise reduction for the HTTP and store stacks
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let filter = EnvFilter::new(&self.level)
            .add_directive(
                "hyper=warn"
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::WARN.into()),
            )
            .add_directive(
                "reqwest=warn"
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::WARN.into()),
            )
            .add_directive(
                "sqlx=warn"
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::WARN.into()),
            )
            .add_directive(
                "tower_http=info"
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::INFO.into()),
            );
        // A full directive string already says what it wants for this crate
        if self.level.contains([',', '=']) {
            return filter;
        }
        filter.add_directive(
            format!("huddle_sms={}", self.level)
                .parse()
                .unwrap_or_else(|_| tracing::Level::INFO.into()),
        )
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        match self.format {
            LogFormat::Json => {
                let json_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(span_events)
                    .json();
                registry.with(json_layer).try_init()?;
            }
            LogFormat::Pretty => {
                let pretty_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(span_events);
                registry.with(pretty_layer).try_init()?;
            }
            LogFormat::Compact => {
                let compact_layer = fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stdout)
                    .with_span_events(FmtSpan::NONE);
                registry.with(compact_layer).try_init()?;
            }
        }

        self.log_startup_info();
        Ok(())
    }

    fn log_startup_info(&self) {
        info!(
            service.name = SERVICE_NAME,
            service.version = %self.service_version,
            log.level = %self.level,
            log.format = ?self.format,
            "Huddle starting up"
        );

        let config_summary = json!({
            "service": {
                "name": SERVICE_NAME,
                "version": self.service_version,
            },
            "logging": {
                "level": self.level,
                "format": format!("{:?}", self.format),
                "features": {
                    "location": self.include_location,
                    "spans": self.include_spans
                }
            }
        });
        info!("Logging configured: {}", config_summary);
    }
}

/// Initialize logging for a loaded server configuration
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_config(config: &ServerConfig) -> Result<()> {
    LoggingConfig::from_server_config(config).init()
}

// ABOUTME: Environment configuration for the SMS gateway, LLM, database and HTTP listener
// ABOUTME: Parses typed settings from environment variables and renders a secrets-free summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Default `SQLite` database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/huddle.db";

/// Default OpenAI-compatible endpoint
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model id
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Default public base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default HTTP listen port
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default LLM request timeout
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 8;

/// Default outbound SMS timeout
pub const DEFAULT_SMS_TIMEOUT_SECS: u64 = 10;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (tests and local experiments)
    Memory,
}

impl DatabaseUrl {
    /// Parse a connection string.
    ///
    /// `sqlite::memory:` is in-memory, `sqlite:<path>` (or `sqlite://<path>`)
    /// is a file, and a bare path is treated as a file.
    ///
    /// # Errors
    ///
    /// Returns an error for any other scheme, such as `postgres://`.
    pub fn parse_url(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Some(rest) = trimmed.strip_prefix("sqlite:") {
            let path = rest.strip_prefix("//").unwrap_or(rest);
            if path == ":memory:" || path.is_empty() {
                return Ok(Self::Memory);
            }
            return Ok(Self::SQLite {
                path: PathBuf::from(path),
            });
        }
        if let Some((scheme, _)) = trimmed.split_once("://") {
            bail!("Unsupported database scheme '{scheme}': only sqlite is supported");
        }
        if trimmed.is_empty() {
            bail!("DATABASE_URL is empty");
        }
        Ok(Self::SQLite {
            path: PathBuf::from(trimmed),
        })
    }

    /// Convert to a sqlx connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/huddle.db"),
        }
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// SMS gateway settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwilioConfig {
    /// Account SID
    pub account_sid: Option<String>,
    /// Auth token
    pub auth_token: Option<String>,
    /// Provisioned sender number, canonical form when it parses
    pub phone_number: Option<String>,
    /// Outbound request timeout
    pub timeout_secs: u64,
}

impl TwilioConfig {
    /// Account SID and auth token, when both are configured along with a number
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str, &str)> {
        match (&self.account_sid, &self.auth_token, &self.phone_number) {
            (Some(sid), Some(token), Some(number)) => Some((sid, token, number)),
            _ => None,
        }
    }

    /// Timeout as a `Duration`
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// LLM completion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key; `None` disables every LLM path
    pub api_key: Option<String>,
    /// OpenAI-compatible base URL
    pub base_url: String,
    /// Model id
    pub model: String,
    /// Request timeout
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Whether the LLM collaborator should be constructed
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Timeout as a `Duration`
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_LLM_BASE_URL.to_owned(),
            model: DEFAULT_LLM_MODEL.to_owned(),
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Public base URL of the webhook
    pub base_url: String,
    /// Log level
    pub log_level: LogLevel,
    /// Database location
    pub database_url: DatabaseUrl,
    /// SMS gateway
    pub twilio: TwilioConfig,
    /// LLM collaborator
    pub llm: LlmConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a numeric variable does not parse or the
    /// database URL uses an unsupported scheme.
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let http_port = env_var_or("HTTP_PORT", &DEFAULT_HTTP_PORT.to_string())
            .parse()
            .context("Invalid HTTP_PORT value")?;
        let llm_timeout = env_var_or("LLM_TIMEOUT_SECS", &DEFAULT_LLM_TIMEOUT_SECS.to_string())
            .parse()
            .context("Invalid LLM_TIMEOUT_SECS value")?;
        let sms_timeout = env_var_or("SMS_TIMEOUT_SECS", &DEFAULT_SMS_TIMEOUT_SECS.to_string())
            .parse()
            .context("Invalid SMS_TIMEOUT_SECS value")?;

        let phone_number = non_empty_var("TWILIO_PHONE_NUMBER").map(|raw| {
            huddle_parsers::normalize_phone(&raw).unwrap_or(raw)
        });

        Ok(Self {
            http_port,
            base_url: env_var_or("BASE_URL", DEFAULT_BASE_URL),
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")),
            database_url: DatabaseUrl::parse_url(&env_var_or("DATABASE_URL", DEFAULT_DATABASE_URL))?,
            twilio: TwilioConfig {
                account_sid: non_empty_var("TWILIO_ACCOUNT_SID"),
                auth_token: non_empty_var("TWILIO_AUTH_TOKEN"),
                phone_number,
                timeout_secs: sms_timeout,
            },
            llm: LlmConfig {
                api_key: non_empty_var("LLM_API_KEY"),
                base_url: env_var_or("LLM_BASE_URL", DEFAULT_LLM_BASE_URL),
                model: env_var_or("LLM_MODEL", DEFAULT_LLM_MODEL),
                timeout_secs: llm_timeout,
            },
        })
    }

    /// Configuration for tests: in-memory store, no collaborators
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            http_port: 0,
            base_url: DEFAULT_BASE_URL.to_owned(),
            log_level: LogLevel::Debug,
            database_url: DatabaseUrl::Memory,
            twilio: TwilioConfig {
                timeout_secs: DEFAULT_SMS_TIMEOUT_SECS,
                ..TwilioConfig::default()
            },
            llm: LlmConfig::default(),
        }
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Huddle Configuration: port={} base_url={} log_level={} database={} sms={} llm={}",
            self.http_port,
            self.base_url,
            self.log_level,
            if self.database_url.is_memory() {
                "SQLite (memory)"
            } else {
                "SQLite (file)"
            },
            if self.twilio.credentials().is_some() {
                "Twilio"
            } else {
                "log-only"
            },
            if self.llm.is_enabled() {
                self.llm.model.as_str()
            } else {
                "disabled"
            },
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Environment variable, treating blank values as unset
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_url() {
        assert_eq!(
            DatabaseUrl::parse_url("sqlite::memory:").ok(),
            Some(DatabaseUrl::Memory)
        );
    }

    #[test]
    fn test_parse_file_url() {
        let parsed = DatabaseUrl::parse_url("sqlite:./data/huddle.db").ok();
        assert_eq!(
            parsed,
            Some(DatabaseUrl::SQLite {
                path: PathBuf::from("./data/huddle.db")
            })
        );
        assert_eq!(
            parsed.map(|url| url.to_connection_string()),
            Some("sqlite:./data/huddle.db".to_owned())
        );
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(DatabaseUrl::parse_url("postgres://localhost/huddle").is_err());
        assert!(DatabaseUrl::parse_url("").is_err());
    }

    #[test]
    fn test_summary_has_no_secrets() {
        let mut config = ServerConfig::for_testing();
        config.twilio.auth_token = Some("secret-token".to_owned());
        config.llm.api_key = Some("sk-secret".to_owned());
        let summary = config.summary();
        assert!(!summary.contains("secret"));
        assert!(summary.contains("gpt-4o-mini"));
    }

    #[test]
    fn test_log_level_fallback() {
        assert_eq!(LogLevel::from_str_or_default("DEBUG"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("loud"), LogLevel::Info);
    }
}

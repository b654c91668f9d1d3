// ABOUTME: Unit tests for environment configuration loading
// ABOUTME: Variables are process-global, so every test runs serially
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::path::PathBuf;

use huddle_sms::config::environment::{
    DatabaseUrl, LogLevel, ServerConfig, DEFAULT_LLM_MODEL, DEFAULT_SMS_TIMEOUT_SECS,
};
use serial_test::serial;

const VARS: &[&str] = &[
    "HTTP_PORT",
    "BASE_URL",
    "LOG_LEVEL",
    "DATABASE_URL",
    "TWILIO_ACCOUNT_SID",
    "TWILIO_AUTH_TOKEN",
    "TWILIO_PHONE_NUMBER",
    "LLM_API_KEY",
    "LLM_BASE_URL",
    "LLM_MODEL",
    "LLM_TIMEOUT_SECS",
    "SMS_TIMEOUT_SECS",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 8080);
    assert_eq!(
        config.database_url,
        DatabaseUrl::SQLite {
            path: PathBuf::from("./data/huddle.db")
        }
    );
    assert!(config.twilio.credentials().is_none());
    assert!(!config.llm.is_enabled());
    assert_eq!(config.llm.model, DEFAULT_LLM_MODEL);
    assert_eq!(config.twilio.timeout_secs, DEFAULT_SMS_TIMEOUT_SECS);
}

#[test]
#[serial]
fn test_full_environment() {
    clear_env();
    env::set_var("HTTP_PORT", "9090");
    env::set_var("LOG_LEVEL", "debug");
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("TWILIO_ACCOUNT_SID", "AC123");
    env::set_var("TWILIO_AUTH_TOKEN", "secret-token");
    env::set_var("TWILIO_PHONE_NUMBER", "+1 (800) 555-0100");
    env::set_var("LLM_API_KEY", "sk-test");
    env::set_var("LLM_TIMEOUT_SECS", "3");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.http_port, 9090);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.database_url, DatabaseUrl::Memory);
    assert_eq!(
        config.twilio.credentials(),
        Some(("AC123", "secret-token", "8005550100"))
    );
    assert!(config.llm.is_enabled());
    assert_eq!(config.llm.timeout_secs, 3);

    let summary = config.summary();
    assert!(summary.contains("sms=Twilio"));
    assert!(!summary.contains("secret-token"));
    assert!(!summary.contains("sk-test"));
}

#[test]
#[serial]
fn test_blank_credentials_disable_collaborators() {
    clear_env();
    env::set_var("TWILIO_ACCOUNT_SID", "  ");
    env::set_var("LLM_API_KEY", "");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert!(config.twilio.credentials().is_none());
    assert!(!config.llm.is_enabled());
}

#[test]
#[serial]
fn test_invalid_values_are_errors() {
    clear_env();
    env::set_var("HTTP_PORT", "eighty");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var("DATABASE_URL", "postgres://localhost/huddle");
    assert!(ServerConfig::from_env().is_err());
    clear_env();
}

#[test]
fn test_database_url_parsing() {
    assert_eq!(DatabaseUrl::parse_url("sqlite::memory:").unwrap(), DatabaseUrl::Memory);
    assert_eq!(
        DatabaseUrl::parse_url("sqlite:./data/test.db").unwrap(),
        DatabaseUrl::SQLite {
            path: PathBuf::from("./data/test.db")
        }
    );
    assert_eq!(
        DatabaseUrl::parse_url("/var/lib/huddle.db").unwrap().to_connection_string(),
        "sqlite:/var/lib/huddle.db"
    );
    assert!(DatabaseUrl::parse_url("mysql://db").is_err());
}

#[test]
fn test_log_level_parsing() {
    assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
    assert_eq!(LogLevel::from_str_or_default("trace"), LogLevel::Trace);
    assert_eq!(LogLevel::from_str_or_default("loud"), LogLevel::Info);
}

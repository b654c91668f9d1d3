// ABOUTME: Repository layer over SQLite for planners, events, guests, contacts and availability
// ABOUTME: Owns the connection pool, the schema migration and per-request transaction guards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! Every inbound message runs inside one transaction obtained from
//! [`Database::begin`]. The entity modules expose free functions that take
//! the transaction's connection (`&mut SqliteConnection`), so the router can
//! thread a single guard through reads, mutations and the final commit.
//!
//! Lookups by phone go through [`huddle_parsers::lookup_keys`] so rows
//! stored before canonicalization (`1415...`, `+1415...`) are still found.

/// Availability interval storage
pub mod availability;
/// Planner contact book storage
pub mod contacts;
/// Event storage
pub mod events;
/// Guest conversation state storage
pub mod guest_states;
/// Guest storage
pub mod guests;
/// Data-integrity sweep
pub mod maintenance;
/// Planner storage
pub mod planners;
/// Transaction guard and retry helpers
pub mod transactions;

pub use maintenance::{run_maintenance, MaintenanceReport};
pub use transactions::{
    retry_transaction, SqliteTransactionGuard, TransactionGuard, DEFAULT_MAX_RETRIES,
};

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::config::environment::DatabaseUrl;
use crate::errors::{AppError, AppResult};

/// How long a connection waits on SQLite's write lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection pool size for file databases
const MAX_CONNECTIONS: u32 = 8;

/// Database handle shared by every request
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and run migrations.
    ///
    /// In-memory databases use a single long-lived connection so every
    /// request sees the same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub async fn new(url: &DatabaseUrl) -> AppResult<Self> {
        let db = Self::connect(url).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Connect without running migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub async fn connect(url: &DatabaseUrl) -> AppResult<Self> {
        if let DatabaseUrl::SQLite { path } = url {
            ensure_parent_dir(path)?;
        }

        let options = SqliteConnectOptions::from_str(&url.to_connection_string())
            .map_err(|e| AppError::config(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool_options = if url.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        info!(database = %url, "Database connected");
        Ok(Self { pool })
    }

    /// Get a reference to the database pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a transaction that rolls back unless committed
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be acquired.
    pub async fn begin(&self) -> AppResult<SqliteTransactionGuard<'static>> {
        let transaction = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        Ok(TransactionGuard::new(transaction))
    }

    /// Create every table and index if missing
    ///
    /// # Errors
    ///
    /// Returns an error if a DDL statement fails.
    pub async fn migrate(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        }
        debug!(statements = SCHEMA.len(), "Schema migrated");
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> AppResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| {
                AppError::config(format!(
                    "Cannot create database directory {}: {e}",
                    parent.display()
                ))
            }),
        _ => Ok(()),
    }
}

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS planners (
        id TEXT PRIMARY KEY,
        phone TEXT NOT NULL,
        name TEXT,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_planners_phone ON planners(phone)",
    r"
    CREATE TABLE IF NOT EXISTS events (
        id TEXT PRIMARY KEY,
        planner_id TEXT NOT NULL REFERENCES planners(id),
        title TEXT,
        location TEXT,
        activity TEXT,
        venue TEXT,
        venue_suggestions TEXT NOT NULL DEFAULT '[]',
        selected_date TEXT,
        start_time TEXT,
        end_time TEXT,
        notes TEXT,
        date_summary TEXT,
        proposed_dates TEXT NOT NULL DEFAULT '[]',
        slot_options TEXT NOT NULL DEFAULT '[]',
        stage TEXT NOT NULL,
        previous_stage TEXT,
        reentry TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_events_planner ON events(planner_id, stage)",
    r"
    CREATE TABLE IF NOT EXISTS guests (
        id TEXT PRIMARY KEY,
        event_id TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
        phone TEXT NOT NULL,
        name TEXT NOT NULL,
        rsvp TEXT NOT NULL DEFAULT 'pending',
        availability_requested INTEGER NOT NULL DEFAULT 0,
        availability_provided INTEGER NOT NULL DEFAULT 0,
        unavailable INTEGER NOT NULL DEFAULT 0,
        preferences_provided INTEGER NOT NULL DEFAULT 0,
        preferences TEXT,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_guests_event_phone ON guests(event_id, phone)",
    r"
    CREATE TABLE IF NOT EXISTS contacts (
        id TEXT PRIMARY KEY,
        planner_id TEXT NOT NULL REFERENCES planners(id),
        phone TEXT NOT NULL,
        name TEXT NOT NULL,
        last_contacted_at TEXT
    )
    ",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_contacts_planner_phone ON contacts(planner_id, phone)",
    r"
    CREATE TABLE IF NOT EXISTS availability (
        id TEXT PRIMARY KEY,
        event_id TEXT NOT NULL,
        guest_id TEXT NOT NULL REFERENCES guests(id) ON DELETE CASCADE,
        date TEXT NOT NULL,
        start_time TEXT NOT NULL,
        end_time TEXT NOT NULL,
        all_day INTEGER NOT NULL DEFAULT 0
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_availability_event ON availability(event_id, guest_id)",
    r"
    CREATE TABLE IF NOT EXISTS guest_states (
        phone TEXT PRIMARY KEY,
        event_id TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
        step TEXT NOT NULL,
        scratch TEXT NOT NULL DEFAULT '{}',
        updated_at TEXT NOT NULL
    )
    ",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_guest_states_phone ON guest_states(phone)",
];

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

pub(crate) fn date_to_sql(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn date_from_sql(raw: &str) -> AppResult<NaiveDate> {
    Ok(NaiveDate::parse_from_str(raw, DATE_FORMAT)?)
}

pub(crate) fn time_to_sql(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub(crate) fn time_from_sql(raw: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(AppError::from)
}

pub(crate) fn timestamp_from_sql(raw: &str) -> AppResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

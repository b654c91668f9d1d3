// ABOUTME: Guest rows, unique per (event, phone)
// ABOUTME: Response counts are always computed from the table, never cached
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use huddle_core::models::Guest;
use huddle_parsers::lookup_keys;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use super::timestamp_from_sql;
use crate::errors::{AppError, AppResult};

const GUEST_COLUMNS: &str = "id, event_id, phone, name, rsvp, availability_requested, \
     availability_provided, unavailable, preferences_provided, preferences, created_at";

/// Responded and invited guest counts for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseCounts {
    /// Guests who gave availability or said they are busy
    pub responded: usize,
    /// Every guest on the event
    pub total: usize,
}

impl ResponseCounts {
    /// Whether every guest has answered
    #[must_use]
    pub const fn all_responded(&self) -> bool {
        self.total > 0 && self.responded >= self.total
    }

    /// Counts over guest rows already read inside the current transaction
    #[must_use]
    pub fn from_guests(guests: &[Guest]) -> Self {
        Self {
            responded: guests.iter().filter(|guest| guest.has_responded()).count(),
            total: guests.len(),
        }
    }
}

/// Every guest of an event in the order they were added
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_for_event(conn: &mut SqliteConnection, event_id: &str) -> AppResult<Vec<Guest>> {
    let rows = sqlx::query(&format!(
        "SELECT {GUEST_COLUMNS} FROM guests WHERE event_id = $1 ORDER BY created_at, rowid"
    ))
    .bind(event_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to list guests: {e}")))?;
    rows.iter().map(row_to_guest).collect()
}

/// Fetch a guest by id
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn get(conn: &mut SqliteConnection, id: &str) -> AppResult<Option<Guest>> {
    let row = sqlx::query(&format!("SELECT {GUEST_COLUMNS} FROM guests WHERE id = $1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to get guest: {e}")))?;
    row.map(|r| row_to_guest(&r)).transpose()
}

/// Find the guest row for a phone on one event
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn find_by_event_and_phone(
    conn: &mut SqliteConnection,
    event_id: &str,
    phone: &str,
) -> AppResult<Option<Guest>> {
    for key in lookup_keys(phone) {
        let row = sqlx::query(&format!(
            "SELECT {GUEST_COLUMNS} FROM guests WHERE event_id = $1 AND phone = $2"
        ))
        .bind(event_id)
        .bind(&key)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to look up guest: {e}")))?;
        if let Some(row) = row {
            return row_to_guest(&row).map(Some);
        }
    }
    Ok(None)
}

/// Insert a guest, or update name, RSVP and flags if the phone is already on the event
///
/// # Errors
///
/// Returns an error if the write fails.
pub async fn upsert(conn: &mut SqliteConnection, guest: &Guest) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO guests (
            id, event_id, phone, name, rsvp, availability_requested, availability_provided,
            unavailable, preferences_provided, preferences, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT(event_id, phone) DO UPDATE SET
            name = excluded.name,
            rsvp = excluded.rsvp,
            availability_requested = excluded.availability_requested,
            availability_provided = excluded.availability_provided,
            unavailable = excluded.unavailable,
            preferences_provided = excluded.preferences_provided,
            preferences = excluded.preferences
        ",
    )
    .bind(&guest.id)
    .bind(&guest.event_id)
    .bind(&guest.phone)
    .bind(&guest.name)
    .bind(guest.rsvp.as_str())
    .bind(guest.availability_requested)
    .bind(guest.availability_provided)
    .bind(guest.unavailable)
    .bind(guest.preferences_provided)
    .bind(&guest.preferences)
    .bind(guest.created_at.to_rfc3339())
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to save guest: {e}")))?;
    Ok(())
}

/// Delete a guest; its availability cascades
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn delete(conn: &mut SqliteConnection, id: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM guests WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete guest: {e}")))?;
    Ok(())
}

/// Count responded and total guests
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn response_counts(
    conn: &mut SqliteConnection,
    event_id: &str,
) -> AppResult<ResponseCounts> {
    let row = sqlx::query(
        r"
        SELECT COUNT(*) AS total,
               COALESCE(SUM(CASE WHEN availability_provided = 1 OR unavailable = 1 THEN 1 ELSE 0 END), 0)
                   AS responded
        FROM guests WHERE event_id = $1
        ",
    )
    .bind(event_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to count guest responses: {e}")))?;
    let total: i64 = row.get("total");
    let responded: i64 = row.get("responded");
    Ok(ResponseCounts {
        responded: responded as usize,
        total: total as usize,
    })
}

fn row_to_guest(row: &SqliteRow) -> AppResult<Guest> {
    let rsvp: String = row.get("rsvp");
    let created_at: String = row.get("created_at");
    Ok(Guest {
        id: row.get("id"),
        event_id: row.get("event_id"),
        phone: row.get("phone"),
        name: row.get("name"),
        rsvp: rsvp.parse()?,
        availability_requested: row.get("availability_requested"),
        availability_provided: row.get("availability_provided"),
        unavailable: row.get("unavailable"),
        preferences_provided: row.get("preferences_provided"),
        preferences: row.get("preferences"),
        created_at: timestamp_from_sql(&created_at)?,
    })
}

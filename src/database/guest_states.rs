// ABOUTME: Guest conversation state rows, unique per phone across all events
// ABOUTME: A row's presence is what routes an inbound message to the guest workflow
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use huddle_core::models::{GuestConversation, GuestStep};
use huddle_parsers::lookup_keys;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use super::timestamp_from_sql;
use crate::errors::{AppError, AppResult};

/// Find the conversation for a phone, retrying the alternate stored forms
///
/// # Errors
///
/// Returns an error if the query fails or the stored state is malformed.
pub async fn find_by_phone(
    conn: &mut SqliteConnection,
    phone: &str,
) -> AppResult<Option<GuestConversation>> {
    for key in lookup_keys(phone) {
        let row = sqlx::query(
            "SELECT phone, event_id, step, scratch, updated_at FROM guest_states WHERE phone = $1",
        )
        .bind(&key)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to look up guest state: {e}")))?;
        if let Some(row) = row {
            return row_to_conversation(&row).map(Some);
        }
    }
    Ok(None)
}

/// Insert or replace the conversation for its phone
///
/// # Errors
///
/// Returns an error if the write fails.
pub async fn put(conn: &mut SqliteConnection, conversation: &GuestConversation) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO guest_states (phone, event_id, step, scratch, updated_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT(phone) DO UPDATE SET
            event_id = excluded.event_id,
            step = excluded.step,
            scratch = excluded.scratch,
            updated_at = excluded.updated_at
        ",
    )
    .bind(&conversation.phone)
    .bind(&conversation.event_id)
    .bind(conversation.step.as_str())
    .bind(serde_json::to_string(&conversation.scratch)?)
    .bind(conversation.updated_at.to_rfc3339())
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to save guest state: {e}")))?;
    Ok(())
}

/// Delete the conversation for a phone under every stored form
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn delete(conn: &mut SqliteConnection, phone: &str) -> AppResult<()> {
    for key in lookup_keys(phone) {
        sqlx::query("DELETE FROM guest_states WHERE phone = $1")
            .bind(&key)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete guest state: {e}")))?;
    }
    Ok(())
}

/// Delete every conversation belonging to an event
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn delete_for_event(conn: &mut SqliteConnection, event_id: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM guest_states WHERE event_id = $1")
        .bind(event_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete guest states: {e}")))?;
    Ok(())
}

fn row_to_conversation(row: &SqliteRow) -> AppResult<GuestConversation> {
    let step: String = row.get("step");
    let scratch: String = row.get("scratch");
    let updated_at: String = row.get("updated_at");
    Ok(GuestConversation {
        phone: row.get("phone"),
        event_id: row.get("event_id"),
        step: step.parse::<GuestStep>()?,
        scratch: serde_json::from_str(&scratch)?,
        updated_at: timestamp_from_sql(&updated_at)?,
    })
}

// ABOUTME: Event rows including stage, re-entry intent and JSON-encoded lists
// ABOUTME: Saves are whole-row upserts; the router is the only caller that writes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use huddle_core::models::{Event, EventStage, ReentryIntent};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use super::{date_from_sql, date_to_sql, time_from_sql, time_to_sql, timestamp_from_sql};
use crate::errors::{AppError, AppResult};

const EVENT_COLUMNS: &str = "id, planner_id, title, location, activity, venue, venue_suggestions, \
     selected_date, start_time, end_time, notes, date_summary, proposed_dates, slot_options, \
     stage, previous_stage, reentry, created_at, updated_at";

/// Fetch an event by id
///
/// # Errors
///
/// Returns an error if the query fails or a stored column is malformed.
pub async fn get(conn: &mut SqliteConnection, id: &str) -> AppResult<Option<Event>> {
    let row = sqlx::query(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to get event: {e}")))?;
    row.map(|r| row_to_event(&r)).transpose()
}

/// The planner's in-flight event, if any
///
/// # Errors
///
/// Returns an error if the query fails or a stored column is malformed.
pub async fn active_for_planner(
    conn: &mut SqliteConnection,
    planner_id: &str,
) -> AppResult<Option<Event>> {
    let row = sqlx::query(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE planner_id = $1 AND stage != $2 \
         ORDER BY updated_at DESC LIMIT 1"
    ))
    .bind(planner_id)
    .bind(EventStage::Finalized.as_str())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to get active event: {e}")))?;
    row.map(|r| row_to_event(&r)).transpose()
}

/// Insert or replace every column of an event
///
/// # Errors
///
/// Returns an error if the write fails.
pub async fn save(conn: &mut SqliteConnection, event: &Event) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO events (
            id, planner_id, title, location, activity, venue, venue_suggestions,
            selected_date, start_time, end_time, notes, date_summary, proposed_dates,
            slot_options, stage, previous_stage, reentry, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            location = excluded.location,
            activity = excluded.activity,
            venue = excluded.venue,
            venue_suggestions = excluded.venue_suggestions,
            selected_date = excluded.selected_date,
            start_time = excluded.start_time,
            end_time = excluded.end_time,
            notes = excluded.notes,
            date_summary = excluded.date_summary,
            proposed_dates = excluded.proposed_dates,
            slot_options = excluded.slot_options,
            stage = excluded.stage,
            previous_stage = excluded.previous_stage,
            reentry = excluded.reentry,
            updated_at = excluded.updated_at
        ",
    )
    .bind(&event.id)
    .bind(&event.planner_id)
    .bind(&event.title)
    .bind(&event.location)
    .bind(&event.activity)
    .bind(&event.venue)
    .bind(serde_json::to_string(&event.venue_suggestions)?)
    .bind(event.selected_date.map(date_to_sql))
    .bind(event.start_time.map(time_to_sql))
    .bind(event.end_time.map(time_to_sql))
    .bind(&event.notes)
    .bind(&event.date_summary)
    .bind(serde_json::to_string(&event.proposed_dates)?)
    .bind(serde_json::to_string(&event.slot_options)?)
    .bind(event.stage.as_str())
    .bind(event.previous_stage.map(EventStage::as_str))
    .bind(event.reentry.map(ReentryIntent::as_str))
    .bind(event.created_at.to_rfc3339())
    .bind(Utc::now().to_rfc3339())
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to save event: {e}")))?;
    Ok(())
}

/// Move an event to a new stage
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn set_stage(conn: &mut SqliteConnection, id: &str, stage: EventStage) -> AppResult<()> {
    sqlx::query("UPDATE events SET stage = $1, updated_at = $2 WHERE id = $3")
        .bind(stage.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to set event stage: {e}")))?;
    Ok(())
}

/// Take `SQLite`'s write lock on behalf of an event before reading it.
///
/// `SQLite` has no row locks; a no-op update upgrades the transaction to a
/// writer so concurrent handlers touching the same event queue behind it.
///
/// # Errors
///
/// Returns an error if the lock cannot be taken within the busy timeout.
pub async fn lock(conn: &mut SqliteConnection, id: &str) -> AppResult<()> {
    sqlx::query("UPDATE events SET updated_at = updated_at WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to lock event: {e}")))?;
    Ok(())
}

/// Delete an event; guests, availability and guest states cascade
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn delete(conn: &mut SqliteConnection, id: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM availability WHERE event_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete event availability: {e}")))?;
    sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete event: {e}")))?;
    Ok(())
}

fn row_to_event(row: &SqliteRow) -> AppResult<Event> {
    let stage: String = row.get("stage");
    let previous_stage: Option<String> = row.get("previous_stage");
    let reentry: Option<String> = row.get("reentry");
    let selected_date: Option<String> = row.get("selected_date");
    let start_time: Option<String> = row.get("start_time");
    let end_time: Option<String> = row.get("end_time");
    let venue_suggestions: String = row.get("venue_suggestions");
    let proposed_dates: String = row.get("proposed_dates");
    let slot_options: String = row.get("slot_options");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Event {
        id: row.get("id"),
        planner_id: row.get("planner_id"),
        title: row.get("title"),
        location: row.get("location"),
        activity: row.get("activity"),
        venue: row.get("venue"),
        venue_suggestions: serde_json::from_str(&venue_suggestions)?,
        selected_date: selected_date.as_deref().map(date_from_sql).transpose()?,
        start_time: start_time.as_deref().map(time_from_sql).transpose()?,
        end_time: end_time.as_deref().map(time_from_sql).transpose()?,
        notes: row.get("notes"),
        date_summary: row.get("date_summary"),
        proposed_dates: serde_json::from_str(&proposed_dates)?,
        slot_options: serde_json::from_str(&slot_options)?,
        stage: stage.parse()?,
        previous_stage: previous_stage
            .as_deref()
            .map(str::parse::<EventStage>)
            .transpose()?,
        reentry: reentry
            .as_deref()
            .map(str::parse::<ReentryIntent>)
            .transpose()?,
        created_at: timestamp_from_sql(&created_at)?,
        updated_at: timestamp_from_sql(&updated_at)?,
    })
}

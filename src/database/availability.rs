// ABOUTME: Availability interval rows per (event, guest)
// ABOUTME: Replacement deletes the pair's prior rows before inserting the new set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use huddle_core::models::{AvailabilityInterval, TimeWindow};
use huddle_parsers::GuestWindow;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use super::{date_from_sql, date_to_sql, time_from_sql, time_to_sql};
use crate::errors::{AppError, AppResult};

/// Replace a guest's intervals for an event with `windows`
///
/// # Errors
///
/// Returns an error if a delete or insert fails.
pub async fn replace_for_guest(
    conn: &mut SqliteConnection,
    event_id: &str,
    guest_id: &str,
    windows: &[TimeWindow],
) -> AppResult<()> {
    sqlx::query("DELETE FROM availability WHERE event_id = $1 AND guest_id = $2")
        .bind(event_id)
        .bind(guest_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to clear availability: {e}")))?;

    for window in windows {
        let interval = AvailabilityInterval::from_window(event_id, guest_id, window);
        sqlx::query(
            r"
            INSERT INTO availability (id, event_id, guest_id, date, start_time, end_time, all_day)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&interval.id)
        .bind(&interval.event_id)
        .bind(&interval.guest_id)
        .bind(date_to_sql(interval.date))
        .bind(time_to_sql(interval.start))
        .bind(time_to_sql(interval.end))
        .bind(interval.all_day)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to save availability: {e}")))?;
    }
    Ok(())
}

/// Every interval stored for an event
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_for_event(
    conn: &mut SqliteConnection,
    event_id: &str,
) -> AppResult<Vec<AvailabilityInterval>> {
    let rows = sqlx::query(
        r"
        SELECT id, event_id, guest_id, date, start_time, end_time, all_day
        FROM availability WHERE event_id = $1
        ORDER BY date, start_time, rowid
        ",
    )
    .bind(event_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to list availability: {e}")))?;
    rows.iter().map(row_to_interval).collect()
}

/// Intervals of guests whose availability-provided flag is set, with names
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn windows_for_overlap(
    conn: &mut SqliteConnection,
    event_id: &str,
) -> AppResult<Vec<GuestWindow>> {
    let rows = sqlx::query(
        r"
        SELECT a.id, a.event_id, a.guest_id, a.date, a.start_time, a.end_time, a.all_day,
               g.name AS guest_name
        FROM availability a
        JOIN guests g ON g.id = a.guest_id
        WHERE a.event_id = $1 AND g.event_id = $1 AND g.availability_provided = 1
        ",
    )
    .bind(event_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to load availability: {e}")))?;

    rows.iter()
        .map(|row| {
            let interval = row_to_interval(row)?;
            Ok(GuestWindow {
                guest_id: interval.guest_id.clone(),
                guest_name: row.get("guest_name"),
                window: interval.window(),
            })
        })
        .collect()
}

/// Number of distinct guests with at least one interval on the event
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn distinct_guest_count(conn: &mut SqliteConnection, event_id: &str) -> AppResult<usize> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(DISTINCT guest_id) FROM availability WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to count availability: {e}")))?;
    Ok(count as usize)
}

pub(super) fn row_to_interval(row: &SqliteRow) -> AppResult<AvailabilityInterval> {
    let date: String = row.get("date");
    let start: String = row.get("start_time");
    let end: String = row.get("end_time");
    Ok(AvailabilityInterval {
        id: row.get("id"),
        event_id: row.get("event_id"),
        guest_id: row.get("guest_id"),
        date: date_from_sql(&date)?,
        start: time_from_sql(&start)?,
        end: time_from_sql(&end)?,
        all_day: row.get("all_day"),
    })
}

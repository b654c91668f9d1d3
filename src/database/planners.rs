// ABOUTME: Planner rows keyed by canonical phone
// ABOUTME: Lookups tolerate historically non-canonical phone values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use huddle_core::models::Planner;
use huddle_parsers::lookup_keys;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use super::timestamp_from_sql;
use crate::errors::{AppError, AppResult};

/// Find a planner by canonical phone, retrying the alternate stored forms
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn find_by_phone(conn: &mut SqliteConnection, phone: &str) -> AppResult<Option<Planner>> {
    for key in lookup_keys(phone) {
        let row = sqlx::query("SELECT id, phone, name, created_at FROM planners WHERE phone = $1")
            .bind(&key)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to look up planner: {e}")))?;
        if let Some(row) = row {
            return row_to_planner(&row).map(Some);
        }
    }
    Ok(None)
}

/// Fetch a planner by id
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn get(conn: &mut SqliteConnection, id: &str) -> AppResult<Option<Planner>> {
    let row = sqlx::query("SELECT id, phone, name, created_at FROM planners WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to get planner: {e}")))?;
    row.map(|r| row_to_planner(&r)).transpose()
}

/// Insert a new planner
///
/// # Errors
///
/// Returns an error if the insert fails (including a duplicate phone).
pub async fn insert(conn: &mut SqliteConnection, planner: &Planner) -> AppResult<()> {
    sqlx::query("INSERT INTO planners (id, phone, name, created_at) VALUES ($1, $2, $3, $4)")
        .bind(&planner.id)
        .bind(&planner.phone)
        .bind(&planner.name)
        .bind(planner.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to create planner: {e}")))?;
    Ok(())
}

/// Set the planner's display name
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn set_name(conn: &mut SqliteConnection, planner_id: &str, name: &str) -> AppResult<()> {
    sqlx::query("UPDATE planners SET name = $1 WHERE id = $2")
        .bind(name)
        .bind(planner_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to set planner name: {e}")))?;
    Ok(())
}

fn row_to_planner(row: &SqliteRow) -> AppResult<Planner> {
    let created_at: String = row.get("created_at");
    Ok(Planner {
        id: row.get("id"),
        phone: row.get("phone"),
        name: row.get("name"),
        created_at: timestamp_from_sql(&created_at)?,
    })
}

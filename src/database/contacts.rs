// ABOUTME: Planner contact book rows, unique per (planner, phone)
// ABOUTME: Seeds the enumerated list shown when a new guest list starts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use huddle_core::models::Contact;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use super::timestamp_from_sql;
use crate::errors::{AppError, AppResult};

/// Contacts, most recently contacted first
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_for_planner(
    conn: &mut SqliteConnection,
    planner_id: &str,
) -> AppResult<Vec<Contact>> {
    let rows = sqlx::query(
        r"
        SELECT id, planner_id, phone, name, last_contacted_at
        FROM contacts
        WHERE planner_id = $1
        ORDER BY last_contacted_at DESC, name COLLATE NOCASE
        ",
    )
    .bind(planner_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to list contacts: {e}")))?;
    rows.iter().map(row_to_contact).collect()
}

/// Insert a contact or refresh its name and last-contacted time
///
/// # Errors
///
/// Returns an error if the write fails.
pub async fn upsert(conn: &mut SqliteConnection, contact: &Contact) -> AppResult<()> {
    sqlx::query(
        r"
        INSERT INTO contacts (id, planner_id, phone, name, last_contacted_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT(planner_id, phone) DO UPDATE SET
            name = excluded.name,
            last_contacted_at = excluded.last_contacted_at
        ",
    )
    .bind(&contact.id)
    .bind(&contact.planner_id)
    .bind(&contact.phone)
    .bind(&contact.name)
    .bind(contact.last_contacted_at.map(|at| at.to_rfc3339()))
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to save contact: {e}")))?;
    Ok(())
}

/// Delete a contact
///
/// # Errors
///
/// Returns an error if the delete fails.
pub async fn delete(conn: &mut SqliteConnection, id: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM contacts WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete contact: {e}")))?;
    Ok(())
}

fn row_to_contact(row: &SqliteRow) -> AppResult<Contact> {
    let last_contacted_at: Option<String> = row.get("last_contacted_at");
    Ok(Contact {
        id: row.get("id"),
        planner_id: row.get("planner_id"),
        phone: row.get("phone"),
        name: row.get("name"),
        last_contacted_at: last_contacted_at
            .as_deref()
            .map(timestamp_from_sql)
            .transpose()?,
    })
}

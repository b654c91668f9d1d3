// ABOUTME: Operator-invoked data-integrity sweep over guests and availability
// ABOUTME: Removes orphans, re-parents mismatched rows and collapses duplicate intervals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Data-integrity sweep
//!
//! Four rules, applied in order inside one transaction:
//!
//! 1. availability rows whose guest no longer exists are deleted
//! 2. availability rows whose `event_id` disagrees with their guest's event
//!    are moved to the guest's event
//! 3. duplicate availability per (guest, event, date) collapses to the most
//!    plausible row
//! 4. guests whose event no longer exists are deleted
//!
//! Re-running the sweep on a clean database changes nothing.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use huddle_core::models::{AvailabilityInterval, DAY_END};
use serde::Serialize;
use sqlx::{Row, SqliteConnection};
use tracing::info;

use super::availability::row_to_interval;
use super::Database;
use crate::errors::{AppError, AppResult};

const NOON: NaiveTime = match NaiveTime::from_hms_opt(12, 0, 0) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// Per-rule counts from one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaintenanceReport {
    /// Availability rows pointing at a missing guest
    pub orphan_availability: u64,
    /// Availability rows moved to their guest's event
    pub reparented_availability: u64,
    /// Duplicate availability rows removed
    pub duplicate_availability: u64,
    /// Guests whose event is gone
    pub orphan_guests: u64,
    /// Whether changes were rolled back instead of committed
    pub dry_run: bool,
}

impl MaintenanceReport {
    /// Total rows touched
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.orphan_availability
            + self.reparented_availability
            + self.duplicate_availability
            + self.orphan_guests
    }
}

/// Run the sweep. With `dry_run` the counts are computed and rolled back.
///
/// # Errors
///
/// Returns an error if any statement fails; nothing is committed then.
pub async fn run_maintenance(database: &Database, dry_run: bool) -> AppResult<MaintenanceReport> {
    let mut guard = database.begin().await?;
    let conn = guard.executor()?;

    let report = MaintenanceReport {
        orphan_availability: delete_orphan_availability(conn).await?,
        reparented_availability: reparent_availability(conn).await?,
        duplicate_availability: dedupe_availability(conn).await?,
        orphan_guests: delete_orphan_guests(conn).await?,
        dry_run,
    };

    if dry_run {
        guard.rollback().await?;
    } else {
        guard.commit().await?;
    }

    info!(
        orphan_availability = report.orphan_availability,
        reparented_availability = report.reparented_availability,
        duplicate_availability = report.duplicate_availability,
        orphan_guests = report.orphan_guests,
        dry_run,
        "Maintenance sweep finished"
    );
    Ok(report)
}

async fn delete_orphan_availability(conn: &mut SqliteConnection) -> AppResult<u64> {
    let result = sqlx::query(
        "DELETE FROM availability WHERE guest_id NOT IN (SELECT id FROM guests)",
    )
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to delete orphan availability: {e}")))?;
    Ok(result.rows_affected())
}

async fn reparent_availability(conn: &mut SqliteConnection) -> AppResult<u64> {
    let result = sqlx::query(
        r"
        UPDATE availability
        SET event_id = (SELECT g.event_id FROM guests g WHERE g.id = availability.guest_id)
        WHERE event_id != (SELECT g.event_id FROM guests g WHERE g.id = availability.guest_id)
        ",
    )
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to re-parent availability: {e}")))?;
    Ok(result.rows_affected())
}

async fn dedupe_availability(conn: &mut SqliteConnection) -> AppResult<u64> {
    let rows = sqlx::query(
        r"
        SELECT rowid AS seq, id, event_id, guest_id, date, start_time, end_time, all_day
        FROM availability
        ORDER BY guest_id, event_id, date, rowid
        ",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| AppError::database(format!("Failed to scan availability: {e}")))?;

    let mut groups: BTreeMap<(String, String, chrono::NaiveDate), Vec<(i64, AvailabilityInterval)>> =
        BTreeMap::new();
    for row in &rows {
        let interval = row_to_interval(row)?;
        let seq: i64 = row.get("seq");
        groups
            .entry((
                interval.guest_id.clone(),
                interval.event_id.clone(),
                interval.date,
            ))
            .or_default()
            .push((seq, interval));
    }

    let mut removed = 0;
    for candidates in groups.into_values().filter(|group| group.len() > 1) {
        let keep = candidates
            .iter()
            .max_by_key(|(seq, interval)| plausibility(interval, *seq))
            .map(|(_, interval)| interval.id.clone());
        for (_, interval) in &candidates {
            if Some(&interval.id) == keep.as_ref() {
                continue;
            }
            removed += sqlx::query("DELETE FROM availability WHERE id = $1")
                .bind(&interval.id)
                .execute(&mut *conn)
                .await
                .map_err(|e| AppError::database(format!("Failed to delete duplicate: {e}")))?
                .rows_affected();
        }
    }
    Ok(removed)
}

/// Higher is more plausible: all-day answers first, then rows that do not
/// look like a dropped end time, then the most recently written row.
///
/// The raw reply is not stored, so "after T" cannot be told apart from a
/// lost end directly. An "after" answer starts in the afternoon or evening;
/// a timed row that starts in the morning and still runs to 23:59 is the
/// one treated as suspect.
fn plausibility(interval: &AvailabilityInterval, seq: i64) -> (bool, bool, i64) {
    (interval.all_day, !lost_end_time(interval), seq)
}

fn lost_end_time(interval: &AvailabilityInterval) -> bool {
    !interval.all_day && interval.end == DAY_END && interval.start < NOON
}

async fn delete_orphan_guests(conn: &mut SqliteConnection) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM guests WHERE event_id NOT IN (SELECT id FROM events)")
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete orphan guests: {e}")))?;
    Ok(result.rows_affected())
}

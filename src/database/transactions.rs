// ABOUTME: Transaction guard with rollback on drop, plus retry with backoff for SQLite lock contention
// ABOUTME: The router wraps each inbound message in one guard and retries when the store is busy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Transaction management
//!
//! - [`TransactionGuard`] rolls back automatically if dropped uncommitted,
//!   which is what happens when a handler returns early with an error or
//!   the transport cancels the request future.
//! - [`retry_transaction`] re-runs a whole unit of work when `SQLite`
//!   reports the database as locked or busy.
//!
//! ```text
//! retry_transaction(|| async {
//!     let mut guard = db.begin().await?;
//!     planners::insert(guard.executor()?, &planner).await?;
//!     guard.commit().await
//! }, 3).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use sqlx::{Database, Transaction};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::errors::{AppError, AppResult};

/// Default attempts for one inbound message's write phase
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Retry an operation when it fails with a transient lock error.
///
/// Backoff doubles from 20ms. Non-retryable errors return immediately.
///
/// # Errors
///
/// Returns the last error once `max_retries` attempts have failed, or the
/// first non-retryable error.
pub async fn retry_transaction<F, Fut, T>(mut f: F, max_retries: u32) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempts = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if attempts >= max_retries {
                    error!(
                        attempts = attempts,
                        max_retries = max_retries,
                        error = %e,
                        "Transaction failed after max retries"
                    );
                    return Err(e);
                }

                if is_retryable_error(&e) {
                    let backoff_ms = 10 * (1_u64 << attempts);
                    warn!(
                        attempt = attempts,
                        backoff_ms = backoff_ms,
                        error = %e,
                        "Transaction failed with retryable error, retrying after backoff"
                    );
                    sleep(Duration::from_millis(backoff_ms)).await;
                } else {
                    debug!(error = %e, "Transaction failed with non-retryable error");
                    return Err(e);
                }
            }
        }
    }
}

/// Whether an error is transient lock contention
fn is_retryable_error(error: &AppError) -> bool {
    if !error.is_database() {
        return false;
    }
    let message = format!("{error:?}").to_lowercase();
    if message.contains("unique constraint")
        || message.contains("foreign key constraint")
        || message.contains("not null constraint")
    {
        return false;
    }
    message.contains("database is locked")
        || message.contains("locked")
        || message.contains("busy")
        || message.contains("timed out")
        || message.contains("timeout")
}

/// RAII guard for a database transaction
pub struct TransactionGuard<'c, DB: Database> {
    transaction: Option<Transaction<'c, DB>>,
    committed: bool,
}

impl<'c, DB: Database> TransactionGuard<'c, DB> {
    /// Wrap a transaction obtained from `pool.begin()`
    #[must_use]
    pub fn new(transaction: Transaction<'c, DB>) -> Self {
        Self {
            transaction: Some(transaction),
            committed: false,
        }
    }

    /// Commit the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails or the guard was already used up.
    pub async fn commit(mut self) -> AppResult<()> {
        match self.transaction.take() {
            Some(tx) => {
                tx.commit()
                    .await
                    .map_err(|e| AppError::database(format!("Transaction commit failed: {e}")))?;
                self.committed = true;
                debug!("Transaction committed");
                Ok(())
            }
            None => Err(AppError::internal(
                "Transaction already consumed - cannot commit",
            )),
        }
    }

    /// Roll back explicitly and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails or the guard was already used up.
    pub async fn rollback(mut self) -> AppResult<()> {
        match self.transaction.take() {
            Some(tx) => {
                tx.rollback()
                    .await
                    .map_err(|e| AppError::database(format!("Transaction rollback failed: {e}")))?;
                debug!("Transaction rolled back");
                Ok(())
            }
            None => Err(AppError::internal(
                "Transaction already consumed - cannot rollback",
            )),
        }
    }

    /// Whether `commit` succeeded
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        self.committed
    }

    /// Connection to run queries on inside the transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was already committed or rolled back.
    pub fn executor(&mut self) -> AppResult<&mut <DB as Database>::Connection> {
        self.transaction.as_deref_mut().ok_or_else(|| {
            AppError::internal("Transaction already consumed - guard used after commit/rollback")
        })
    }
}

impl<DB: Database> Drop for TransactionGuard<'_, DB> {
    fn drop(&mut self) {
        if self.transaction.is_some() && !self.committed {
            warn!("Transaction dropped without commit - rolling back");
        }
    }
}

/// `SQLite` transaction guard
pub type SqliteTransactionGuard<'c> = TransactionGuard<'c, sqlx::Sqlite>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_recovers_from_lock_contention() {
        let calls = AtomicU32::new(0);
        let result = retry_transaction(
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(AppError::database("database is locked"))
                } else {
                    Ok(7)
                }
            },
            3,
        )
        .await;
        assert_eq!(result.ok(), Some(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_on_constraint_violation() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = retry_transaction(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::database("UNIQUE constraint failed: planners.phone"))
            },
            3,
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_ignores_non_store_errors() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = retry_transaction(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::internal("busy doing something else"))
            },
            3,
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

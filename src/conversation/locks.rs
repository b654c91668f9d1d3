// ABOUTME: Per-phone async mutex table that keeps messages from one sender from interleaving
// ABOUTME: Uses a sharded DashMap of tokio mutexes; idle entries are pruned after release
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Serializes inbound handling per canonical phone
#[derive(Clone, Default)]
pub struct PhoneLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl PhoneLocks {
    /// Empty lock table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of `phone`
    pub async fn acquire(&self, phone: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(phone.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop entries nobody holds or waits on
    pub fn prune(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of phones currently tracked
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no phone is tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

//! Per-summary exclusive sections.
//!
//! Every mutating operation must hold the lock of each summary whose totals
//! it will rewrite, so at most one in-flight mutation touches a given summary
//! at a time while operations on unrelated summaries proceed in parallel.
//! Moves that span two summaries acquire both locks in ascending-id order,
//! which rules out deadlock between concurrent cross-summary moves.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of per-summary-id async locks.
///
/// Handles are created on first use and kept for the life of the registry;
/// the map is bounded by the number of distinct summaries ever touched.
#[derive(Clone, Default)]
pub struct SummaryLocks {
    registry: Arc<Mutex<HashMap<i32, Arc<AsyncMutex<()>>>>>,
}

impl SummaryLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, summary_id: i32) -> Arc<AsyncMutex<()>> {
        // The registry map guard is held only for the lookup, never across
        // an await. A poisoned map still holds valid handles, keep using it.
        let mut registry = match self.registry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(registry.entry(summary_id).or_default())
    }

    /// Acquires the exclusive section for one summary.
    pub async fn acquire(&self, summary_id: i32) -> OwnedMutexGuard<()> {
        self.handle(summary_id).lock_owned().await
    }

    /// Acquires the exclusive sections for several summaries in ascending-id
    /// order, deduplicating repeats.
    pub async fn acquire_ordered(&self, summary_ids: &[i32]) -> Vec<OwnedMutexGuard<()>> {
        let mut ids = summary_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.acquire(id).await);
        }
        guards
    }
}

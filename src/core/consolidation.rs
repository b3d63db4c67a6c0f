//! Consolidation engine - the stateful orchestrator owning the
//! attach/detach/recompute protocol.
//!
//! Every mutating operation follows the same discipline: validate and
//! allocate before touching anything, take the exclusive section of each
//! summary whose totals will change, rewrite rows inside one database
//! transaction, and only then announce the committed snapshot. Totals are
//! always rebuilt from the full attached detail set by [`totals_of`], never
//! patched incrementally, so the stored rollup cannot drift from the rows
//! that back it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Set, TransactionTrait};
use tokio::sync::Mutex as AsyncMutex;
use tracing::info;

use crate::{
    core::{allocation, locks::SummaryLocks, rcc_detail::DetailDraft, validate},
    entities::{rcc, rcc_detail},
    errors::{Error, Result},
    notify::{SummaryHub, SummaryUpdate},
};

/// The three derived rollups of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    /// Sum of `value_devices` over the attached details
    pub equipment: Decimal,
    /// Sum of `value_services` over the attached details
    pub service: Decimal,
    /// Sum of `fee - total_fee` over the attached details
    pub company: Decimal,
}

/// Derives a summary's totals from its attached detail set.
///
/// This is the only place totals are computed; every mutating operation and
/// the consistency audit go through it.
#[must_use]
pub fn totals_of(details: &[rcc_detail::Model]) -> Totals {
    let mut totals = Totals::default();
    for detail in details {
        totals.equipment += Decimal::from(detail.value_devices);
        totals.service += Decimal::from(detail.value_services);
        totals.company += Decimal::from(detail.fee - detail.total_fee);
    }
    totals
}

/// Outcome of a consistency audit over one summary: the stored totals next
/// to the totals re-derived from the attached details, without mutating
/// either.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyReport {
    /// The audited summary
    pub rcc_id: i32,
    /// Totals as persisted on the summary row
    pub stored: Totals,
    /// Totals re-derived from the attached details
    pub derived: Totals,
    /// Number of attached details at audit time
    pub detail_count: usize,
    /// When the audit ran
    pub checked_at: DateTime<Utc>,
}

impl ConsistencyReport {
    /// True when the stored totals match the derived ones exactly.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.stored == self.derived
    }
}

/// Rebuilds and persists a summary's totals from its current attached set.
/// Returns the updated summary and the size of the set it aggregated.
async fn refresh_totals<C>(db: &C, summary_id: i32) -> Result<(rcc::Model, usize)>
where
    C: ConnectionTrait,
{
    let summary = crate::core::rcc::get_summary_by_id(db, summary_id)
        .await?
        .ok_or(Error::SummaryNotFound { id: summary_id })?;

    let details = crate::core::rcc_detail::get_details_for_summary(db, summary_id).await?;
    let totals = totals_of(&details);

    let mut model: rcc::ActiveModel = summary.into();
    model.equipment_total = Set(totals.equipment);
    model.service_total = Set(totals.service);
    model.company_total = Set(totals.company);
    let updated = model.update(db).await?;

    Ok((updated, details.len()))
}

/// The consolidation engine.
///
/// Holds the store connection, the per-summary lock registry, and the
/// notification hub. One instance is shared by all callers; operations on
/// different summaries run fully in parallel, operations on the same summary
/// serialize on its lock.
pub struct ConsolidationEngine {
    db: DatabaseConnection,
    locks: SummaryLocks,
    hub: SummaryHub,
    // Serializes lazy summary creation so two concurrent submits cannot
    // insert duplicate (account, period) rows.
    create_guard: AsyncMutex<()>,
}

impl ConsolidationEngine {
    /// Creates an engine over the given store and notification hub.
    #[must_use]
    pub fn new(db: DatabaseConnection, hub: SummaryHub) -> Self {
        Self {
            db,
            locks: SummaryLocks::new(),
            hub,
            create_guard: AsyncMutex::new(()),
        }
    }

    /// Locates the summary for an `(account, period)` pair, creating it
    /// lazily on first use.
    async fn find_or_create_summary(&self, account: i32, period: &str) -> Result<rcc::Model> {
        if let Some(summary) = crate::core::rcc::find_summary(&self.db, account, period).await? {
            return Ok(summary);
        }

        let _create = self.create_guard.lock().await;
        // Re-check under the guard; a concurrent caller may have created it
        if let Some(summary) = crate::core::rcc::find_summary(&self.db, account, period).await? {
            return Ok(summary);
        }

        let summary = crate::core::rcc::create_summary(&self.db, account, period).await?;
        info!(summary = summary.id, account, period, "created summary for period");
        Ok(summary)
    }

    /// Consolidates a newly submitted detail line into the summary for
    /// `(account, period)`.
    ///
    /// Validates the draft, allocates its fee, attaches it to the summary
    /// (created lazily if needed), rebuilds the summary's totals from the
    /// full attached set, persists detail and summary in one transaction,
    /// and publishes the committed snapshot.
    ///
    /// Returns the persisted detail id and the updated summary.
    ///
    /// # Errors
    /// [`Error::Validation`] or [`Error::Allocation`] if the draft is
    /// malformed; both are reported before any lock is taken or row written.
    pub async fn submit(
        &self,
        draft: DetailDraft,
        account: i32,
        period: &str,
    ) -> Result<(i32, rcc::Model)> {
        validate::validate_draft(&draft)?;
        let total_fee = allocation::allocate(draft.fee, draft.paid_by, draft.subsidy)?;

        let summary = self.find_or_create_summary(account, period).await?;
        let _guard = self.locks.acquire(summary.id).await;

        let txn = self.db.begin().await?;
        let detail =
            crate::core::rcc_detail::insert_detail(&txn, draft, Some(summary.id), total_fee)
                .await?;
        let (updated, _) = refresh_totals(&txn, summary.id).await?;
        txn.commit().await?;

        info!(
            detail = detail.id,
            summary = updated.id,
            account,
            period,
            "consolidated new detail line"
        );
        self.hub.publish(SummaryUpdate::from(&updated));

        Ok((detail.id, updated))
    }

    /// Moves a detail line to the summary for `(account, period)`, rebuilding
    /// the totals of both the previous and the target summary in one
    /// transaction and publishing snapshots for each.
    ///
    /// Returns the updated target summary and, when the detail actually left
    /// another summary, that summary's updated state.
    ///
    /// # Errors
    /// [`Error::DetailNotFound`] if no detail with that id exists.
    pub async fn reattach(
        &self,
        detail_id: i32,
        account: i32,
        period: &str,
    ) -> Result<(rcc::Model, Option<rcc::Model>)> {
        let target = self.find_or_create_summary(account, period).await?;

        loop {
            let detail = crate::core::rcc_detail::get_detail_by_id(&self.db, detail_id)
                .await?
                .ok_or(Error::DetailNotFound { id: detail_id })?;
            let planned_owner = detail.rcc_id;

            let mut lock_ids = vec![target.id];
            if let Some(owner) = planned_owner {
                lock_ids.push(owner);
            }
            // Both locks taken in ascending-id order
            let _guards = self.locks.acquire_ordered(&lock_ids).await;

            let txn = self.db.begin().await?;
            let current = crate::core::rcc_detail::get_detail_by_id(&txn, detail_id)
                .await?
                .ok_or(Error::DetailNotFound { id: detail_id })?;
            if current.rcc_id != planned_owner {
                // A concurrent move changed the owner between planning the
                // lock set and acquiring it; replan with the fresh owner
                txn.rollback().await?;
                continue;
            }

            let moved_from = planned_owner.filter(|owner| *owner != target.id);
            crate::core::rcc_detail::set_detail_owner(&txn, current, Some(target.id)).await?;
            let (updated_target, _) = refresh_totals(&txn, target.id).await?;
            let updated_previous = match moved_from {
                Some(owner) => Some(refresh_totals(&txn, owner).await?.0),
                None => None,
            };
            txn.commit().await?;

            info!(
                detail = detail_id,
                from = moved_from,
                to = updated_target.id,
                "reattached detail line"
            );
            self.hub.publish(SummaryUpdate::from(&updated_target));
            if let Some(previous) = &updated_previous {
                self.hub.publish(SummaryUpdate::from(previous));
            }

            return Ok((updated_target, updated_previous));
        }
    }

    /// Detaches a detail line from its owning summary, leaving the line
    /// pending consolidation and the summary's totals rebuilt without it.
    ///
    /// Returns the updated previous summary, or None when the line was
    /// already unattached. A summary left with zero details keeps its row,
    /// with all totals at zero.
    ///
    /// # Errors
    /// [`Error::DetailNotFound`] if no detail with that id exists.
    pub async fn detach(&self, detail_id: i32) -> Result<Option<rcc::Model>> {
        loop {
            let detail = crate::core::rcc_detail::get_detail_by_id(&self.db, detail_id)
                .await?
                .ok_or(Error::DetailNotFound { id: detail_id })?;
            let Some(owner) = detail.rcc_id else {
                return Ok(None);
            };

            let _guard = self.locks.acquire(owner).await;

            let txn = self.db.begin().await?;
            let current = crate::core::rcc_detail::get_detail_by_id(&txn, detail_id)
                .await?
                .ok_or(Error::DetailNotFound { id: detail_id })?;
            if current.rcc_id != Some(owner) {
                txn.rollback().await?;
                continue;
            }

            crate::core::rcc_detail::set_detail_owner(&txn, current, None).await?;
            let (updated, remaining) = refresh_totals(&txn, owner).await?;
            txn.commit().await?;

            info!(detail = detail_id, summary = updated.id, "detached detail line");
            if remaining == 0 {
                info!(summary = updated.id, "summary is now empty, row retained");
            }
            self.hub.publish(SummaryUpdate::from(&updated));

            return Ok(Some(updated));
        }
    }

    /// Idempotently rebuilds a summary's totals from its attached details.
    ///
    /// Used internally by every mutation and available as a repair operation:
    /// invoking it any number of times on an unchanged attachment set yields
    /// identical totals.
    ///
    /// # Errors
    /// [`Error::SummaryNotFound`] if no summary with that id exists.
    pub async fn recompute(&self, summary_id: i32) -> Result<rcc::Model> {
        let _guard = self.locks.acquire(summary_id).await;

        let txn = self.db.begin().await?;
        let (updated, _) = refresh_totals(&txn, summary_id).await?;
        txn.commit().await?;

        info!(summary = updated.id, "recomputed summary totals");
        self.hub.publish(SummaryUpdate::from(&updated));

        Ok(updated)
    }

    /// Re-derives a summary's totals and compares them against the stored
    /// values, without mutating anything.
    ///
    /// Runs concurrently with reads; it does not take the summary's mutation
    /// lock. Used for periodic consistency audits, where drift is reported
    /// for an operator to inspect rather than silently corrected.
    ///
    /// # Errors
    /// [`Error::SummaryNotFound`] if no summary with that id exists.
    pub async fn audit(&self, summary_id: i32) -> Result<ConsistencyReport> {
        let summary = crate::core::rcc::get_summary_by_id(&self.db, summary_id)
            .await?
            .ok_or(Error::SummaryNotFound { id: summary_id })?;

        let details =
            crate::core::rcc_detail::get_details_for_summary(&self.db, summary_id).await?;

        Ok(ConsistencyReport {
            rcc_id: summary_id,
            stored: Totals {
                equipment: summary.equipment_total,
                service: summary.service_total,
                company: summary.company_total,
            },
            derived: totals_of(&details),
            detail_count: details.len(),
            checked_at: Utc::now(),
        })
    }
}

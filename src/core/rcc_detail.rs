//! Detail record business logic - queries and insertion for phone-line
//! line items.
//!
//! Attachment (setting or clearing the owning summary) goes through the
//! consolidation engine so the summary totals are rebuilt in the same
//! database transaction; the helpers here are generic over
//! [`ConnectionTrait`] so they run against the pool or an open transaction.

use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, QueryOrder, Set, prelude::*};
use uuid::Uuid;

use crate::{
    entities::{RccDetail, rcc_detail},
    errors::Result,
};

/// A client-submitted detail line, before it is validated, allocated, and
/// attached to a summary.
///
/// Carries every persisted field except the generated id, the owning summary
/// reference, and the derived `total_fee` - those are assigned by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailDraft {
    /// Collaborator the line belongs to, supplied by the identity provider
    pub collaborator_id: Uuid,
    /// 10-digit phone line
    pub phoneline: String,
    /// Services cost component, non-negative
    pub value_services: i32,
    /// Equipment cost component, non-negative
    pub value_devices: i32,
    /// Base fee before allocation, non-negative
    pub fee: i32,
    /// Optional free-text description
    pub description: Option<String>,
    /// True when the collaborator pays the line directly
    pub paid_by: bool,
    /// Company contribution toward the line, within `[0, fee]`
    pub subsidy: Decimal,
    /// Reporting classification code
    pub group_code: i16,
    /// Collaborator classification code
    pub ci_collaborator: i16,
}

/// Retrieves a specific detail record by its unique id.
///
/// Returns None if the detail does not exist, letting callers decide whether
/// a missing record is an error for their operation.
pub async fn get_detail_by_id<C>(db: &C, detail_id: i32) -> Result<Option<rcc_detail::Model>>
where
    C: ConnectionTrait,
{
    RccDetail::find_by_id(detail_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all detail records attached to the given summary, ordered by id.
///
/// This is the authoritative set the engine aggregates over when it rebuilds
/// a summary's totals.
pub async fn get_details_for_summary<C>(db: &C, rcc_id: i32) -> Result<Vec<rcc_detail::Model>>
where
    C: ConnectionTrait,
{
    RccDetail::find()
        .filter(rcc_detail::Column::RccId.eq(rcc_id))
        .order_by_asc(rcc_detail::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all detail records still pending consolidation (no owning
/// summary), ordered by id.
pub async fn get_unattached_details(db: &DatabaseConnection) -> Result<Vec<rcc_detail::Model>> {
    RccDetail::find()
        .filter(rcc_detail::Column::RccId.is_null())
        .order_by_asc(rcc_detail::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every detail record in the store, ordered by id.
///
/// Used by line-listing views and by operators inspecting a period.
pub async fn get_all_details(db: &DatabaseConnection) -> Result<Vec<rcc_detail::Model>> {
    RccDetail::find()
        .order_by_asc(rcc_detail::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Inserts a new detail row from a draft, with the owner and the derived
/// `total_fee` the engine computed for it.
///
/// Callers are expected to have validated the draft and allocated the fee
/// already; this helper only persists.
pub async fn insert_detail<C>(
    db: &C,
    draft: DetailDraft,
    rcc_id: Option<i32>,
    total_fee: i32,
) -> Result<rcc_detail::Model>
where
    C: ConnectionTrait,
{
    let detail = rcc_detail::ActiveModel {
        rcc_id: Set(rcc_id),
        collaborator_id: Set(draft.collaborator_id),
        phoneline: Set(draft.phoneline),
        value_services: Set(draft.value_services),
        value_devices: Set(draft.value_devices),
        fee: Set(draft.fee),
        total_fee: Set(total_fee),
        description: Set(draft.description),
        paid_by: Set(draft.paid_by),
        subsidy: Set(draft.subsidy),
        group_code: Set(draft.group_code),
        ci_collaborator: Set(draft.ci_collaborator),
        ..Default::default()
    };

    detail.insert(db).await.map_err(Into::into)
}

/// Moves a detail to a new owner (or clears the owner with None).
///
/// Only the owning reference changes; the line's own fields, including its
/// allocated `total_fee`, are independent of attachment.
pub async fn set_detail_owner<C>(
    db: &C,
    detail: rcc_detail::Model,
    rcc_id: Option<i32>,
) -> Result<rcc_detail::Model>
where
    C: ConnectionTrait,
{
    let mut model: rcc_detail::ActiveModel = detail.into();
    model.rcc_id = Set(rcc_id);
    model.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_insert_and_get_detail_by_id() -> Result<()> {
        let db = setup_test_db().await?;

        let detail = insert_detail(&db, test_draft("3001234567", 1000), None, 1000).await?;
        assert_eq!(detail.phoneline, "3001234567");
        assert_eq!(detail.fee, 1000);
        assert_eq!(detail.total_fee, 1000);
        assert_eq!(detail.rcc_id, None);

        let found = get_detail_by_id(&db, detail.id).await?;
        assert_eq!(found, Some(detail));

        let not_found = get_detail_by_id(&db, 999).await?;
        assert!(not_found.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_get_details_for_summary_filters_by_owner() -> Result<()> {
        let db = setup_test_db().await?;

        let summary_a = crate::core::rcc::create_summary(&db, 10, "2022-04").await?;
        let summary_b = crate::core::rcc::create_summary(&db, 11, "2022-04").await?;

        let in_a = insert_detail(&db, test_draft("3001111111", 100), Some(summary_a.id), 100)
            .await?;
        let in_b = insert_detail(&db, test_draft("3002222222", 200), Some(summary_b.id), 200)
            .await?;
        insert_detail(&db, test_draft("3003333333", 300), None, 300).await?;

        let details_a = get_details_for_summary(&db, summary_a.id).await?;
        assert_eq!(details_a, vec![in_a]);

        let details_b = get_details_for_summary(&db, summary_b.id).await?;
        assert_eq!(details_b, vec![in_b]);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_unattached_details_is_the_pending_queue() -> Result<()> {
        let db = setup_test_db().await?;

        let summary = crate::core::rcc::create_summary(&db, 10, "2022-04").await?;
        insert_detail(&db, test_draft("3001111111", 100), Some(summary.id), 100).await?;
        let pending = insert_detail(&db, test_draft("3002222222", 200), None, 200).await?;

        let unattached = get_unattached_details(&db).await?;
        assert_eq!(unattached, vec![pending]);

        let all = get_all_details(&db).await?;
        assert_eq!(all.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_detail_owner_moves_and_clears() -> Result<()> {
        let db = setup_test_db().await?;

        let summary = crate::core::rcc::create_summary(&db, 10, "2022-04").await?;
        let detail = insert_detail(&db, test_draft("3001234567", 100), None, 100).await?;

        let attached = set_detail_owner(&db, detail, Some(summary.id)).await?;
        assert_eq!(attached.rcc_id, Some(summary.id));

        let cleared = set_detail_owner(&db, attached, None).await?;
        assert_eq!(cleared.rcc_id, None);

        // The line's own fields are untouched by ownership changes
        assert_eq!(cleared.fee, 100);
        assert_eq!(cleared.total_fee, 100);

        Ok(())
    }
}

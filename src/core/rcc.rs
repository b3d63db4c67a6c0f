//! Summary record business logic - queries and creation for per-account,
//! per-period rollups.
//!
//! Totals are never written here; they are derived fields owned by the
//! consolidation engine, which rebuilds them from the attached detail set
//! inside the same transaction as every attachment change.

use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, QueryOrder, Set, prelude::*};

use crate::{
    entities::{Rcc, rcc},
    errors::Result,
};

/// Finds a summary by its unique id.
pub async fn get_summary_by_id<C>(db: &C, summary_id: i32) -> Result<Option<rcc::Model>>
where
    C: ConnectionTrait,
{
    Rcc::find_by_id(summary_id).one(db).await.map_err(Into::into)
}

/// Finds the summary for an `(account, period)` pair, returning None when no
/// detail line has targeted that pair yet.
pub async fn find_summary<C>(db: &C, account: i32, period: &str) -> Result<Option<rcc::Model>>
where
    C: ConnectionTrait,
{
    Rcc::find()
        .filter(rcc::Column::Account.eq(account))
        .filter(rcc::Column::RccDate.eq(period))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every summary in the store, ordered by account and period.
///
/// Used by the summary listing view and by the consistency audit sweep.
pub async fn get_all_summaries(db: &DatabaseConnection) -> Result<Vec<rcc::Model>> {
    Rcc::find()
        .order_by_asc(rcc::Column::Account)
        .order_by_asc(rcc::Column::RccDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a new, empty summary for an `(account, period)` pair.
///
/// Summaries are created lazily, the first time a detail line targets the
/// pair; they start with zero totals and gain their real totals when the
/// engine attaches the first line.
pub async fn create_summary<C>(db: &C, account: i32, period: &str) -> Result<rcc::Model>
where
    C: ConnectionTrait,
{
    let summary = rcc::ActiveModel {
        rcc_date: Set(period.to_string()),
        account: Set(account),
        equipment_total: Set(Decimal::ZERO),
        service_total: Set(Decimal::ZERO),
        company_total: Set(Decimal::ZERO),
        ..Default::default()
    };

    summary.insert(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_summary_starts_empty() -> Result<()> {
        let db = setup_test_db().await?;

        let summary = create_summary(&db, 42, "2022-04").await?;
        assert_eq!(summary.account, 42);
        assert_eq!(summary.rcc_date, "2022-04");
        assert_eq!(summary.equipment_total, Decimal::ZERO);
        assert_eq!(summary.service_total, Decimal::ZERO);
        assert_eq!(summary.company_total, Decimal::ZERO);

        Ok(())
    }

    #[tokio::test]
    async fn test_find_summary_matches_account_and_period() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_summary(&db, 42, "2022-04").await?;
        create_summary(&db, 42, "2022-05").await?;
        create_summary(&db, 43, "2022-04").await?;

        let found = find_summary(&db, 42, "2022-04").await?;
        assert_eq!(found, Some(created));

        let missing = find_summary(&db, 42, "2022-06").await?;
        assert!(missing.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_summaries_orders_by_account_then_period() -> Result<()> {
        let db = setup_test_db().await?;

        create_summary(&db, 43, "2022-04").await?;
        create_summary(&db, 42, "2022-05").await?;
        create_summary(&db, 42, "2022-04").await?;

        let summaries = get_all_summaries(&db).await?;
        let keys: Vec<(i32, &str)> = summaries
            .iter()
            .map(|s| (s.account, s.rcc_date.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![(42, "2022-04"), (42, "2022-05"), (43, "2022-04")]
        );

        Ok(())
    }
}

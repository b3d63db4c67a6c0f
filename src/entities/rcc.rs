//! Rcc entity - the per-account, per-period billing summary.
//!
//! Each summary rolls up the phone-line detail records currently attached to
//! it. The three totals are derived fields: they always equal the aggregation
//! over the attached details and are only ever written by the consolidation
//! engine, never by a caller.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Summary database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rcc")]
pub struct Model {
    /// Unique identifier for the summary
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Billing period marker (e.g., "2022-04")
    pub rcc_date: String,
    /// Account code the summary belongs to
    pub account: i32,
    /// Sum of `value_devices` over the attached details
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub equipment_total: Decimal,
    /// Sum of `value_services` over the attached details
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub service_total: Decimal,
    /// Sum of `fee - total_fee` over the attached details, the portion of
    /// each line's base fee the company absorbed
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub company_total: Decimal,
}

/// Defines relationships between Rcc and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One summary owns many detail records
    #[sea_orm(has_many = "super::rcc_detail::Entity")]
    RccDetails,
}

impl Related<super::rcc_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RccDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! `RccDetail` entity - one billable phone-line line item.
//!
//! Each detail carries a `collaborator_id` (owned by the identity provider,
//! referenced here), the line's cost components, and a nullable `rcc_id`
//! pointing at the owning summary. A `None` owner means the line is
//! unassigned and pending consolidation; a detail is never attached to two
//! summaries at once. `total_fee` is derived by the allocation rule and is
//! never set directly by a caller.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Detail database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rcc_detail")]
pub struct Model {
    /// Unique identifier for the detail, immutable once assigned
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Owning summary, or None while the line is pending consolidation
    pub rcc_id: Option<i32>,
    /// Identifier of the collaborator the line belongs to
    pub collaborator_id: Uuid,
    /// 10-digit phone line, format-validated at the boundary
    pub phoneline: String,
    /// Services cost component of the line, in whole monetary units
    pub value_services: i32,
    /// Equipment cost component of the line, in whole monetary units
    pub value_devices: i32,
    /// Base fee charged for the line before allocation
    pub fee: i32,
    /// Fee actually billed to the collaborator after allocation
    pub total_fee: i32,
    /// Optional free-text description
    pub description: Option<String>,
    /// True when the collaborator pays the line directly, false when the
    /// company absorbs it
    pub paid_by: bool,
    /// Amount the company contributes toward this line
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub subsidy: Decimal,
    /// Classification code used to bucket lines for reporting
    pub group_code: i16,
    /// Collaborator classification code, opaque to the engine
    pub ci_collaborator: i16,
}

/// Defines relationships between `RccDetail` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each detail belongs to at most one summary
    #[sea_orm(
        belongs_to = "super::rcc::Entity",
        from = "Column::RccId",
        to = "super::rcc::Column::Id"
    )]
    Rcc,
}

impl Related<super::rcc::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rcc.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

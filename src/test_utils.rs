//! Shared test utilities for the consolidation engine.
//!
//! This module provides common helper functions for setting up test databases
//! and building detail drafts with sensible defaults.

use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, DatabaseConnection};
use uuid::Uuid;

use crate::{
    core::{consolidation::ConsolidationEngine, rcc_detail::DetailDraft},
    errors::Result,
    notify::SummaryHub,
};

/// Creates an in-memory `SQLite` database with both tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    // A single pooled connection, so every task in a test observes the same
    // in-memory database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);

    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a detail draft with sensible defaults.
///
/// # Arguments
/// * `phoneline` - Phone line string (pass a malformed one to exercise the
///   validator)
/// * `fee` - Base fee of the line
///
/// # Defaults
/// * `collaborator_id`: fresh random id
/// * `value_services` / `value_devices`: 0
/// * `description`: None
/// * `paid_by`: true
/// * `subsidy`: 0
/// * `group_code` / `ci_collaborator`: 0
#[must_use]
pub fn test_draft(phoneline: &str, fee: i32) -> DetailDraft {
    DetailDraft {
        collaborator_id: Uuid::new_v4(),
        phoneline: phoneline.to_string(),
        value_services: 0,
        value_devices: 0,
        fee,
        description: None,
        paid_by: true,
        subsidy: Decimal::ZERO,
        group_code: 0,
        ci_collaborator: 0,
    }
}

/// Sets up a complete test environment: in-memory database, notification
/// hub, and an engine over both. Returns (db, engine, hub) so tests can
/// inspect the store and subscribe to updates directly.
pub async fn setup_engine() -> Result<(DatabaseConnection, ConsolidationEngine, SummaryHub)> {
    let db = setup_test_db().await?;
    let hub = SummaryHub::new(16);
    let engine = ConsolidationEngine::new(db.clone(), hub.clone());
    Ok((db, engine, hub))
}

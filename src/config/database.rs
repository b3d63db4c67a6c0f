//! Database connection and table creation using `SeaORM`.
//!
//! The schema is generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the persisted tables always match
//! the Rust struct definitions without hand-written SQL.

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

use crate::entities::{Rcc, RccDetail};
use crate::errors::Result;

/// Establishes a connection to the store.
///
/// # Errors
/// Returns [`crate::errors::Error::Database`] if the connection cannot be
/// established.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the `rcc` and `rcc_detail` tables from the entity definitions.
///
/// # Errors
/// Returns [`crate::errors::Error::Database`] if a table cannot be created.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let rcc_table = schema.create_table_from_entity(Rcc);
    let rcc_detail_table = schema.create_table_from_entity(RccDetail);

    db.execute(builder.build(&rcc_table)).await?;
    db.execute(builder.build(&rcc_detail_table)).await?;

    Ok(())
}

//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod rcc;
pub mod rcc_detail;

// Re-export specific types to avoid conflicts
pub use rcc::{Column as RccColumn, Entity as Rcc, Model as RccModel};
pub use rcc_detail::{Column as RccDetailColumn, Entity as RccDetail, Model as RccDetailModel};

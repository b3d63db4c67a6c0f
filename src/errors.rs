//! Unified error types and result handling for the consolidation engine.
//!
//! Every fallible operation in the crate returns [`Result`]. Validation and
//! allocation failures are reported before any row is written; database
//! failures abort the surrounding transaction, so a summary and its detail
//! lines are never committed out of sync.

use rust_decimal::Decimal;
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A submitted detail line failed boundary validation.
    #[error("validation failed for `{field}`: {message}")]
    Validation {
        /// The offending field.
        field: &'static str,
        /// Human-readable description of the constraint that was violated.
        message: String,
    },

    /// The fee allocation was asked to grant a subsidy the fee cannot cover.
    #[error("cannot allocate fee {fee} with subsidy {subsidy}")]
    Allocation {
        /// Base fee of the line.
        fee: i32,
        /// Requested company subsidy.
        subsidy: Decimal,
    },

    /// A referenced detail record does not exist.
    #[error("detail record {id} not found")]
    DetailNotFound {
        /// The missing detail id.
        id: i32,
    },

    /// A referenced summary record does not exist.
    #[error("summary record {id} not found")]
    SummaryNotFound {
        /// The missing summary id.
        id: i32,
    },

    /// A consistency audit found stored totals that drifted from the
    /// attached detail lines. Reported, never auto-corrected.
    #[error("summary record {id} totals drifted from its attached details")]
    Consistency {
        /// The drifted summary id.
        id: i32,
    },

    /// Failed to load or parse application configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong while loading or parsing configuration.
        message: String,
    },

    /// The store rejected or could not confirm a write. Surfaced to the
    /// caller as a failed operation; the engine does not retry internally,
    /// idempotent retry is the store's responsibility.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Underlying I/O failure, typically while reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

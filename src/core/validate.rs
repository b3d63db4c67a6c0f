//! Boundary validation for submitted detail lines.
//!
//! Malformed drafts are rejected here, before the engine takes any lock or
//! writes any row. The checks mirror what the line-entry form promises: a
//! 10-digit phone line, non-negative amounts, and a subsidy the fee can
//! cover. The engine itself does not re-validate formats; it trusts drafts
//! that passed this gate.

use rust_decimal::Decimal;

use crate::{
    core::rcc_detail::DetailDraft,
    errors::{Error, Result},
};

/// Length every phone line must have, in digits.
pub const PHONELINE_LEN: usize = 10;

/// Checks a submitted draft against the boundary constraints.
///
/// Pure and side-effect free: a failed check names the offending field and
/// leaves nothing behind.
///
/// # Errors
/// Returns [`Error::Validation`] naming the first field that violates its
/// constraint.
pub fn validate_draft(draft: &DetailDraft) -> Result<()> {
    if draft.phoneline.is_empty() {
        return Err(Error::Validation {
            field: "phoneline",
            message: "phone line is required".to_string(),
        });
    }

    if draft.phoneline.len() != PHONELINE_LEN
        || !draft.phoneline.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(Error::Validation {
            field: "phoneline",
            message: format!("phone line must be exactly {PHONELINE_LEN} digits"),
        });
    }

    if draft.value_services < 0 {
        return Err(Error::Validation {
            field: "value_services",
            message: "services value must be non-negative".to_string(),
        });
    }

    if draft.value_devices < 0 {
        return Err(Error::Validation {
            field: "value_devices",
            message: "devices value must be non-negative".to_string(),
        });
    }

    if draft.fee < 0 {
        return Err(Error::Validation {
            field: "fee",
            message: "fee must be non-negative".to_string(),
        });
    }

    if draft.subsidy < Decimal::ZERO {
        return Err(Error::Validation {
            field: "subsidy",
            message: "subsidy must be non-negative".to_string(),
        });
    }

    if draft.subsidy > Decimal::from(draft.fee) {
        return Err(Error::Validation {
            field: "subsidy",
            message: format!("subsidy {} cannot exceed the fee {}", draft.subsidy, draft.fee),
        });
    }

    Ok(())
}

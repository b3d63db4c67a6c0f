//! Fee allocation rule - splits a line's base fee between the collaborator
//! and the company.
//!
//! The rule is pure and deterministic: the billed amount depends only on the
//! line's own `(fee, paid_by, subsidy)` triple, never on which summary the
//! line is attached to. The company-funded share of a line is always
//! `fee - total_fee`, which is what the summary's company total accumulates.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::errors::{Error, Result};

/// Computes the fee actually billed to the collaborator for one line.
///
/// When `paid_by` is true the collaborator covers the full fee minus whatever
/// subsidy the company grants, so `total_fee = fee - subsidy`. When `paid_by`
/// is false the company covers the line entirely except the floor the
/// collaborator still owes, so `total_fee = subsidy`.
///
/// Fractional subsidies are settled to whole monetary units with
/// midpoint-away-from-zero rounding before the integer fee is produced. The
/// result always satisfies `0 <= total_fee <= fee`.
///
/// # Errors
/// Returns [`Error::Allocation`] if the subsidy is negative or exceeds the
/// fee. The validator already rejects both, but this is the last gate before
/// a monetary total is persisted, so the bounds are re-checked here.
pub fn allocate(fee: i32, paid_by: bool, subsidy: Decimal) -> Result<i32> {
    let fee_value = Decimal::from(fee);
    if fee < 0 || subsidy < Decimal::ZERO || subsidy > fee_value {
        return Err(Error::Allocation { fee, subsidy });
    }

    let billed = if paid_by { fee_value - subsidy } else { subsidy };
    let settled = billed.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    // settled is within [0, fee], so the conversion cannot actually fail
    settled
        .to_i32()
        .ok_or(Error::Allocation { fee, subsidy })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_collaborator_paid_line_is_fee_minus_subsidy() {
        assert_eq!(allocate(1000, true, Decimal::from(200)).unwrap(), 800);
    }

    #[test]
    fn test_company_paid_line_is_subsidy() {
        // The collaborator still owes the subsidy floor; the company funds
        // the remaining 800.
        assert_eq!(allocate(1000, false, Decimal::from(200)).unwrap(), 200);
    }

    #[test]
    fn test_zero_subsidy() {
        assert_eq!(allocate(500, true, Decimal::ZERO).unwrap(), 500);
        assert_eq!(allocate(500, false, Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn test_full_subsidy() {
        assert_eq!(allocate(500, true, Decimal::from(500)).unwrap(), 0);
        assert_eq!(allocate(500, false, Decimal::from(500)).unwrap(), 500);
    }

    #[test]
    fn test_zero_fee() {
        assert_eq!(allocate(0, true, Decimal::ZERO).unwrap(), 0);
        assert_eq!(allocate(0, false, Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn test_subsidy_exceeding_fee_is_rejected() {
        let result = allocate(100, true, Decimal::from(101));
        assert!(matches!(
            result.unwrap_err(),
            Error::Allocation { fee: 100, subsidy: _ }
        ));
    }

    #[test]
    fn test_negative_subsidy_is_rejected() {
        let result = allocate(100, false, Decimal::from(-1));
        assert!(matches!(result.unwrap_err(), Error::Allocation { .. }));
    }

    #[test]
    fn test_negative_fee_is_rejected() {
        let result = allocate(-100, true, Decimal::ZERO);
        assert!(matches!(result.unwrap_err(), Error::Allocation { .. }));
    }

    #[test]
    fn test_fractional_subsidy_settles_to_whole_units() {
        // 99.5 owed rounds away from zero to 100
        let half = Decimal::new(5, 1);
        assert_eq!(allocate(100, true, half).unwrap(), 100);
        // 0.5 owed rounds away from zero to 1
        assert_eq!(allocate(100, false, half).unwrap(), 1);

        let quarter = Decimal::new(25, 2);
        assert_eq!(allocate(100, true, quarter).unwrap(), 100);
        assert_eq!(allocate(100, false, quarter).unwrap(), 0);
    }

    #[test]
    fn test_billed_amount_stays_within_fee_bounds() {
        for fee in [0, 1, 2, 99, 100, 1000, i32::MAX / 2] {
            for subsidy in [
                Decimal::ZERO,
                Decimal::new(5, 1),
                Decimal::from(fee / 2),
                Decimal::from(fee),
            ] {
                if subsidy > Decimal::from(fee) {
                    continue;
                }
                for paid_by in [true, false] {
                    let total_fee = allocate(fee, paid_by, subsidy).unwrap();
                    assert!(total_fee >= 0, "fee {fee} subsidy {subsidy} went negative");
                    assert!(total_fee <= fee, "fee {fee} subsidy {subsidy} overshot");
                }
            }
        }
    }
}

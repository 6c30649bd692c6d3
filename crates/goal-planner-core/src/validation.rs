//! Rounding rules and caller-side input guards.
//!
//! Engine functions never call the guards themselves: they are total over
//! finite inputs. Callers run `validate()` on an input before handing it over
//! so that out-of-range values are reported instead of silently producing a
//! degenerate projection.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::PlannerError;
use crate::policy::MAX_PROJECTION_MONTHS;
use crate::types::{Money, Rate};
use crate::PlannerResult;

/// Round a monetary amount to cents for reporting.
pub fn round_money(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a monetary amount to a whole currency unit.
pub fn round_currency_unit(value: Money) -> Money {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a rate or fraction for reporting.
pub fn round_rate(value: Rate) -> Rate {
    value.round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero)
}

pub(crate) fn require_positive(field: &str, value: Decimal) -> PlannerResult<()> {
    if value <= Decimal::ZERO {
        return Err(PlannerError::invalid(field, format!("must be > 0, got {value}")));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: Decimal) -> PlannerResult<()> {
    if value < Decimal::ZERO {
        return Err(PlannerError::invalid(field, format!("must be >= 0, got {value}")));
    }
    Ok(())
}

/// Annual rates must be decimal fractions within (-100%, 100%].
///
/// A value above 1 almost always means the caller forgot to divide a
/// percentage by 100.
pub fn validate_rate(field: &str, rate: Rate) -> PlannerResult<()> {
    if rate <= dec!(-1) || rate > Decimal::ONE {
        return Err(PlannerError::invalid(
            field,
            format!("annual rate must be a decimal fraction in (-1, 1], got {rate}"),
        ));
    }
    Ok(())
}

/// Fractions such as a down-payment share must lie in [0, 1].
pub fn validate_fraction(field: &str, value: Rate) -> PlannerResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(PlannerError::invalid(
            field,
            format!("must be a fraction in [0, 1], got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn require_months(field: &str, months: u32) -> PlannerResult<()> {
    if months == 0 {
        return Err(PlannerError::invalid(field, "must be at least one month"));
    }
    Ok(())
}

/// Horizons are bounded by the 100-year projection ceiling.
pub(crate) fn require_within_ceiling(field: &str, months: u32) -> PlannerResult<()> {
    if months > MAX_PROJECTION_MONTHS {
        return Err(PlannerError::invalid(
            field,
            format!("must span at most {MAX_PROJECTION_MONTHS} months, got {months}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(-10.005)), dec!(-10.01));
        assert_eq!(round_money(dec!(88.848788)), dec!(88.85));
    }

    #[test]
    fn test_round_currency_unit() {
        assert_eq!(round_currency_unit(dec!(1234.5)), dec!(1235));
        assert_eq!(round_currency_unit(dec!(1234.49)), dec!(1234));
    }

    #[test]
    fn test_validate_rate_bounds() {
        assert!(validate_rate("annual_return", dec!(0.05)).is_ok());
        assert!(validate_rate("annual_return", dec!(-0.2)).is_ok());
        assert!(validate_rate("annual_return", dec!(5)).is_err());
        assert!(validate_rate("annual_return", dec!(-1)).is_err());
    }

    #[test]
    fn test_validate_fraction_bounds() {
        assert!(validate_fraction("down_payment_pct", dec!(0)).is_ok());
        assert!(validate_fraction("down_payment_pct", dec!(1)).is_ok());
        assert!(validate_fraction("down_payment_pct", dec!(20)).is_err());
    }

    #[test]
    fn test_require_helpers_name_field() {
        let err = require_positive("target_amount", Decimal::ZERO).unwrap_err();
        match err {
            PlannerError::InvalidInput { field, .. } => assert_eq!(field, "target_amount"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(require_non_negative("current_amount", Decimal::ZERO).is_ok());
        assert!(require_months("loan_term_months", 0).is_err());
    }

    #[test]
    fn test_require_within_ceiling() {
        assert!(require_within_ceiling("analysis_years", 1200).is_ok());
        assert!(require_within_ceiling("analysis_years", 1212).is_err());
    }
}

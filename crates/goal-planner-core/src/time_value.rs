use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::types::{Money, Rate, Years};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Convert an annual rate to its simple monthly equivalent.
pub fn monthly_rate(annual_rate: Rate) -> Rate {
    annual_rate / MONTHS_PER_YEAR
}

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
///
/// Saturates at `Decimal::MAX` instead of overflowing.
pub fn compound(rate: Rate, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result = result.saturating_mul(factor);
        if result == Decimal::MAX {
            break;
        }
    }
    result
}

/// Growth factor for a possibly fractional number of periods.
fn growth_factor(rate: Rate, periods: Years) -> Decimal {
    if periods >= Decimal::ZERO && periods.fract().is_zero() {
        if let Some(n) = periods.to_u32() {
            return compound(rate, n);
        }
    }
    (Decimal::ONE + rate)
        .checked_powd(periods)
        .unwrap_or(Decimal::MAX)
}

/// Future value of a lump sum: principal * (1 + rate)^years.
///
/// Negative rates are allowed and model loss scenarios.
pub fn compound_growth(principal: Money, annual_rate: Rate, years: Years) -> Money {
    principal.saturating_mul(growth_factor(annual_rate, years))
}

/// Future value of an ordinary annuity:
/// FV = pmt * [((1+r)^n - 1) / r], degrading to pmt * n at r = 0.
pub fn annuity_future_value(payment: Money, periodic_rate: Rate, periods: u32) -> Money {
    if periodic_rate.is_zero() {
        return payment.saturating_mul(Decimal::from(periods));
    }
    let factor = (compound(periodic_rate, periods) - Decimal::ONE)
        .checked_div(periodic_rate)
        .unwrap_or(Decimal::MAX);
    payment.saturating_mul(factor)
}

/// Present value of a lump sum received after `years` (inverse of `compound_growth`).
pub fn present_value(future_value: Money, annual_rate: Rate, years: Years) -> Money {
    future_value
        .checked_div(growth_factor(annual_rate, years))
        .unwrap_or(Decimal::ZERO)
}

/// Level monthly payment that fully amortises `principal` over `total_months`:
/// pmt = P * r * (1+r)^n / ((1+r)^n - 1), with r the monthly rate.
///
/// A zero rate degrades to straight-line repayment. A zero-month term is
/// treated as a single immediate payment of the whole principal.
pub fn level_payment(principal: Money, annual_rate: Rate, total_months: u32) -> Money {
    if total_months == 0 {
        return principal;
    }
    let r = monthly_rate(annual_rate);
    if r.is_zero() {
        return principal / Decimal::from(total_months);
    }
    let factor = compound(r, total_months);
    let denom = factor - Decimal::ONE;
    if denom.is_zero() {
        return principal / Decimal::from(total_months);
    }
    principal * r * (factor / denom)
}

/// Return on investment as a percentage: (final - cost) / cost * 100.
pub fn roi(final_value: Money, total_cost: Money) -> Decimal {
    if total_cost <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    final_value
        .saturating_sub(total_cost)
        .checked_div(total_cost)
        .map(|ratio| ratio.saturating_mul(dec!(100)))
        .unwrap_or(Decimal::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compound_basic() {
        // 1.1^3 = 1.331
        assert_eq!(compound(dec!(0.10), 3), dec!(1.331));
        assert_eq!(compound(dec!(0.10), 0), Decimal::ONE);
    }

    #[test]
    fn test_compound_growth_whole_years() {
        let fv = compound_growth(dec!(1000), dec!(0.05), dec!(2));
        assert_eq!(fv, dec!(1102.5));
    }

    #[test]
    fn test_compound_growth_negative_rate() {
        let fv = compound_growth(dec!(1000), dec!(-0.10), dec!(2));
        assert_eq!(fv, dec!(810));
    }

    #[test]
    fn test_compound_growth_fractional_years() {
        // 1000 * 1.21^0.5 = 1100
        let fv = compound_growth(dec!(1000), dec!(0.21), dec!(0.5));
        assert!((fv - dec!(1100)).abs() < dec!(0.01), "fv={fv}");
    }

    #[test]
    fn test_present_value_inverts_growth() {
        let fv = compound_growth(dec!(2500), dec!(0.07), dec!(10));
        let pv = present_value(fv, dec!(0.07), dec!(10));
        assert!((pv - dec!(2500)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_annuity_future_value() {
        // 100/month for 12 months at 1% = 100 * (1.01^12 - 1) / 0.01 ≈ 1268.25
        let fv = annuity_future_value(dec!(100), dec!(0.01), 12);
        assert!((fv - dec!(1268.25)).abs() < dec!(0.01), "fv={fv}");
    }

    #[test]
    fn test_annuity_future_value_zero_rate() {
        assert_eq!(annuity_future_value(dec!(250), Decimal::ZERO, 24), dec!(6000));
    }

    #[test]
    fn test_compound_saturates() {
        assert_eq!(compound(Decimal::ONE, 200), Decimal::MAX);
        assert_eq!(annuity_future_value(dec!(100), dec!(0.5), 400), Decimal::MAX);
        // 1.0/12 per month over a century leaves the representable range
        let pmt = level_payment(dec!(10_000), Decimal::ONE, 1200);
        assert!((pmt - dec!(10_000) / dec!(12)).abs() < dec!(0.01), "pmt={pmt}");
    }

    #[test]
    fn test_roi_saturates_on_tiny_cost() {
        assert_eq!(roi(Decimal::MAX, dec!(0.01)), Decimal::MAX);
    }

    #[test]
    fn test_level_payment_zero_rate() {
        assert_eq!(level_payment(dec!(1200), Decimal::ZERO, 12), dec!(100));
    }

    #[test]
    fn test_level_payment_twelve_percent() {
        let pmt = level_payment(dec!(1000), dec!(0.12), 12);
        // 1000 * 0.01 * 1.01^12 / (1.01^12 - 1) = 88.848789...
        assert_eq!(pmt.round_dp(4), dec!(88.8488), "pmt={pmt}");
        assert!((pmt - dec!(88.848789)).abs() < dec!(0.000001), "pmt={pmt}");
    }

    #[test]
    fn test_level_payment_zero_term() {
        assert_eq!(level_payment(dec!(5000), dec!(0.06), 0), dec!(5000));
    }

    #[test]
    fn test_roi() {
        assert_eq!(roi(dec!(1000), dec!(1000)), Decimal::ZERO);
        assert_eq!(roi(dec!(1100), dec!(1000)), dec!(10));
        assert_eq!(roi(dec!(1100), Decimal::ZERO), Decimal::ZERO);
    }
}

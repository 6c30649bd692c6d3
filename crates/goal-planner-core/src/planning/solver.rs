use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::policy::MAX_PROJECTION_MONTHS;
use crate::time_value::{annuity_future_value, compound, monthly_rate};
use crate::types::{Horizon, Money, Rate, Years};

/// Result of advancing a balance by one period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodStep {
    pub period_return: Money,
    pub balance: Money,
}

/// One period of the savings recurrence: the balance earns `periodic_rate`,
/// then `contribution` is added at period end.
///
/// Every projection in the crate advances through this function. Balances
/// past the `Decimal` range saturate at its bounds.
pub fn step(balance: Money, periodic_rate: Rate, contribution: Money) -> PeriodStep {
    let period_return = balance.saturating_mul(periodic_rate);
    PeriodStep {
        period_return,
        balance: balance.saturating_add(period_return).saturating_add(contribution),
    }
}

/// Smallest number of periods after which the balance meets `target`,
/// bounded by the default 1200-month ceiling.
pub fn required_periods(current: Money, target: Money, payment: Money, periodic_rate: Rate) -> Horizon {
    required_periods_within(current, target, payment, periodic_rate, MAX_PROJECTION_MONTHS)
}

/// Same as [`required_periods`] with an explicit ceiling.
pub fn required_periods_within(
    current: Money,
    target: Money,
    payment: Money,
    periodic_rate: Rate,
    ceiling: u32,
) -> Horizon {
    if current >= target {
        return Horizon::Reached(0);
    }
    if payment <= Decimal::ZERO {
        return Horizon::Unreachable;
    }

    let mut balance = current;
    let mut periods = 0u32;
    while periods < ceiling {
        balance = step(balance, periodic_rate, payment).balance;
        periods += 1;
        if balance >= target {
            return Horizon::Reached(periods);
        }
    }
    Horizon::Unreachable
}

/// Level monthly contribution needed to grow `current` into `target` over
/// `years`, compounding monthly at `annual_rate / 12`.
pub fn required_payment(current: Money, target: Money, annual_rate: Rate, years: Years) -> Money {
    let months = (years * Decimal::from(12u32))
        .round()
        .max(Decimal::ZERO)
        .to_u32()
        .unwrap_or(u32::MAX);
    required_monthly_payment(current, target, annual_rate, months)
}

/// Month-based form of [`required_payment`].
///
/// The shortfall is what remains of `target` after `current` has grown for
/// the whole horizon. With no months left the entire shortfall is due now.
pub fn required_monthly_payment(current: Money, target: Money, annual_rate: Rate, months: u32) -> Money {
    let r = monthly_rate(annual_rate);
    let grown_current = current.saturating_mul(compound(r, months));
    let shortfall = (target - grown_current).max(Decimal::ZERO);
    if shortfall.is_zero() {
        return Decimal::ZERO;
    }
    if months == 0 {
        return shortfall;
    }
    // Annuity factor: FV of one unit paid each month.
    let factor = annuity_future_value(Decimal::ONE, r, months);
    shortfall.checked_div(factor).unwrap_or(shortfall)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_step_interest_before_contribution() {
        let s = step(dec!(1000), dec!(0.01), dec!(100));
        assert_eq!(s.period_return, dec!(10));
        assert_eq!(s.balance, dec!(1110));
    }

    #[test]
    fn test_step_saturates() {
        let s = step(Decimal::MAX, dec!(0.5), dec!(100));
        assert_eq!(s.balance, Decimal::MAX);
    }

    #[test]
    fn test_required_payment_far_deadline() {
        // (1 + 1/12)^12000 is far outside the Decimal range
        assert_eq!(
            required_monthly_payment(dec!(1_000), dec!(1_000_000), Decimal::ONE, 12_000),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_required_periods_already_met() {
        assert_eq!(
            required_periods(dec!(5000), dec!(5000), dec!(100), dec!(0.01)),
            Horizon::Reached(0)
        );
        assert_eq!(
            required_periods(dec!(6000), dec!(5000), Decimal::ZERO, dec!(0.01)),
            Horizon::Reached(0)
        );
    }

    #[test]
    fn test_required_periods_no_payment_is_unreachable() {
        assert_eq!(
            required_periods(dec!(1000), dec!(5000), Decimal::ZERO, dec!(0.01)),
            Horizon::Unreachable
        );
        assert_eq!(
            required_periods(dec!(1000), dec!(5000), dec!(-50), dec!(0.01)),
            Horizon::Unreachable
        );
    }

    #[test]
    fn test_required_periods_zero_rate_is_linear() {
        // 1000 + 12 * 100 = 2200 >= 2200
        assert_eq!(
            required_periods(dec!(1000), dec!(2200), dec!(100), Decimal::ZERO),
            Horizon::Reached(12)
        );
        assert_eq!(
            required_periods(dec!(1000), dec!(2201), dec!(100), Decimal::ZERO),
            Horizon::Reached(13)
        );
    }

    #[test]
    fn test_required_periods_ceiling() {
        // 1/month toward 1,000,000 never gets there in 100 years
        assert_eq!(
            required_periods(Decimal::ZERO, dec!(1_000_000), dec!(1), Decimal::ZERO),
            Horizon::Unreachable
        );
        assert_eq!(
            required_periods_within(Decimal::ZERO, dec!(10), dec!(1), Decimal::ZERO, 5),
            Horizon::Unreachable
        );
        assert_eq!(
            required_periods_within(Decimal::ZERO, dec!(5), dec!(1), Decimal::ZERO, 5),
            Horizon::Reached(5)
        );
    }

    #[test]
    fn test_required_payment_zero_rate() {
        // (12000 - 0) / 24
        assert_eq!(
            required_payment(Decimal::ZERO, dec!(12_000), Decimal::ZERO, dec!(2)),
            dec!(500)
        );
    }

    #[test]
    fn test_required_payment_already_covered() {
        // 10_000 growing at 12% for a year already exceeds 10_500
        assert_eq!(
            required_payment(dec!(10_000), dec!(10_500), dec!(0.12), dec!(1)),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_required_payment_round_trip() {
        let pmt = required_payment(dec!(2_000), dec!(50_000), dec!(0.06), dec!(5));
        let mut balance = dec!(2_000);
        for _ in 0..60 {
            balance = step(balance, monthly_rate(dec!(0.06)), pmt).balance;
        }
        assert!((balance - dec!(50_000)).abs() < dec!(0.01), "balance={balance}");
    }

    #[test]
    fn test_required_monthly_payment_no_time_left() {
        assert_eq!(
            required_monthly_payment(dec!(1000), dec!(4000), dec!(0.05), 0),
            dec!(3000)
        );
    }

    #[test]
    fn test_horizon_ordering() {
        assert!(Horizon::Reached(1199) < Horizon::Unreachable);
        assert!(Horizon::Reached(10) < Horizon::Reached(11));
        assert_eq!(Horizon::Unreachable.months_or(1200), 1200);
    }
}

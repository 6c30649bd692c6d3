use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::time_value::{level_payment, monthly_rate};
use crate::types::{Money, Rate};
use crate::validation::round_money;

/// One month of a level-payment loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPeriod {
    pub month: u32,
    pub payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSchedule {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_paid: Money,
    pub periods: Vec<LoanPeriod>,
}

/// Walks a fixed-rate, level-payment loan one month at a time.
///
/// Values are yielded at full precision. The balance never increases and the
/// last period settles whatever is left, so it ends at exactly zero.
#[derive(Debug, Clone)]
pub struct LoanAmortizer {
    balance: Money,
    rate: Rate,
    payment: Money,
    term_months: u32,
    month: u32,
}

impl LoanAmortizer {
    pub fn new(principal: Money, annual_rate: Rate, term_months: u32) -> Self {
        LoanAmortizer {
            balance: principal,
            rate: monthly_rate(annual_rate),
            payment: level_payment(principal, annual_rate, term_months),
            term_months,
            month: 0,
        }
    }

    pub fn monthly_payment(&self) -> Money {
        self.payment
    }

    /// Outstanding balance after the periods yielded so far.
    pub fn balance(&self) -> Money {
        self.balance
    }
}

impl Iterator for LoanAmortizer {
    type Item = LoanPeriod;

    fn next(&mut self) -> Option<LoanPeriod> {
        if self.month >= self.term_months {
            return None;
        }
        self.month += 1;

        let interest = self.balance * self.rate;
        let mut principal_portion = (self.payment - interest).max(Decimal::ZERO);
        if self.month == self.term_months || principal_portion > self.balance {
            principal_portion = self.balance;
        }
        self.balance -= principal_portion;

        Some(LoanPeriod {
            month: self.month,
            payment: principal_portion + interest,
            principal_portion,
            interest_portion: interest,
            remaining_balance: self.balance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.term_months - self.month) as usize;
        (remaining, Some(remaining))
    }
}

/// Full amortisation table, rounded to cents for reporting.
pub fn amortization_schedule(principal: Money, annual_rate: Rate, term_months: u32) -> LoanSchedule {
    let amortizer = LoanAmortizer::new(principal, annual_rate, term_months);
    let monthly_payment = amortizer.monthly_payment();

    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let periods = amortizer
        .map(|p| {
            total_interest += p.interest_portion;
            total_paid += p.payment;
            LoanPeriod {
                month: p.month,
                payment: round_money(p.payment),
                principal_portion: round_money(p.principal_portion),
                interest_portion: round_money(p.interest_portion),
                remaining_balance: round_money(p.remaining_balance),
            }
        })
        .collect();

    LoanSchedule {
        principal: round_money(principal),
        annual_rate,
        term_months,
        monthly_payment: round_money(monthly_payment),
        total_interest: round_money(total_interest),
        total_paid: round_money(total_paid),
        periods,
    }
}

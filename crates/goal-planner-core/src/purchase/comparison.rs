use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};

use crate::planning::projection::{project_trajectory, MonthlyProjectionPoint, TrajectoryRequest};
use crate::policy::PlanningPolicy;
use crate::purchase::amortization::{amortization_schedule, LoanAmortizer, LoanSchedule};
use crate::time_value::{level_payment, roi};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::validation::{
    require_months, require_non_negative, require_positive, require_within_ceiling,
    round_currency_unit, round_money, validate_fraction, validate_rate,
};
use crate::PlannerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a pay-in-full versus finance comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseInput {
    pub price: Money,
    pub current_savings: Money,
    /// Share of the price paid up front (0.20 = 20%).
    pub down_payment_pct: Rate,
    pub loan_rate: Rate,
    pub loan_term_months: u32,
    pub investment_return: Rate,
    pub analysis_years: u32,
    pub monthly_investment_capacity: Money,
}

/// Financing parameters shared by the comparison and the down-payment sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingTerms {
    pub price: Money,
    pub current_savings: Money,
    pub down_payment_pct: Rate,
    pub loan_rate: Rate,
    pub loan_term_months: u32,
    pub investment_return: Rate,
    pub monthly_investment_capacity: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    PayInFull,
    Finance,
}

/// Investment track run alongside a purchase strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityAnalysis {
    pub starting_principal: Money,
    pub monthly_investment: Money,
    pub total_invested: Money,
    pub investment_returns: Money,
    pub final_value: Money,
    pub monthly_projection: Vec<MonthlyProjectionPoint>,
    #[serde(skip)]
    pub(crate) unrounded_final_value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumpSumScenario {
    pub total_cost: Money,
    pub remaining_savings: Money,
    pub final_assets: Money,
    pub opportunity: OpportunityAnalysis,
}

/// Investment value net of the outstanding loan for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetWorthPoint {
    pub month: u32,
    pub investment_value: Money,
    pub loan_balance: Money,
    pub net_worth: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanScenario {
    pub down_payment: Money,
    pub loan_amount: Money,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_cost: Money,
    pub remaining_savings: Money,
    pub net_monthly_investment: Money,
    pub final_assets: Money,
    pub opportunity: OpportunityAnalysis,
    pub schedule: LoanSchedule,
    pub net_worth_timeline: Vec<NetWorthPoint>,
    #[serde(skip)]
    pub(crate) unrounded_total_cost: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseSimulation {
    pub lump_sum: LumpSumScenario,
    pub loan: LoanScenario,
    pub recommendation: Recommendation,
    /// Absolute gap between the two net outcomes, in whole currency units.
    pub total_difference: Money,
}

impl PurchaseInput {
    pub fn validate(&self) -> PlannerResult<()> {
        require_positive("price", self.price)?;
        require_non_negative("current_savings", self.current_savings)?;
        validate_fraction("down_payment_pct", self.down_payment_pct)?;
        validate_rate("loan_rate", self.loan_rate)?;
        require_non_negative("loan_rate", self.loan_rate)?;
        require_months("loan_term_months", self.loan_term_months)?;
        require_within_ceiling("loan_term_months", self.loan_term_months)?;
        validate_rate("investment_return", self.investment_return)?;
        require_months("analysis_years", self.analysis_years)?;
        require_within_ceiling("analysis_years", self.analysis_years.saturating_mul(12))?;
        require_non_negative("monthly_investment_capacity", self.monthly_investment_capacity)
    }

    pub fn financing_terms(&self) -> FinancingTerms {
        FinancingTerms {
            price: self.price,
            current_savings: self.current_savings,
            down_payment_pct: self.down_payment_pct,
            loan_rate: self.loan_rate,
            loan_term_months: self.loan_term_months,
            investment_return: self.investment_return,
            monthly_investment_capacity: self.monthly_investment_capacity,
        }
    }

    pub fn horizon_months(&self) -> u32 {
        self.analysis_years.saturating_mul(12)
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn opportunity_track(
    starting_principal: Money,
    monthly_investment: Money,
    annual_rate: Rate,
    months: u32,
    policy: &PlanningPolicy,
) -> OpportunityAnalysis {
    let trajectory = project_trajectory(
        &TrajectoryRequest {
            starting_balance: starting_principal,
            monthly_contribution: monthly_investment,
            annual_rate,
            months,
            target: None,
        },
        policy.max_trajectory_points,
    );
    OpportunityAnalysis {
        starting_principal: round_money(starting_principal),
        monthly_investment: round_money(monthly_investment),
        total_invested: round_money(starting_principal + trajectory.total_contributions),
        investment_returns: trajectory.total_returns,
        final_value: trajectory.final_value,
        monthly_projection: trajectory.points,
        unrounded_final_value: trajectory.unrounded_final_value,
    }
}

/// Pay the full price from savings and invest whatever is left plus the
/// full monthly capacity.
pub fn lump_sum_scenario(
    price: Money,
    current_savings: Money,
    investment_return: Rate,
    monthly_investment_capacity: Money,
    horizon_months: u32,
    policy: &PlanningPolicy,
) -> LumpSumScenario {
    let remaining_savings = (current_savings - price).max(Decimal::ZERO);
    let opportunity = opportunity_track(
        remaining_savings,
        monthly_investment_capacity,
        investment_return,
        horizon_months,
        policy,
    );
    LumpSumScenario {
        total_cost: round_money(price),
        remaining_savings: round_money(remaining_savings),
        final_assets: opportunity.final_value,
        opportunity,
    }
}

/// Finance the purchase and invest what the loan payment leaves of the
/// monthly capacity.
pub fn finance_scenario(terms: &FinancingTerms, horizon_months: u32, policy: &PlanningPolicy) -> LoanScenario {
    let down_payment = terms.price * terms.down_payment_pct;
    let loan_amount = terms.price - down_payment;
    let monthly_payment = level_payment(loan_amount, terms.loan_rate, terms.loan_term_months);
    let total_interest = monthly_payment * Decimal::from(terms.loan_term_months) - loan_amount;
    let total_cost = terms.price + total_interest;

    let remaining_savings = (terms.current_savings - down_payment).max(Decimal::ZERO);
    // Loan payments crowd out investment; never negative.
    let net_monthly_investment = (terms.monthly_investment_capacity - monthly_payment).max(Decimal::ZERO);

    let opportunity = opportunity_track(
        remaining_savings,
        net_monthly_investment,
        terms.investment_return,
        horizon_months,
        policy,
    );

    let mut amortizer = LoanAmortizer::new(loan_amount, terms.loan_rate, terms.loan_term_months);
    let net_worth_timeline = opportunity
        .monthly_projection
        .iter()
        .map(|point| {
            let loan_balance = if point.month <= terms.loan_term_months {
                amortizer.next().map(|p| p.remaining_balance).unwrap_or(Decimal::ZERO)
            } else {
                Decimal::ZERO
            };
            NetWorthPoint {
                month: point.month,
                investment_value: point.total_value,
                loan_balance: round_money(loan_balance),
                net_worth: round_money(point.total_value - loan_balance),
            }
        })
        .collect();

    LoanScenario {
        down_payment: round_money(down_payment),
        loan_amount: round_money(loan_amount),
        monthly_payment: round_money(monthly_payment),
        total_interest: round_money(total_interest),
        total_cost: round_money(total_cost),
        remaining_savings: round_money(remaining_savings),
        net_monthly_investment: round_money(net_monthly_investment),
        final_assets: opportunity.final_value,
        opportunity,
        schedule: amortization_schedule(loan_amount, terms.loan_rate, terms.loan_term_months),
        net_worth_timeline,
        unrounded_total_cost: total_cost,
    }
}

impl LoanScenario {
    /// Return on the financed purchase in percent, before rounding.
    pub(crate) fn unrounded_roi(&self) -> Decimal {
        roi(self.opportunity.unrounded_final_value, self.unrounded_total_cost)
    }
}

/// Financed outcome net of what financing cost above the cash price.
fn loan_net_worth(loan: &LoanScenario, price: Money) -> Money {
    loan.opportunity
        .unrounded_final_value
        .saturating_sub(loan.unrounded_total_cost - price)
}

/// Pay in full only when it strictly beats financing; a tie goes to financing.
///
/// Both outcomes are compared at full precision; only the reported
/// difference is rounded.
pub fn recommend(lump_sum: &LumpSumScenario, loan: &LoanScenario, price: Money) -> (Recommendation, Money) {
    let difference = lump_sum
        .opportunity
        .unrounded_final_value
        .saturating_sub(loan_net_worth(loan, price));
    let recommendation = if difference > Decimal::ZERO {
        Recommendation::PayInFull
    } else {
        Recommendation::Finance
    };
    (recommendation, round_currency_unit(difference.abs()))
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

pub fn simulate_purchase(input: &PurchaseInput) -> ComputationOutput<PurchaseSimulation> {
    simulate_purchase_with_policy(input, &PlanningPolicy::default())
}

/// Compare paying cash with financing over the analysis horizon.
#[instrument(skip_all)]
pub fn simulate_purchase_with_policy(
    input: &PurchaseInput,
    policy: &PlanningPolicy,
) -> ComputationOutput<PurchaseSimulation> {
    let start = Instant::now();
    debug!(
        price = %input.price,
        down_payment_pct = %input.down_payment_pct,
        loan_rate = %input.loan_rate,
        loan_term_months = input.loan_term_months,
        "simulating purchase"
    );
    let mut warnings: Vec<String> = Vec::new();
    let horizon = input.horizon_months();

    let lump_sum = lump_sum_scenario(
        input.price,
        input.current_savings,
        input.investment_return,
        input.monthly_investment_capacity,
        horizon,
        policy,
    );
    let loan = finance_scenario(&input.financing_terms(), horizon, policy);
    let (recommendation, total_difference) = recommend(&lump_sum, &loan, input.price);

    if input.current_savings < input.price {
        warnings.push(format!(
            "Savings of {} do not cover the price of {}; the pay-in-full branch starts from zero",
            input.current_savings, input.price
        ));
    }
    if loan.monthly_payment > input.monthly_investment_capacity {
        warnings.push(format!(
            "Monthly loan payment {} exceeds investment capacity {}; net investment is zero",
            loan.monthly_payment, input.monthly_investment_capacity
        ));
    }
    if input.loan_term_months > horizon {
        warnings.push(format!(
            "Loan term of {} months runs past the {}-month analysis horizon",
            input.loan_term_months, horizon
        ));
    }
    if lump_sum.final_assets == Decimal::MAX || loan.final_assets == Decimal::MAX {
        warnings.push("Investment growth exceeds the representable range; final assets are capped".into());
    }
    if (horizon as usize) > policy.max_trajectory_points {
        warnings.push(format!(
            "Monthly projections truncated to the first {} months",
            policy.max_trajectory_points
        ));
    }

    let output = PurchaseSimulation {
        lump_sum,
        loan,
        recommendation,
        total_difference,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Buy vs finance (level-payment loan with opportunity-cost investment tracks)",
        &serde_json::json!({
            "price": input.price.to_string(),
            "down_payment_pct": input.down_payment_pct.to_string(),
            "loan_rate": input.loan_rate.to_string(),
            "loan_term_months": input.loan_term_months,
            "investment_return": input.investment_return.to_string(),
            "analysis_years": input.analysis_years,
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};

use crate::error::PlannerError;
use crate::policy::PlanningPolicy;
use crate::purchase::comparison::{finance_scenario, FinancingTerms};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::validation::{
    require_months, require_non_negative, require_positive, require_within_ceiling, round_money,
    round_rate, validate_rate,
};
use crate::PlannerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

fn default_max_pct() -> u32 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationInput {
    pub price: Money,
    pub current_savings: Money,
    pub loan_rate: Rate,
    pub loan_term_months: u32,
    pub investment_return: Rate,
    pub analysis_years: u32,
    pub monthly_investment_capacity: Money,
    /// Lowest down-payment percentage to try (whole percent).
    #[serde(default)]
    pub min_pct: u32,
    /// Highest down-payment percentage to try (whole percent, inclusive).
    #[serde(default = "default_max_pct")]
    pub max_pct: u32,
}

/// Outcome of financing at one down-payment percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownPaymentPoint {
    pub down_payment_pct: u32,
    pub down_payment: Money,
    pub feasible: bool,
    /// ROI in percent; `None` when the down payment exceeds savings.
    pub roi: Option<Decimal>,
    pub monthly_payment: Option<Money>,
    pub total_cost: Option<Money>,
    pub final_assets: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalDownPayment {
    pub down_payment_pct: u32,
    pub roi: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownPaymentOptimization {
    /// `None` when no percentage in the range is affordable.
    pub optimal: Option<OptimalDownPayment>,
    pub analysis: Vec<DownPaymentPoint>,
}

impl OptimizationInput {
    pub fn validate(&self) -> PlannerResult<()> {
        require_positive("price", self.price)?;
        require_non_negative("current_savings", self.current_savings)?;
        validate_rate("loan_rate", self.loan_rate)?;
        require_non_negative("loan_rate", self.loan_rate)?;
        require_months("loan_term_months", self.loan_term_months)?;
        require_within_ceiling("loan_term_months", self.loan_term_months)?;
        validate_rate("investment_return", self.investment_return)?;
        require_months("analysis_years", self.analysis_years)?;
        require_within_ceiling("analysis_years", self.analysis_years.saturating_mul(12))?;
        require_non_negative("monthly_investment_capacity", self.monthly_investment_capacity)?;
        if self.max_pct > 100 {
            return Err(PlannerError::invalid("max_pct", "must be <= 100"));
        }
        if self.min_pct > self.max_pct {
            return Err(PlannerError::invalid("min_pct", "must be <= max_pct"));
        }
        Ok(())
    }

    fn terms_at(&self, pct: u32) -> FinancingTerms {
        FinancingTerms {
            price: self.price,
            current_savings: self.current_savings,
            down_payment_pct: Decimal::from(pct) / dec!(100),
            loan_rate: self.loan_rate,
            loan_term_months: self.loan_term_months,
            investment_return: self.investment_return,
            monthly_investment_capacity: self.monthly_investment_capacity,
        }
    }
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

pub fn find_optimal_down_payment(input: &OptimizationInput) -> ComputationOutput<DownPaymentOptimization> {
    find_optimal_down_payment_with_policy(input, &PlanningPolicy::default())
}

/// Sweep down-payment percentages in whole-percent steps and keep the one
/// with the highest ROI among those the savings can cover.
///
/// Every percentage appears in `analysis`, affordable or not. Ties keep the
/// lowest percentage.
#[instrument(skip_all)]
pub fn find_optimal_down_payment_with_policy(
    input: &OptimizationInput,
    policy: &PlanningPolicy,
) -> ComputationOutput<DownPaymentOptimization> {
    let start = Instant::now();
    debug!(
        price = %input.price,
        current_savings = %input.current_savings,
        min_pct = input.min_pct,
        max_pct = input.max_pct,
        "sweeping down payment"
    );
    let horizon = input.analysis_years.saturating_mul(12);

    let mut analysis = Vec::new();
    // Best percentage with its unrounded ROI.
    let mut best: Option<(u32, Decimal)> = None;

    for pct in input.min_pct..=input.max_pct {
        let down_payment = input.price * Decimal::from(pct) / dec!(100);
        if down_payment > input.current_savings {
            analysis.push(DownPaymentPoint {
                down_payment_pct: pct,
                down_payment: round_money(down_payment),
                feasible: false,
                roi: None,
                monthly_payment: None,
                total_cost: None,
                final_assets: None,
            });
            continue;
        }

        let loan = finance_scenario(&input.terms_at(pct), horizon, policy);
        let exact_roi = loan.unrounded_roi();
        if best.map_or(true, |(_, best_roi)| exact_roi > best_roi) {
            best = Some((pct, exact_roi));
        }

        analysis.push(DownPaymentPoint {
            down_payment_pct: pct,
            down_payment: loan.down_payment,
            feasible: true,
            roi: Some(round_rate(exact_roi)),
            monthly_payment: Some(loan.monthly_payment),
            total_cost: Some(loan.total_cost),
            final_assets: Some(loan.final_assets),
        });
    }

    let optimal = best.map(|(down_payment_pct, exact_roi)| OptimalDownPayment {
        down_payment_pct,
        roi: round_rate(exact_roi),
    });

    let mut warnings = Vec::new();
    if optimal.is_none() {
        warnings.push(format!(
            "No down payment between {}% and {}% is covered by savings of {}",
            input.min_pct, input.max_pct, input.current_savings
        ));
    }

    let output = DownPaymentOptimization { optimal, analysis };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Down-payment sweep (whole-percent grid, ROI = (final assets - total cost) / total cost)",
        &serde_json::json!({
            "price": input.price.to_string(),
            "loan_rate": input.loan_rate.to_string(),
            "loan_term_months": input.loan_term_months,
            "investment_return": input.investment_return.to_string(),
            "analysis_years": input.analysis_years,
            "range": [input.min_pct, input.max_pct],
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

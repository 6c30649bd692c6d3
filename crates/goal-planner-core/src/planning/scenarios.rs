use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};

use crate::planning::projection::{project_trajectory, TrajectoryRequest};
use crate::planning::solver::required_periods_within;
use crate::policy::PlanningPolicy;
use crate::time_value::monthly_rate;
use crate::types::{with_metadata, ComputationOutput, Horizon, Money, Rate};
use crate::validation::{
    require_non_negative, require_positive, round_money, round_rate, validate_rate,
};
use crate::PlannerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioLabel {
    Conservative,
    Expected,
    Optimistic,
}

/// Annual returns for the three bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReturns {
    pub conservative: Rate,
    pub expected: Rate,
    pub optimistic: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub current_amount: Money,
    pub target_amount: Money,
    pub monthly_contribution: Money,
    pub expected_return: Rate,
}

/// One band of the projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub label: ScenarioLabel,
    pub annual_return: Rate,
    pub projected_months: Horizon,
    pub total_value: Money,
    pub total_returns: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    pub conservative: Scenario,
    pub expected: Scenario,
    pub optimistic: Scenario,
}

impl ScenarioInput {
    pub fn validate(&self) -> PlannerResult<()> {
        require_positive("target_amount", self.target_amount)?;
        require_non_negative("current_amount", self.current_amount)?;
        require_non_negative("monthly_contribution", self.monthly_contribution)?;
        validate_rate("expected_return", self.expected_return)
    }
}

impl ScenarioAnalysis {
    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        [&self.conservative, &self.expected, &self.optimistic].into_iter()
    }
}

// ---------------------------------------------------------------------------
// Banding
// ---------------------------------------------------------------------------

/// Shift the expected return by the policy volatility.
///
/// The conservative band is floored, but never rises above the expected
/// return itself.
pub fn band_returns(expected: Rate, policy: &PlanningPolicy) -> ScenarioReturns {
    let conservative = (expected - policy.volatility)
        .max(policy.conservative_floor)
        .min(expected);
    ScenarioReturns {
        conservative,
        expected,
        optimistic: expected + policy.volatility,
    }
}

/// Solve and replay one band.
pub fn evaluate_scenario(
    label: ScenarioLabel,
    annual_return: Rate,
    input: &ScenarioInput,
    policy: &PlanningPolicy,
) -> Scenario {
    let projected_months = required_periods_within(
        input.current_amount,
        input.target_amount,
        input.monthly_contribution,
        monthly_rate(annual_return),
        policy.max_periods,
    );

    let (total_value, total_returns) = match projected_months {
        Horizon::Reached(months) => {
            let trajectory = project_trajectory(
                &TrajectoryRequest {
                    starting_balance: input.current_amount,
                    monthly_contribution: input.monthly_contribution,
                    annual_rate: annual_return,
                    months,
                    target: None,
                },
                0,
            );
            (trajectory.final_value, trajectory.total_returns)
        }
        Horizon::Unreachable => (round_money(input.target_amount), Decimal::ZERO),
    };

    Scenario {
        label,
        annual_return: round_rate(annual_return),
        projected_months,
        total_value,
        total_returns,
    }
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

pub fn analyze_scenarios(input: &ScenarioInput) -> ComputationOutput<ScenarioAnalysis> {
    analyze_scenarios_with_policy(input, &PlanningPolicy::default())
}

/// Evaluate the conservative, expected and optimistic bands independently.
#[instrument(skip_all)]
pub fn analyze_scenarios_with_policy(
    input: &ScenarioInput,
    policy: &PlanningPolicy,
) -> ComputationOutput<ScenarioAnalysis> {
    let start = Instant::now();
    debug!(
        target_amount = %input.target_amount,
        current_amount = %input.current_amount,
        expected_return = %input.expected_return,
        "analyzing scenario bands"
    );

    let analysis = scenario_bands(input, policy);

    let mut warnings = Vec::new();
    for scenario in analysis.iter() {
        if !scenario.projected_months.is_reached() {
            warnings.push(format!(
                "{:?} scenario does not reach the target within {} months",
                scenario.label, policy.max_periods
            ));
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Scenario banding (expected return ± fixed volatility, iterative horizon solve)",
        &serde_json::json!({
            "expected_return": input.expected_return.to_string(),
            "volatility": policy.volatility.to_string(),
            "conservative_floor": policy.conservative_floor.to_string(),
            "max_periods": policy.max_periods,
        }),
        warnings,
        elapsed,
        analysis,
    )
}

pub(crate) fn scenario_bands(input: &ScenarioInput, policy: &PlanningPolicy) -> ScenarioAnalysis {
    let returns = band_returns(input.expected_return, policy);
    ScenarioAnalysis {
        conservative: evaluate_scenario(ScenarioLabel::Conservative, returns.conservative, input, policy),
        expected: evaluate_scenario(ScenarioLabel::Expected, returns.expected, input, policy),
        optimistic: evaluate_scenario(ScenarioLabel::Optimistic, returns.optimistic, input, policy),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn default_input() -> ScenarioInput {
        ScenarioInput {
            current_amount: dec!(10_000),
            target_amount: dec!(100_000),
            monthly_contribution: dec!(1_000),
            expected_return: dec!(0.07),
        }
    }

    #[test]
    fn test_band_returns_default_policy() {
        let bands = band_returns(dec!(0.20), &PlanningPolicy::default());
        assert_eq!(bands.conservative, dec!(0.05));
        assert_eq!(bands.expected, dec!(0.20));
        assert_eq!(bands.optimistic, dec!(0.35));
    }

    #[test]
    fn test_band_returns_floor() {
        let bands = band_returns(dec!(0.07), &PlanningPolicy::default());
        assert_eq!(bands.conservative, dec!(0.01));
    }

    #[test]
    fn test_band_returns_floor_never_exceeds_expected() {
        let bands = band_returns(dec!(0.005), &PlanningPolicy::default());
        assert_eq!(bands.conservative, dec!(0.005));
        assert!(bands.conservative <= bands.expected);
    }

    #[test]
    fn test_bands_are_ordered_by_months() {
        let out = analyze_scenarios(&default_input());
        let a = &out.result;
        assert!(a.conservative.projected_months >= a.expected.projected_months);
        assert!(a.expected.projected_months >= a.optimistic.projected_months);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_reached_band_totals_meet_target() {
        let out = analyze_scenarios(&default_input());
        for s in out.result.iter() {
            assert!(s.projected_months.is_reached());
            assert!(s.total_value >= dec!(100_000), "{:?}", s);
            assert!(s.total_returns > Decimal::ZERO);
        }
    }

    #[test]
    fn test_unreachable_band_reports_target() {
        let mut input = default_input();
        input.monthly_contribution = Decimal::ZERO;
        let out = analyze_scenarios(&input);
        for s in out.result.iter() {
            assert_eq!(s.projected_months, Horizon::Unreachable);
            assert_eq!(s.total_value, dec!(100_000));
            assert_eq!(s.total_returns, Decimal::ZERO);
        }
        assert_eq!(out.warnings.len(), 3);
    }

    #[test]
    fn test_already_complete_goal() {
        let mut input = default_input();
        input.current_amount = dec!(150_000);
        let out = analyze_scenarios(&input);
        assert_eq!(out.result.expected.projected_months, Horizon::Reached(0));
        assert_eq!(out.result.expected.total_value, dec!(150_000));
        assert_eq!(out.result.expected.total_returns, Decimal::ZERO);
    }

    #[test]
    fn test_custom_policy_ceiling() {
        let policy = PlanningPolicy {
            max_periods: 12,
            ..PlanningPolicy::default()
        };
        let out = analyze_scenarios_with_policy(&default_input(), &policy);
        assert_eq!(out.result.expected.projected_months, Horizon::Unreachable);
    }

    #[test]
    fn test_validate_rejects_percentage_rate() {
        let mut input = default_input();
        input.expected_return = dec!(7);
        assert!(input.validate().is_err());
        assert!(default_input().validate().is_ok());
    }
}

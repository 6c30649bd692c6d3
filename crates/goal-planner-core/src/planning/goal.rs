use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};

use crate::error::PlannerError;
use crate::planning::projection::{project_trajectory, MonthlyProjectionPoint, TrajectoryRequest};
use crate::planning::scenarios::{scenario_bands, ScenarioAnalysis, ScenarioInput};
use crate::planning::solver::{required_monthly_payment, required_periods_within};
use crate::policy::PlanningPolicy;
use crate::time_value::monthly_rate;
use crate::types::{with_metadata, ComputationOutput, Horizon, Money, Rate};
use crate::validation::{require_non_negative, require_positive, round_money, validate_rate};
use crate::PlannerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    EmergencyFund,
    Retirement,
    Home,
    Education,
    Vehicle,
    Travel,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPriority {
    High,
    Medium,
    Low,
}

/// A savings goal as stored by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub name: String,
    pub target_amount: Money,
    pub current_amount: Money,
    pub deadline: NaiveDate,
    pub category: GoalCategory,
    pub priority: GoalPriority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalPlanInput {
    pub goal: Goal,
    pub monthly_contribution: Money,
    pub expected_return: Rate,
    /// Date the plan is computed from.
    pub as_of: NaiveDate,
}

/// Expected-case plan for a goal plus its risk bands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalPlan {
    pub months_to_deadline: u32,
    pub projected_months: Horizon,
    pub projected_completion_date: Option<NaiveDate>,
    pub on_track: bool,
    /// Monthly contribution that would meet the target exactly at the deadline.
    pub required_monthly_contribution: Money,
    /// Value on completion. An unreachable goal reports the target with zero
    /// returns, matching its expected scenario; `monthly_projection` still
    /// shows the replayed balance.
    pub total_value: Money,
    pub total_contributions: Money,
    pub total_returns: Money,
    pub monthly_projection: Vec<MonthlyProjectionPoint>,
    pub scenarios: ScenarioAnalysis,
}

impl Goal {
    pub fn is_complete(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    pub fn shortfall(&self) -> Money {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    /// Whole months from `as_of` until the deadline; 0 once it has passed.
    pub fn months_until_deadline(&self, as_of: NaiveDate) -> u32 {
        whole_months_between(as_of, self.deadline)
    }

    pub fn validate(&self, as_of: NaiveDate) -> PlannerResult<()> {
        require_positive("target_amount", self.target_amount)?;
        require_non_negative("current_amount", self.current_amount)?;
        if self.current_amount >= self.target_amount {
            return Err(PlannerError::invalid(
                "current_amount",
                "must be below target_amount",
            ));
        }
        if self.deadline <= as_of {
            return Err(PlannerError::DateError(format!(
                "deadline {} is not after {}",
                self.deadline, as_of
            )));
        }
        Ok(())
    }
}

impl GoalPlanInput {
    pub fn validate(&self) -> PlannerResult<()> {
        self.goal.validate(self.as_of)?;
        require_non_negative("monthly_contribution", self.monthly_contribution)?;
        validate_rate("expected_return", self.expected_return)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn whole_months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }
    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0) as u32
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

pub fn plan_goal(input: &GoalPlanInput) -> ComputationOutput<GoalPlan> {
    plan_goal_with_policy(input, &PlanningPolicy::default())
}

/// Project a goal at the expected return, solve both for time and for the
/// contribution the deadline demands, and attach the scenario bands.
#[instrument(skip_all, fields(goal = %input.goal.name))]
pub fn plan_goal_with_policy(input: &GoalPlanInput, policy: &PlanningPolicy) -> ComputationOutput<GoalPlan> {
    let start = Instant::now();
    let goal = &input.goal;
    debug!(
        target_amount = %goal.target_amount,
        current_amount = %goal.current_amount,
        monthly_contribution = %input.monthly_contribution,
        "planning goal"
    );
    let mut warnings: Vec<String> = Vec::new();

    let months_to_deadline = goal.months_until_deadline(input.as_of);
    let projected_months = required_periods_within(
        goal.current_amount,
        goal.target_amount,
        input.monthly_contribution,
        monthly_rate(input.expected_return),
        policy.max_periods,
    );

    let trajectory = project_trajectory(
        &TrajectoryRequest {
            starting_balance: goal.current_amount,
            monthly_contribution: input.monthly_contribution,
            annual_rate: input.expected_return,
            months: projected_months.months_or(policy.max_periods),
            target: Some(goal.target_amount),
        },
        policy.max_trajectory_points,
    );

    let projected_completion_date = projected_months
        .months()
        .and_then(|m| input.as_of.checked_add_months(Months::new(m)));

    let on_track = match projected_months {
        Horizon::Reached(m) => m <= months_to_deadline,
        Horizon::Unreachable => false,
    };

    let required_monthly_contribution = round_money(required_monthly_payment(
        goal.current_amount,
        goal.target_amount,
        input.expected_return,
        months_to_deadline,
    ));

    match projected_months {
        Horizon::Unreachable => warnings.push(format!(
            "Goal '{}' is not reached within {} months at the current contribution",
            goal.name, policy.max_periods
        )),
        Horizon::Reached(m) if !on_track => warnings.push(format!(
            "Goal '{}' completes in {} months, {} months after the deadline; \
             {} per month is required to finish on time",
            goal.name,
            m,
            m - months_to_deadline,
            required_monthly_contribution
        )),
        _ => {}
    }
    if months_to_deadline == 0 && !goal.is_complete() {
        warnings.push("Deadline has passed; the full shortfall is due now".into());
    }
    if trajectory.points.len() < trajectory.months_simulated as usize {
        warnings.push(format!(
            "Monthly projection truncated to the first {} months",
            policy.max_trajectory_points
        ));
    }

    let scenarios = scenario_bands(
        &ScenarioInput {
            current_amount: goal.current_amount,
            target_amount: goal.target_amount,
            monthly_contribution: input.monthly_contribution,
            expected_return: input.expected_return,
        },
        policy,
    );

    let (total_value, total_returns) = match projected_months {
        Horizon::Reached(_) => (trajectory.final_value, trajectory.total_returns),
        Horizon::Unreachable => (round_money(goal.target_amount), Decimal::ZERO),
    };

    let output = GoalPlan {
        months_to_deadline,
        projected_months,
        projected_completion_date,
        on_track,
        required_monthly_contribution,
        total_value,
        total_contributions: trajectory.total_contributions,
        total_returns,
        monthly_projection: trajectory.points,
        scenarios,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Goal projection (monthly compounding, end-of-month contributions)",
        &serde_json::json!({
            "goal": goal.name,
            "category": goal.category,
            "priority": goal.priority,
            "expected_return": input.expected_return.to_string(),
            "as_of": input.as_of.to_string(),
            "deadline": goal.deadline.to_string(),
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

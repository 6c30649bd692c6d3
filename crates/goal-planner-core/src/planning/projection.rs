use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::planning::solver::step;
use crate::time_value::monthly_rate;
use crate::types::{Money, Rate};
use crate::validation::round_money;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single month of a savings or investment trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProjectionPoint {
    pub month: u32,
    pub contribution: Money,
    pub cumulative_contribution: Money,
    pub period_return: Money,
    pub cumulative_return: Money,
    pub total_value: Money,
    /// Fraction of the target reached (1.0 = complete). Absent when the
    /// trajectory has no target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Rate>,
}

/// Parameters of one trajectory run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryRequest {
    pub starting_balance: Money,
    pub monthly_contribution: Money,
    pub annual_rate: Rate,
    /// Number of months to simulate at most.
    pub months: u32,
    /// Stop at the first month whose total meets this amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Money>,
}

/// Outcome of a trajectory run.
///
/// `points` is capped for presentation; the totals always cover every month
/// that was simulated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    pub points: Vec<MonthlyProjectionPoint>,
    pub months_simulated: u32,
    pub final_value: Money,
    pub total_contributions: Money,
    pub total_returns: Money,
    pub target_reached: bool,
    /// Closing balance before rounding, for comparisons between runs.
    #[serde(skip)]
    pub(crate) unrounded_final_value: Money,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Replay the savings recurrence month by month.
///
/// Running totals keep full precision; each emitted point is rounded.
pub fn project_trajectory(request: &TrajectoryRequest, point_cap: usize) -> Trajectory {
    let r = monthly_rate(request.annual_rate);
    let contribution = request.monthly_contribution;

    let mut balance = request.starting_balance;
    let mut cumulative_contribution = Decimal::ZERO;
    let mut cumulative_return = Decimal::ZERO;
    let mut points = Vec::with_capacity(point_cap.min(request.months as usize));
    let mut months_simulated = 0u32;
    let mut target_reached = matches!(request.target, Some(t) if balance >= t);

    while months_simulated < request.months && !target_reached {
        let next = step(balance, r, contribution);
        balance = next.balance;
        cumulative_contribution = cumulative_contribution.saturating_add(contribution);
        cumulative_return = cumulative_return.saturating_add(next.period_return);
        months_simulated += 1;

        if let Some(target) = request.target {
            target_reached = balance >= target;
        }

        if points.len() < point_cap {
            let progress = request
                .target
                .and_then(|t| balance.checked_div(t))
                .map(|p| p.round_dp(4));
            points.push(MonthlyProjectionPoint {
                month: months_simulated,
                contribution: round_money(contribution),
                cumulative_contribution: round_money(cumulative_contribution),
                period_return: round_money(next.period_return),
                cumulative_return: round_money(cumulative_return),
                total_value: round_money(balance),
                progress,
            });
        }
    }

    Trajectory {
        points,
        months_simulated,
        final_value: round_money(balance),
        total_contributions: round_money(cumulative_contribution),
        total_returns: round_money(cumulative_return),
        target_reached,
        unrounded_final_value: balance,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

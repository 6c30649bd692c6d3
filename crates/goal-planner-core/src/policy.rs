//! Tunable policy constants for projections and scenario banding.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Rate;
use crate::PlannerResult;

/// Offset applied above and below the expected return to form the bands.
pub const DEFAULT_VOLATILITY: Rate = dec!(0.15);

/// Lowest annual return the conservative band may fall to.
pub const CONSERVATIVE_RETURN_FLOOR: Rate = dec!(0.01);

/// Hard ceiling for horizon solving (100 years of monthly periods).
pub const MAX_PROJECTION_MONTHS: u32 = 1200;

/// Maximum number of monthly points emitted in a single trajectory.
pub const MAX_TRAJECTORY_POINTS: usize = 600;

/// Tolerance (in percentage points) when checking that allocations sum to 100.
pub const ALLOCATION_TOLERANCE: Decimal = dec!(0.01);

/// Policy knobs shared by the solver, trajectory and scenario engines.
///
/// Deserialisation is lenient: any field left out of the source keeps its
/// default value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningPolicy {
    pub volatility: Rate,
    pub conservative_floor: Rate,
    pub max_periods: u32,
    pub max_trajectory_points: usize,
}

impl Default for PlanningPolicy {
    fn default() -> Self {
        PlanningPolicy {
            volatility: DEFAULT_VOLATILITY,
            conservative_floor: CONSERVATIVE_RETURN_FLOOR,
            max_periods: MAX_PROJECTION_MONTHS,
            max_trajectory_points: MAX_TRAJECTORY_POINTS,
        }
    }
}

impl PlanningPolicy {
    /// Parse a (possibly partial) JSON policy document.
    pub fn from_json(json: &str) -> PlannerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

//! Savings-goal projection and buy-vs-finance simulation.
//!
//! Engine operations are pure and total over finite inputs: they take plain
//! numbers, never fail, and report soft outcomes (an unreachable goal, a loan
//! payment that exceeds investment capacity) as data. Input range checks live
//! on the input types as `validate()` and are the caller's responsibility.
//!
//! ```rust
//! use goal_planner_core::planning::solver::required_periods;
//! use goal_planner_core::types::Horizon;
//! use rust_decimal_macros::dec;
//!
//! // 1000 saved, 100 a month at 0% toward 2200
//! let horizon = required_periods(dec!(1000), dec!(2200), dec!(100), dec!(0));
//! assert_eq!(horizon, Horizon::Reached(12));
//! ```

pub mod error;
pub mod planning;
pub mod policy;
pub mod purchase;
pub mod time_value;
pub mod types;
pub mod validation;

#[cfg(feature = "goals")]
pub mod allocation;

pub use error::PlannerError;
pub use policy::PlanningPolicy;
pub use types::*;

/// Result type for validation and configuration loading.
pub type PlannerResult<T> = Result<T, PlannerError>;

//! Portfolio allocation across asset categories.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::policy::ALLOCATION_TOLERANCE;
use crate::types::Rate;
use crate::PlannerResult;

/// One category's share of the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSlice {
    pub category: String,
    /// Share of the portfolio in percent (0-100).
    pub percentage: Decimal,
    /// Expected annual return of the category as a decimal fraction.
    pub expected_return: Rate,
}

/// Check that every share lies in 0..=100 and that the shares sum to 100
/// within the allocation tolerance.
pub fn validate_allocation(slices: &[AllocationSlice]) -> PlannerResult<()> {
    if slices.is_empty() {
        return Err(PlannerError::InvalidAllocation(
            "At least one category is required".into(),
        ));
    }

    for slice in slices {
        if slice.percentage < Decimal::ZERO || slice.percentage > dec!(100) {
            return Err(PlannerError::InvalidAllocation(format!(
                "Invalid percentage for '{}': {}",
                slice.category, slice.percentage
            )));
        }
    }

    let total: Decimal = slices.iter().map(|s| s.percentage).sum();
    if (total - dec!(100)).abs() > ALLOCATION_TOLERANCE {
        return Err(PlannerError::InvalidAllocation(format!(
            "Allocations must sum to 100%, got {}%",
            total
        )));
    }

    Ok(())
}

/// Weighted expected annual return of the portfolio.
pub fn blended_return(slices: &[AllocationSlice]) -> Rate {
    slices
        .iter()
        .map(|s| s.percentage / dec!(100) * s.expected_return)
        .sum()
}

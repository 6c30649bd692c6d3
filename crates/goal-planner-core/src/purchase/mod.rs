pub mod amortization;

#[cfg(feature = "purchase")]
pub mod comparison;
#[cfg(feature = "purchase")]
pub mod optimization;

pub mod projection;
pub mod solver;

#[cfg(feature = "goals")]
pub mod goal;
#[cfg(feature = "goals")]
pub mod scenarios;

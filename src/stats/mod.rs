//! Statistics for benchmark stability tracking.

pub mod estimate;

pub use estimate::{refine, Estimate};

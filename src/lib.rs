//! Adaptive Microbenchmark Harness
//!
//! Speedtesting with tracking of mean, variance and standard deviation to
//! monitor the stability of the results. Results are provided in ticks and
//! in microseconds.
//!
//! Benchmark a piece of code by calling [`Benchmark::test_now`]: every
//! growth-loop iteration calls the routine at a doubling repetition count
//! until one timing window reaches the minimum running time per observation,
//! refining the statistics whenever a batch is more stable than the stored
//! estimate. One-off timings go through [`RunningTime::test_now`].

pub mod core;
pub mod stats;
pub mod timing;
pub mod ui;
pub mod utils;

pub use crate::core::{
    default_min_running_time, set_default_min_running_time, BenchConfig, Benchmark,
};
pub use crate::stats::estimate::{refine, Estimate};
pub use crate::timing::{micros_to_ticks, ticks_to_micros, RunningTime, TICKS_PER_SECOND};
pub use crate::utils::sched::SchedGuard;

/// Library version
pub const VERSION: &str = "0.1.0";

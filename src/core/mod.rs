//! Adaptive measurement core.
//!
//! [`Benchmark`] measures a piece of code by doubling the repetition count
//! per observation until a single timing window exceeds the configured
//! minimum running time, folding each batch of per-call durations into a
//! stability-gated estimate of mean, variance and standard deviation.
//! Results are kept in ticks with microsecond views derived on demand.

use std::fmt;
use std::fs;
use std::hint::black_box;
use std::io::{self, Error, ErrorKind};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::stats::estimate::{refine, Estimate};
use crate::timing::ticks_to_micros;
use crate::utils::sched::SchedGuard;

// ============================================================================
// CONFIGURATION
// ============================================================================

lazy_static::lazy_static! {
    static ref DEFAULT_MIN_RUNNING_TIME: Mutex<Duration> = Mutex::new(Duration::from_millis(25));
}

/// Process-wide default minimum running time per observation.
pub fn default_min_running_time() -> Duration {
    *DEFAULT_MIN_RUNNING_TIME.lock().unwrap()
}

/// Override the process-wide default minimum running time per observation.
pub fn set_default_min_running_time(value: Duration) {
    *DEFAULT_MIN_RUNNING_TIME.lock().unwrap() = value;
}

/// Parameters for one adaptive benchmark run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BenchConfig {
    /// A growth-loop iteration ends the run once one timing window takes at
    /// least this long.
    #[serde(rename = "MinRunningTimeMs", deserialize_with = "validate_positive_f64")]
    pub min_running_time_ms: f64,
    /// Wall-clock duration of the warm-up phase. A warm-up of 1000-1500 ms
    /// stabilizes the CPU cache and pipeline.
    #[serde(rename = "WarmupMs")]
    pub warmup_ms: u64,
    /// Timed observations per growth-loop iteration.
    #[serde(rename = "Observations", deserialize_with = "validate_positive_usize")]
    pub observations: usize,
}

fn validate_positive_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(serde::de::Error::custom("Value must be positive"))
    }
}

fn validate_positive_usize<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = usize::deserialize(deserializer)?;
    if value > 0 {
        Ok(value)
    } else {
        Err(serde::de::Error::custom("Value must be positive"))
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            min_running_time_ms: default_min_running_time().as_secs_f64() * 1000.0,
            warmup_ms: 1500,
            observations: 1,
        }
    }
}

impl BenchConfig {
    /// Load parameters from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        fs::read_to_string(path).and_then(|content| {
            serde_json::from_str(&content).map_err(|e| Error::new(ErrorKind::InvalidData, e))
        })
    }
}

// ============================================================================
// ADAPTIVE BENCHMARK
// ============================================================================

/// Result of an adaptive benchmark run.
///
/// Created zeroed with a label, updated only through the refiner's accept
/// path while the growth loop runs, immutable once returned.
#[derive(Debug, Clone)]
pub struct Benchmark {
    label: String,
    mean_ticks: f64,
    variance_ticks: f64,
    std_dev_ticks: f64,
}

impl Benchmark {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            mean_ticks: 0.0,
            variance_ticks: 0.0,
            std_dev_ticks: 0.0,
        }
    }

    /// Benchmark `piece_of_code` with the process-wide defaults and a single
    /// observation per iteration.
    ///
    /// The closure receives the observation index and must return a value;
    /// the harness consumes it so the timed call cannot be optimized away.
    ///
    /// With a single observation per iteration every batch has one sample,
    /// which the refiner skips (sample variance needs `n - 1 >= 1`), so the
    /// returned statistics stay zeroed. Use [`Benchmark::test_with`] and two
    /// or more observations to get an accepted estimate.
    pub fn test_now<F>(piece_of_code: F, label: &str) -> Self
    where
        F: FnMut(usize) -> f64,
    {
        Self::test_with(piece_of_code, label, &BenchConfig::default())
    }

    /// Benchmark `piece_of_code` with explicit parameters.
    pub fn test_with<F>(mut piece_of_code: F, label: &str, config: &BenchConfig) -> Self
    where
        F: FnMut(usize) -> f64,
    {
        let mut benchmark = Self::new(label);
        let dummy = benchmark.measure_execution_time(&mut piece_of_code, config);
        black_box(dummy);
        benchmark
    }

    /// Warm-up, then the growth loop described in
    /// <https://www.itu.dk/people/sestoft/papers/benchmarking.pdf>:
    /// double the repetition count until the last timing window meets the
    /// minimum running time, refining the statistics after every batch.
    fn measure_execution_time<F>(&mut self, action: &mut F, config: &BenchConfig) -> f64
    where
        F: FnMut(usize) -> f64,
    {
        let min_running_ticks =
            Duration::from_secs_f64(config.min_running_time_ms / 1000.0).as_nanos() as u64;

        // No collector to drain before measuring in Rust; the warm-up below
        // carries the "no memory-management pause inside a timed window"
        // intent as far as the platform allows.

        // Restored on every exit path, including a panicking action.
        let _sched = SchedGuard::acquire();

        let mut dummy = 1.0f64;

        let warmup = Duration::from_millis(config.warmup_ms);
        let warmup_start = Instant::now();
        while warmup_start.elapsed() < warmup {
            dummy = action(0);
            black_box(dummy);
        }

        let mut times_for_same_call: u32 = 1;
        let mut last_elapsed_ticks: u64 = 0;
        let mut estimate = Estimate::default();
        let mut values: Vec<f64> = Vec::with_capacity(config.observations);

        loop {
            times_for_same_call = match times_for_same_call.checked_mul(2) {
                Some(doubled) => doubled,
                None => break,
            };

            values.clear();

            for j in 0..config.observations {
                let start = Instant::now();
                for _ in 0..times_for_same_call {
                    dummy = action(j);
                }
                let elapsed = start.elapsed();
                black_box(dummy);

                last_elapsed_ticks = elapsed.as_nanos() as u64;
                values.push(last_elapsed_ticks as f64 / f64::from(times_for_same_call));
            }

            estimate = refine(estimate, &values);
            self.store(estimate);

            // Live convergence feedback after every iteration.
            println!("{}", self);

            if last_elapsed_ticks >= min_running_ticks {
                break;
            }
        }

        // Both exits leave the last collected batch already folded in; the
        // final refine re-folds it so the result never depends on the exit
        // path.
        estimate = refine(estimate, &values);
        self.store(estimate);

        dummy
    }

    fn store(&mut self, estimate: Estimate) {
        self.mean_ticks = estimate.mean;
        self.variance_ticks = estimate.variance;
        self.std_dev_ticks = estimate.std_dev;
    }

    /// Identifying label, set at construction.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Mean per-call duration in ticks.
    pub fn mean_ticks(&self) -> f64 {
        self.mean_ticks
    }

    /// Sample variance of the per-call duration in ticks.
    pub fn variance_ticks(&self) -> f64 {
        self.variance_ticks
    }

    /// Standard deviation of the per-call duration in ticks.
    pub fn std_dev_ticks(&self) -> f64 {
        self.std_dev_ticks
    }

    /// Mean per-call duration in microseconds.
    pub fn mean_micros(&self) -> f64 {
        ticks_to_micros(self.mean_ticks)
    }

    /// Sample variance in microseconds.
    pub fn variance_micros(&self) -> f64 {
        ticks_to_micros(self.variance_ticks)
    }

    /// Standard deviation in microseconds.
    pub fn std_dev_micros(&self) -> f64 {
        ticks_to_micros(self.std_dev_ticks)
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Performed {} Mean = {:.5}µs; Variance = {:.5}µs; SDev = {:.5}µs",
            self.label,
            self.mean_micros(),
            self.variance_micros(),
            self.std_dev_micros()
        )
    }
}

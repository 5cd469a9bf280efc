//! Stability-gated refinement of the running statistics estimate.
//!
//! The sampler hands one batch of per-call durations per growth-loop
//! iteration to [`refine`], which recomputes mean, variance and standard
//! deviation and keeps whichever estimate has the lower spread.

/// Running (mean, variance, standard deviation) triple, in ticks.
///
/// The three fields only change together, through the accept path of
/// [`refine`]. `std_dev` is always the square root of `variance`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Estimate {
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
}

/// Fold a batch of per-call duration samples into `current`.
///
/// Computes the batch mean and the sample variance with Bessel's correction
/// (sum of squared deviations over `n - 1`). The candidate replaces the
/// stored triple only when the batch spread is strictly lower than the
/// stored one, or when no estimate exists yet. Later, noisier batches are
/// discarded rather than accepted.
pub fn refine(current: Estimate, batch: &[f64]) -> Estimate {
    // Bessel's correction divides by n - 1, so fewer than two samples is
    // insufficient data, not an error.
    if batch.len() < 2 {
        return current;
    }

    let n = batch.len() as f64;
    let mean = batch.iter().sum::<f64>() / n;
    let variance = batch.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();

    // A stored standard deviation of exactly zero doubles as "no estimate
    // yet", so a genuinely zero-variance estimate is always displaced by the
    // next batch. Inherited behavior, kept as-is.
    if current.std_dev == 0.0 || std_dev < current.std_dev {
        Estimate {
            mean,
            variance,
            std_dev,
        }
    } else {
        current
    }
}

//! End-to-end checks of the public harness API.

use std::time::Duration;

use speedbench::{refine, BenchConfig, Benchmark, Estimate, RunningTime};

fn quick_config(min_running_time_ms: f64, observations: usize) -> BenchConfig {
    BenchConfig {
        min_running_time_ms,
        warmup_ms: 0,
        observations,
    }
}

#[test]
fn adaptive_run_reports_consistent_statistics() {
    let result = Benchmark::test_with(
        |i| {
            std::thread::sleep(Duration::from_micros(200));
            i as f64
        },
        "sleep 200us",
        &quick_config(2.0, 4),
    );

    assert_eq!(result.label(), "sleep 200us");
    assert!(result.mean_ticks() > 0.0);
    assert_eq!(result.std_dev_ticks(), result.variance_ticks().sqrt());

    // The synthetic delay is a hard floor for the per-call mean.
    assert!(result.mean_micros() >= 199.0);
}

#[test]
fn microsecond_views_derive_from_ticks() {
    let result = Benchmark::test_with(|i| i as f64 + 1.0, "views", &quick_config(0.05, 2));

    let expected = (result.mean_ticks() * 1000.0) / 1_000_000.0;
    assert!((result.mean_micros() - expected).abs() < 1e-9);
}

#[test]
fn single_shot_is_comparable_with_adaptive_results() {
    let running_time = RunningTime::test_now(|| std::thread::sleep(Duration::from_millis(2)));

    assert!(running_time.as_micros() >= 2000.0);
    assert!(running_time.to_string().starts_with("Running time = "));
}

#[test]
fn refiner_accept_rule_via_public_api() {
    let stored = Estimate {
        mean: 5.0,
        variance: 4.0,
        std_dev: 2.0,
    };

    // Empty batch: no update.
    assert_eq!(refine(stored, &[]), stored);

    // Perfectly stable batch replaces the stored triple.
    let zeroed = refine(stored, &[10.0, 10.0]);
    assert_eq!(zeroed.mean, 10.0);
    assert_eq!(zeroed.std_dev, 0.0);

    // And a zero stored spread is always displaced by the next batch.
    let displaced = refine(zeroed, &[1.0, 100.0]);
    assert!(displaced.std_dev > 60.0);
}

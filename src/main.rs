use std::io;
use std::time::Duration;

use colored::Colorize;

use speedbench::ui::report::{case_progress, print_banner, results_table};
use speedbench::{BenchConfig, Benchmark, RunningTime};

fn main() {
    if let Err(e) = run() {
        eprintln!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> io::Result<()> {
    print_banner("Speedbench - Adaptive Microbenchmarks");

    // appsettings.json overrides the built-in defaults when present.
    let config = match BenchConfig::load("appsettings.json") {
        Ok(config) => config,
        Err(e) if e.kind() == io::ErrorKind::NotFound => BenchConfig::default(),
        Err(e) => {
            eprintln!("❌ Configuration Error: {}", e);
            return Err(e);
        }
    };

    println!("{}", "Benchmark Parameters".bold().yellow());
    println!("━━━━━━━━━━━━━━━━━━━");
    println!("▸ Min running time: {:.1} ms per observation", config.min_running_time_ms);
    println!("▸ Warm-up:          {} ms", config.warmup_ms);
    println!("▸ Observations:     {}", config.observations);
    println!();

    // One-off measurement first; same tick unit as the adaptive results.
    println!("{}", "Single-Shot Timing".bold().yellow());
    println!("━━━━━━━━━━━━━━━━━━");
    let once = RunningTime::test_now(|| {
        std::thread::sleep(Duration::from_millis(5));
    });
    println!("{}", once);
    println!();

    let cases: Vec<(&str, Box<dyn FnMut(usize) -> f64>)> = vec![
        (
            "f64 sqrt sum (1k)",
            Box::new(|i: usize| -> f64 { (0..1_000).map(|n| ((n + i) as f64).sqrt()).sum() }),
        ),
        (
            "vec push (1k)",
            Box::new(|i: usize| -> f64 {
                let mut v = Vec::with_capacity(1_000);
                for n in 0..1_000 {
                    v.push(n + i);
                }
                v.len() as f64
            }),
        ),
        (
            "string format",
            Box::new(|i: usize| -> f64 { format!("case {}", i).len() as f64 }),
        ),
    ];

    println!("{}", "Adaptive Benchmarks".bold().yellow());
    println!("━━━━━━━━━━━━━━━━━━━");

    let pb = case_progress(cases.len() as u64);
    let mut results = Vec::with_capacity(cases.len());

    for (label, op) in cases {
        pb.set_message(label.to_string());
        results.push(Benchmark::test_with(op, label, &config));
        pb.inc(1);
    }
    pb.finish_with_message("benchmarks completed");

    println!("\n{}", "Results".bold().yellow());
    println!("{}", results_table(&results));

    Ok(())
}

//! Console reporting for the demo binary.

use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Table};
use indicatif::{ProgressBar, ProgressStyle};
use sysinfo::System;

use crate::core::Benchmark;

/// Print the title block and a short system information section.
pub fn print_banner(title: &str) {
    let separator = "=".repeat(60);

    println!("\n{}", separator);
    println!("{:^60}", title.bold().cyan());
    println!("{}\n", separator);

    println!("{}", "System Information".bold().yellow());
    println!("━━━━━━━━━━━━━━━━━━━");

    let info = os_info::get();
    println!("▸ OS:  {} {}", info.os_type(), info.version());

    let system = System::new_all();
    let cpu = system
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    println!("▸ CPU: {}", cpu);
    println!();
}

/// Progress bar over a known number of benchmark cases.
pub fn case_progress(cases: u64) -> ProgressBar {
    let pb = ProgressBar::new(cases);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    pb
}

/// Summary table of finished benchmark results, in microseconds.
pub fn results_table(results: &[Benchmark]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Label",
        "Mean (µs)",
        "Variance (µs)",
        "SDev (µs)",
    ]);

    for result in results {
        table.add_row(vec![
            Cell::new(result.label()),
            Cell::new(format!("{:.5}", result.mean_micros())),
            Cell::new(format!("{:.5}", result.variance_micros())),
            Cell::new(format!("{:.5}", result.std_dev_micros())),
        ]);
    }

    table
}

//! Console output: banner, progress and result tables.

pub mod report;

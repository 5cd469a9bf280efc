//! Utility infrastructure shared by the measurement core.

pub mod sched;

pub use sched::SchedGuard;

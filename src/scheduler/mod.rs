//! Critical path scheduling.
//!
//! Computes early/late dates, total float and the critical path of a task
//! graph with the Critical Path Method, and collects the non-fatal
//! findings (warnings) that scheduling and mutation produce.
//!
//! # References
//!
//! - Kelley & Walker (1959), "Critical-Path Planning and Scheduling"
//! - PMI (2021), "PMBOK Guide", Schedule Management

mod critical_path;
mod warning;

pub use critical_path::{calculate_critical_path, CriticalPathResult, TaskTiming};
pub use warning::{ScheduleWarning, WarningKind};

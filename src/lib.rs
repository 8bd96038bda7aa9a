//! Project scheduling core.
//!
//! Holds a project's tasks as an explicit [`TaskGraph`] value and provides
//! the pure computations a Gantt-style planner is built on: dependency
//! validation, the Critical Path Method, validated schedule edits with
//! successor cascading, and Earned Value Management.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `Dependency`, `SchedulingConstraint`,
//!   `TaskGraph`, `Project`
//! - **`validation`**: Dependency and date checks (dangling edges, cycles,
//!   edge date violations)
//! - **`scheduler`**: CPM forward/backward passes, total float, critical path
//! - **`mutation`**: `ScheduleMutator`: move, resize, link, hierarchy edits
//! - **`evm`**: Per-task earned value and project KPIs
//! - **`export`**: Flat interchange records with ISO dates
//! - **`config`**: TOML configuration
//!
//! # Data flow
//!
//! An edit goes through [`ScheduleMutator`], which validates it on a copy of
//! the graph, cascades date shifts to successors, and recomputes the
//! critical path. The caller's graph is never modified; an accepted edit
//! returns a new graph. EVM runs on demand over task values alone.
//!
//! ```
//! use chrono::NaiveDate;
//! use u_schedule_core::{calculate_critical_path, move_task, Task, TaskGraph};
//!
//! let day0 = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
//! let graph = TaskGraph::from_tasks(vec![
//!     Task::new("A", day0).with_duration(5),
//!     Task::new("B", day0).with_duration(3).with_predecessor("A"),
//! ])
//! .unwrap();
//!
//! let cpm = calculate_critical_path(&graph).unwrap();
//! assert_eq!(cpm.project_duration, 8);
//!
//! let outcome = move_task(&graph, "A", 2).unwrap();
//! assert_eq!(outcome.critical_path.project_duration, 10);
//! ```
//!
//! # References
//!
//! - Kelley & Walker (1959), "Critical-Path Planning and Scheduling"
//! - PMI (2019), "The Standard for Earned Value Management"

pub mod config;
pub mod error;
pub mod evm;
pub mod export;
pub mod models;
pub mod mutation;
pub mod scheduler;
pub mod validation;

use chrono::NaiveDate;

pub use config::{CoreConfig, SchedulingConfig};
pub use error::{Result, ScheduleError};
pub use evm::{EvmData, EvmThresholds, HealthStatus, KpiMetrics, RiskLevel};
pub use models::{
    Dependency, DependencyType, Project, SchedulingConstraint, Task, TaskGraph, TaskStatus,
};
pub use mutation::{MutationOutcome, ResizeEdge, ScheduleMutator, TaskShift};
pub use scheduler::{CriticalPathResult, ScheduleWarning, TaskTiming, WarningKind};
pub use validation::{ValidationError, ValidationErrorKind, ValidationResult};

pub use evm::{calculate_evm, calculate_kpis};
pub use scheduler::calculate_critical_path;
pub use validation::{validate_dependencies, validate_task_dates};

/// Shifts a task by `delta_days` with default settings.
/// See [`ScheduleMutator::move_task`].
pub fn move_task(graph: &TaskGraph, id: &str, delta_days: i64) -> Result<MutationOutcome> {
    ScheduleMutator::new().move_task(graph, id, delta_days)
}

/// See [`ScheduleMutator::resize_task`].
pub fn resize_task(
    graph: &TaskGraph,
    id: &str,
    edge: ResizeEdge,
    delta_days: i64,
) -> Result<MutationOutcome> {
    ScheduleMutator::new().resize_task(graph, id, edge, delta_days)
}

/// See [`ScheduleMutator::set_task_dates`].
pub fn set_task_dates(
    graph: &TaskGraph,
    id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<MutationOutcome> {
    ScheduleMutator::new().set_task_dates(graph, id, start, end)
}

/// See [`ScheduleMutator::indent`].
pub fn indent(graph: &TaskGraph, id: &str) -> Result<MutationOutcome> {
    ScheduleMutator::new().indent(graph, id)
}

/// See [`ScheduleMutator::outdent`].
pub fn outdent(graph: &TaskGraph, id: &str) -> Result<MutationOutcome> {
    ScheduleMutator::new().outdent(graph, id)
}

/// See [`ScheduleMutator::move_in_hierarchy`].
pub fn move_in_hierarchy(graph: &TaskGraph, id: &str, target_id: &str) -> Result<MutationOutcome> {
    ScheduleMutator::new().move_in_hierarchy(graph, id, target_id)
}

/// See [`ScheduleMutator::link`].
pub fn link(
    graph: &TaskGraph,
    from_id: &str,
    to_id: &str,
    kind: DependencyType,
    lag: i64,
) -> Result<MutationOutcome> {
    ScheduleMutator::new().link(graph, from_id, to_id, kind, lag)
}

/// See [`ScheduleMutator::unlink`].
pub fn unlink(graph: &TaskGraph, from_id: &str, to_id: &str) -> Result<MutationOutcome> {
    ScheduleMutator::new().unlink(graph, from_id, to_id)
}

//! Scheduling domain models.
//!
//! Provides the core data types of the project scheduling core: tasks,
//! typed dependency edges, date constraints, the owned task graph, and
//! project metadata for KPI roll-ups.
//!
//! # Construction Mapping
//!
//! | u-schedule-core | Gantt UI | Field |
//! |-----------------|----------|-------|
//! | Task | Bar / row | Work package |
//! | Dependency | Link arrow | Handover |
//! | SchedulingConstraint | Pin | Contract date |
//! | TaskGraph | Project plan | Programme |

mod constraint;
mod dependency;
mod graph;
mod project;
mod task;

pub use constraint::{ConstraintBreach, ConstraintKind, ConstraintStrength, SchedulingConstraint};
pub use dependency::{Dependency, DependencyType};
pub use graph::{TaskGraph, MAX_LEVEL};
pub use project::Project;
pub use task::{Task, TaskStatus, DEFAULT_DURATION_DAYS};

pub(crate) use graph::check_task_shape;
pub(crate) use task::{add_days, checked_add_days, days_between};

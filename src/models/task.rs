//! Task model.
//!
//! A task is the scheduling unit of a project: a dated span of work with
//! progress, cost, a place in the outline hierarchy, and typed incoming
//! dependency edges.
//!
//! # Time Representation
//! Dates have day granularity. `end` is the exclusive finish boundary, so
//! `duration = end - start` in days and a milestone has `start == end`.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Dependency, DependencyType, SchedulingConstraint};
use crate::error::{Result, ScheduleError};

/// Default duration (days) of a newly created task.
pub const DEFAULT_DURATION_DAYS: i64 = 1;

/// Progress status of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Status implied by a percent-complete value.
    pub fn from_progress(percent_complete: u8) -> Self {
        match percent_complete {
            0 => Self::NotStarted,
            p if p >= 100 => Self::Completed,
            _ => Self::InProgress,
        }
    }
}

/// A task to be scheduled.
///
/// Temporal, progress and dependency fields are crate-private: once a task
/// is in a [`TaskGraph`](super::TaskGraph) they change only through the
/// mutation operations, which validate and propagate every edit. Use the
/// builder methods to describe a task before inserting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Assigned resource (crew, subcontractor), if any.
    #[serde(default)]
    pub resource: Option<String>,
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
    pub(crate) duration: i64,
    #[serde(default)]
    pub(crate) is_milestone: bool,
    #[serde(default)]
    pub(crate) percent_complete: u8,
    #[serde(default)]
    pub(crate) status: TaskStatus,
    /// Outline depth (0 = top level).
    #[serde(default)]
    pub(crate) level: u8,
    /// Order among siblings.
    #[serde(default)]
    pub(crate) position: u32,
    #[serde(default)]
    pub(crate) children: Vec<String>,
    /// Display flag only; never consulted by scheduling.
    #[serde(default = "default_expanded")]
    pub is_expanded: bool,
    /// Planned value basis.
    #[serde(default)]
    pub budgeted_cost: f64,
    #[serde(default)]
    pub actual_cost: f64,
    /// Typed incoming edges (this task is the successor).
    #[serde(default)]
    pub(crate) dependencies: Vec<Dependency>,
    /// Derived view of `dependencies`, rebuilt by the graph.
    #[serde(default)]
    pub(crate) predecessors: Vec<String>,
    /// Derived view of other tasks' `dependencies`, rebuilt by the graph.
    #[serde(default)]
    pub(crate) successors: Vec<String>,
    #[serde(default)]
    pub(crate) constraint: Option<SchedulingConstraint>,
}

fn default_expanded() -> bool {
    true
}

impl Task {
    /// Creates a task starting on `start` with the default duration and no edges.
    pub fn new(id: impl Into<String>, start: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            resource: None,
            start,
            end: add_days(start, DEFAULT_DURATION_DAYS),
            duration: DEFAULT_DURATION_DAYS,
            is_milestone: false,
            percent_complete: 0,
            status: TaskStatus::NotStarted,
            level: 0,
            position: 0,
            children: Vec::new(),
            is_expanded: true,
            budgeted_cost: 0.0,
            actual_cost: 0.0,
            dependencies: Vec::new(),
            predecessors: Vec::new(),
            successors: Vec::new(),
            constraint: None,
        }
    }

    /// Creates a zero-duration milestone on `date`.
    pub fn milestone(id: impl Into<String>, date: NaiveDate) -> Self {
        let mut task = Self::new(id, date);
        task.end = date;
        task.duration = 0;
        task.is_milestone = true;
        task
    }

    /// Sets the task name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the assigned resource.
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Sets the duration in days, moving `end` accordingly.
    ///
    /// Ignored for milestones.
    pub fn with_duration(mut self, days: i64) -> Self {
        if !self.is_milestone {
            self.duration = days;
            self.end = add_days(self.start, days);
        }
        self
    }

    /// Sets explicit start and end dates.
    ///
    /// The duration follows from the dates; the graph rejects `start > end`.
    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = start;
        self.end = end;
        self.duration = days_between(start, end);
        self
    }

    /// Sets percent complete (clamped to 100) and derives the status.
    pub fn with_progress(mut self, percent_complete: u8) -> Self {
        self.percent_complete = percent_complete.min(100);
        self.status = TaskStatus::from_progress(self.percent_complete);
        self
    }

    /// Sets planned and actual cost.
    pub fn with_costs(mut self, budgeted_cost: f64, actual_cost: f64) -> Self {
        self.budgeted_cost = budgeted_cost;
        self.actual_cost = actual_cost;
        self
    }

    /// Adds a finish-to-start dependency on `from_task_id` with zero lag.
    pub fn with_predecessor(self, from_task_id: impl Into<String>) -> Self {
        self.with_dependency(Dependency::new(from_task_id, DependencyType::FinishToStart, 0))
    }

    /// Adds a typed incoming dependency.
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Sets a scheduling constraint.
    pub fn with_constraint(mut self, constraint: SchedulingConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Duration in days.
    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn is_milestone(&self) -> bool {
        self.is_milestone
    }

    pub fn percent_complete(&self) -> u8 {
        self.percent_complete
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    /// Child task IDs in ascending position order.
    pub fn children(&self) -> &[String] {
        &self.children
    }

    /// Typed incoming dependency edges.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// IDs of tasks this one depends on (derived).
    pub fn predecessors(&self) -> &[String] {
        &self.predecessors
    }

    /// IDs of tasks that depend on this one (derived).
    pub fn successors(&self) -> &[String] {
        &self.successors
    }

    pub fn constraint(&self) -> Option<&SchedulingConstraint> {
        self.constraint.as_ref()
    }

    /// Whether the task carries a must-start-on / must-finish-on constraint.
    pub fn has_hard_constraint(&self) -> bool {
        self.constraint.as_ref().is_some_and(|c| c.kind.is_hard())
    }

    /// Finds the incoming edge from `from_task_id`, if any.
    pub fn dependency_on(&self, from_task_id: &str) -> Option<&Dependency> {
        self.dependencies
            .iter()
            .find(|d| d.from_task_id == from_task_id)
    }

    /// Shifts both dates by `delta` days, keeping the duration.
    ///
    /// Fails without change if either date would leave the calendar range.
    pub(crate) fn shift(&mut self, delta: i64) -> Result<()> {
        let out_of_range = || ScheduleError::DateOutOfRange {
            task_id: self.id.clone(),
            delta,
        };
        let start = checked_add_days(self.start, delta).ok_or_else(out_of_range)?;
        let end = checked_add_days(self.end, delta).ok_or_else(out_of_range)?;
        self.start = start;
        self.end = end;
        Ok(())
    }

    /// Sets both dates and recomputes the duration.
    pub(crate) fn set_dates(&mut self, start: NaiveDate, end: NaiveDate) {
        self.start = start;
        self.end = end;
        self.duration = days_between(start, end);
    }
}

/// Adds a signed number of days to a date, `None` outside the calendar range.
pub(crate) fn checked_add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    }
}

/// Adds a signed number of days to a date, saturating at the calendar range.
///
/// Only for display-side conversions; edits use [`checked_add_days`].
pub(crate) fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    checked_add_days(date, days).unwrap_or(if days >= 0 {
        NaiveDate::MAX
    } else {
        NaiveDate::MIN
    })
}

/// Whole days from `from` to `to` (negative if `to` is earlier).
pub(crate) fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

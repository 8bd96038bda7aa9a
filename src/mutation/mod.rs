//! Schedule mutation.
//!
//! Every edit to a task graph goes through [`ScheduleMutator`]. An edit is
//! applied to a private copy of the graph, validated, cascaded to dependent
//! tasks, and finished with a full CPM pass. Either the whole edit is
//! accepted and a fresh graph plus its critical path is returned, or an
//! error is returned and the caller's graph is untouched.
//!
//! # Cascading
//!
//! When an edit moves a task, every successor whose incoming edges are no
//! longer satisfied is shifted forward by the minimum number of days, in
//! topological order. A successor pinned by a must-start-on/must-finish-on
//! constraint stops the cascade and the edit is rejected with
//! [`ScheduleError::ConstraintConflict`]. Breaking a soft constraint only
//! adds a warning.

mod cascade;
mod hierarchy;

pub use cascade::TaskShift;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SchedulingConfig;
use crate::error::{Result, ScheduleError};
use crate::models::{
    add_days, check_task_shape, checked_add_days, Dependency, DependencyType, Task, TaskGraph, TaskStatus,
};
use crate::scheduler::{calculate_critical_path, CriticalPathResult, ScheduleWarning};
use crate::validation::{validate_dependencies, validate_task_dates, ValidationErrorKind};

/// Which edge of a task bar a resize drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeEdge {
    Start,
    End,
}

/// Result of an accepted edit.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    /// The updated graph.
    pub graph: TaskGraph,
    /// CPM over the updated graph.
    pub critical_path: CriticalPathResult,
    /// Tasks moved by cascading, in the order they were shifted.
    pub shifted: Vec<TaskShift>,
    /// Non-blocking findings of the edit.
    pub warnings: Vec<ScheduleWarning>,
}

/// Rounds a fractional day delta (e.g. from a drag) to whole days.
///
/// # Errors
/// [`ScheduleError::InvalidDelta`] for NaN, infinities, and values outside
/// the `i64` range.
pub fn snap_to_days(delta: f64) -> Result<i64> {
    let rounded = delta.round();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return Err(ScheduleError::InvalidDelta(delta));
    }
    Ok(rounded as i64)
}

/// Working copy of a graph for one edit.
struct Draft {
    graph: TaskGraph,
    /// Edited directly; dates are kept, successors are examined.
    moved: BTreeSet<String>,
    /// Examined by the cascade themselves.
    marked: BTreeSet<String>,
}

impl Draft {
    fn new(graph: &TaskGraph) -> Self {
        Self {
            graph: graph.clone(),
            moved: BTreeSet::new(),
            marked: BTreeSet::new(),
        }
    }
}

/// Applies edits to task graphs.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_schedule_core::models::{Task, TaskGraph};
/// use u_schedule_core::mutation::ScheduleMutator;
///
/// let day0 = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
/// let graph = TaskGraph::from_tasks(vec![
///     Task::new("A", day0).with_duration(5),
///     Task::new("B", day0 + chrono::Days::new(5)).with_duration(3).with_predecessor("A"),
/// ])
/// .unwrap();
///
/// let outcome = ScheduleMutator::new().move_task(&graph, "A", 2).unwrap();
/// assert_eq!(outcome.shifted[0].task_id, "B");
/// assert_eq!(outcome.critical_path.project_duration, 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScheduleMutator {
    config: SchedulingConfig,
}

impl ScheduleMutator {
    /// Creates a mutator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scheduling configuration.
    pub fn with_config(mut self, config: SchedulingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    /// A new task with the configured default duration.
    pub fn new_task(&self, id: impl Into<String>, start: NaiveDate) -> Task {
        Task::new(id, start).with_duration(self.config.default_duration_days)
    }

    /// Shifts a task's start and end by `delta_days`, then cascades.
    pub fn move_task(&self, graph: &TaskGraph, id: &str, delta_days: i64) -> Result<MutationOutcome> {
        self.apply(graph, "move_task", id, |draft| {
            let task = draft.graph.require_mut(id)?;
            let before = hard_breach_days(task);
            task.shift(delta_days)?;
            ensure_hard_constraint_kept(task, before)?;
            draft.moved.insert(id.to_string());
            Ok(())
        })
    }

    /// Drags one edge of a task by `delta_days`, then cascades.
    ///
    /// The duration never drops below one day. Milestones cannot be resized.
    pub fn resize_task(
        &self,
        graph: &TaskGraph,
        id: &str,
        edge: ResizeEdge,
        delta_days: i64,
    ) -> Result<MutationOutcome> {
        self.apply(graph, "resize_task", id, |draft| {
            let task = draft.graph.require_mut(id)?;
            if task.is_milestone {
                return Err(ScheduleError::MilestoneResize(id.to_string()));
            }
            let before = hard_breach_days(task);
            let out_of_range = || ScheduleError::DateOutOfRange {
                task_id: id.to_string(),
                delta: delta_days,
            };
            let (start, end) = match edge {
                ResizeEdge::Start => {
                    let latest = add_days(task.end, -1);
                    let dragged =
                        checked_add_days(task.start, delta_days).ok_or_else(out_of_range)?;
                    (dragged.min(latest), task.end)
                }
                ResizeEdge::End => {
                    let earliest = add_days(task.start, 1);
                    let dragged = checked_add_days(task.end, delta_days).ok_or_else(out_of_range)?;
                    (task.start, dragged.max(earliest))
                }
            };
            task.set_dates(start, end);
            ensure_hard_constraint_kept(task, before)?;
            draft.moved.insert(id.to_string());
            Ok(())
        })
    }

    /// Sets a task's dates explicitly, then cascades.
    ///
    /// Violations of the task's own incoming edges are reported as warnings
    /// on the outcome; use [`validate_task_dates`] first to block instead.
    pub fn set_task_dates(
        &self,
        graph: &TaskGraph,
        id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MutationOutcome> {
        self.apply(graph, "set_task_dates", id, |draft| {
            let task = draft.graph.require_mut(id)?;
            if start > end {
                return Err(ScheduleError::InvalidDateRange {
                    task_id: id.to_string(),
                    start,
                    end,
                });
            }
            let before = hard_breach_days(task);
            task.set_dates(start, end);
            check_task_shape(task)?;
            ensure_hard_constraint_kept(task, before)?;
            draft.moved.insert(id.to_string());
            Ok(())
        })
    }

    /// Indents a task under its preceding sibling.
    pub fn indent(&self, graph: &TaskGraph, id: &str) -> Result<MutationOutcome> {
        let max_level = self.config.max_level;
        self.apply(graph, "indent", id, |draft| {
            hierarchy::indent(&mut draft.graph, id, max_level)
        })
    }

    /// Outdents a task to follow its former parent.
    pub fn outdent(&self, graph: &TaskGraph, id: &str) -> Result<MutationOutcome> {
        let max_level = self.config.max_level;
        self.apply(graph, "outdent", id, |draft| {
            hierarchy::outdent(&mut draft.graph, id, max_level)
        })
    }

    /// Moves a task next to `target_id` in the outline.
    pub fn move_in_hierarchy(
        &self,
        graph: &TaskGraph,
        id: &str,
        target_id: &str,
    ) -> Result<MutationOutcome> {
        let max_level = self.config.max_level;
        self.apply(graph, "move_in_hierarchy", id, |draft| {
            hierarchy::move_in_hierarchy(&mut draft.graph, id, target_id, max_level)
        })
    }

    /// Adds a typed dependency `from_id → to_id`, then cascades `to_id`.
    ///
    /// Rejected without change if the edge is a self-dependency, duplicates
    /// an existing edge, references a missing task, or closes a cycle.
    pub fn link(
        &self,
        graph: &TaskGraph,
        from_id: &str,
        to_id: &str,
        kind: DependencyType,
        lag: i64,
    ) -> Result<MutationOutcome> {
        self.apply(graph, "link", to_id, |draft| {
            if from_id == to_id {
                return Err(ScheduleError::SelfDependency(to_id.to_string()));
            }
            if !draft.graph.contains(from_id) {
                return Err(ScheduleError::DanglingReference {
                    task_id: to_id.to_string(),
                    missing_id: from_id.to_string(),
                });
            }
            let target = draft.graph.require_mut(to_id)?;
            if target.dependency_on(from_id).is_some() {
                return Err(ScheduleError::DuplicateDependency {
                    from_id: from_id.to_string(),
                    to_id: to_id.to_string(),
                });
            }
            target
                .dependencies
                .push(Dependency::new(from_id, kind, lag));

            let report = validate_dependencies(&draft.graph);
            if let Some(cycle) = report
                .errors
                .iter()
                .find(|e| e.kind == ValidationErrorKind::CycleDetected)
            {
                return Err(ScheduleError::CycleDetected(cycle.related_ids.clone()));
            }
            draft.marked.insert(to_id.to_string());
            Ok(())
        })
    }

    /// Removes the dependency `from_id → to_id`.
    pub fn unlink(&self, graph: &TaskGraph, from_id: &str, to_id: &str) -> Result<MutationOutcome> {
        self.apply(graph, "unlink", to_id, |draft| {
            let target = draft.graph.require_mut(to_id)?;
            let before = target.dependencies.len();
            target.dependencies.retain(|d| d.from_task_id != from_id);
            if target.dependencies.len() == before {
                return Err(ScheduleError::DependencyNotFound {
                    from_id: from_id.to_string(),
                    to_id: to_id.to_string(),
                });
            }
            Ok(())
        })
    }

    /// Adds a task, at the end of `parent`'s children or of the top level.
    pub fn add_task(
        &self,
        graph: &TaskGraph,
        task: Task,
        parent: Option<&str>,
    ) -> Result<MutationOutcome> {
        let id = task.id.clone();
        let max_level = self.config.max_level;
        self.apply(graph, "add_task", &id, |draft| {
            check_task_shape(&task)?;
            if draft.graph.contains(&task.id) {
                return Err(ScheduleError::DuplicateTask(task.id.clone()));
            }
            if !task.children.is_empty() {
                return Err(ScheduleError::InvalidHierarchyMove {
                    task_id: task.id.clone(),
                    reason: "new tasks cannot bring children".into(),
                });
            }
            for dep in &task.dependencies {
                if dep.from_task_id == task.id {
                    return Err(ScheduleError::SelfDependency(task.id.clone()));
                }
                if !draft.graph.contains(&dep.from_task_id) {
                    return Err(ScheduleError::DanglingReference {
                        task_id: task.id.clone(),
                        missing_id: dep.from_task_id.clone(),
                    });
                }
            }

            let mut task = task;
            let siblings = match parent {
                Some(p) => {
                    let parent_task = draft.graph.require(p)?;
                    let level = parent_task.level as i32 + 1;
                    if level > max_level as i32 {
                        return Err(ScheduleError::HierarchyBoundsExceeded {
                            task_id: task.id.clone(),
                            level,
                            max_level,
                        });
                    }
                    task.level = level as u8;
                    parent_task.children.clone()
                }
                None => {
                    task.level = 0;
                    draft.graph.roots()
                }
            };
            task.status = TaskStatus::from_progress(task.percent_complete);

            let mut siblings = siblings;
            siblings.push(task.id.clone());
            draft.marked.insert(task.id.clone());
            draft.graph.insert(task);
            draft.graph.set_siblings(parent, &siblings);
            Ok(())
        })
    }

    /// Removes a task, its descendants, and every edge touching them.
    pub fn remove_task(&self, graph: &TaskGraph, id: &str) -> Result<MutationOutcome> {
        self.apply(graph, "remove_task", id, |draft| {
            draft.graph.require(id)?;
            let parent = draft.graph.parent_of(id).map(str::to_string);
            let mut siblings = draft.graph.siblings_of(id);
            siblings.retain(|s| s != id);

            let mut doomed: BTreeSet<String> = draft.graph.descendants(id).into_iter().collect();
            doomed.insert(id.to_string());
            for gone in &doomed {
                draft.graph.remove(gone);
            }
            for other in draft.graph.ids().map(str::to_string).collect::<Vec<_>>() {
                if let Some(t) = draft.graph.get_mut(&other) {
                    t.dependencies.retain(|d| !doomed.contains(&d.from_task_id));
                }
            }
            draft.graph.set_siblings(parent.as_deref(), &siblings);
            Ok(())
        })
    }

    /// Sets percent complete and derives the status.
    pub fn set_progress(
        &self,
        graph: &TaskGraph,
        id: &str,
        percent_complete: u8,
    ) -> Result<MutationOutcome> {
        self.apply(graph, "set_progress", id, |draft| {
            if percent_complete > 100 {
                return Err(ScheduleError::InvalidProgress {
                    task_id: id.to_string(),
                    reason: format!("{percent_complete}% is above 100%"),
                });
            }
            let task = draft.graph.require_mut(id)?;
            task.percent_complete = percent_complete;
            task.status = TaskStatus::from_progress(percent_complete);
            Ok(())
        })
    }

    /// Overrides the status, keeping progress consistent with it.
    ///
    /// Completed sets 100%, NotStarted sets 0%; InProgress keeps the current
    /// progress and requires it to be strictly between 0 and 100.
    pub fn set_status(
        &self,
        graph: &TaskGraph,
        id: &str,
        status: TaskStatus,
    ) -> Result<MutationOutcome> {
        self.apply(graph, "set_status", id, |draft| {
            let task = draft.graph.require_mut(id)?;
            match status {
                TaskStatus::Completed => task.percent_complete = 100,
                TaskStatus::NotStarted => task.percent_complete = 0,
                TaskStatus::InProgress => {
                    if !(1..=99).contains(&task.percent_complete) {
                        return Err(ScheduleError::InvalidProgress {
                            task_id: id.to_string(),
                            reason: format!(
                                "cannot mark in-progress at {}%",
                                task.percent_complete
                            ),
                        });
                    }
                }
            }
            task.status = status;
            Ok(())
        })
    }

    /// Runs `edit` on a copy of `graph`, then cascades and recomputes.
    fn apply<F>(&self, graph: &TaskGraph, op: &str, id: &str, edit: F) -> Result<MutationOutcome>
    where
        F: FnOnce(&mut Draft) -> Result<()>,
    {
        let result = self.try_apply(graph, edit);
        match &result {
            Ok(outcome) => debug!(
                op,
                task = %id,
                shifted = outcome.shifted.len(),
                warnings = outcome.warnings.len(),
                project_duration = outcome.critical_path.project_duration,
                "edit applied"
            ),
            Err(e) => warn!(op, task = %id, error = %e, "edit rejected"),
        }
        result
    }

    fn try_apply<F>(&self, graph: &TaskGraph, edit: F) -> Result<MutationOutcome>
    where
        F: FnOnce(&mut Draft) -> Result<()>,
    {
        let mut draft = Draft::new(graph);
        edit(&mut draft)?;

        let shifted = cascade::cascade(&mut draft.graph, &draft.moved, &draft.marked)?;
        draft.graph.sync_links();

        let mut warnings = Vec::new();
        let touched = draft
            .moved
            .iter()
            .chain(&draft.marked)
            .chain(shifted.iter().map(|s| &s.task_id));
        for id in touched.collect::<BTreeSet<_>>() {
            let Some(task) = draft.graph.get(id) else {
                continue;
            };
            if let Some(breach) = task
                .constraint
                .as_ref()
                .filter(|c| !c.kind.is_hard())
                .and_then(|c| c.check_violation(task.start, task.end))
            {
                warnings.push(ScheduleWarning::soft_constraint(
                    id,
                    format!(
                        "Task '{}' breaks its {:?} constraint by {} day(s)",
                        id,
                        breach.kind,
                        breach.total_days()
                    ),
                ));
            }
            if draft.moved.contains(id) {
                let report = validate_task_dates(id, &draft.graph);
                warnings.extend(
                    report
                        .errors
                        .iter()
                        .filter(|e| e.kind == ValidationErrorKind::DateConstraintViolation)
                        .filter(|e| !e.related_ids.is_empty())
                        .map(|e| ScheduleWarning::date_violation(id, e.message.clone())),
                );
            }
        }

        let critical_path = calculate_critical_path(&draft.graph)?;
        Ok(MutationOutcome {
            graph: draft.graph,
            critical_path,
            shifted,
            warnings,
        })
    }
}

/// Days by which a task currently breaks its hard constraint (0 if none).
fn hard_breach_days(task: &Task) -> i64 {
    task.constraint
        .as_ref()
        .filter(|c| c.kind.is_hard())
        .and_then(|c| c.check_violation(task.start, task.end))
        .map(|b| b.total_days())
        .unwrap_or(0)
}

/// Rejects an edit that breaks (or worsens a breach of) a hard constraint.
fn ensure_hard_constraint_kept(task: &Task, before_days: i64) -> Result<()> {
    let after = hard_breach_days(task);
    if after > before_days {
        let kind = task.constraint.as_ref().map(|c| c.kind);
        return Err(ScheduleError::ConstraintConflict {
            task_id: task.id.clone(),
            reason: format!("edit would break its {kind:?} constraint by {after} day(s)"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SchedulingConstraint;
    use crate::scheduler::WarningKind;

    fn day(n: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .checked_add_days(chrono::Days::new(n))
            .unwrap()
    }

    fn two_chain() -> TaskGraph {
        TaskGraph::from_tasks(vec![
            Task::new("A", day(0)).with_duration(5),
            Task::new("B", day(5)).with_duration(3).with_predecessor("A"),
        ])
        .unwrap()
    }

    #[test]
    fn test_move_cascades_successor() {
        let graph = two_chain();
        let outcome = ScheduleMutator::new().move_task(&graph, "A", 2).unwrap();

        let b = outcome.graph.get("B").unwrap();
        assert_eq!(b.start(), day(7));
        assert_eq!(b.end(), day(10));
        assert_eq!(outcome.shifted, vec![TaskShift { task_id: "B".into(), delta_days: 2 }]);
        assert_eq!(outcome.critical_path.project_duration, 10);
        assert_eq!(outcome.critical_path.critical_tasks, vec!["A", "B"]);
        // Input untouched
        assert_eq!(graph.get("B").unwrap().start(), day(5));
    }

    #[test]
    fn test_move_without_successors_shifts_nothing() {
        let graph = two_chain();
        let outcome = ScheduleMutator::new().move_task(&graph, "B", 1).unwrap();
        assert!(outcome.shifted.is_empty());
        assert_eq!(outcome.graph.get("B").unwrap().start(), day(6));
        assert_eq!(outcome.graph.get("A").unwrap().start(), day(0));
    }

    #[test]
    fn test_move_before_predecessor_warns() {
        let graph = two_chain();
        let outcome = ScheduleMutator::new().move_task(&graph, "B", -2).unwrap();
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::DateConstraintViolation && w.task_id == "B"));
    }

    #[test]
    fn test_cascade_into_pinned_task_rejected() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("A", day(0)).with_duration(5),
            Task::new("B", day(5))
                .with_duration(3)
                .with_predecessor("A")
                .with_constraint(SchedulingConstraint::must_start_on(day(5))),
        ])
        .unwrap();
        let err = ScheduleMutator::new().move_task(&graph, "A", 1).unwrap_err();
        assert!(matches!(err, ScheduleError::ConstraintConflict { task_id, .. } if task_id == "B"));
    }

    #[test]
    fn test_moving_pinned_task_rejected() {
        let graph = TaskGraph::from_tasks(vec![Task::new("A", day(0))
            .with_duration(2)
            .with_constraint(SchedulingConstraint::must_start_on(day(0)))])
        .unwrap();
        assert!(matches!(
            ScheduleMutator::new().move_task(&graph, "A", 3),
            Err(ScheduleError::ConstraintConflict { .. })
        ));
    }

    #[test]
    fn test_soft_constraint_breach_warns() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("A", day(0)).with_duration(5),
            Task::new("B", day(5))
                .with_duration(3)
                .with_predecessor("A")
                .with_constraint(SchedulingConstraint::finish_no_later_than(day(8))),
        ])
        .unwrap();
        let outcome = ScheduleMutator::new().move_task(&graph, "A", 1).unwrap();
        assert_eq!(outcome.graph.get("B").unwrap().end(), day(9));
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::SoftConstraintBreach && w.task_id == "B"));
        assert_eq!(outcome.critical_path.float_of("B"), Some(-1));
    }

    #[test]
    fn test_resize_end_cascades() {
        let graph = two_chain();
        let outcome = ScheduleMutator::new()
            .resize_task(&graph, "A", ResizeEdge::End, 3)
            .unwrap();
        assert_eq!(outcome.graph.get("A").unwrap().duration(), 8);
        assert_eq!(outcome.graph.get("B").unwrap().start(), day(8));
        assert_eq!(outcome.critical_path.project_duration, 11);
    }

    #[test]
    fn test_resize_floors_duration_at_one() {
        let graph = two_chain();
        let m = ScheduleMutator::new();
        let shrunk = m.resize_task(&graph, "A", ResizeEdge::End, -10).unwrap();
        assert_eq!(shrunk.graph.get("A").unwrap().duration(), 1);

        let shrunk = m.resize_task(&graph, "A", ResizeEdge::Start, 9).unwrap();
        let a = shrunk.graph.get("A").unwrap();
        assert_eq!(a.duration(), 1);
        assert_eq!(a.end(), day(5));
    }

    #[test]
    fn test_milestone_resize_rejected() {
        let graph = TaskGraph::from_tasks(vec![Task::milestone("M", day(0))]).unwrap();
        assert!(matches!(
            ScheduleMutator::new().resize_task(&graph, "M", ResizeEdge::End, 2),
            Err(ScheduleError::MilestoneResize(_))
        ));
    }

    #[test]
    fn test_set_task_dates() {
        let graph = two_chain();
        let m = ScheduleMutator::new();
        let outcome = m.set_task_dates(&graph, "A", day(1), day(8)).unwrap();
        assert_eq!(outcome.graph.get("A").unwrap().duration(), 7);
        assert_eq!(outcome.graph.get("B").unwrap().start(), day(8));

        assert!(matches!(
            m.set_task_dates(&graph, "A", day(4), day(2)),
            Err(ScheduleError::InvalidDateRange { .. })
        ));
        assert!(matches!(
            m.set_task_dates(&graph, "A", day(4), day(4)),
            Err(ScheduleError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_link_cascades_target() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("A", day(0)).with_duration(5),
            Task::new("B", day(0)).with_duration(2),
        ])
        .unwrap();
        let outcome = ScheduleMutator::new()
            .link(&graph, "A", "B", DependencyType::FinishToStart, 1)
            .unwrap();
        assert_eq!(outcome.graph.get("B").unwrap().start(), day(6));
        assert_eq!(outcome.graph.get("A").unwrap().successors(), ["B"]);
        assert_eq!(outcome.graph.get("B").unwrap().predecessors(), ["A"]);
    }

    #[test]
    fn test_link_rejections_leave_graph_unchanged() {
        let graph = two_chain();
        let m = ScheduleMutator::new();
        let snapshot = graph.clone();

        assert!(matches!(
            m.link(&graph, "B", "A", DependencyType::FinishToStart, 0),
            Err(ScheduleError::CycleDetected(ids)) if ids == ["A", "B"]
        ));
        assert!(matches!(
            m.link(&graph, "A", "A", DependencyType::FinishToStart, 0),
            Err(ScheduleError::SelfDependency(_))
        ));
        assert!(matches!(
            m.link(&graph, "A", "B", DependencyType::StartToStart, 0),
            Err(ScheduleError::DuplicateDependency { .. })
        ));
        assert!(matches!(
            m.link(&graph, "Z", "B", DependencyType::FinishToStart, 0),
            Err(ScheduleError::DanglingReference { .. })
        ));
        assert_eq!(graph, snapshot);
    }

    #[test]
    fn test_unlink() {
        let graph = two_chain();
        let m = ScheduleMutator::new();
        let outcome = m.unlink(&graph, "A", "B").unwrap();
        assert!(outcome.graph.get("A").unwrap().successors().is_empty());
        assert!(outcome.graph.get("B").unwrap().dependencies().is_empty());

        assert!(matches!(
            m.unlink(&outcome.graph, "A", "B"),
            Err(ScheduleError::DependencyNotFound { .. })
        ));
    }

    #[test]
    fn test_indent_at_max_level_rejected() {
        let mut tasks = Vec::new();
        for (i, id) in ["L0", "L1", "L2", "L3", "L4", "L5"].iter().enumerate() {
            let mut t = Task::new(*id, day(0));
            if i < 5 {
                t.children = vec![format!("L{}", i + 1)];
            }
            tasks.push(t);
        }
        let graph = TaskGraph::from_tasks(tasks).unwrap();
        assert_eq!(graph.get("L5").unwrap().level(), 5);

        let err = ScheduleMutator::new().indent(&graph, "L5").unwrap_err();
        assert!(matches!(err, ScheduleError::HierarchyBoundsExceeded { level: 6, .. }));
    }

    #[test]
    fn test_add_and_remove_task() {
        let graph = two_chain();
        let m = ScheduleMutator::new();
        let c = m.new_task("C", day(0)).with_predecessor("B");
        let added = m.add_task(&graph, c, Some("A")).unwrap();

        let c = added.graph.get("C").unwrap();
        assert_eq!(c.level(), 1);
        assert_eq!(c.start(), day(8));
        assert_eq!(added.graph.get("A").unwrap().children(), ["C"]);

        let removed = m.remove_task(&added.graph, "A").unwrap();
        assert!(!removed.graph.contains("A"));
        assert!(!removed.graph.contains("C"));
        assert!(removed.graph.get("B").unwrap().dependencies().is_empty());
        assert_eq!(removed.critical_path.critical_tasks, vec!["B"]);

        assert!(matches!(
            m.add_task(&graph, Task::new("A", day(0)), None),
            Err(ScheduleError::DuplicateTask(_))
        ));
    }

    #[test]
    fn test_progress_and_status() {
        let graph = two_chain();
        let m = ScheduleMutator::new();

        let g = m.set_progress(&graph, "A", 100).unwrap().graph;
        assert_eq!(g.get("A").unwrap().status(), TaskStatus::Completed);

        let g = m.set_progress(&g, "A", 0).unwrap().graph;
        assert_eq!(g.get("A").unwrap().status(), TaskStatus::NotStarted);
        assert!(matches!(
            m.set_status(&g, "A", TaskStatus::InProgress),
            Err(ScheduleError::InvalidProgress { .. })
        ));

        let g = m.set_status(&g, "A", TaskStatus::Completed).unwrap().graph;
        assert_eq!(g.get("A").unwrap().percent_complete(), 100);

        assert!(matches!(
            m.set_progress(&g, "A", 101),
            Err(ScheduleError::InvalidProgress { .. })
        ));
    }

    #[test]
    fn test_add_task_rejects_bad_progress() {
        let graph = two_chain();
        let m = ScheduleMutator::new();

        let mut overdone = Task::new("C", day(0));
        overdone.percent_complete = 200;
        assert!(matches!(
            m.add_task(&graph, overdone, None),
            Err(ScheduleError::InvalidProgress { .. })
        ));

        let mut finished = Task::new("D", day(0));
        finished.percent_complete = 100;
        assert!(matches!(
            m.add_task(&graph, finished, None),
            Err(ScheduleError::InvalidProgress { .. })
        ));
        assert!(!graph.contains("C") && !graph.contains("D"));
    }

    #[test]
    fn test_configured_max_level() {
        let graph = TaskGraph::from_tasks(vec![Task::new("A", day(0)), {
            let mut b = Task::new("B", day(0));
            b.position = 1;
            b
        }])
        .unwrap();
        let m = ScheduleMutator::new().with_config(SchedulingConfig {
            max_level: 0,
            default_duration_days: 2,
        });
        assert!(matches!(
            m.indent(&graph, "B"),
            Err(ScheduleError::HierarchyBoundsExceeded { .. })
        ));
        assert_eq!(m.new_task("X", day(0)).duration(), 2);
    }

    #[test]
    fn test_snap_to_days() {
        assert_eq!(snap_to_days(2.4).unwrap(), 2);
        assert_eq!(snap_to_days(2.6).unwrap(), 3);
        assert_eq!(snap_to_days(-1.6).unwrap(), -2);
    }

    #[test]
    fn test_snap_to_days_rejects_non_finite() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e300] {
            assert!(matches!(snap_to_days(bad), Err(ScheduleError::InvalidDelta(_))));
        }
    }

    #[test]
    fn test_move_past_calendar_end_rejected() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("A", NaiveDate::MAX - chrono::Days::new(10)).with_duration(3),
        ])
        .unwrap();
        let m = ScheduleMutator::new();
        assert!(matches!(
            m.move_task(&graph, "A", 20),
            Err(ScheduleError::DateOutOfRange { delta: 20, .. })
        ));
        assert!(matches!(
            m.resize_task(&graph, "A", ResizeEdge::End, 20),
            Err(ScheduleError::DateOutOfRange { .. })
        ));
        assert_eq!(graph.get("A").unwrap().duration(), 3);
    }
}

//! Successor cascading after a date change.
//!
//! Walks the graph in topological order. A task is examined when one of
//! its predecessors moved (or when it was explicitly marked, e.g. as the
//! target of a new link). If its start precedes what its incoming edges
//! now require, it is shifted forward by the minimum delta; that shift in
//! turn marks its own successors. Tasks are never pulled earlier.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::models::TaskGraph;
use crate::validation::topological_order;

/// A shift applied to a task by cascading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskShift {
    pub task_id: String,
    pub delta_days: i64,
}

/// Restores edge feasibility downstream of `moved` and `marked` tasks.
///
/// `moved` tasks were edited directly and keep their dates; their
/// successors are examined. `marked` tasks are examined themselves.
///
/// # Errors
/// - [`ScheduleError::CycleDetected`] if the graph has a cycle.
/// - [`ScheduleError::ConstraintConflict`] if a task with a hard
///   (must-start-on / must-finish-on) constraint would have to move.
pub(crate) fn cascade(
    graph: &mut TaskGraph,
    moved: &BTreeSet<String>,
    marked: &BTreeSet<String>,
) -> Result<Vec<TaskShift>> {
    let order = topological_order(graph).map_err(ScheduleError::CycleDetected)?;
    let mut changed: BTreeSet<String> = moved.clone();
    let mut shifts = Vec::new();

    for id in &order {
        if moved.contains(id) {
            continue;
        }
        let task = graph.require(id)?;
        let examine = marked.contains(id)
            || task
                .dependencies
                .iter()
                .any(|d| changed.contains(&d.from_task_id));
        if !examine {
            continue;
        }

        let required = task
            .dependencies
            .iter()
            .filter(|d| d.from_task_id != task.id)
            .filter_map(|d| {
                let pred = graph.get(&d.from_task_id)?;
                Some(d.required_start(
                    graph.offset_of(pred.start),
                    graph.offset_of(pred.end),
                    task.duration,
                ))
            })
            .max();

        let start = graph.offset_of(task.start);
        let Some(required) = required.filter(|&r| r > start) else {
            continue;
        };
        let delta = required - start;

        if let Some(c) = task.constraint.as_ref().filter(|c| c.kind.is_hard()) {
            return Err(ScheduleError::ConstraintConflict {
                task_id: id.clone(),
                reason: format!(
                    "cascade needs to shift it {} day(s) but it is pinned by {:?} {}",
                    delta, c.kind, c.date
                ),
            });
        }

        debug!(task = %id, delta, "cascading shift");
        graph.require_mut(id)?.shift(delta)?;
        changed.insert(id.clone());
        shifts.push(TaskShift {
            task_id: id.clone(),
            delta_days: delta,
        });
    }

    Ok(shifts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dependency, DependencyType, SchedulingConstraint, Task};
    use chrono::NaiveDate;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 1 + n).unwrap()
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn chain() -> TaskGraph {
        TaskGraph::from_tasks(vec![
            Task::new("A", day(0)).with_duration(5),
            Task::new("B", day(5)).with_duration(3).with_predecessor("A"),
            Task::new("C", day(10)).with_duration(2).with_predecessor("B"),
        ])
        .unwrap()
    }

    #[test]
    fn test_shift_propagates_only_as_needed() {
        let mut graph = chain();
        graph.get_mut("A").unwrap().shift(4).unwrap();

        let shifts = cascade(&mut graph, &set(&["A"]), &set(&[])).unwrap();
        // B moves 4; C had 2 days of slack so moves 2
        assert_eq!(
            shifts,
            vec![
                TaskShift { task_id: "B".into(), delta_days: 4 },
                TaskShift { task_id: "C".into(), delta_days: 2 },
            ]
        );
        assert_eq!(graph.get("B").unwrap().start(), day(9));
        assert_eq!(graph.get("C").unwrap().start(), day(12));
    }

    #[test]
    fn test_earlier_move_never_pulls_back() {
        let mut graph = chain();
        graph.get_mut("A").unwrap().shift(-2).unwrap();
        let shifts = cascade(&mut graph, &set(&["A"]), &set(&[])).unwrap();
        assert!(shifts.is_empty());
        assert_eq!(graph.get("B").unwrap().start(), day(5));
    }

    #[test]
    fn test_marked_task_is_examined() {
        let mut graph = TaskGraph::from_tasks(vec![
            Task::new("A", day(0)).with_duration(5),
            Task::new("B", day(2)).with_duration(1).with_dependency(Dependency::new(
                "A",
                DependencyType::StartToStart,
                3,
            )),
        ])
        .unwrap();
        let shifts = cascade(&mut graph, &set(&[]), &set(&["B"])).unwrap();
        assert_eq!(shifts[0].delta_days, 1);
    }

    #[test]
    fn test_hard_constraint_conflict() {
        let mut graph = TaskGraph::from_tasks(vec![
            Task::new("A", day(0)).with_duration(5),
            Task::new("B", day(5))
                .with_duration(3)
                .with_predecessor("A")
                .with_constraint(SchedulingConstraint::must_start_on(day(5))),
        ])
        .unwrap();
        graph.get_mut("A").unwrap().shift(1).unwrap();
        let err = cascade(&mut graph, &set(&["A"]), &set(&[])).unwrap_err();
        assert!(matches!(err, ScheduleError::ConstraintConflict { task_id, .. } if task_id == "B"));
    }
}

//! Critical Path Method (CPM).
//!
//! # Algorithm
//!
//! 1. Topologically order tasks (smallest ID first among ready tasks).
//! 2. Forward pass: early start/finish from predecessors' early dates.
//! 3. Backward pass: late finish/start from successors' late dates,
//!    terminal tasks anchored to the project finish.
//! 4. Total float = late start − early start; critical iff float is zero.
//!
//! All arithmetic is in whole days relative to the graph's project start.
//! Task ends are exclusive, so a zero-lag FS link places the successor's
//! start on the predecessor's end date.
//!
//! # Complexity
//! O(V log V + E log V) with ordered maps.
//!
//! # Reference
//! Kelley & Walker (1959), "Critical-Path Planning and Scheduling"

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ScheduleWarning;
use crate::error::{Result, ScheduleError};
use crate::models::{Dependency, TaskGraph};
use crate::validation::topological_order;

/// Early/late dates and float of one task, as day offsets from the
/// project start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTiming {
    pub early_start: i64,
    pub early_finish: i64,
    pub late_start: i64,
    pub late_finish: i64,
    pub total_float: i64,
    pub is_critical: bool,
}

/// Output of a CPM pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPathResult {
    /// Zero-float tasks, in topological order.
    pub critical_tasks: Vec<String>,
    /// Project finish offset (days from project start).
    pub project_duration: i64,
    /// Total float per task.
    pub float_by_task: BTreeMap<String, i64>,
    /// Full timing per task.
    pub timings: BTreeMap<String, TaskTiming>,
    /// Date of offset 0.
    pub project_start: NaiveDate,
    /// Topological order used by the passes.
    pub order: Vec<String>,
    /// Negative-float findings.
    pub warnings: Vec<ScheduleWarning>,
}

impl CriticalPathResult {
    pub fn is_critical(&self, task_id: &str) -> bool {
        self.timings.get(task_id).is_some_and(|t| t.is_critical)
    }

    pub fn float_of(&self, task_id: &str) -> Option<i64> {
        self.float_by_task.get(task_id).copied()
    }

    pub fn timing(&self, task_id: &str) -> Option<&TaskTiming> {
        self.timings.get(task_id)
    }

    /// Calendar date of a day offset.
    pub fn date_at(&self, offset: i64) -> NaiveDate {
        crate::models::add_days(self.project_start, offset)
    }

    /// Project finish date.
    pub fn finish_date(&self) -> NaiveDate {
        self.date_at(self.project_duration)
    }
}

/// Runs forward and backward passes over the whole graph.
///
/// Dangling and self-referencing edges are skipped (the validator reports
/// them); a cycle is an error.
///
/// # Errors
/// [`ScheduleError::CycleDetected`] if the dependency relation has a cycle.
pub fn calculate_critical_path(graph: &TaskGraph) -> Result<CriticalPathResult> {
    let order = topological_order(graph).map_err(ScheduleError::CycleDetected)?;
    let project_start = graph.anchor();

    // Outgoing edges: predecessor → [(successor, edge)]
    let mut outgoing: BTreeMap<&str, Vec<(&str, &Dependency)>> = BTreeMap::new();
    for task in graph.tasks() {
        for dep in incoming(graph, &task.id) {
            outgoing
                .entry(dep.from_task_id.as_str())
                .or_default()
                .push((task.id.as_str(), dep));
        }
    }

    // Forward pass
    let mut early: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for id in &order {
        let task = graph.require(id)?;
        let duration = task.duration;
        let mut es = incoming(graph, id)
            .filter_map(|dep| {
                let &(p_es, p_ef) = early.get(dep.from_task_id.as_str())?;
                Some(dep.required_start(p_es, p_ef, duration))
            })
            .max()
            .unwrap_or_else(|| graph.offset_of(task.start));
        if let Some(c) = &task.constraint {
            es = c.bound_early_start(graph.offset_of(c.date), es, duration);
        }
        early.insert(id.as_str(), (es, es + duration));
    }

    let project_finish = order
        .iter()
        .filter(|id| !outgoing.contains_key(id.as_str()))
        .filter_map(|id| early.get(id.as_str()).map(|&(_, ef)| ef))
        .max()
        .unwrap_or(0);

    // Backward pass
    let mut late: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for id in order.iter().rev() {
        let task = graph.require(id)?;
        let duration = task.duration;
        let mut lf = match outgoing.get(id.as_str()) {
            None => project_finish,
            Some(edges) => edges
                .iter()
                .filter_map(|(succ, dep)| {
                    let &(s_ls, s_lf) = late.get(succ)?;
                    Some(dep.allowed_finish(s_ls, s_lf, duration))
                })
                .min()
                .unwrap_or(project_finish),
        };
        if let Some(c) = &task.constraint {
            lf = c.bound_late_finish(graph.offset_of(c.date), lf, duration);
        }
        late.insert(id.as_str(), (lf - duration, lf));
    }

    let mut timings = BTreeMap::new();
    let mut float_by_task = BTreeMap::new();
    let mut critical_tasks = Vec::new();
    let mut warnings = Vec::new();

    for id in &order {
        let (es, ef) = early[id.as_str()];
        let (ls, lf) = late[id.as_str()];
        let total_float = ls - es;
        let is_critical = total_float == 0;

        if total_float < 0 {
            warn!(task = %id, float = total_float, "negative float: constraints are infeasible");
            warnings.push(ScheduleWarning::negative_float(id, total_float));
        }
        if is_critical {
            critical_tasks.push(id.clone());
        }

        float_by_task.insert(id.clone(), total_float);
        timings.insert(
            id.clone(),
            TaskTiming {
                early_start: es,
                early_finish: ef,
                late_start: ls,
                late_finish: lf,
                total_float,
                is_critical,
            },
        );
    }

    debug!(
        tasks = order.len(),
        critical = critical_tasks.len(),
        project_duration = project_finish,
        "critical path computed"
    );

    Ok(CriticalPathResult {
        critical_tasks,
        project_duration: project_finish,
        float_by_task,
        timings,
        project_start,
        order,
        warnings,
    })
}

/// Incoming edges of `id` that point at another existing task.
fn incoming<'a>(graph: &'a TaskGraph, id: &'a str) -> impl Iterator<Item = &'a Dependency> + 'a {
    graph
        .get(id)
        .into_iter()
        .flat_map(|t| t.dependencies.iter())
        .filter(move |dep| dep.from_task_id != id && graph.contains(&dep.from_task_id))
}

//! Interchange records for external tooling.
//!
//! A flat, serde-friendly view of a task graph: one [`ExportRecord`] per
//! task in outline order, dates as ISO calendar dates (`2025-01-06`).
//! CSV/XML writers sit outside this crate and consume these records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::models::{Dependency, Task, TaskGraph, TaskStatus};
use crate::validation::{validate_dependencies, ValidationError, ValidationErrorKind};

/// One task as seen by an exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExportRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Days; 0 marks a milestone.
    pub duration: i64,
    #[serde(default)]
    pub percent_complete: u8,
    #[serde(default)]
    pub resource: Option<String>,
    /// Budgeted cost.
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub actual_cost: f64,
    /// Outline parent, `None` at the top level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl ExportRecord {
    fn from_task(task: &Task, parent_id: Option<&str>) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            start: task.start(),
            end: task.end(),
            duration: task.duration(),
            percent_complete: task.percent_complete(),
            resource: task.resource.clone(),
            cost: task.budgeted_cost,
            actual_cost: task.actual_cost,
            parent_id: parent_id.map(str::to_string),
            dependencies: task.dependencies().to_vec(),
        }
    }
}

/// Flattens a graph into records, in outline order.
pub fn to_records(graph: &TaskGraph) -> Vec<ExportRecord> {
    graph
        .outline()
        .into_iter()
        .map(|task| ExportRecord::from_task(task, graph.parent_of(&task.id)))
        .collect()
}

/// Rebuilds a graph from records.
///
/// Record order sets sibling order and the status follows the progress.
/// The result is checked like any graph handed to the core: bad shapes,
/// progress above 100%, dangling or duplicate edges, self-dependencies and
/// cycles are rejected.
pub fn from_records(records: Vec<ExportRecord>) -> Result<TaskGraph> {
    let count = records.len();
    let mut tasks = Vec::with_capacity(count);
    let mut children: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (position, record) in records.into_iter().enumerate() {
        let mut task = if record.duration == 0 && record.start == record.end {
            Task::milestone(record.id, record.start)
        } else {
            Task::new(record.id, record.start).with_dates(record.start, record.end)
        };
        task.duration = record.duration;
        task.position = position as u32;
        task.name = record.name;
        task.resource = record.resource;
        task.budgeted_cost = record.cost;
        task.actual_cost = record.actual_cost;
        task.percent_complete = record.percent_complete;
        task.status = TaskStatus::from_progress(record.percent_complete);
        for dep in record.dependencies {
            task = task.with_dependency(dep);
        }
        if let Some(parent) = record.parent_id {
            children.entry(parent).or_default().push(task.id.clone());
        }
        tasks.push(task);
    }

    for task in &mut tasks {
        if let Some(list) = children.remove(&task.id) {
            task.children = list;
        }
    }
    if let Some(missing) = children.into_keys().next() {
        return Err(ScheduleError::TaskNotFound(missing));
    }

    let graph = TaskGraph::from_tasks(tasks)?;
    let report = validate_dependencies(&graph);
    if let Some(issue) = report.fatal().next() {
        return Err(rejection(issue));
    }
    debug!(tasks = count, "imported task graph");
    Ok(graph)
}

fn rejection(issue: &ValidationError) -> ScheduleError {
    let related = issue.related_ids.first().cloned().unwrap_or_default();
    match issue.kind {
        ValidationErrorKind::DanglingReference => ScheduleError::DanglingReference {
            task_id: issue.task_id.clone(),
            missing_id: related,
        },
        ValidationErrorKind::SelfDependency => ScheduleError::SelfDependency(issue.task_id.clone()),
        ValidationErrorKind::DuplicateDependency => ScheduleError::DuplicateDependency {
            from_id: related,
            to_id: issue.task_id.clone(),
        },
        ValidationErrorKind::CycleDetected => ScheduleError::CycleDetected(issue.related_ids.clone()),
        // Not produced by dependency validation
        _ => ScheduleError::TaskNotFound(issue.task_id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DependencyType;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn sample() -> TaskGraph {
        let mut phase = Task::new("P", d(6)).with_name("Phase").with_duration(10);
        phase.children = vec!["A".into(), "M".into()];
        TaskGraph::from_tasks(vec![
            phase,
            Task::new("A", d(6))
                .with_name("Dig")
                .with_resource("Crew 1")
                .with_duration(4)
                .with_costs(1000.0, 300.0)
                .with_progress(25),
            Task::milestone("M", d(10)).with_dependency(Dependency::new(
                "A",
                DependencyType::FinishToStart,
                0,
            )),
        ])
        .unwrap()
    }

    #[test]
    fn test_records_in_outline_order() {
        let records = to_records(&sample());
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["P", "A", "M"]);

        let a = &records[1];
        assert_eq!(a.parent_id.as_deref(), Some("P"));
        assert_eq!(a.resource.as_deref(), Some("Crew 1"));
        assert_eq!(a.cost, 1000.0);
        assert_eq!(a.percent_complete, 25);
        assert_eq!(records[2].duration, 0);
        assert_eq!(records[2].dependencies[0].from_task_id, "A");
    }

    #[test]
    fn test_iso_dates_and_type_codes() {
        let records = to_records(&sample());
        let json = serde_json::to_value(&records[2]).unwrap();
        assert_eq!(json["start"], "2025-01-10");
        assert_eq!(json["end"], "2025-01-10");
        assert_eq!(json["dependencies"][0]["type"], "FS");
        assert_eq!(json["percentComplete"], 0);
    }

    #[test]
    fn test_rebuild_graph() {
        let graph = sample();
        let rebuilt = from_records(to_records(&graph)).unwrap();
        assert_eq!(rebuilt.get("P").unwrap().children(), ["A", "M"]);
        assert_eq!(rebuilt.get("M").unwrap().level(), 1);
        assert!(rebuilt.get("M").unwrap().is_milestone());
        assert_eq!(rebuilt.get("A").unwrap().successors(), ["M"]);
        assert_eq!(to_records(&rebuilt), to_records(&graph));
    }

    #[test]
    fn test_rejects_bad_records() {
        let mut records = to_records(&sample());
        records[1].duration = 3;
        assert!(matches!(
            from_records(records),
            Err(ScheduleError::InvalidDuration { .. })
        ));

        let mut records = to_records(&sample());
        records[2].dependencies[0].from_task_id = "GHOST".into();
        assert!(matches!(
            from_records(records),
            Err(ScheduleError::DanglingReference { missing_id, .. }) if missing_id == "GHOST"
        ));

        let mut records = to_records(&sample());
        records[1].percent_complete = 150;
        assert!(matches!(
            from_records(records),
            Err(ScheduleError::InvalidProgress { task_id, .. }) if task_id == "A"
        ));

        let mut records = to_records(&sample());
        records[1].parent_id = Some("NOPE".into());
        assert!(matches!(from_records(records), Err(ScheduleError::TaskNotFound(_))));
    }

    #[test]
    fn test_rejects_cycle() {
        let mut records = to_records(&sample());
        records[1]
            .dependencies
            .push(Dependency::new("M", DependencyType::FinishToStart, 0));
        assert!(matches!(from_records(records), Err(ScheduleError::CycleDetected(_))));
    }
}

//! Task graph: the owned task collection of one project.
//!
//! Holds tasks keyed by ID (ordered, so every traversal is deterministic),
//! keeps the derived predecessor/successor views in sync with the typed
//! edges, and maintains the outline hierarchy (levels, sibling positions,
//! children order).
//!
//! Edge legality (cycles, dangling references) is *not* enforced here; that
//! is the job of [`crate::validation`]. A graph may be loaded with bad edges
//! so that they can be reported.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::task::{add_days, days_between};
use super::{Task, TaskStatus};
use crate::error::{Result, ScheduleError};

/// Deepest allowed outline level.
pub const MAX_LEVEL: u8 = 5;

/// The task collection of a single project.
///
/// Deserialization goes through [`TaskGraph::from_tasks`], so a graph read
/// from JSON passes the same shape and hierarchy checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskGraphRepr")]
pub struct TaskGraph {
    tasks: BTreeMap<String, Task>,
    /// Day 0 of the project. `None` = earliest task start.
    #[serde(default)]
    project_start: Option<NaiveDate>,
}

/// Wire form of a [`TaskGraph`] before any checks.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct TaskGraphRepr {
    #[serde(default)]
    tasks: BTreeMap<String, Task>,
    #[serde(default)]
    project_start: Option<NaiveDate>,
}

impl TryFrom<TaskGraphRepr> for TaskGraph {
    type Error = ScheduleError;

    fn try_from(repr: TaskGraphRepr) -> Result<Self> {
        if let Some((key, task)) = repr.tasks.iter().find(|(key, task)| **key != task.id) {
            return Err(ScheduleError::TaskKeyMismatch {
                key: key.clone(),
                task_id: task.id.clone(),
            });
        }
        let mut graph = Self::from_tasks(repr.tasks.into_values())?;
        if repr.project_start.is_some() {
            graph.project_start = repr.project_start;
        }
        Ok(graph)
    }
}

impl TaskGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from tasks, checking per-task structure.
    ///
    /// Rejects duplicate IDs, `start > end`, durations that disagree with the
    /// dates, non-zero milestones, and broken hierarchies. Levels are derived
    /// from the children lists and sibling positions are renumbered 0..n.
    ///
    /// The project start is pinned to the earliest task start, so later
    /// edits do not move day 0. Override it with [`Self::with_project_start`].
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Result<Self> {
        let mut graph = Self::new();
        for task in tasks {
            check_task_shape(&task)?;
            if graph.tasks.contains_key(&task.id) {
                return Err(ScheduleError::DuplicateTask(task.id));
            }
            graph.tasks.insert(task.id.clone(), task);
        }
        graph.normalize_hierarchy()?;
        graph.sync_links();
        graph.project_start = graph.tasks.values().map(|t| t.start).min();
        Ok(graph)
    }

    /// Sets the project start (day 0).
    pub fn with_project_start(mut self, start: NaiveDate) -> Self {
        self.project_start = Some(start);
        self
    }

    pub fn project_start(&self) -> Option<NaiveDate> {
        self.project_start
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    pub(crate) fn require(&self, id: &str) -> Result<&Task> {
        self.tasks
            .get(id)
            .ok_or_else(|| ScheduleError::TaskNotFound(id.to_string()))
    }

    pub(crate) fn require_mut(&mut self, id: &str) -> Result<&mut Task> {
        self.tasks
            .get_mut(id)
            .ok_or_else(|| ScheduleError::TaskNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in ascending ID order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Task IDs in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    /// Owned copy of all tasks, in ID order.
    pub fn to_vec(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    pub(crate) fn insert(&mut self, task: Task) {
        self.tasks.insert(task.id.clone(), task);
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Task> {
        self.tasks.remove(id)
    }

    // ---- Time axis ----

    /// Date that day offset 0 refers to.
    pub fn anchor(&self) -> NaiveDate {
        self.project_start
            .or_else(|| self.tasks.values().map(|t| t.start).min())
            .unwrap_or_default()
    }

    /// Day offset of `date` from the anchor.
    pub fn offset_of(&self, date: NaiveDate) -> i64 {
        days_between(self.anchor(), date)
    }

    /// Date at day offset `offset` from the anchor.
    pub fn date_at(&self, offset: i64) -> NaiveDate {
        add_days(self.anchor(), offset)
    }

    // ---- Dependency views ----

    /// Rebuilds every task's derived `predecessors`/`successors` lists.
    ///
    /// Dangling edges still appear in `predecessors` so that the view
    /// mirrors the typed edge set exactly.
    pub(crate) fn sync_links(&mut self) {
        let mut successors: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for task in self.tasks.values() {
            for dep in &task.dependencies {
                successors
                    .entry(dep.from_task_id.clone())
                    .or_default()
                    .insert(task.id.clone());
            }
        }
        for task in self.tasks.values_mut() {
            task.predecessors = task
                .dependencies
                .iter()
                .map(|d| d.from_task_id.clone())
                .collect();
            task.successors = successors
                .remove(&task.id)
                .map(|s| s.into_iter().collect())
                .unwrap_or_default();
        }
    }

    // ---- Hierarchy ----

    /// Parent task ID, or `None` for a top-level task.
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.tasks
            .values()
            .find(|t| t.children.iter().any(|c| c == id))
            .map(|t| t.id.as_str())
    }

    /// Top-level task IDs in position order.
    pub fn roots(&self) -> Vec<String> {
        let children: BTreeSet<&str> = self
            .tasks
            .values()
            .flat_map(|t| t.children.iter().map(String::as_str))
            .collect();
        let mut roots: Vec<&Task> = self
            .tasks
            .values()
            .filter(|t| !children.contains(t.id.as_str()))
            .collect();
        roots.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        roots.into_iter().map(|t| t.id.clone()).collect()
    }

    /// Ordered sibling list that contains `id` (including `id` itself).
    pub fn siblings_of(&self, id: &str) -> Vec<String> {
        match self.parent_of(id) {
            Some(parent) => self.tasks[parent].children.clone(),
            None => self.roots(),
        }
    }

    /// All descendants of `id`, depth first.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<&str> = match self.tasks.get(id) {
            Some(t) => t.children.iter().rev().map(String::as_str).collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            out.push(next.to_string());
            if let Some(t) = self.tasks.get(next) {
                stack.extend(t.children.iter().rev().map(String::as_str));
            }
        }
        out
    }

    /// Tasks in outline (display) order: depth first, siblings by position.
    pub fn outline(&self) -> Vec<&Task> {
        let mut out = Vec::with_capacity(self.tasks.len());
        for root in self.roots() {
            if let Some(task) = self.tasks.get(&root) {
                out.push(task);
                out.extend(self.descendants(&root).iter().filter_map(|d| self.tasks.get(d)));
            }
        }
        out
    }

    /// Writes `ordered` as the sibling list under `parent` (or the roots),
    /// renumbering positions 0..n.
    pub(crate) fn set_siblings(&mut self, parent: Option<&str>, ordered: &[String]) {
        for (pos, id) in ordered.iter().enumerate() {
            if let Some(t) = self.tasks.get_mut(id) {
                t.position = pos as u32;
            }
        }
        if let Some(parent) = parent {
            if let Some(p) = self.tasks.get_mut(parent) {
                p.children = ordered.to_vec();
            }
        }
    }

    /// Shifts the level of `id` and all its descendants by `delta`.
    pub(crate) fn shift_levels(&mut self, id: &str, delta: i32) {
        let mut ids = self.descendants(id);
        ids.push(id.to_string());
        for sub in ids {
            if let Some(t) = self.tasks.get_mut(&sub) {
                t.level = (t.level as i32 + delta).max(0) as u8;
            }
        }
    }

    /// Depth of the subtree below `id` (0 for a leaf).
    pub(crate) fn subtree_depth(&self, id: &str) -> u8 {
        let base = self.tasks.get(id).map(|t| t.level).unwrap_or(0);
        self.descendants(id)
            .iter()
            .filter_map(|d| self.tasks.get(d))
            .map(|t| t.level.saturating_sub(base))
            .max()
            .unwrap_or(0)
    }

    /// Derives levels from children lists and renumbers positions.
    fn normalize_hierarchy(&mut self) -> Result<()> {
        let mut parent: BTreeMap<String, String> = BTreeMap::new();
        for task in self.tasks.values() {
            for child in &task.children {
                if !self.tasks.contains_key(child) {
                    return Err(ScheduleError::TaskNotFound(child.clone()));
                }
                if parent.insert(child.clone(), task.id.clone()).is_some() {
                    return Err(ScheduleError::InvalidHierarchyMove {
                        task_id: child.clone(),
                        reason: "listed as a child of more than one task".into(),
                    });
                }
            }
        }

        // Children lists are ordered by each child's stated position.
        let ids: Vec<String> = self.tasks.keys().cloned().collect();
        for id in &ids {
            let mut children = self.tasks[id].children.clone();
            children.sort_by_key(|c| (self.tasks[c].position, c.clone()));
            self.set_siblings(Some(id), &children);
        }
        let roots = self.roots();
        self.set_siblings(None, &roots);

        let mut visited = BTreeSet::new();
        let mut stack: Vec<(String, u8)> = roots.into_iter().map(|r| (r, 0)).collect();
        while let Some((id, level)) = stack.pop() {
            if level > MAX_LEVEL {
                return Err(ScheduleError::HierarchyBoundsExceeded {
                    task_id: id,
                    level: level as i32,
                    max_level: MAX_LEVEL,
                });
            }
            visited.insert(id.clone());
            let task = self
                .tasks
                .get_mut(&id)
                .ok_or_else(|| ScheduleError::TaskNotFound(id.clone()))?;
            task.level = level;
            for child in task.children.clone() {
                stack.push((child, level + 1));
            }
        }

        // Anything unreachable from a root sits on a parent cycle.
        if let Some(orphan) = self.tasks.keys().find(|id| !visited.contains(*id)) {
            return Err(ScheduleError::InvalidHierarchyMove {
                task_id: orphan.clone(),
                reason: "task is its own ancestor".into(),
            });
        }
        Ok(())
    }
}

/// Per-task shape check: dates, duration, and progress against status.
pub(crate) fn check_task_shape(task: &Task) -> Result<()> {
    if task.start > task.end {
        return Err(ScheduleError::InvalidDateRange {
            task_id: task.id.clone(),
            start: task.start,
            end: task.end,
        });
    }
    let span = days_between(task.start, task.end);
    let bad_duration = task.duration < 0
        || task.duration != span
        || (task.is_milestone && task.duration != 0)
        || (!task.is_milestone && task.duration == 0);
    if bad_duration {
        return Err(ScheduleError::InvalidDuration {
            task_id: task.id.clone(),
            duration: task.duration,
        });
    }
    check_progress(task)
}

/// 100% holds exactly when the task is completed, and 0% means not started.
fn check_progress(task: &Task) -> Result<()> {
    let pct = task.percent_complete;
    let reason = if pct > 100 {
        format!("{pct}% is above 100%")
    } else if (pct == 100) != (task.status == TaskStatus::Completed) {
        format!("{pct}% contradicts status {:?}", task.status)
    } else if pct == 0 && task.status != TaskStatus::NotStarted {
        format!("0% contradicts status {:?}", task.status)
    } else {
        return Ok(());
    };
    Err(ScheduleError::InvalidProgress {
        task_id: task.id.clone(),
        reason,
    })
}

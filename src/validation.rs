//! Dependency and date validation.
//!
//! Checks a task graph (or one task in it) without changing anything.
//! Detects:
//! - Dangling predecessor references
//! - Self-dependencies and duplicate edges
//! - Circular dependencies (DAG validation)
//! - Edges whose date relationship the current dates do not satisfy
//!
//! Validators never fail: they return a [`ValidationResult`] listing every
//! issue, and the caller decides whether to block or warn. Only
//! [`ValidationErrorKind::DateConstraintViolation`] is soft.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::{days_between, TaskGraph};

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// `false` iff at least one fatal issue was found.
    pub is_valid: bool,
    /// Every issue found, fatal and soft.
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: !errors.iter().any(|e| e.kind.is_fatal()),
            errors,
        }
    }

    /// Whether any issue of `kind` was found.
    pub fn has(&self, kind: ValidationErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    /// Fatal issues only.
    pub fn fatal(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(|e| e.kind.is_fatal())
    }

    /// Soft issues only.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(|e| !e.kind.is_fatal())
    }

    /// Whether there are no issues at all, soft ones included.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A validation issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Issue category.
    pub kind: ValidationErrorKind,
    /// Task the issue was found on.
    pub task_id: String,
    /// Other tasks involved (predecessor, cycle members).
    pub related_ids: Vec<String>,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// An edge references a task that does not exist.
    DanglingReference,
    /// A task lists itself as predecessor.
    SelfDependency,
    /// The same predecessor is listed twice on one task.
    DuplicateDependency,
    /// The dependency graph contains a cycle.
    CycleDetected,
    /// Current dates do not satisfy an edge or constraint (soft).
    DateConstraintViolation,
    /// `start > end`.
    InvalidDateRange,
    /// Duration negative, or inconsistent with the dates or milestone flag.
    InvalidDuration,
    /// The task being validated does not exist.
    UnknownTask,
}

impl ValidationErrorKind {
    /// Whether the issue blocks an edit (everything except date violations).
    pub fn is_fatal(self) -> bool {
        self != Self::DateConstraintViolation
    }
}

impl ValidationError {
    fn new(
        kind: ValidationErrorKind,
        task_id: impl Into<String>,
        related_ids: Vec<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            task_id: task_id.into(),
            related_ids,
            message: message.into(),
        }
    }
}

/// Validates the dependency structure of a task graph.
///
/// Checks, in order:
/// 1. Every edge's predecessor exists
/// 2. No task depends on itself (or twice on the same predecessor)
/// 3. The "blocks" relation is acyclic
/// 4. Every edge's date relationship holds for the current dates (soft)
pub fn validate_dependencies(graph: &TaskGraph) -> ValidationResult {
    let mut errors = Vec::new();

    for task in graph.tasks() {
        let mut seen = BTreeSet::new();
        for dep in &task.dependencies {
            if dep.from_task_id == task.id {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SelfDependency,
                    &task.id,
                    vec![],
                    format!("Task '{}' depends on itself", task.id),
                ));
            } else if !graph.contains(&dep.from_task_id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DanglingReference,
                    &task.id,
                    vec![dep.from_task_id.clone()],
                    format!(
                        "Task '{}' references unknown predecessor '{}'",
                        task.id, dep.from_task_id
                    ),
                ));
            } else if !seen.insert(dep.from_task_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateDependency,
                    &task.id,
                    vec![dep.from_task_id.clone()],
                    format!(
                        "Task '{}' lists predecessor '{}' more than once",
                        task.id, dep.from_task_id
                    ),
                ));
            }
        }
    }

    // Dangling/self edges are ignored by the sort, so a cycle report here
    // is always a genuine loop between existing tasks.
    if let Err(cycle) = topological_order(graph) {
        let head = cycle.first().cloned().unwrap_or_default();
        errors.push(ValidationError::new(
            ValidationErrorKind::CycleDetected,
            head,
            cycle.clone(),
            format!("Circular dependency detected: {}", cycle.join(" -> ")),
        ));
    }

    for task in graph.tasks() {
        errors.extend(edge_date_violations(graph, &task.id));
    }

    ValidationResult::from_errors(errors)
}

/// Validates one task's dates against its own shape and incoming edges.
///
/// Reports `start > end`, durations that disagree with the dates, edges
/// whose predecessor boundary the task currently precedes, and a breached
/// scheduling constraint.
pub fn validate_task_dates(task_id: &str, graph: &TaskGraph) -> ValidationResult {
    let Some(task) = graph.get(task_id) else {
        return ValidationResult::from_errors(vec![ValidationError::new(
            ValidationErrorKind::UnknownTask,
            task_id,
            vec![],
            format!("Task '{task_id}' does not exist"),
        )]);
    };

    let mut errors = Vec::new();

    if task.start > task.end {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidDateRange,
            task_id,
            vec![],
            format!(
                "Task '{}' starts {} after it ends {}",
                task_id, task.start, task.end
            ),
        ));
    }

    let span = days_between(task.start, task.end);
    if task.duration < 0
        || (task.start <= task.end && task.duration != span)
        || (task.is_milestone != (task.duration == 0))
    {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidDuration,
            task_id,
            vec![],
            format!(
                "Task '{}' has duration {} but spans {} days",
                task_id, task.duration, span
            ),
        ));
    }

    errors.extend(edge_date_violations(graph, task_id));

    if let Some(breach) = task
        .constraint
        .as_ref()
        .and_then(|c| c.check_violation(task.start, task.end))
    {
        errors.push(ValidationError::new(
            ValidationErrorKind::DateConstraintViolation,
            task_id,
            vec![],
            format!(
                "Task '{}' breaks its {:?} constraint by {} day(s)",
                task_id,
                breach.kind,
                breach.total_days()
            ),
        ));
    }

    ValidationResult::from_errors(errors)
}

/// Soft violations of the incoming edges of `task_id` under current dates.
fn edge_date_violations(graph: &TaskGraph, task_id: &str) -> Vec<ValidationError> {
    let Some(task) = graph.get(task_id) else {
        return Vec::new();
    };
    let start = graph.offset_of(task.start);

    task.dependencies
        .iter()
        .filter(|dep| dep.from_task_id != task.id)
        .filter_map(|dep| {
            let pred = graph.get(&dep.from_task_id)?;
            let required = dep.required_start(
                graph.offset_of(pred.start),
                graph.offset_of(pred.end),
                task.duration,
            );
            (start < required).then(|| {
                ValidationError::new(
                    ValidationErrorKind::DateConstraintViolation,
                    &task.id,
                    vec![pred.id.clone()],
                    format!(
                        "Task '{}' ({} link from '{}', lag {}) starts {} day(s) too early",
                        task.id,
                        dep.kind.code(),
                        pred.id,
                        dep.lag,
                        required - start
                    ),
                )
            })
        })
        .collect()
}

/// Topologically orders tasks by the "blocks" relation.
///
/// Kahn's algorithm with the smallest ready ID taken first, so the order
/// depends only on the graph, never on insertion order. Dangling and
/// self-referencing edges are ignored.
///
/// # Returns
/// `Ok(order)` or `Err(cycle)` with the task IDs of one cycle, in edge
/// direction, starting from its smallest ID.
pub fn topological_order(graph: &TaskGraph) -> Result<Vec<String>, Vec<String>> {
    let (preds, succs) = adjacency(graph);

    let mut in_degree: BTreeMap<&str, usize> =
        preds.iter().map(|(&id, p)| (id, p.len())).collect();
    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut order = Vec::with_capacity(in_degree.len());
    while let Some(id) = ready.pop_first() {
        order.push(id.to_string());
        for &next in &succs[id] {
            if let Some(deg) = in_degree.get_mut(next) {
                *deg -= 1;
                if *deg == 0 {
                    ready.insert(next);
                }
            }
        }
    }

    if order.len() == in_degree.len() {
        return Ok(order);
    }

    in_degree.retain(|_, deg| *deg > 0);
    Err(extract_cycle(&preds, &in_degree))
}

/// Deduplicated predecessor and successor sets for every task.
type Adjacency<'a> = BTreeMap<&'a str, BTreeSet<&'a str>>;

fn adjacency(graph: &TaskGraph) -> (Adjacency<'_>, Adjacency<'_>) {
    let mut preds: Adjacency = graph.ids().map(|id| (id, BTreeSet::new())).collect();
    let mut succs: Adjacency = graph.ids().map(|id| (id, BTreeSet::new())).collect();
    for task in graph.tasks() {
        for dep in &task.dependencies {
            let from = dep.from_task_id.as_str();
            if from == task.id || !graph.contains(from) {
                continue;
            }
            if let Some(p) = preds.get_mut(task.id.as_str()) {
                p.insert(from);
            }
            if let Some(s) = succs.get_mut(from) {
                s.insert(task.id.as_str());
            }
        }
    }
    (preds, succs)
}

/// Walks predecessor links inside the unsorted remainder until a task
/// repeats. Every remaining task has a remaining predecessor, so the walk
/// always closes a loop.
fn extract_cycle(preds: &Adjacency<'_>, remaining: &BTreeMap<&str, usize>) -> Vec<String> {
    let Some(&start) = remaining.keys().next() else {
        return Vec::new();
    };

    let mut path: Vec<&str> = Vec::new();
    let mut index: BTreeMap<&str, usize> = BTreeMap::new();
    let mut current = start;
    while !index.contains_key(current) {
        index.insert(current, path.len());
        path.push(current);
        match preds[current].iter().find(|p| remaining.contains_key(*p)) {
            Some(&p) => current = p,
            None => break,
        }
    }

    let from = index.get(current).copied().unwrap_or(0);
    // The walk followed predecessors; reverse to read in edge direction.
    let mut cycle: Vec<&str> = path[from..].iter().rev().copied().collect();
    if let Some(min_pos) = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map(|(i, _)| i)
    {
        cycle.rotate_left(min_pos);
    }
    cycle.into_iter().map(String::from).collect()
}

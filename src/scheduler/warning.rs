//! Non-fatal findings attached to CPM results and accepted mutations.

use serde::{Deserialize, Serialize};

/// A non-blocking issue found while scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWarning {
    /// Warning category.
    pub kind: WarningKind,
    /// Task the warning is about.
    pub task_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningKind {
    /// Total float below zero: the task's constraints cannot all be met.
    NegativeFloat,
    /// A soft scheduling constraint (no-earlier/no-later-than) is broken.
    SoftConstraintBreach,
    /// The task's dates do not satisfy one of its incoming edges.
    DateConstraintViolation,
}

impl ScheduleWarning {
    pub fn negative_float(task_id: impl Into<String>, float: i64) -> Self {
        let task_id = task_id.into();
        Self {
            kind: WarningKind::NegativeFloat,
            message: format!("Task '{task_id}' has negative float ({float} days)"),
            task_id,
        }
    }

    pub fn soft_constraint(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::SoftConstraintBreach,
            task_id: task_id.into(),
            message: message.into(),
        }
    }

    pub fn date_violation(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::DateConstraintViolation,
            task_id: task_id.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_factories() {
        let w = ScheduleWarning::negative_float("T1", -3);
        assert_eq!(w.kind, WarningKind::NegativeFloat);
        assert!(w.message.contains("-3"));

        let w = ScheduleWarning::soft_constraint("T2", "late");
        assert_eq!(w.kind, WarningKind::SoftConstraintBreach);
        assert_eq!(w.task_id, "T2");
    }
}

//! Date constraints on individual tasks.
//!
//! A [`SchedulingConstraint`] bounds where the CPM forward/backward pass
//! may place a task. Must-start-on and must-finish-on are **hard**: the
//! mutator refuses to cascade through them. The no-earlier/no-later kinds
//! are **soft**: breaking them yields a warning, not a rejection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::task::days_between;

/// Hard or soft constraint strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintStrength {
    /// Must be satisfied; edits that break it are rejected.
    Hard,
    /// Should be satisfied; breaking it is reported as a warning.
    Soft,
}

/// Kind of date constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintKind {
    MustStartOn,
    MustFinishOn,
    StartNoEarlierThan,
    StartNoLaterThan,
    FinishNoEarlierThan,
    FinishNoLaterThan,
}

impl ConstraintKind {
    pub fn strength(self) -> ConstraintStrength {
        match self {
            Self::MustStartOn | Self::MustFinishOn => ConstraintStrength::Hard,
            _ => ConstraintStrength::Soft,
        }
    }

    pub fn is_hard(self) -> bool {
        self.strength() == ConstraintStrength::Hard
    }
}

/// A date constraint attached to a task.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use u_schedule_core::models::{ConstraintKind, SchedulingConstraint};
///
/// let date = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
/// let c = SchedulingConstraint::new(ConstraintKind::StartNoLaterThan, date);
/// let late = NaiveDate::from_ymd_opt(2025, 5, 12).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 5, 14).unwrap();
/// assert_eq!(c.check_violation(late, end).unwrap().late_days, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SchedulingConstraint {
    #[serde(rename = "constraintType")]
    pub kind: ConstraintKind,
    #[serde(rename = "constraintDate")]
    pub date: NaiveDate,
}

impl SchedulingConstraint {
    pub fn new(kind: ConstraintKind, date: NaiveDate) -> Self {
        Self { kind, date }
    }

    pub fn must_start_on(date: NaiveDate) -> Self {
        Self::new(ConstraintKind::MustStartOn, date)
    }

    pub fn must_finish_on(date: NaiveDate) -> Self {
        Self::new(ConstraintKind::MustFinishOn, date)
    }

    pub fn start_no_earlier_than(date: NaiveDate) -> Self {
        Self::new(ConstraintKind::StartNoEarlierThan, date)
    }

    pub fn finish_no_later_than(date: NaiveDate) -> Self {
        Self::new(ConstraintKind::FinishNoLaterThan, date)
    }

    /// Applies the constraint to an early start computed by the forward pass.
    ///
    /// `date` is the constraint date as a day offset.
    pub(crate) fn bound_early_start(&self, date: i64, early_start: i64, duration: i64) -> i64 {
        match self.kind {
            ConstraintKind::MustStartOn => date,
            ConstraintKind::MustFinishOn => date - duration,
            ConstraintKind::StartNoEarlierThan => early_start.max(date),
            ConstraintKind::FinishNoEarlierThan => early_start.max(date - duration),
            ConstraintKind::StartNoLaterThan | ConstraintKind::FinishNoLaterThan => early_start,
        }
    }

    /// Applies the constraint to a late finish computed by the backward pass.
    pub(crate) fn bound_late_finish(&self, date: i64, late_finish: i64, duration: i64) -> i64 {
        match self.kind {
            ConstraintKind::MustStartOn => date + duration,
            ConstraintKind::MustFinishOn => date,
            ConstraintKind::StartNoLaterThan => late_finish.min(date + duration),
            ConstraintKind::FinishNoLaterThan => late_finish.min(date),
            ConstraintKind::StartNoEarlierThan | ConstraintKind::FinishNoEarlierThan => {
                late_finish
            }
        }
    }

    /// Checks concrete dates against the constraint.
    ///
    /// Returns `None` if satisfied.
    pub fn check_violation(&self, start: NaiveDate, end: NaiveDate) -> Option<ConstraintBreach> {
        let (early_days, late_days) = match self.kind {
            ConstraintKind::MustStartOn => split(days_between(self.date, start)),
            ConstraintKind::MustFinishOn => split(days_between(self.date, end)),
            ConstraintKind::StartNoEarlierThan => (days_between(start, self.date).max(0), 0),
            ConstraintKind::FinishNoEarlierThan => (days_between(end, self.date).max(0), 0),
            ConstraintKind::StartNoLaterThan => (0, days_between(self.date, start).max(0)),
            ConstraintKind::FinishNoLaterThan => (0, days_between(self.date, end).max(0)),
        };

        if early_days == 0 && late_days == 0 {
            return None;
        }

        Some(ConstraintBreach {
            kind: self.kind,
            early_days,
            late_days,
        })
    }
}

fn split(offset: i64) -> (i64, i64) {
    if offset < 0 {
        (-offset, 0)
    } else {
        (0, offset)
    }
}

/// How far concrete dates fall outside a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintBreach {
    pub kind: ConstraintKind,
    /// Days too early.
    pub early_days: i64,
    /// Days too late.
    pub late_days: i64,
}

impl ConstraintBreach {
    pub fn is_hard(&self) -> bool {
        self.kind.is_hard()
    }

    pub fn total_days(&self) -> i64 {
        self.early_days + self.late_days
    }
}

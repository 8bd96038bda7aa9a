//! Crate-wide error type.
//!
//! Validators never return these: they report [`ValidationError`]s instead
//! (see [`crate::validation`]). `ScheduleError` is what a rejected mutation,
//! a failed CPM pass, or a bad configuration produces.
//!
//! [`ValidationError`]: crate::validation::ValidationError

use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced by scheduling operations.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Task '{task_id}' depends on unknown task '{missing_id}'")]
    DanglingReference { task_id: String, missing_id: String },

    #[error("Task '{0}' cannot depend on itself")]
    SelfDependency(String),

    #[error("Cycle detected in dependency graph involving: {}", .0.join(", "))]
    CycleDetected(Vec<String>),

    #[error("Dependency '{from_id}' -> '{to_id}' already exists")]
    DuplicateDependency { from_id: String, to_id: String },

    #[error("Dependency '{from_id}' -> '{to_id}' does not exist")]
    DependencyNotFound { from_id: String, to_id: String },

    #[error("Task '{task_id}' would move to level {level}, outside 0..={max_level}")]
    HierarchyBoundsExceeded {
        task_id: String,
        level: i32,
        max_level: u8,
    },

    #[error("Invalid hierarchy move for task '{task_id}': {reason}")]
    InvalidHierarchyMove { task_id: String, reason: String },

    #[error("Task '{task_id}' has a hard constraint that the edit would break: {reason}")]
    ConstraintConflict { task_id: String, reason: String },

    #[error("Task '{task_id}' starts {start} after it ends {end}")]
    InvalidDateRange {
        task_id: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Task '{task_id}' has invalid duration {duration}")]
    InvalidDuration { task_id: String, duration: i64 },

    #[error("Shifting task '{task_id}' by {delta} day(s) leaves the calendar range")]
    DateOutOfRange { task_id: String, delta: i64 },

    #[error("Day delta {0} is not a finite whole-day amount")]
    InvalidDelta(f64),

    #[error("Task graph key '{key}' holds task '{task_id}'")]
    TaskKeyMismatch { key: String, task_id: String },

    #[error("Invalid progress for task '{task_id}': {reason}")]
    InvalidProgress { task_id: String, reason: String },

    #[error("Milestone '{0}' cannot be resized")]
    MilestoneResize(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Duplicate task ID: {0}")]
    DuplicateTask(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ScheduleError {
    /// Short machine-readable name of the error kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::DanglingReference { .. } => "DanglingReference",
            Self::SelfDependency(_) => "SelfDependency",
            Self::CycleDetected(_) => "CycleDetected",
            Self::DuplicateDependency { .. } => "DuplicateDependency",
            Self::DependencyNotFound { .. } => "DependencyNotFound",
            Self::HierarchyBoundsExceeded { .. } => "HierarchyBoundsExceeded",
            Self::InvalidHierarchyMove { .. } => "InvalidHierarchyMove",
            Self::ConstraintConflict { .. } => "ConstraintConflict",
            Self::InvalidDateRange { .. } => "InvalidDateRange",
            Self::InvalidDuration { .. } => "InvalidDuration",
            Self::DateOutOfRange { .. } => "DateOutOfRange",
            Self::InvalidDelta(_) => "InvalidDelta",
            Self::TaskKeyMismatch { .. } => "TaskKeyMismatch",
            Self::InvalidProgress { .. } => "InvalidProgress",
            Self::MilestoneResize(_) => "MilestoneResize",
            Self::TaskNotFound(_) => "TaskNotFound",
            Self::DuplicateTask(_) => "DuplicateTask",
            Self::Config(_) => "Config",
            Self::Io(_) => "Io",
            Self::Toml(_) => "Toml",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

//! Typed dependency edges.
//!
//! An edge is stored on its successor task and names the predecessor
//! (`from_task_id`). The edge type selects which boundary of each task the
//! relationship binds; `lag` offsets the predecessor boundary in days
//! (negative lag is a lead and is never clamped).

use serde::{Deserialize, Serialize};

/// Dependency relationship type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    /// Successor starts after predecessor finishes.
    #[default]
    #[serde(rename = "FS")]
    FinishToStart,
    /// Successor starts after predecessor starts.
    #[serde(rename = "SS")]
    StartToStart,
    /// Successor finishes after predecessor finishes.
    #[serde(rename = "FF")]
    FinishToFinish,
    /// Successor finishes after predecessor starts.
    #[serde(rename = "SF")]
    StartToFinish,
}

impl DependencyType {
    /// Whether the predecessor's finish (rather than start) is the bound.
    pub fn from_finish(self) -> bool {
        matches!(self, Self::FinishToStart | Self::FinishToFinish)
    }

    /// Whether the edge constrains the successor's finish (rather than start).
    pub fn to_finish(self) -> bool {
        matches!(self, Self::FinishToFinish | Self::StartToFinish)
    }

    /// Two-letter code (FS, SS, FF, SF).
    pub fn code(self) -> &'static str {
        match self {
            Self::FinishToStart => "FS",
            Self::StartToStart => "SS",
            Self::FinishToFinish => "FF",
            Self::StartToFinish => "SF",
        }
    }
}

/// A typed incoming dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Dependency {
    /// Predecessor task ID.
    pub from_task_id: String,
    /// Relationship type.
    #[serde(rename = "type")]
    pub kind: DependencyType,
    /// Offset in days applied to the predecessor boundary.
    #[serde(default)]
    pub lag: i64,
}

impl Dependency {
    pub fn new(from_task_id: impl Into<String>, kind: DependencyType, lag: i64) -> Self {
        Self {
            from_task_id: from_task_id.into(),
            kind,
            lag,
        }
    }

    /// Earliest start (day offset) the successor may take under this edge.
    ///
    /// `pred_start`/`pred_finish` are the predecessor's boundaries and
    /// `duration` is the successor's duration, all in days.
    pub fn required_start(&self, pred_start: i64, pred_finish: i64, duration: i64) -> i64 {
        let bound = if self.kind.from_finish() {
            pred_finish
        } else {
            pred_start
        } + self.lag;
        if self.kind.to_finish() {
            bound - duration
        } else {
            bound
        }
    }

    /// Latest finish (day offset) the predecessor may take under this edge.
    ///
    /// `succ_start`/`succ_finish` are the successor's boundaries and
    /// `duration` is the predecessor's duration.
    pub fn allowed_finish(&self, succ_start: i64, succ_finish: i64, duration: i64) -> i64 {
        let bound = if self.kind.to_finish() {
            succ_finish
        } else {
            succ_start
        } - self.lag;
        if self.kind.from_finish() {
            bound
        } else {
            bound + duration
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_start_per_type() {
        // Predecessor occupies [10, 15); successor lasts 3 days.
        let fs = Dependency::new("A", DependencyType::FinishToStart, 0);
        let ss = Dependency::new("A", DependencyType::StartToStart, 2);
        let ff = Dependency::new("A", DependencyType::FinishToFinish, 0);
        let sf = Dependency::new("A", DependencyType::StartToFinish, 1);

        assert_eq!(fs.required_start(10, 15, 3), 15);
        assert_eq!(ss.required_start(10, 15, 3), 12);
        assert_eq!(ff.required_start(10, 15, 3), 12);
        assert_eq!(sf.required_start(10, 15, 3), 8);
    }

    #[test]
    fn test_negative_lag_is_lead() {
        let fs = Dependency::new("A", DependencyType::FinishToStart, -2);
        assert_eq!(fs.required_start(0, 5, 1), 3);
    }

    #[test]
    fn test_allowed_finish_per_type() {
        // Successor occupies [20, 24); predecessor lasts 5 days.
        let fs = Dependency::new("A", DependencyType::FinishToStart, 1);
        let ss = Dependency::new("A", DependencyType::StartToStart, 0);
        let ff = Dependency::new("A", DependencyType::FinishToFinish, 0);
        let sf = Dependency::new("A", DependencyType::StartToFinish, 0);

        assert_eq!(fs.allowed_finish(20, 24, 5), 19);
        assert_eq!(ss.allowed_finish(20, 24, 5), 25);
        assert_eq!(ff.allowed_finish(20, 24, 5), 24);
        assert_eq!(sf.allowed_finish(20, 24, 5), 29);
    }

    #[test]
    fn test_serde_codes() {
        let dep = Dependency::new("A", DependencyType::StartToFinish, -1);
        let json = serde_json::to_string(&dep).unwrap();
        assert_eq!(json, r#"{"fromTaskId":"A","type":"SF","lag":-1}"#);
        assert_eq!(DependencyType::StartToFinish.code(), "SF");
    }
}

//! Portfolio KPIs rolled up from per-task earned value.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Average SPI / CPI | Mean over tasks (1.0 with no tasks) |
//! | Resource utilization | ΣAC / ΣPV (0 when ΣPV = 0) |
//! | Percent complete | ΣEV / ΣPV × 100 (budget weighted) |
//! | Risk / Health | Worst of the two averages against [`EvmThresholds`] |

use serde::{Deserialize, Serialize};

use super::{EvmData, EvmThresholds};
use crate::models::{Project, Task, TaskStatus};

/// Project risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Traffic-light health of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Green,
    Yellow,
    Red,
}

/// Project performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiMetrics {
    pub project_id: String,
    /// Mean schedule performance index.
    pub average_spi: f64,
    /// Mean cost performance index.
    pub average_cpi: f64,
    /// Total actual cost over total planned value.
    pub resource_utilization: f64,
    pub total_planned_value: f64,
    pub total_earned_value: f64,
    pub total_actual_cost: f64,
    pub cost_variance: f64,
    pub schedule_variance: f64,
    /// Budget-weighted completion (0..=100).
    pub percent_complete: f64,
    /// Project budget, or the sum of task budgets when unset.
    pub budget_at_completion: f64,
    pub tasks_not_started: usize,
    pub tasks_in_progress: usize,
    pub tasks_completed: usize,
    pub risk_level: RiskLevel,
    pub health_status: HealthStatus,
}

impl KpiMetrics {
    /// Computes KPIs for `project` from its tasks.
    ///
    /// # Arguments
    /// * `project` - Project metadata (id, optional budget).
    /// * `tasks` - The project's tasks.
    /// * `thresholds` - Risk/health cut-offs.
    pub fn calculate(project: &Project, tasks: &[Task], thresholds: &EvmThresholds) -> Self {
        let mut total_pv = 0.0;
        let mut total_ev = 0.0;
        let mut total_ac = 0.0;
        let mut sum_spi = 0.0;
        let mut sum_cpi = 0.0;
        let mut counts = [0usize; 3];

        for task in tasks {
            let evm = EvmData::for_task(task);
            total_pv += evm.planned_value;
            total_ev += evm.earned_value;
            total_ac += evm.actual_cost;
            sum_spi += evm.spi;
            sum_cpi += evm.cpi;
            counts[match task.status() {
                TaskStatus::NotStarted => 0,
                TaskStatus::InProgress => 1,
                TaskStatus::Completed => 2,
            }] += 1;
        }

        let (average_spi, average_cpi) = if tasks.is_empty() {
            (1.0, 1.0)
        } else {
            let n = tasks.len() as f64;
            (sum_spi / n, sum_cpi / n)
        };
        let resource_utilization = if total_pv > 0.0 {
            total_ac / total_pv
        } else {
            0.0
        };
        let percent_complete = if total_pv > 0.0 {
            total_ev / total_pv * 100.0
        } else {
            0.0
        };
        let (risk_level, health_status) = classify(average_spi, average_cpi, thresholds);

        Self {
            project_id: project.id.clone(),
            average_spi,
            average_cpi,
            resource_utilization,
            total_planned_value: total_pv,
            total_earned_value: total_ev,
            total_actual_cost: total_ac,
            cost_variance: total_ev - total_ac,
            schedule_variance: total_ev - total_pv,
            percent_complete,
            budget_at_completion: project.budget.unwrap_or(total_pv),
            tasks_not_started: counts[0],
            tasks_in_progress: counts[1],
            tasks_completed: counts[2],
            risk_level,
            health_status,
        }
    }

    /// Whether the project is on track (green).
    pub fn is_healthy(&self) -> bool {
        self.health_status == HealthStatus::Green
    }
}

fn classify(spi: f64, cpi: f64, thresholds: &EvmThresholds) -> (RiskLevel, HealthStatus) {
    let worst = spi.min(cpi);
    if worst < thresholds.high_risk_below {
        (RiskLevel::High, HealthStatus::Red)
    } else if worst < thresholds.medium_risk_below {
        (RiskLevel::Medium, HealthStatus::Yellow)
    } else {
        (RiskLevel::Low, HealthStatus::Green)
    }
}

/// Computes KPIs with the default 0.90 / 0.95 thresholds.
pub fn calculate_kpis(project: &Project, tasks: &[Task]) -> KpiMetrics {
    KpiMetrics::calculate(project, tasks, &EvmThresholds::default())
}

/// Computes KPIs with custom thresholds.
pub fn calculate_kpis_with(
    project: &Project,
    tasks: &[Task],
    thresholds: &EvmThresholds,
) -> KpiMetrics {
    KpiMetrics::calculate(project, tasks, thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: &str, budget: f64, actual: f64, pct: u8) -> Task {
        Task::new(id, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .with_costs(budget, actual)
            .with_progress(pct)
    }

    #[test]
    fn test_kpi_basic() {
        let tasks = vec![task("A", 1000.0, 500.0, 50), task("B", 1000.0, 1000.0, 100)];
        let kpi = calculate_kpis(&Project::new("P"), &tasks);

        assert_eq!(kpi.project_id, "P");
        assert!((kpi.average_spi - 0.75).abs() < 1e-9);
        assert!((kpi.average_cpi - 1.0).abs() < 1e-9);
        assert!((kpi.resource_utilization - 0.75).abs() < 1e-9);
        assert!((kpi.percent_complete - 75.0).abs() < 1e-9);
        assert_eq!(kpi.budget_at_completion, 2000.0);
        assert_eq!((kpi.tasks_in_progress, kpi.tasks_completed), (1, 1));
        assert_eq!(kpi.risk_level, RiskLevel::High);
        assert_eq!(kpi.health_status, HealthStatus::Red);
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = calculate_kpis(&Project::new("P").with_budget(5000.0), &[]);
        assert_eq!(kpi.average_spi, 1.0);
        assert_eq!(kpi.average_cpi, 1.0);
        assert_eq!(kpi.resource_utilization, 0.0);
        assert_eq!(kpi.budget_at_completion, 5000.0);
        assert!(kpi.is_healthy());
    }

    #[test]
    fn test_threshold_boundaries() {
        let t = EvmThresholds::default();
        assert_eq!(classify(0.95, 1.2, &t), (RiskLevel::Low, HealthStatus::Green));
        assert_eq!(classify(1.0, 0.94, &t), (RiskLevel::Medium, HealthStatus::Yellow));
        assert_eq!(classify(0.90, 1.0, &t), (RiskLevel::Medium, HealthStatus::Yellow));
        assert_eq!(classify(0.89, 1.0, &t), (RiskLevel::High, HealthStatus::Red));
    }

    #[test]
    fn test_custom_thresholds() {
        let tasks = vec![task("A", 100.0, 100.0, 93)];
        let strict = EvmThresholds {
            high_risk_below: 0.95,
            medium_risk_below: 0.99,
        };
        assert_eq!(
            calculate_kpis(&Project::new("P"), &tasks).risk_level,
            RiskLevel::Medium
        );
        assert_eq!(
            calculate_kpis_with(&Project::new("P"), &tasks, &strict).risk_level,
            RiskLevel::High
        );
    }
}

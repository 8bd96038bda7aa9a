//! Earned Value Management.
//!
//! Per-task cost and schedule performance derived purely from task values
//! (budget, actual cost, percent complete). Nothing here looks at the
//! dependency graph.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | PV | Planned value = budgeted cost |
//! | EV | Earned value = percent complete × PV |
//! | CV | EV − AC |
//! | SV | EV − PV |
//! | CPI | EV / AC (1 when AC = 0) |
//! | SPI | EV / PV (1 when PV = 0) |
//! | EAC | AC + (PV − EV) / CPI |
//! | VAC | PV − EAC |
//!
//! # Reference
//! PMI (2019), "The Standard for Earned Value Management"

mod kpi;

pub use kpi::{calculate_kpis, calculate_kpis_with, HealthStatus, KpiMetrics, RiskLevel};

use serde::{Deserialize, Serialize};

use crate::models::Task;

/// Earned value figures for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmData {
    pub task_id: String,
    pub planned_value: f64,
    pub earned_value: f64,
    pub actual_cost: f64,
    pub cost_variance: f64,
    pub schedule_variance: f64,
    /// Cost performance index.
    pub cpi: f64,
    /// Schedule performance index.
    pub spi: f64,
    /// Estimate at completion.
    pub eac: f64,
    /// Variance at completion.
    pub vac: f64,
}

impl EvmData {
    /// Computes the metrics of a single task.
    pub fn for_task(task: &Task) -> Self {
        let planned_value = task.budgeted_cost;
        let actual_cost = task.actual_cost;
        let earned_value = f64::from(task.percent_complete()) / 100.0 * planned_value;

        let cpi = if actual_cost > 0.0 {
            earned_value / actual_cost
        } else {
            1.0
        };
        let spi = if planned_value > 0.0 {
            earned_value / planned_value
        } else {
            1.0
        };
        // A task with cost but no progress has CPI 0
        let eac_cpi = if cpi == 0.0 { 1.0 } else { cpi };
        let eac = actual_cost + (planned_value - earned_value) / eac_cpi;

        Self {
            task_id: task.id.clone(),
            planned_value,
            earned_value,
            actual_cost,
            cost_variance: earned_value - actual_cost,
            schedule_variance: earned_value - planned_value,
            cpi,
            spi,
            eac,
            vac: planned_value - eac,
        }
    }
}

/// Computes EVM metrics for each task, in input order.
pub fn calculate_evm(tasks: &[Task]) -> Vec<EvmData> {
    tasks.iter().map(EvmData::for_task).collect()
}

/// CPI/SPI cut-offs for risk and health classification.
///
/// An average below `high_risk_below` is high risk (red); below
/// `medium_risk_below` is medium risk (yellow).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvmThresholds {
    pub high_risk_below: f64,
    pub medium_risk_below: f64,
}

impl Default for EvmThresholds {
    fn default() -> Self {
        Self {
            high_risk_below: 0.90,
            medium_risk_below: 0.95,
        }
    }
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

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_over_budget_task() {
        let evm = EvmData::for_task(&task("T", 1000.0, 600.0, 50));
        assert!(approx(evm.earned_value, 500.0));
        assert!(approx(evm.cost_variance, -100.0));
        assert!(approx(evm.schedule_variance, -500.0));
        assert!(approx(evm.cpi, 500.0 / 600.0));
        assert!(approx(evm.spi, 0.5));
        // 600 + 500 / (5/6) = 1200
        assert!(approx(evm.eac, 1200.0));
        assert!(approx(evm.vac, -200.0));
    }

    #[test]
    fn test_zero_cost_and_budget_guards() {
        let evm = EvmData::for_task(&task("T", 0.0, 0.0, 0));
        assert_eq!(evm.cpi, 1.0);
        assert_eq!(evm.spi, 1.0);
        assert_eq!(evm.eac, 0.0);
        assert_eq!(evm.vac, 0.0);
    }

    #[test]
    fn test_zero_progress_with_spend() {
        // CPI is 0; EAC falls back to dividing by 1
        let evm = EvmData::for_task(&task("T", 1000.0, 200.0, 0));
        assert_eq!(evm.cpi, 0.0);
        assert!(approx(evm.eac, 1200.0));
        assert!(evm.eac.is_finite());
    }

    #[test]
    fn test_nothing_started_anywhere() {
        let tasks = [
            task("A", 1000.0, 0.0, 0),
            task("B", 500.0, 250.0, 0),
            task("C", 0.0, 0.0, 0),
        ];
        let data = calculate_evm(&tasks);
        assert!(data.iter().all(|d| d.earned_value == 0.0));

        // Budgeted work with nothing earned is behind plan
        assert_eq!(data[0].spi, 0.0);
        assert_eq!(data[0].cpi, 1.0);
        // Spend with nothing earned
        assert_eq!(data[1].cpi, 0.0);
        // No budget, no spend: both guards apply
        assert_eq!(data[2].spi, 1.0);
        assert_eq!(data[2].cpi, 1.0);
    }

    #[test]
    fn test_on_plan_task() {
        let evm = EvmData::for_task(&task("T", 800.0, 800.0, 100));
        assert!(approx(evm.cpi, 1.0));
        assert!(approx(evm.spi, 1.0));
        assert!(approx(evm.eac, 800.0));
        assert!(approx(evm.vac, 0.0));
    }

    #[test]
    fn test_calculate_evm_keeps_order() {
        let data = calculate_evm(&[task("B", 1.0, 0.0, 0), task("A", 1.0, 0.0, 0)]);
        let ids: Vec<&str> = data.iter().map(|d| d.task_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }
}

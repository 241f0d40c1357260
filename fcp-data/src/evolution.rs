//! Mean price per period, the series behind the time-series chart.

use crate::aggregate::GroupedStatistics;
use fcp_core::Period;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionPoint {
    pub period: Period,
    pub mean: f64,
    pub count: usize,
    /// Ratio against the previous listed period. `None` for the first period
    /// or when the previous mean is 0.
    pub change: Option<f64>,
}

/// One point per period of the subset, ascending.
pub fn evolution(stats: &GroupedStatistics) -> Vec<EvolutionPoint> {
    let mut previous: Option<f64> = None;
    stats
        .by_period
        .iter()
        .map(|(period, group)| {
            let change = previous
                .filter(|prev| *prev != 0.0)
                .map(|prev| (group.mean - prev) / prev);
            previous = Some(group.mean);
            EvolutionPoint {
                period: *period,
                mean: group.mean,
                count: group.count,
                change,
            }
        })
        .collect()
}

//! Detailed forecast table: every model of the selected segment side by side,
//! one row per forecast period, each value with its 95% interval.

use crate::forecast::SelectedForecast;
use fcp_core::Period;
use serde::Serialize;
use std::collections::BTreeMap;

/// Forecast value of one model for one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastCell {
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub period: Period,
    /// Keyed by model; a model without a point for this period is absent.
    pub cells: BTreeMap<String, ForecastCell>,
}

impl ForecastRow {
    pub fn cell(&self, model: &str) -> Option<&ForecastCell> {
        self.cells.get(model)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastTable {
    /// Column order.
    pub models: Vec<String>,
    /// Ascending by period.
    pub rows: Vec<ForecastRow>,
}

impl ForecastTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Merge the forecasts of every model by period. `horizon` keeps the first
/// `horizon` points of each model, as the model cards do.
pub fn forecast_table(selected: &SelectedForecast, horizon: Option<usize>) -> ForecastTable {
    let mut by_period: BTreeMap<Period, BTreeMap<String, ForecastCell>> = BTreeMap::new();
    let mut models = Vec::new();

    for (model, output) in &selected.model_forecasts {
        let take = horizon.unwrap_or(output.forecast.len());
        let points = output.forecast.iter().take(take);
        let mut any = false;
        for point in points {
            any = true;
            by_period.entry(point.period).or_default().insert(
                model.clone(),
                ForecastCell {
                    value: point.value,
                    lower: point.lower,
                    upper: point.upper,
                },
            );
        }
        if any {
            models.push(model.clone());
        }
    }

    let rows = by_period
        .into_iter()
        .map(|(period, cells)| ForecastRow { period, cells })
        .collect();
    ForecastTable { models, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcp_core::{ForecastPoint, ModelOutput};

    fn p(s: &str) -> Period {
        s.parse().unwrap()
    }

    fn output(points: &[(&str, f64)]) -> ModelOutput {
        ModelOutput {
            forecast: points
                .iter()
                .map(|(period, value)| ForecastPoint {
                    period: p(period),
                    value: *value,
                    lower: value - 10.0,
                    upper: value + 10.0,
                })
                .collect(),
            metrics: Default::default(),
        }
    }

    fn selected() -> SelectedForecast {
        let mut model_forecasts = BTreeMap::new();
        model_forecasts.insert(
            "naive".to_string(),
            output(&[("2025-01", 100.0), ("2025-02", 100.0)]),
        );
        model_forecasts.insert(
            "arima".to_string(),
            output(&[("2025-02", 110.0), ("2025-03", 120.0)]),
        );
        SelectedForecast {
            segment_key: "general".to_string(),
            historical_tail: Vec::new(),
            model_forecasts,
        }
    }

    #[test]
    fn test_models_merged_by_period() {
        let table = forecast_table(&selected(), None);
        assert_eq!(table.models, vec!["arima", "naive"]);
        let periods: Vec<Period> = table.rows.iter().map(|r| r.period).collect();
        assert_eq!(periods, vec![p("2025-01"), p("2025-02"), p("2025-03")]);

        assert!(table.rows[0].cell("arima").is_none());
        let shared = &table.rows[1];
        assert_eq!(shared.cell("naive").unwrap().value, 100.0);
        let arima = shared.cell("arima").unwrap();
        assert_eq!((arima.lower, arima.value, arima.upper), (100.0, 110.0, 120.0));
    }

    #[test]
    fn test_horizon_truncates_each_model() {
        let table = forecast_table(&selected(), Some(1));
        let periods: Vec<Period> = table.rows.iter().map(|r| r.period).collect();
        assert_eq!(periods, vec![p("2025-01"), p("2025-02")]);
        assert!(table.rows[1].cell("naive").is_none());
    }

    #[test]
    fn test_zero_horizon_is_empty() {
        let table = forecast_table(&selected(), Some(0));
        assert!(table.is_empty());
        assert!(table.models.is_empty());
    }
}

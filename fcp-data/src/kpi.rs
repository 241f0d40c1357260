//! Headline and forecast KPI cards.

use crate::aggregate::GroupedStatistics;
use crate::forecast::SelectedForecast;
use fcp_core::{ModelMetrics, Period};
use serde::Serialize;

/// Number of category names listed under the category card.
const TOP_CATEGORIES: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeadlineKpis {
    pub mean_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub total_count: usize,
    pub product_count: usize,
    pub category_count: usize,
    /// First categories in key order.
    pub top_categories: Vec<String>,
    /// Ratio between the mean of the last and the first period.
    pub variation: Option<f64>,
    /// First and last period, when the subset spans at least two.
    pub period_span: Option<(Period, Period)>,
}

/// Cards shown above the charts.
pub fn headline(stats: &GroupedStatistics) -> HeadlineKpis {
    let span = match (stats.sorted_periods.first(), stats.sorted_periods.last()) {
        (Some(first), Some(last)) if stats.sorted_periods.len() >= 2 => Some((*first, *last)),
        _ => None,
    };
    let variation = span.and_then(|(first, last)| {
        let first = stats.by_period.get(&first)?.mean;
        let last = stats.by_period.get(&last)?.mean;
        (first != 0.0 && last != 0.0).then(|| (last - first) / first)
    });

    HeadlineKpis {
        mean_price: stats.mean_price,
        min_price: stats.min_price,
        max_price: stats.max_price,
        total_count: stats.total_count,
        product_count: stats.by_product.len(),
        category_count: stats.by_category.len(),
        top_categories: stats
            .by_category
            .keys()
            .take(TOP_CATEGORIES)
            .cloned()
            .collect(),
        variation,
        period_span: span,
    }
}

/// Summary card of one forecasting model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelKpis {
    pub model: String,
    pub forecast_months: usize,
    /// Last forecast value within the horizon, 0 when there is none.
    pub final_value: f64,
    /// Percent change of the final value against the last observed mean.
    /// 0 when there is no positive observed mean to compare with.
    pub variation_pct: f64,
    pub metrics: ModelMetrics,
}

/// One card per model of the selected segment. `horizon` caps the number of
/// forecast months considered; `None` uses the whole published forecast.
pub fn model_kpis(selected: &SelectedForecast, horizon: Option<usize>) -> Vec<ModelKpis> {
    let current = selected
        .historical_tail
        .last()
        .map(|point| point.mean)
        .unwrap_or(0.0);

    selected
        .model_forecasts
        .iter()
        .map(|(model, output)| {
            let take = horizon.unwrap_or(output.forecast.len());
            let window = &output.forecast[..take.min(output.forecast.len())];
            let final_value = window.last().map(|point| point.value).unwrap_or(0.0);
            let variation_pct = if current > 0.0 {
                (final_value - current) / current * 100.0
            } else {
                0.0
            };
            ModelKpis {
                model: model.clone(),
                forecast_months: window.len(),
                final_value,
                variation_pct,
                metrics: output.metrics.clone(),
            }
        })
        .collect()
}

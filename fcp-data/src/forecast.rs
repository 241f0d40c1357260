//! Forecast segment selection.
//!
//! A pure lookup over the externally supplied artifact. The numbers are never
//! recomputed or validated; the only thing derived here is the historical
//! tail, read from the aggregation of the current subset.

use crate::aggregate::GroupedStatistics;
use crate::filter::DeclarativeFilterState;
use fcp_core::{ForecastArtifact, ModelOutput, Period, SegmentKey};
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of most recent historical periods shown next to a forecast.
pub const HISTORY_TAIL_LEN: usize = 24;

/// Observed mean price of one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalPoint {
    pub period: Period,
    pub mean: f64,
}

/// The segment picked for the current filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedForecast {
    pub segment_key: String,
    /// Ascending by period, at most [`HISTORY_TAIL_LEN`] entries.
    pub historical_tail: Vec<HistoricalPoint>,
    /// Only models with at least one forecast point.
    pub model_forecasts: BTreeMap<String, ModelOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ForecastSelection {
    Available(SelectedForecast),
    /// No segment could be resolved; the forecast view renders an empty state.
    Unavailable,
}

impl ForecastSelection {
    pub fn available(&self) -> Option<&SelectedForecast> {
        match self {
            ForecastSelection::Available(selected) => Some(selected),
            ForecastSelection::Unavailable => None,
        }
    }
}

/// Key preferred for the current filters: the single selected region, or the
/// general segment.
pub fn preferred_segment_key(filters: &DeclarativeFilterState) -> SegmentKey {
    match filters.single_region() {
        Some(region) => SegmentKey::for_region(region),
        None => SegmentKey::general(),
    }
}

/// Last [`HISTORY_TAIL_LEN`] period means of an aggregation.
pub fn historical_tail(stats: &GroupedStatistics) -> Vec<HistoricalPoint> {
    let skip = stats.by_period.len().saturating_sub(HISTORY_TAIL_LEN);
    stats
        .by_period
        .iter()
        .skip(skip)
        .map(|(period, group)| HistoricalPoint {
            period: *period,
            mean: group.mean,
        })
        .collect()
}

/// Resolve the forecast segment for the current filters.
///
/// Lookup order: region segment (when exactly one region is selected), the
/// general segment, the first key of the artifact, then
/// [`ForecastSelection::Unavailable`].
pub fn select_segment(
    artifact: &ForecastArtifact,
    filters: &DeclarativeFilterState,
    stats: &GroupedStatistics,
) -> ForecastSelection {
    let preferred = preferred_segment_key(filters).to_string();
    let general = SegmentKey::general().to_string();

    let found = artifact
        .series
        .get_key_value(&preferred)
        .or_else(|| artifact.series.get_key_value(&general))
        .or_else(|| artifact.series.iter().next());

    let Some((key, series)) = found else {
        log::debug!("[FCP Debug] forecast: artifact has no series");
        return ForecastSelection::Unavailable;
    };
    if *key != preferred {
        log::debug!(
            "[FCP Debug] forecast: segment {} missing, using {}",
            preferred,
            key
        );
    }

    let model_forecasts = series
        .models
        .iter()
        .filter(|(_, output)| !output.forecast.is_empty())
        .map(|(name, output)| (name.clone(), output.clone()))
        .collect();

    ForecastSelection::Available(SelectedForecast {
        segment_key: key.clone(),
        historical_tail: historical_tail(stats),
        model_forecasts,
    })
}

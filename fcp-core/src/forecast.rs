//! Forecast artifact (`forecasts.json`) produced by the offline modeling pipeline.
//!
//! Series are keyed by a [`SegmentKey`], a pipe-separated encoding of the
//! dimension tuple the series was computed for, with `*` standing in for an
//! unconstrained dimension:
//!
//! ```text
//! ano=*|regiao=Norte|categoria=*|subcategoria=*|produto=*
//! ```
//!
//! Nothing here fits or validates models; the numbers are consumed as-is.

use crate::error::FcpError;
use crate::period::Period;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Token used for an unconstrained dimension in a segment key.
pub const WILDCARD: &str = "*";

/// One forecast step with its confidence band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub period: Period,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

/// In-sample error metrics. The persistence baseline publishes nulls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    #[serde(default)]
    pub mae: Option<f64>,
    #[serde(default)]
    pub rmse: Option<f64>,
    #[serde(default)]
    pub mape: Option<f64>,
}

/// Output of one model for one segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    #[serde(default)]
    pub forecast: Vec<ForecastPoint>,
    #[serde(default)]
    pub metrics: ModelMetrics,
}

/// All model outputs for one segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    #[serde(default)]
    pub filters: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub last_period: Option<Period>,
    #[serde(default)]
    pub forecast_end: Option<Period>,
    #[serde(default)]
    pub models: BTreeMap<String, ModelOutput>,
}

/// Display label of a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelLabel {
    #[serde(default)]
    pub label: String,
}

/// Generation metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastMeta {
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub target_period: Option<Period>,
    #[serde(default)]
    pub max_horizon: Option<u32>,
    #[serde(default)]
    pub models: BTreeMap<String, ModelLabel>,
}

/// The whole artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastArtifact {
    #[serde(default)]
    pub meta: Option<ForecastMeta>,
    #[serde(default)]
    pub series: BTreeMap<String, ForecastSeries>,
}

impl ForecastArtifact {
    /// Display label of a model, falling back to the model key.
    pub fn model_label<'a>(&'a self, model: &'a str) -> &'a str {
        self.meta
            .as_ref()
            .and_then(|meta| meta.models.get(model))
            .map(|m| m.label.as_str())
            .filter(|label| !label.is_empty())
            .unwrap_or(model)
    }
}

/// Decoded segment key. `None` means the dimension is wildcarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SegmentKey {
    pub year: Option<i32>,
    pub region: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub product: Option<String>,
}

impl SegmentKey {
    /// The fully wildcarded segment.
    pub fn general() -> SegmentKey {
        SegmentKey::default()
    }

    /// Segment for one region with every other dimension wildcarded.
    pub fn for_region(region: &str) -> SegmentKey {
        SegmentKey {
            region: Some(region.to_string()),
            ..SegmentKey::default()
        }
    }

    /// True when every dimension is wildcarded.
    pub fn is_general(&self) -> bool {
        *self == SegmentKey::general()
    }
}

fn encode(value: Option<&str>) -> &str {
    value.unwrap_or(WILDCARD)
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = self.year.map(|y| y.to_string());
        write!(
            f,
            "ano={}|regiao={}|categoria={}|subcategoria={}|produto={}",
            encode(year.as_deref()),
            encode(self.region.as_deref()),
            encode(self.category.as_deref()),
            encode(self.subcategory.as_deref()),
            encode(self.product.as_deref()),
        )
    }
}

impl FromStr for SegmentKey {
    type Err = FcpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FcpError::InvalidSegmentKey(s.to_string());
        let mut key = SegmentKey::default();
        for part in s.split('|') {
            let (name, raw) = part.split_once('=').ok_or_else(invalid)?;
            let value = (raw != WILDCARD).then(|| raw.to_string());
            match name {
                "ano" => {
                    key.year = match value {
                        Some(v) => Some(v.parse().map_err(|_| invalid())?),
                        None => None,
                    }
                }
                "regiao" => key.region = value,
                "categoria" => key.category = value,
                "subcategoria" => key.subcategory = value,
                "produto" => key.product = value,
                _ => return Err(invalid()),
            }
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORECASTS_JSON: &str = r#"{
        "meta": {
            "generated_at": "2025-01-10T12:00:00+00:00",
            "target_period": "2026-11",
            "max_horizon": 36,
            "models": {"naive": {"label": "Persistencia"}}
        },
        "series": {
            "ano=*|regiao=*|categoria=*|subcategoria=*|produto=*": {
                "filters": {"ano": null, "regiao": null},
                "last_period": "2024-12",
                "forecast_end": "2025-02",
                "models": {
                    "naive": {
                        "forecast": [
                            {"period": "2025-01", "value": 10.0, "lower": 10.0, "upper": 10.0},
                            {"period": "2025-02", "value": 10.0, "lower": 10.0, "upper": 10.0}
                        ],
                        "metrics": {"mae": null, "rmse": null, "mape": null}
                    }
                }
            }
        }
    }"#;

    #[test]
    fn test_parse_artifact() {
        let artifact: ForecastArtifact = serde_json::from_str(FORECASTS_JSON).unwrap();
        let general = SegmentKey::general().to_string();
        let series = artifact.series.get(&general).unwrap();
        let naive = series.models.get("naive").unwrap();
        assert_eq!(naive.forecast.len(), 2);
        assert_eq!(naive.metrics, ModelMetrics::default());
        assert_eq!(series.forecast_end, Period::new(2025, 2));
        assert_eq!(artifact.model_label("naive"), "Persistencia");
        assert_eq!(artifact.model_label("arima"), "arima");
    }

    #[test]
    fn test_segment_key_encoding() {
        assert_eq!(
            SegmentKey::general().to_string(),
            "ano=*|regiao=*|categoria=*|subcategoria=*|produto=*"
        );
        assert_eq!(
            SegmentKey::for_region("Norte Pioneiro").to_string(),
            "ano=*|regiao=Norte Pioneiro|categoria=*|subcategoria=*|produto=*"
        );
    }

    #[test]
    fn test_segment_key_decoding() {
        let key: SegmentKey = "ano=2023|regiao=Sul|categoria=TORAS|subcategoria=*|produto=*"
            .parse()
            .unwrap();
        assert_eq!(key.year, Some(2023));
        assert_eq!(key.region.as_deref(), Some("Sul"));
        assert_eq!(key.category.as_deref(), Some("TORAS"));
        assert!(key.subcategory.is_none());
        assert!(!key.is_general());
        assert!(SegmentKey::general().to_string().parse::<SegmentKey>().unwrap().is_general());
    }

    #[test]
    fn test_segment_key_rejects_malformed() {
        assert!("regiao".parse::<SegmentKey>().is_err());
        assert!("ano=abc".parse::<SegmentKey>().is_err());
        assert!("cidade=Curitiba".parse::<SegmentKey>().is_err());
    }
}

//! Price observations as published in `detailed.json`.
//!
//! The pipeline that produces the artifact writes Portuguese field names
//! (`ano`, `periodo`, `regiao`, `categoria`, `subcategoria`, `produto`,
//! `unidade`, `preco`). [`RawPriceRecord`] accepts that shape loosely and
//! [`PriceRecord::try_from`] turns it into a typed record or a
//! [`RecordRejection`]. Upstream data is known to be imperfect, so a rejected
//! record is skipped by the loader instead of failing the whole artifact.

use crate::period::Period;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Loosely typed record exactly as it appears in the artifact.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPriceRecord {
    #[serde(default)]
    pub ano: Option<i64>,
    /// Informational only; the month is read from `periodo`.
    #[serde(default)]
    pub mes: Option<serde_json::Value>,
    #[serde(default)]
    pub periodo: Option<String>,
    #[serde(default)]
    pub regiao: Option<String>,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(default)]
    pub subcategoria: Option<String>,
    #[serde(default)]
    pub produto: Option<String>,
    #[serde(default)]
    pub unidade: Option<String>,
    #[serde(default)]
    pub preco: Option<serde_json::Value>,
}

/// Why a raw record was excluded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordRejection {
    #[error("record is not an object with the expected fields")]
    Shape,
    #[error("missing period")]
    MissingPeriod,
    #[error("unparseable period {0:?}")]
    InvalidPeriod(String),
    #[error("missing field {0}")]
    MissingField(&'static str),
    #[error("non-numeric price")]
    NonNumericPrice,
    #[error("price {0} is not a finite non-negative number")]
    InvalidPrice(f64),
}

/// One observed price. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(rename = "periodo")]
    pub period: Period,
    #[serde(rename = "regiao")]
    pub region: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "subcategoria")]
    pub subcategory: String,
    #[serde(rename = "produto")]
    pub product: String,
    #[serde(rename = "unidade")]
    pub unit: Option<String>,
    #[serde(rename = "preco")]
    pub price: f64,
}

impl PriceRecord {
    /// Build a record whose year is taken from its period.
    pub fn new(
        period: Period,
        region: &str,
        category: &str,
        subcategory: &str,
        product: &str,
        price: f64,
    ) -> PriceRecord {
        PriceRecord {
            year: period.year,
            period,
            region: region.to_string(),
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            product: product.to_string(),
            unit: None,
            price,
        }
    }

    /// Set the unit of measure.
    pub fn with_unit(mut self, unit: &str) -> PriceRecord {
        self.unit = Some(unit.to_string());
        self
    }

    /// True if the price is finite and non-negative.
    pub fn has_valid_price(&self) -> bool {
        is_valid_price(self.price)
    }
}

fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price >= 0.0
}

fn required(value: Option<String>, name: &'static str) -> Result<String, RecordRejection> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(RecordRejection::MissingField(name)),
    }
}

impl TryFrom<RawPriceRecord> for PriceRecord {
    type Error = RecordRejection;

    fn try_from(raw: RawPriceRecord) -> Result<Self, Self::Error> {
        let periodo = raw.periodo.ok_or(RecordRejection::MissingPeriod)?;
        let period: Period = periodo
            .parse()
            .map_err(|_| RecordRejection::InvalidPeriod(periodo.clone()))?;

        let price = match raw.preco {
            Some(serde_json::Value::Number(n)) => n.as_f64().ok_or(RecordRejection::NonNumericPrice)?,
            _ => return Err(RecordRejection::NonNumericPrice),
        };
        if !is_valid_price(price) {
            return Err(RecordRejection::InvalidPrice(price));
        }

        let year = raw
            .ano
            .and_then(|ano| i32::try_from(ano).ok())
            .unwrap_or(period.year);

        Ok(PriceRecord {
            year,
            period,
            region: required(raw.regiao, "regiao")?,
            category: required(raw.categoria, "categoria")?,
            subcategory: required(raw.subcategoria, "subcategoria")?,
            product: required(raw.produto, "produto")?,
            unit: raw.unidade.filter(|u| !u.trim().is_empty()),
            price,
        })
    }
}

impl TryFrom<serde_json::Value> for PriceRecord {
    type Error = RecordRejection;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let raw: RawPriceRecord =
            serde_json::from_value(value).map_err(|_| RecordRejection::Shape)?;
        raw.try_into()
    }
}

//! In-memory record store for the forestry price dashboard.
//!
//! The store owns every validated [`PriceRecord`] and the
//! [`DimensionCatalog`] loaded at startup. Both are immutable afterwards;
//! the dashboard engine borrows the record slice for the whole session.
//!
//! # Usage
//!
//! ```rust
//! use fcp_store::RecordStore;
//!
//! let detailed = r#"[{"ano": 2023, "periodo": "2023-01", "regiao": "Norte",
//!     "categoria": "TORAS", "subcategoria": "Pinus", "produto": "Tora", "preco": 100.0}]"#;
//! let aggregated = r#"{"anos": [2023], "regioes": ["Norte"], "categorias": ["TORAS"]}"#;
//!
//! let store = RecordStore::from_json(detailed, aggregated).unwrap();
//! assert_eq!(store.len(), 1);
//! assert_eq!(store.report().skipped, 0);
//! ```

pub mod loader;

use fcp_core::{DimensionCatalog, PriceRecord, RecordRejection};
use std::collections::BTreeMap;

/// Outcome of loading the records artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
    /// Skip count keyed by the rejection message.
    pub skipped_by_reason: BTreeMap<String, usize>,
}

impl LoadReport {
    fn record_skip(&mut self, reason: &RecordRejection) {
        self.skipped += 1;
        *self.skipped_by_reason.entry(reason.to_string()).or_default() += 1;
    }
}

/// Records and catalog of one dataset.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<PriceRecord>,
    catalog: DimensionCatalog,
    report: LoadReport,
}

impl RecordStore {
    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn catalog(&self) -> &DimensionCatalog {
        &self.catalog
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_starts_empty() {
        let store = RecordStore::default();
        assert!(store.is_empty());
        assert_eq!(store.report(), &LoadReport::default());
    }

    #[test]
    fn report_counts_reasons() {
        let mut report = LoadReport::default();
        report.record_skip(&RecordRejection::NonNumericPrice);
        report.record_skip(&RecordRejection::NonNumericPrice);
        report.record_skip(&RecordRejection::MissingPeriod);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.skipped_by_reason.len(), 2);
        assert_eq!(report.skipped_by_reason["non-numeric price"], 2);
    }
}

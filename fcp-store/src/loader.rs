//! Parsing of the static artifacts into typed values.
//!
//! # Artifacts
//!
//! - **Records** (`detailed.json`): array of `{ano, mes, periodo, regiao,
//!   categoria, subcategoria, produto, unidade, preco}` objects
//! - **Catalog** (`aggregated.json`): `{anos, regioes, categorias,
//!   subcategorias, produtos, stats, precos_medios_ultimo, ultimo_periodo}`
//! - **Forecasts** (`forecasts.json`): `{meta, series}`
//! - **Boundaries** (`regioes.geojson`): GeoJSON FeatureCollection
//!
//! Any artifact may be served gzip-compressed; a name ending in `.gz` is
//! decompressed before parsing.

use crate::{LoadReport, RecordStore};
use fcp_core::geo::RegionBoundaries;
use fcp_core::{DimensionCatalog, FcpError, ForecastArtifact, PriceRecord, Result};
use std::io::Read;

/// Artifact bytes as UTF-8 text, gunzipped when `name` ends in `.gz`.
pub fn decode_artifact(name: &str, bytes: &[u8]) -> Result<String> {
    if name.ends_with(".gz") {
        let mut decoder = flate2::read::GzDecoder::new(bytes);
        let mut text = String::new();
        decoder
            .read_to_string(&mut text)
            .map_err(|e| FcpError::Decompression(format!("{}: {}", name, e)))?;
        return Ok(text);
    }
    String::from_utf8(bytes.to_vec())
        .map_err(|e| FcpError::InvalidFormat(format!("{} is not UTF-8: {}", name, e)))
}

/// Parse the record array. Records that fail validation are skipped and
/// counted per reason; only a malformed top-level document is an error.
pub fn parse_records(json: &str) -> Result<(Vec<PriceRecord>, LoadReport)> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(json)? {
        serde_json::Value::Array(values) => values,
        _ => {
            return Err(FcpError::InvalidFormat(
                "records artifact is not a JSON array".to_string(),
            ))
        }
    };

    let mut report = LoadReport::default();
    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match PriceRecord::try_from(value) {
            Ok(record) => records.push(record),
            Err(reason) => {
                log::debug!("[FCP Debug] loader: skipping record {}: {}", index, reason);
                report.record_skip(&reason);
            }
        }
    }
    report.loaded = records.len();
    Ok((records, report))
}

pub fn parse_catalog(json: &str) -> Result<DimensionCatalog> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_forecasts(json: &str) -> Result<ForecastArtifact> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_boundaries(geojson: &str) -> Result<RegionBoundaries> {
    RegionBoundaries::from_geojson(geojson)
}

impl RecordStore {
    /// Build the store from the two required artifacts.
    pub fn from_json(detailed: &str, aggregated: &str) -> anyhow::Result<Self> {
        let (records, report) = parse_records(detailed)
            .map_err(|e| anyhow::anyhow!("failed to parse records: {}", e))?;
        let catalog = parse_catalog(aggregated)
            .map_err(|e| anyhow::anyhow!("failed to parse catalog: {}", e))?;

        log::info!(
            "[FCP Debug] loader: Loaded {} records ({} skipped), {} regions, {} categories",
            report.loaded,
            report.skipped,
            catalog.regions.len(),
            catalog.categories.len()
        );
        Ok(RecordStore {
            records,
            catalog,
            report,
        })
    }

    /// Same as [`RecordStore::from_json`] for raw artifact bytes named after
    /// their source, so `.gz` artifacts are decompressed first.
    pub fn from_artifacts(
        detailed: (&str, &[u8]),
        aggregated: (&str, &[u8]),
    ) -> anyhow::Result<Self> {
        let detailed_json = decode_artifact(detailed.0, detailed.1)?;
        let aggregated_json = decode_artifact(aggregated.0, aggregated.1)?;
        Self::from_json(&detailed_json, &aggregated_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const DETAILED: &str = r#"[
        {"ano": 2023, "mes": 1, "periodo": "2023-01", "regiao": "Norte",
         "categoria": "TORAS", "subcategoria": "Pinus", "produto": "Tora 25-30cm",
         "unidade": "m3", "preco": 120.5},
        {"ano": 2023, "mes": 2, "periodo": "2023-02", "regiao": "Sul",
         "categoria": "TORAS", "subcategoria": "Pinus", "produto": "Tora 25-30cm",
         "preco": 130},
        {"ano": 2023, "periodo": "2023-02", "regiao": "Sul",
         "categoria": "TORAS", "subcategoria": "Pinus", "produto": "Tora 25-30cm",
         "preco": "n/d"},
        {"ano": 2023, "regiao": "Sul", "categoria": "TORAS",
         "subcategoria": "Pinus", "produto": "Tora 25-30cm", "preco": 1.0},
        "not a record"
    ]"#;

    const AGGREGATED: &str = r#"{
        "anos": [2023],
        "regioes": ["Norte", "Sul", "Média Estado"],
        "categorias": ["TORAS"],
        "subcategorias": {"TORAS": ["Pinus"]},
        "produtos": {"TORAS": {"Pinus": ["Tora 25-30cm"]}},
        "stats": {"total_registros": 2, "periodo_inicio": "2023-01", "periodo_fim": "2023-02"},
        "ultimo_periodo": "2023-02"
    }"#;

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn parse_records_skips_malformed() {
        let (records, report) = parse_records(DETAILED).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(report.loaded, 2);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.skipped_by_reason.get("non-numeric price"), Some(&1));
        assert_eq!(report.skipped_by_reason.get("missing period"), Some(&1));
        assert_eq!(records[0].unit.as_deref(), Some("m3"));
        assert_eq!(records[1].unit, None);
    }

    #[test]
    fn parse_records_rejects_non_array() {
        assert!(parse_records(r#"{"records": []}"#).is_err());
        assert!(parse_records("[").is_err());
    }

    #[test]
    fn store_from_json() {
        let store = RecordStore::from_json(DETAILED, AGGREGATED).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.catalog().selectable_regions(), vec!["Norte", "Sul"]);
        assert_eq!(store.report().skipped, 3);
    }

    #[test]
    fn store_requires_valid_catalog() {
        let err = RecordStore::from_json(DETAILED, "{\"anos\": ").unwrap_err();
        assert!(err.to_string().contains("catalog"));
    }

    #[test]
    fn decode_gzip_artifact() {
        let compressed = gzip(AGGREGATED);
        let text = decode_artifact("aggregated.json.gz", &compressed).unwrap();
        assert_eq!(text, AGGREGATED);

        let store = RecordStore::from_artifacts(
            ("detailed.json.gz", gzip(DETAILED).as_slice()),
            ("aggregated.json", AGGREGATED.as_bytes()),
        )
        .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn decode_rejects_corrupt_gzip() {
        let err = decode_artifact("detailed.json.gz", b"plain text").unwrap_err();
        assert!(matches!(err, FcpError::Decompression(_)));
    }

    #[test]
    fn parse_optional_artifacts() {
        let forecasts = parse_forecasts(r#"{"series": {}}"#).unwrap();
        assert!(forecasts.series.is_empty());
        assert!(forecasts.meta.is_none());
        let boundaries = parse_boundaries(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        assert!(boundaries.is_empty());
    }
}

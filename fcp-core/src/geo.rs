//! Region boundary polygons (`regioes.geojson`), consumed only by map renderers.

use crate::error::Result;
use serde::{Deserialize, Serialize};

const UNKNOWN_REGION: &str = "Desconhecido";

/// One region polygon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionBoundary {
    pub region: String,
    pub municipality_count: u32,
    pub geometry: serde_json::Value,
}

/// All region polygons of the boundary file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionBoundaries(pub Vec<RegionBoundary>);

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<FeatureProperties>,
    #[serde(default)]
    geometry: serde_json::Value,
}

#[derive(Deserialize, Default)]
struct FeatureProperties {
    #[serde(default)]
    regiao: Option<String>,
    #[serde(default)]
    num_municipios: Option<u32>,
}

impl RegionBoundaries {
    /// Parse a GeoJSON FeatureCollection. Features without properties are kept
    /// under the "Desconhecido" region with zero municipalities.
    pub fn from_geojson(geojson: &str) -> Result<RegionBoundaries> {
        let collection: FeatureCollection = serde_json::from_str(geojson)?;
        let boundaries = collection
            .features
            .into_iter()
            .map(|feature| {
                let properties = feature.properties.unwrap_or_default();
                RegionBoundary {
                    region: properties
                        .regiao
                        .unwrap_or_else(|| UNKNOWN_REGION.to_string()),
                    municipality_count: properties.num_municipios.unwrap_or(0),
                    geometry: feature.geometry,
                }
            })
            .collect();
        Ok(RegionBoundaries(boundaries))
    }

    /// Boundary of a region by name.
    pub fn get(&self, region: &str) -> Option<&RegionBoundary> {
        self.0.iter().find(|boundary| boundary.region == region)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

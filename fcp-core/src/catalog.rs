//! Dimension catalog published in `aggregated.json`.
//!
//! The catalog lists every valid value per dimension and is used to populate
//! filter controls. It is precomputed by the offline pipeline and never
//! recomputed here.

use crate::period::Period;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pseudo-region carrying the statewide average. Listed in the catalog but
/// never offered as a region choice.
pub const STATEWIDE_REGION: &str = "Média Estado";

/// Returns true for the statewide pseudo-region, with or without the accent
/// (the offline pipeline writes both spellings).
pub fn is_statewide_region(region: &str) -> bool {
    region == STATEWIDE_REGION || region == "Media Estado"
}

/// Header/footer totals for the whole dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    #[serde(default)]
    pub total_registros: u64,
    #[serde(default)]
    pub periodo_inicio: Option<Period>,
    #[serde(default)]
    pub periodo_fim: Option<Period>,
    #[serde(default)]
    pub total_anos: u32,
    #[serde(default)]
    pub total_regioes: u32,
    #[serde(default)]
    pub total_categorias: u32,
    #[serde(default)]
    pub total_produtos: u32,
}

/// Valid values per dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionCatalog {
    #[serde(rename = "anos", default)]
    pub years: Vec<i32>,
    #[serde(rename = "regioes", default)]
    pub regions: Vec<String>,
    #[serde(rename = "categorias", default)]
    pub categories: Vec<String>,
    /// category -> subcategories
    #[serde(rename = "subcategorias", default)]
    pub subcategories: BTreeMap<String, Vec<String>>,
    /// category -> subcategory -> products
    #[serde(rename = "produtos", default)]
    pub products: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub stats: DatasetStats,
    /// Mean price per category at the latest period.
    #[serde(rename = "precos_medios_ultimo", default)]
    pub latest_category_means: BTreeMap<String, f64>,
    #[serde(rename = "ultimo_periodo", default)]
    pub latest_period: Option<Period>,
}

impl DimensionCatalog {
    /// Regions offered as filter choices (everything except the statewide average).
    pub fn selectable_regions(&self) -> Vec<&str> {
        self.regions
            .iter()
            .map(String::as_str)
            .filter(|region| !is_statewide_region(region))
            .collect()
    }

    /// Subcategories of a category, empty for an unknown category.
    pub fn subcategories_for(&self, category: &str) -> &[String] {
        self.subcategories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Products of a (category, subcategory) pair, empty when either is unknown.
    pub fn products_for(&self, category: &str, subcategory: &str) -> &[String] {
        self.products
            .get(category)
            .and_then(|by_subcategory| by_subcategory.get(subcategory))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

//! The two filter layers and the pipeline that applies them.
//!
//! Declarative filters come from the dropdown controls: one set of accepted
//! values per dimension, OR within a dimension, AND across dimensions, an
//! empty set meaning "no constraint". Interactive filters are toggled by
//! clicking chart elements: at most one value per dimension.
//!
//! The layers are applied in sequence (declarative first, interactive on its
//! result) by two separate functions so each can be cleared and tested on
//! its own. Neither function can fail. Any combination of states is legal;
//! contradictory ones just produce an empty subset.

use fcp_core::{DimensionCatalog, PriceRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Dropdown selections. The UI keeps at most one value per dimension, but
/// any number is accepted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclarativeFilterState {
    pub years: BTreeSet<i32>,
    pub regions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub subcategories: BTreeSet<String>,
    pub products: BTreeSet<String>,
}

fn singleton<T: Ord>(value: Option<T>) -> BTreeSet<T> {
    value.into_iter().collect()
}

fn accepts<T: Ord>(selected: &BTreeSet<T>, value: &T) -> bool {
    selected.is_empty() || selected.contains(value)
}

impl DeclarativeFilterState {
    /// Select one year, or all years with `None`.
    pub fn select_year(&mut self, year: Option<i32>) {
        self.years = singleton(year);
    }

    /// Select one region, or all regions with `None`.
    pub fn select_region(&mut self, region: Option<&str>) {
        self.regions = singleton(region.map(str::to_string));
    }

    /// Select one category. Subcategory and product selections are reset.
    pub fn select_category(&mut self, category: Option<&str>) {
        self.categories = singleton(category.map(str::to_string));
        self.subcategories.clear();
        self.products.clear();
    }

    /// Select one subcategory. The product selection is reset.
    pub fn select_subcategory(&mut self, subcategory: Option<&str>) {
        self.subcategories = singleton(subcategory.map(str::to_string));
        self.products.clear();
    }

    /// Select one product, or all products with `None`.
    pub fn select_product(&mut self, product: Option<&str>) {
        self.products = singleton(product.map(str::to_string));
    }

    pub fn remove_year(&mut self, year: i32) {
        self.years.remove(&year);
    }

    pub fn remove_region(&mut self, region: &str) {
        self.regions.remove(region);
    }

    pub fn remove_product(&mut self, product: &str) {
        self.products.remove(product);
    }

    /// Reset every dimension.
    pub fn clear(&mut self) {
        *self = DeclarativeFilterState::default();
    }

    /// True when no dimension is constrained.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
            && self.regions.is_empty()
            && self.categories.is_empty()
            && self.subcategories.is_empty()
            && self.products.is_empty()
    }

    /// The single selected region, if exactly one is selected.
    pub fn single_region(&self) -> Option<&str> {
        match self.regions.len() {
            1 => self.regions.first().map(String::as_str),
            _ => None,
        }
    }

    /// True if the record passes every constrained dimension.
    pub fn matches(&self, record: &PriceRecord) -> bool {
        accepts(&self.years, &record.year)
            && accepts(&self.regions, &record.region)
            && accepts(&self.categories, &record.category)
            && accepts(&self.subcategories, &record.subcategory)
            && accepts(&self.products, &record.product)
    }

    /// One-line description of the selection, e.g.
    /// "Ano: 2023 • Região: Todas as regiões • Categoria: TORAS • …".
    pub fn summary(&self) -> String {
        let years = if self.years.is_empty() {
            "Todos os anos".to_string()
        } else {
            self.years
                .iter()
                .map(i32::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let regions = if self.regions.is_empty() {
            "Todas as regiões".to_string()
        } else {
            self.regions.iter().cloned().collect::<Vec<_>>().join(", ")
        };
        let first_or = |set: &BTreeSet<String>, all: &str| {
            set.first().cloned().unwrap_or_else(|| all.to_string())
        };
        format!(
            "Ano: {} \u{2022} Região: {} \u{2022} Categoria: {} \u{2022} Subcategoria: {} \u{2022} Produto: {}",
            years,
            regions,
            first_or(&self.categories, "Todas as categorias"),
            first_or(&self.subcategories, "Todas as subcategorias"),
            first_or(&self.products, "Todos os produtos"),
        )
    }
}

/// Subcategory choices for the current selection: empty until a category is chosen.
pub fn available_subcategories<'c>(
    catalog: &'c DimensionCatalog,
    filters: &DeclarativeFilterState,
) -> &'c [String] {
    match filters.categories.first() {
        Some(category) => catalog.subcategories_for(category),
        None => &[],
    }
}

/// Product choices for the current selection: empty until both a category
/// and a subcategory are chosen.
pub fn available_products<'c>(
    catalog: &'c DimensionCatalog,
    filters: &DeclarativeFilterState,
) -> &'c [String] {
    match (filters.categories.first(), filters.subcategories.first()) {
        (Some(category), Some(subcategory)) => catalog.products_for(category, subcategory),
        _ => &[],
    }
}

/// A dimension of the interactive layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractiveDimension {
    Region,
    Category,
    Subcategory,
    Year,
}

impl InteractiveDimension {
    /// Badge label.
    pub fn label(&self) -> &'static str {
        match self {
            InteractiveDimension::Region => "Região",
            InteractiveDimension::Category => "Categoria",
            InteractiveDimension::Subcategory => "Subcategoria",
            InteractiveDimension::Year => "Ano",
        }
    }
}

/// A click on a chart element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartClick {
    Region(String),
    Category(String),
    Subcategory(String),
    Year(i32),
}

impl ChartClick {
    /// Dimension the click toggles.
    pub fn dimension(&self) -> InteractiveDimension {
        match self {
            ChartClick::Region(_) => InteractiveDimension::Region,
            ChartClick::Category(_) => InteractiveDimension::Category,
            ChartClick::Subcategory(_) => InteractiveDimension::Subcategory,
            ChartClick::Year(_) => InteractiveDimension::Year,
        }
    }
}

/// Click-to-filter overlay. Each dimension holds at most one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractiveFilterState {
    pub region: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub year: Option<i32>,
}

fn toggle_value<T: PartialEq>(slot: &mut Option<T>, value: T) {
    if slot.as_ref() == Some(&value) {
        *slot = None;
    } else {
        *slot = Some(value);
    }
}

impl InteractiveFilterState {
    /// Apply a chart click: clicking the active value clears it, any other
    /// value replaces it. A category click also clears the subcategory.
    pub fn toggle(&mut self, click: &ChartClick) {
        match click {
            ChartClick::Region(region) => toggle_value(&mut self.region, region.clone()),
            ChartClick::Category(category) => {
                toggle_value(&mut self.category, category.clone());
                self.subcategory = None;
            }
            ChartClick::Subcategory(subcategory) => {
                toggle_value(&mut self.subcategory, subcategory.clone())
            }
            ChartClick::Year(year) => toggle_value(&mut self.year, *year),
        }
    }

    pub fn toggle_region(&mut self, region: &str) {
        self.toggle(&ChartClick::Region(region.to_string()));
    }

    pub fn toggle_category(&mut self, category: &str) {
        self.toggle(&ChartClick::Category(category.to_string()));
    }

    pub fn toggle_subcategory(&mut self, subcategory: &str) {
        self.toggle(&ChartClick::Subcategory(subcategory.to_string()));
    }

    pub fn toggle_year(&mut self, year: i32) {
        self.toggle(&ChartClick::Year(year));
    }

    /// Clear one dimension (badge close button).
    pub fn remove(&mut self, dimension: InteractiveDimension) {
        match dimension {
            InteractiveDimension::Region => self.region = None,
            InteractiveDimension::Category => self.category = None,
            InteractiveDimension::Subcategory => self.subcategory = None,
            InteractiveDimension::Year => self.year = None,
        }
    }

    /// Reset every dimension.
    pub fn clear(&mut self) {
        *self = InteractiveFilterState::default();
    }

    /// True when at least one dimension is set.
    pub fn is_active(&self) -> bool {
        self.region.is_some()
            || self.category.is_some()
            || self.subcategory.is_some()
            || self.year.is_some()
    }

    /// Set dimensions with their display value, in badge order.
    pub fn active(&self) -> Vec<(InteractiveDimension, String)> {
        let mut active = Vec::new();
        if let Some(region) = &self.region {
            active.push((InteractiveDimension::Region, region.clone()));
        }
        if let Some(category) = &self.category {
            active.push((InteractiveDimension::Category, category.clone()));
        }
        if let Some(subcategory) = &self.subcategory {
            active.push((InteractiveDimension::Subcategory, subcategory.clone()));
        }
        if let Some(year) = self.year {
            active.push((InteractiveDimension::Year, year.to_string()));
        }
        active
    }

    /// True if the record passes every set dimension. The year is read from
    /// the record's period, which is the authoritative time key.
    pub fn matches(&self, record: &PriceRecord) -> bool {
        let region_ok = self.region.as_ref().map_or(true, |r| *r == record.region);
        let category_ok = self.category.as_ref().map_or(true, |c| *c == record.category);
        let subcategory_ok = self
            .subcategory
            .as_ref()
            .map_or(true, |s| *s == record.subcategory);
        let year_ok = self.year.map_or(true, |y| y == record.period.year);
        region_ok && category_ok && subcategory_ok && year_ok
    }
}

/// First layer: keep records accepted by every declarative dimension.
pub fn apply_declarative_filters<'a, I>(
    records: I,
    filters: &DeclarativeFilterState,
) -> Vec<&'a PriceRecord>
where
    I: IntoIterator<Item = &'a PriceRecord>,
{
    records
        .into_iter()
        .filter(|record| filters.matches(record))
        .collect()
}

/// Second layer: narrow a subset further with the interactive overlay.
pub fn apply_interactive_filters<'a, I>(
    subset: I,
    interactive: &InteractiveFilterState,
) -> Vec<&'a PriceRecord>
where
    I: IntoIterator<Item = &'a PriceRecord>,
{
    subset
        .into_iter()
        .filter(|record| interactive.matches(record))
        .collect()
}

//! Product ranking: one row per product of the aggregated subset.

use crate::aggregate::GroupedStatistics;
use crate::table::{compare_text, sorted_view, SortField, SortOrder, TableRow};
use serde::Serialize;
use std::cmp::Ordering;

/// Column the ranking is sorted by when none is requested.
pub const DEFAULT_PRODUCT_SORT: SortField = SortField::Mean;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRow {
    pub product: String,
    pub category: String,
    pub subcategory: String,
    pub unit: Option<String>,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductTable {
    /// By product name; use [`ProductTable::view`] for display.
    pub rows: Vec<ProductRow>,
}

/// Ranking of every product in `stats.by_product`.
pub fn product_table(stats: &GroupedStatistics) -> ProductTable {
    let rows = stats
        .by_product
        .iter()
        .map(|(product, group)| ProductRow {
            product: product.clone(),
            category: group.category.clone(),
            subcategory: group.subcategory.clone(),
            unit: group.unit.clone(),
            mean: group.mean,
            min: group.min,
            max: group.max,
            count: group.count,
        })
        .collect();
    ProductTable { rows }
}

impl TableRow for ProductRow {
    fn search_fields(&self) -> [&str; 3] {
        [&self.product, &self.category, &self.subcategory]
    }

    fn compare_by(&self, other: &Self, field: SortField) -> Ordering {
        match field {
            SortField::Product => compare_text(&self.product, &other.product),
            SortField::Category => compare_text(&self.category, &other.category),
            SortField::Subcategory => compare_text(&self.subcategory, &other.subcategory),
            SortField::Unit => compare_text(
                self.unit.as_deref().unwrap_or("-"),
                other.unit.as_deref().unwrap_or("-"),
            ),
            SortField::Mean => self.mean.total_cmp(&other.mean),
            SortField::Min => self.min.total_cmp(&other.min),
            SortField::Max => self.max.total_cmp(&other.max),
            SortField::Records => self.count.cmp(&other.count),
            SortField::Variation | SortField::Regions => Ordering::Equal,
        }
    }
}

impl ProductTable {
    pub fn view(&self, search: &str, field: SortField, order: SortOrder) -> Vec<&ProductRow> {
        sorted_view(&self.rows, search, field, order)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

//! Current-price table: the latest period of a subset, one row per product,
//! compared against the period before it.

use crate::aggregate::Accumulator;
use crate::table::{compare_text, sorted_view, SortField, SortOrder, TableRow};
use fcp_core::{Period, PriceRecord};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Sort key used for rows without a variation.
const MISSING_VARIATION: f64 = -999.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentPriceRow {
    pub product: String,
    pub category: String,
    pub subcategory: String,
    pub unit: Option<String>,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Mean of the product in the previous period, if it was observed there.
    pub previous_mean: Option<f64>,
    /// Ratio against the previous mean. `None` without a non-zero previous mean.
    pub variation: Option<f64>,
    pub region_count: usize,
    pub record_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrentPriceTable {
    pub latest_period: Option<Period>,
    pub previous_period: Option<Period>,
    /// In first-seen order; use [`CurrentPriceTable::view`] for display.
    pub rows: Vec<CurrentPriceRow>,
}

struct ProductGroup<'a> {
    first: &'a PriceRecord,
    prices: Accumulator,
    regions: HashSet<&'a str>,
}

/// Build the table from a (declaratively filtered) subset.
pub fn current_prices<'a, I>(subset: I) -> CurrentPriceTable
where
    I: IntoIterator<Item = &'a PriceRecord>,
{
    let records: Vec<&PriceRecord> = subset
        .into_iter()
        .filter(|record| record.has_valid_price())
        .collect();
    let periods: BTreeSet<Period> = records.iter().map(|record| record.period).collect();
    let mut newest = periods.iter().rev();
    let Some(latest) = newest.next().copied() else {
        return CurrentPriceTable::default();
    };
    let previous = newest.next().copied();

    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, ProductGroup<'_>> = HashMap::new();
    let mut previous_prices: HashMap<&str, Accumulator> = HashMap::new();

    for record in records.iter().copied() {
        if record.period == latest {
            let group = groups.entry(record.product.as_str()).or_insert_with(|| {
                order.push(record.product.as_str());
                ProductGroup {
                    first: record,
                    prices: Accumulator::default(),
                    regions: HashSet::new(),
                }
            });
            group.prices.push(record.price);
            group.regions.insert(record.region.as_str());
        } else if Some(record.period) == previous {
            previous_prices
                .entry(record.product.as_str())
                .or_default()
                .push(record.price);
        }
    }

    let rows = order
        .into_iter()
        .filter_map(|product| groups.get(product).map(|group| (product, group)))
        .map(|(product, group)| {
            let mean = group.prices.mean();
            let previous_mean = previous_prices.get(product).map(Accumulator::mean);
            let variation = previous_mean
                .filter(|prev| *prev != 0.0)
                .map(|prev| (mean - prev) / prev);
            CurrentPriceRow {
                product: product.to_string(),
                category: group.first.category.clone(),
                subcategory: group.first.subcategory.clone(),
                unit: group.first.unit.clone(),
                mean,
                min: group.prices.min(),
                max: group.prices.max(),
                previous_mean,
                variation,
                region_count: group.regions.len(),
                record_count: group.prices.count(),
            }
        })
        .collect();

    CurrentPriceTable {
        latest_period: Some(latest),
        previous_period: previous,
        rows,
    }
}

impl TableRow for CurrentPriceRow {
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
            SortField::Variation => self
                .variation
                .unwrap_or(MISSING_VARIATION)
                .total_cmp(&other.variation.unwrap_or(MISSING_VARIATION)),
            SortField::Regions => self.region_count.cmp(&other.region_count),
            SortField::Records => self.record_count.cmp(&other.record_count),
        }
    }
}

impl CurrentPriceTable {
    /// Rows matching `search` on product, category and subcategory, sorted
    /// by `field`.
    pub fn view(&self, search: &str, field: SortField, order: SortOrder) -> Vec<&CurrentPriceRow> {
        sorted_view(&self.rows, search, field, order)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

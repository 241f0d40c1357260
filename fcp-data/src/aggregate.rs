//! The aggregation engine: one pass over a record subset producing every
//! grouping the dashboard renders.
//!
//! Means are a plain running sum divided by the count (no compensated
//! summation). Groups are accumulated in hash maps so the pass stays linear
//! in the number of records; they are emitted as ordered maps so output is
//! deterministic.
//!
//! A record whose price is not finite and non-negative is skipped. The loader
//! already rejects such records, so this only matters for hand-built input,
//! and it keeps `NaN` from ever reaching a chart.

use fcp_core::{Period, PriceRecord};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Mean and count of one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStats {
    pub mean: f64,
    pub count: usize,
}

/// Category group, including how many distinct products of the category
/// appear in the subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryStats {
    pub mean: f64,
    pub count: usize,
    pub distinct_product_count: usize,
}

/// Product group. Category, subcategory and unit come from the first record
/// seen for the product.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    pub category: String,
    pub subcategory: String,
    pub unit: Option<String>,
}

/// Everything the charts, tables and KPI cards read.
///
/// For an empty subset every scalar is 0 and every map is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupedStatistics {
    pub mean_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub total_count: usize,
    pub by_period: BTreeMap<Period, GroupStats>,
    pub by_region: BTreeMap<String, GroupStats>,
    pub by_category: BTreeMap<String, CategoryStats>,
    pub by_product: BTreeMap<String, ProductStats>,
    /// Periods in ascending order.
    pub sorted_periods: Vec<Period>,
}

/// Running sum, count and extremes of a group of prices.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Accumulator {
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Accumulator {
            sum: 0.0,
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Accumulator {
    pub(crate) fn push(&mut self, price: f64) {
        self.sum += price;
        self.count += 1;
        self.min = self.min.min(price);
        self.max = self.max.max(price);
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    /// 0 for an empty group.
    pub(crate) fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// 0 for an empty group.
    pub(crate) fn min(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.min
        }
    }

    /// 0 for an empty group.
    pub(crate) fn max(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.max
        }
    }

    fn group_stats(&self) -> GroupStats {
        GroupStats {
            mean: self.mean(),
            count: self.count,
        }
    }
}

struct CategoryAccumulator<'a> {
    prices: Accumulator,
    products: HashSet<&'a str>,
}

struct ProductAccumulator<'a> {
    prices: Accumulator,
    first: &'a PriceRecord,
}

/// Group a record subset by period, region, category and product.
pub fn aggregate<'a, I>(subset: I) -> GroupedStatistics
where
    I: IntoIterator<Item = &'a PriceRecord>,
{
    let mut overall = Accumulator::default();
    let mut by_period: HashMap<Period, Accumulator> = HashMap::new();
    let mut by_region: HashMap<&'a str, Accumulator> = HashMap::new();
    let mut by_category: HashMap<&'a str, CategoryAccumulator<'a>> = HashMap::new();
    let mut by_product: HashMap<&'a str, ProductAccumulator<'a>> = HashMap::new();
    let mut skipped = 0usize;

    for record in subset {
        if !record.has_valid_price() {
            skipped += 1;
            log::debug!(
                "[FCP Debug] aggregate: skipping {} / {} with price {}",
                record.period,
                record.product,
                record.price
            );
            continue;
        }
        let price = record.price;
        overall.push(price);
        by_period.entry(record.period).or_default().push(price);
        by_region
            .entry(record.region.as_str())
            .or_default()
            .push(price);

        let category = by_category
            .entry(record.category.as_str())
            .or_insert_with(|| CategoryAccumulator {
                prices: Accumulator::default(),
                products: HashSet::new(),
            });
        category.prices.push(price);
        category.products.insert(record.product.as_str());

        by_product
            .entry(record.product.as_str())
            .or_insert_with(|| ProductAccumulator {
                prices: Accumulator::default(),
                first: record,
            })
            .prices
            .push(price);
    }

    if skipped > 0 {
        log::debug!("[FCP Debug] aggregate: skipped {} invalid records", skipped);
    }
    if overall.count() == 0 {
        return GroupedStatistics::default();
    }

    let by_period: BTreeMap<Period, GroupStats> = by_period
        .into_iter()
        .map(|(period, acc)| (period, acc.group_stats()))
        .collect();
    let sorted_periods: Vec<Period> = by_period.keys().copied().collect();

    let by_region = by_region
        .into_iter()
        .map(|(region, acc)| (region.to_string(), acc.group_stats()))
        .collect();

    let by_category = by_category
        .into_iter()
        .map(|(category, acc)| {
            (
                category.to_string(),
                CategoryStats {
                    mean: acc.prices.mean(),
                    count: acc.prices.count(),
                    distinct_product_count: acc.products.len(),
                },
            )
        })
        .collect();

    let by_product = by_product
        .into_iter()
        .map(|(product, acc)| {
            (
                product.to_string(),
                ProductStats {
                    mean: acc.prices.mean(),
                    min: acc.prices.min(),
                    max: acc.prices.max(),
                    count: acc.prices.count(),
                    category: acc.first.category.clone(),
                    subcategory: acc.first.subcategory.clone(),
                    unit: acc.first.unit.clone(),
                },
            )
        })
        .collect();

    log::debug!(
        "[FCP Debug] aggregate: {} records over {} periods",
        overall.count(),
        sorted_periods.len()
    );

    GroupedStatistics {
        mean_price: overall.mean(),
        min_price: overall.min(),
        max_price: overall.max(),
        total_count: overall.count(),
        by_period,
        by_region,
        by_category,
        by_product,
        sorted_periods,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(period: &str, region: &str, product: &str, price: f64) -> PriceRecord {
        PriceRecord::new(period.parse().unwrap(), region, "TORAS", "Pinus", product, price)
    }

    fn sample_records() -> Vec<PriceRecord> {
        vec![
            record("2023-01", "Norte", "Pinus", 100.0),
            record("2023-01", "Sul", "Pinus", 200.0),
            record("2023-02", "Norte", "Pinus", 150.0),
        ]
    }

    fn p(s: &str) -> Period {
        s.parse().unwrap()
    }

    #[test]
    fn test_aggregate_sample() {
        let records = sample_records();
        let stats = aggregate(&records);
        assert_eq!(stats.total_count, 3);
        assert!((stats.mean_price - 150.0).abs() < 1e-9);
        assert_eq!(stats.min_price, 100.0);
        assert_eq!(stats.max_price, 200.0);
        assert!((stats.by_period[&p("2023-01")].mean - 150.0).abs() < 1e-9);
        assert!((stats.by_period[&p("2023-02")].mean - 150.0).abs() < 1e-9);
        assert_eq!(stats.by_region["Norte"].count, 2);
        assert_eq!(stats.by_region["Sul"].count, 1);
        let pinus = &stats.by_product["Pinus"];
        assert_eq!(pinus.min, 100.0);
        assert_eq!(pinus.max, 200.0);
        assert_eq!(pinus.count, 3);
        assert_eq!(pinus.category, "TORAS");
        assert_eq!(stats.sorted_periods, vec![p("2023-01"), p("2023-02")]);
    }

    #[test]
    fn test_aggregate_empty_is_zero_structure() {
        let records: Vec<PriceRecord> = Vec::new();
        let stats = aggregate(&records);
        assert_eq!(stats, GroupedStatistics::default());
        assert_eq!(stats.mean_price, 0.0);
        assert_eq!(stats.min_price, 0.0);
        assert_eq!(stats.max_price, 0.0);
        assert_eq!(stats.total_count, 0);
        assert!(stats.by_period.is_empty());
        assert!(stats.sorted_periods.is_empty());
    }

    #[test]
    fn test_distinct_products_follow_subset() {
        let mut records = sample_records();
        records.push(record("2023-02", "Sul", "Tora 25-30cm", 300.0));
        let stats = aggregate(&records);
        assert_eq!(stats.by_category["TORAS"].distinct_product_count, 2);
        assert_eq!(stats.by_category["TORAS"].count, 4);

        let norte: Vec<&PriceRecord> = records.iter().filter(|r| r.region == "Norte").collect();
        let stats = aggregate(norte);
        assert_eq!(stats.by_category["TORAS"].distinct_product_count, 1);
    }

    #[test]
    fn test_invalid_prices_are_skipped() {
        let mut records = sample_records();
        records.push(record("2023-03", "Norte", "Pinus", f64::NAN));
        records.push(record("2023-03", "Norte", "Pinus", -10.0));
        let stats = aggregate(&records);
        assert_eq!(stats.total_count, 3);
        assert!(!stats.by_period.contains_key(&p("2023-03")));
        assert!(stats.mean_price.is_finite());

        let only_invalid = vec![record("2023-03", "Norte", "Pinus", f64::INFINITY)];
        assert_eq!(aggregate(&only_invalid), GroupedStatistics::default());
    }

    #[test]
    fn test_partition_counts_sum_to_total() {
        let mut records = sample_records();
        records.push(record("2024-05", "Oeste", "Lenha", 80.0));
        let stats = aggregate(&records);
        let total = stats.total_count;
        assert_eq!(stats.by_period.values().map(|g| g.count).sum::<usize>(), total);
        assert_eq!(stats.by_region.values().map(|g| g.count).sum::<usize>(), total);
        assert_eq!(stats.by_category.values().map(|g| g.count).sum::<usize>(), total);
        assert_eq!(stats.by_product.values().map(|g| g.count).sum::<usize>(), total);
    }

    #[test]
    fn test_product_metadata_from_first_record() {
        let records = vec![
            record("2023-01", "Norte", "Muda", 1.0).with_unit("un"),
            record("2023-02", "Norte", "Muda", 2.0).with_unit("milheiro"),
        ];
        let stats = aggregate(&records);
        assert_eq!(stats.by_product["Muda"].unit.as_deref(), Some("un"));
    }
}

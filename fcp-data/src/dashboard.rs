//! A dashboard session: the loaded records, both filter layers and the
//! memoised views derived from them.
//!
//! Every accessor recomputes synchronously on a cache miss. Entries are keyed
//! by the identity of the record slice plus a copy of the filter state they
//! were computed from, so re-reading a view without a filter change is free.

use crate::aggregate::{aggregate, GroupedStatistics};
use crate::current_prices::{current_prices, CurrentPriceTable};
use crate::filter::{
    apply_declarative_filters, apply_interactive_filters, ChartClick, DeclarativeFilterState,
    InteractiveFilterState,
};
use crate::forecast::{select_segment, ForecastSelection};
use crate::memo::{Memo, MemoStats};
use crate::products::{product_table, ProductTable};
use fcp_core::{ForecastArtifact, PriceRecord};
use std::rc::Rc;

/// Identity of the record slice: address and length.
type StoreKey = (usize, usize);
type FilteredKey = (StoreKey, DeclarativeFilterState);
type RefinedKey = (FilteredKey, InteractiveFilterState);

/// Hit/miss counters of every memoised view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub filtered: MemoStats,
    pub interactive_filtered: MemoStats,
    pub aggregations: MemoStats,
    pub forecast: MemoStats,
    pub current_prices: MemoStats,
    pub products: MemoStats,
}

pub struct Dashboard<'a> {
    records: &'a [PriceRecord],
    forecasts: Option<&'a ForecastArtifact>,
    filters: DeclarativeFilterState,
    interactive: InteractiveFilterState,
    filtered: Memo<FilteredKey, Vec<&'a PriceRecord>>,
    interactive_filtered: Memo<RefinedKey, Vec<&'a PriceRecord>>,
    aggregations: Memo<RefinedKey, GroupedStatistics>,
    forecast: Memo<RefinedKey, ForecastSelection>,
    current_prices: Memo<FilteredKey, CurrentPriceTable>,
    products: Memo<RefinedKey, ProductTable>,
}

impl<'a> Dashboard<'a> {
    /// Start a session with no filters. `forecasts` is `None` when the
    /// forecast artifact could not be loaded.
    pub fn new(records: &'a [PriceRecord], forecasts: Option<&'a ForecastArtifact>) -> Self {
        Dashboard {
            records,
            forecasts,
            filters: DeclarativeFilterState::default(),
            interactive: InteractiveFilterState::default(),
            filtered: Memo::new(),
            interactive_filtered: Memo::new(),
            aggregations: Memo::new(),
            forecast: Memo::new(),
            current_prices: Memo::new(),
            products: Memo::new(),
        }
    }

    pub fn records(&self) -> &'a [PriceRecord] {
        self.records
    }

    pub fn filters(&self) -> &DeclarativeFilterState {
        &self.filters
    }

    pub fn interactive(&self) -> &InteractiveFilterState {
        &self.interactive
    }

    /// Mutable access to the declarative layer. Views pick up the change on
    /// their next read.
    pub fn filters_mut(&mut self) -> &mut DeclarativeFilterState {
        &mut self.filters
    }

    pub fn interactive_mut(&mut self) -> &mut InteractiveFilterState {
        &mut self.interactive
    }

    /// Toggle the interactive filter behind a chart element.
    pub fn click(&mut self, click: &ChartClick) {
        self.interactive.toggle(click);
        log::debug!(
            "dashboard: {} filter now {:?}",
            click.dimension().label(),
            self.interactive
        );
    }

    /// Reset the declarative layer only.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Reset the interactive layer only.
    pub fn clear_interactive(&mut self) {
        self.interactive.clear();
    }

    fn store_key(&self) -> StoreKey {
        (self.records.as_ptr() as usize, self.records.len())
    }

    fn filtered_key(&self) -> FilteredKey {
        (self.store_key(), self.filters.clone())
    }

    fn refined_key(&self) -> RefinedKey {
        (self.filtered_key(), self.interactive.clone())
    }

    /// Records passing the declarative filters.
    pub fn filtered(&self) -> Rc<Vec<&'a PriceRecord>> {
        self.filtered.get_or_compute(self.filtered_key(), || {
            let subset = apply_declarative_filters(self.records, &self.filters);
            log::debug!(
                "[FCP Debug] dashboard: declarative filters kept {} of {} records",
                subset.len(),
                self.records.len()
            );
            subset
        })
    }

    /// Declarative result narrowed by the interactive filters.
    pub fn interactive_filtered(&self) -> Rc<Vec<&'a PriceRecord>> {
        self.interactive_filtered
            .get_or_compute(self.refined_key(), || {
                let filtered = self.filtered();
                let subset = apply_interactive_filters(filtered.iter().copied(), &self.interactive);
                log::debug!(
                    "[FCP Debug] dashboard: interactive filters kept {} of {} records",
                    subset.len(),
                    filtered.len()
                );
                subset
            })
    }

    /// Statistics of the interactively filtered subset.
    pub fn aggregations(&self) -> Rc<GroupedStatistics> {
        self.aggregations.get_or_compute(self.refined_key(), || {
            aggregate(self.interactive_filtered().iter().copied())
        })
    }

    /// Forecast for the current declarative filters, with the historical tail
    /// read from [`Dashboard::aggregations`].
    pub fn forecast(&self) -> Rc<ForecastSelection> {
        self.forecast.get_or_compute(self.refined_key(), || match self.forecasts {
            Some(artifact) => select_segment(artifact, &self.filters, &self.aggregations()),
            None => ForecastSelection::Unavailable,
        })
    }

    /// Current-price table of the declaratively filtered subset. Chart clicks
    /// do not narrow it.
    pub fn current_prices(&self) -> Rc<CurrentPriceTable> {
        self.current_prices
            .get_or_compute(self.filtered_key(), || {
                current_prices(self.filtered().iter().copied())
            })
    }

    /// Product ranking of the interactively filtered subset.
    pub fn products(&self) -> Rc<ProductTable> {
        self.products
            .get_or_compute(self.refined_key(), || product_table(&self.aggregations()))
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            filtered: self.filtered.stats(),
            interactive_filtered: self.interactive_filtered.stats(),
            aggregations: self.aggregations.stats(),
            forecast: self.forecast.stats(),
            current_prices: self.current_prices.stats(),
            products: self.products.stats(),
        }
    }
}

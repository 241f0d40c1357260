//! The dashboard engine: filter pipeline, aggregation, forecast selection and
//! the views derived from them.
//!
//! Everything here is synchronous and pure apart from the memo cache held by
//! [`Dashboard`]. The four entry points a presentation layer needs are
//! [`apply_declarative_filters`], [`apply_interactive_filters`],
//! [`aggregate`] and [`select_segment`].

pub mod aggregate;
pub mod current_prices;
pub mod dashboard;
pub mod evolution;
pub mod filter;
pub mod forecast;
pub mod forecast_table;
pub mod kpi;
pub mod memo;
pub mod products;
pub mod table;

pub use aggregate::{aggregate, CategoryStats, GroupStats, GroupedStatistics, ProductStats};
pub use current_prices::{current_prices, CurrentPriceRow, CurrentPriceTable};
pub use dashboard::{CacheStats, Dashboard};
pub use filter::{
    apply_declarative_filters, apply_interactive_filters, available_products,
    available_subcategories, ChartClick, DeclarativeFilterState, InteractiveDimension,
    InteractiveFilterState,
};
pub use forecast::{
    select_segment, ForecastSelection, HistoricalPoint, SelectedForecast, HISTORY_TAIL_LEN,
};
pub use evolution::{evolution, EvolutionPoint};
pub use forecast_table::{forecast_table, ForecastCell, ForecastRow, ForecastTable};
pub use kpi::{headline, model_kpis, HeadlineKpis, ModelKpis};
pub use products::{product_table, ProductRow, ProductTable, DEFAULT_PRODUCT_SORT};
pub use table::{SortField, SortOrder, TableRow};

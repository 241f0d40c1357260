//! Core types for forestry commodity price data.
//!
//! Every artifact the dashboard reads is modelled here as an explicit type:
//! price records, the dimension catalog, the forecast artifact and the region
//! boundaries. Parsing happens at this boundary so the aggregation code never
//! deals with loosely shaped JSON.

pub mod catalog;
pub mod error;
pub mod forecast;
pub mod geo;
pub mod period;
pub mod record;

pub use catalog::{DatasetStats, DimensionCatalog};
pub use error::{FcpError, Result};
pub use forecast::{ForecastArtifact, ForecastPoint, ModelMetrics, ModelOutput, SegmentKey};
pub use period::Period;
pub use record::{PriceRecord, RawPriceRecord, RecordRejection};

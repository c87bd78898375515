pub mod config;
pub mod error;
pub mod ingest;
pub mod logger;
pub mod series;
pub mod trends;

pub use config::Config;
pub use error::{Error, Result};
pub use ingest::{Aggregation, SeriesAggregator};
pub use series::{DataPoint, TrendLine};
pub use trends::{DistanceEngine, DistanceReport};

pub mod aggregator;
pub mod loader;
pub mod record;

pub use aggregator::{aggregate, Aggregation, SeriesAggregator};
pub use loader::{load_file, load_reader, FileType};
pub use record::{parse_tsv_line, Record};

pub mod export;
pub mod point;
pub mod trend_line;

pub use export::{export_to_csv, export_to_json, ExportFormat};
pub use point::DataPoint;
pub use trend_line::TrendLine;

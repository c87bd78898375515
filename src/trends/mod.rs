pub mod distance;
pub mod types;

pub use distance::DistanceEngine;
pub use types::{sort_by_similarity, Distance, DistanceReport, PointDifference};

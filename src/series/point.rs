use serde::Serialize;

/// One topic's measurement at one timestamp, plus its derived differences.
///
/// `delta_count` and `delta_delta_count` follow arrival order within a topic,
/// not timestamp order. Fields are private so a point cannot change after it
/// has been built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataPoint {
    timestamp: i64,
    count: u64,
    delta_count: i64,
    delta_delta_count: i64,
    trending: bool,
}

impl DataPoint {
    pub fn new(
        timestamp: i64,
        count: u64,
        delta_count: i64,
        delta_delta_count: i64,
        trending: bool,
    ) -> Self {
        Self {
            timestamp,
            count,
            delta_count,
            delta_delta_count,
            trending,
        }
    }

    /// Stand-in for a missing side when zero-filling.
    pub fn zero(timestamp: i64) -> Self {
        Self::new(timestamp, 0, 0, 0, false)
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn delta_count(&self) -> i64 {
        self.delta_count
    }

    pub fn delta_delta_count(&self) -> i64 {
        self.delta_delta_count
    }

    pub fn trending(&self) -> bool {
        self.trending
    }
}

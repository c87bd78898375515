use std::collections::btree_map;
use std::collections::BTreeMap;

use super::point::DataPoint;
use crate::logger::Reporter;
use crate::trends::{DistanceEngine, DistanceReport};

/// The full time series for one topic, keyed and ordered by timestamp.
///
/// A trend line is never mutated once built; rebuild it to change it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    topic: String,
    series: BTreeMap<i64, DataPoint>,
}

impl TrendLine {
    /// Builds a trend line from points in arrival order. A later point with
    /// the same timestamp replaces the earlier one.
    pub fn new(topic: impl Into<String>, points: impl IntoIterator<Item = DataPoint>) -> Self {
        let series = points
            .into_iter()
            .map(|point| (point.timestamp(), point))
            .collect();
        Self::from_series(topic, series)
    }

    pub(crate) fn from_series(topic: impl Into<String>, series: BTreeMap<i64, DataPoint>) -> Self {
        Self {
            topic: topic.into(),
            series,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Points in ascending timestamp order.
    pub fn iter(&self) -> btree_map::Values<'_, i64, DataPoint> {
        self.series.values()
    }

    pub fn timestamps(&self) -> btree_map::Keys<'_, i64, DataPoint> {
        self.series.keys()
    }

    pub fn get(&self, timestamp: i64) -> Option<&DataPoint> {
        self.series.get(&timestamp)
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.series.contains_key(&timestamp)
    }

    pub fn first_timestamp(&self) -> Option<i64> {
        self.series.keys().next().copied()
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.series.keys().next_back().copied()
    }

    pub fn trending_points(&self) -> usize {
        self.series.values().filter(|p| p.trending()).count()
    }

    pub fn distance<R: Reporter>(&self, other: &TrendLine, engine: &DistanceEngine<R>) -> DistanceReport {
        engine.compare(self, other)
    }
}

impl<'a> IntoIterator for &'a TrendLine {
    type Item = &'a DataPoint;
    type IntoIter = btree_map::Values<'a, i64, DataPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistanceConfig;
    use crate::logger::NullReporter;

    fn sample() -> TrendLine {
        TrendLine::new(
            "T1",
            vec![
                DataPoint::new(300, 13, -2, -7, true),
                DataPoint::new(100, 10, 0, 0, false),
                DataPoint::new(200, 15, 5, 0, false),
            ],
        )
    }

    #[test]
    fn test_iteration_is_ascending() {
        let line = sample();
        let timestamps: Vec<i64> = line.iter().map(|p| p.timestamp()).collect();
        assert_eq!(timestamps, vec![100, 200, 300]);
        assert_eq!(line.first_timestamp(), Some(100));
        assert_eq!(line.last_timestamp(), Some(300));
    }

    #[test]
    fn test_lookup_missing_is_absent() {
        let line = sample();
        assert_eq!(line.get(200).map(|p| p.count()), Some(15));
        assert!(line.get(250).is_none());
        assert!(!line.contains(250));
    }

    #[test]
    fn test_same_timestamp_last_write_wins() {
        let line = TrendLine::new(
            "dup",
            vec![DataPoint::new(100, 1, 0, 0, false), DataPoint::new(100, 9, 0, 0, true)],
        );
        assert_eq!(line.len(), 1);
        assert_eq!(line.get(100).map(|p| p.count()), Some(9));
        assert_eq!(line.trending_points(), 1);
    }

    #[test]
    fn test_empty_line() {
        let line = TrendLine::new("empty", Vec::new());
        assert!(line.is_empty());
        assert_eq!(line.first_timestamp(), None);
    }

    #[test]
    fn test_distance_delegates_to_engine() {
        let engine = DistanceEngine::new(DistanceConfig::default(), NullReporter).unwrap();
        let line = sample();
        let report = line.distance(&line, &engine);
        assert_eq!(report.compared_points(), 3);
        assert_eq!(report.total(), Some(0.0));
    }
}

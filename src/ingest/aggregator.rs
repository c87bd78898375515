use std::collections::{BTreeMap, HashMap};

use super::record::Record;
use crate::error::{RecordParseError, Warning};
use crate::logger::Reporter;
use crate::series::{DataPoint, TrendLine};

/// In-progress state for one topic during an aggregation pass.
///
/// `last_count` and `last_delta` use zero to mean "no prior value". A genuine
/// count of zero is therefore indistinguishable from a fresh topic: the record
/// after it gets a delta of 0.
#[derive(Debug, Default)]
struct TopicState {
    series: BTreeMap<i64, DataPoint>,
    last_count: u64,
    last_delta: i64,
}

/// Narrows a difference to i64, saturating at the bounds. The flag is set
/// when saturation happened.
fn saturate(value: i128) -> (i64, bool) {
    match i64::try_from(value) {
        Ok(v) => (v, false),
        Err(_) if value < 0 => (i64::MIN, true),
        Err(_) => (i64::MAX, true),
    }
}

impl TopicState {
    /// Appends `record` and returns true if a derived field had to saturate.
    fn push(&mut self, record: &Record) -> bool {
        let (delta_count, delta_saturated) = if self.last_count != 0 {
            saturate(i128::from(record.count) - i128::from(self.last_count))
        } else {
            (0, false)
        };

        let (delta_delta_count, dd_saturated) = if self.last_delta != 0 {
            saturate(i128::from(delta_count) - i128::from(self.last_delta))
        } else {
            (0, false)
        };

        let point = DataPoint::new(
            record.timestamp,
            record.count,
            delta_count,
            delta_delta_count,
            record.trending,
        );
        self.series.insert(record.timestamp, point);

        self.last_count = record.count;
        self.last_delta = delta_count;
        delta_saturated || dd_saturated
    }
}

/// Everything an aggregation pass produced.
#[derive(Debug, Default)]
pub struct Aggregation {
    /// One per topic, in no particular order.
    pub trend_lines: Vec<TrendLine>,
    pub parse_errors: Vec<RecordParseError>,
    pub warnings: Vec<Warning>,
    pub records: usize,
}

impl Aggregation {
    pub fn find(&self, topic: &str) -> Option<&TrendLine> {
        self.trend_lines.iter().find(|line| line.topic() == topic)
    }

    pub fn is_empty(&self) -> bool {
        self.trend_lines.is_empty()
    }

    /// Drops trend lines shorter than `min_points` and returns how many went.
    pub fn prune_short(&mut self, min_points: usize) -> usize {
        let before = self.trend_lines.len();
        self.trend_lines.retain(|line| line.len() >= min_points);
        before - self.trend_lines.len()
    }

    pub fn sort_by_topic(&mut self) {
        self.trend_lines.sort_by(|a, b| a.topic().cmp(b.topic()));
    }
}

/// Groups an interleaved record stream into one trend line per topic.
pub struct SeriesAggregator<R: Reporter> {
    topics: HashMap<String, TopicState>,
    parse_errors: Vec<RecordParseError>,
    warnings: Vec<Warning>,
    records: usize,
    reporter: R,
}

impl<R: Reporter> SeriesAggregator<R> {
    pub fn new(reporter: R) -> Self {
        Self {
            topics: HashMap::new(),
            parse_errors: Vec::new(),
            warnings: Vec::new(),
            records: 0,
            reporter,
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records += 1;
        let saturated = match self.topics.get_mut(&record.topic) {
            Some(state) => state.push(&record),
            None => {
                self.reporter.debug(format_args!("new topic '{}'", record.topic));
                let mut state = TopicState::default();
                let saturated = state.push(&record);
                self.topics.insert(record.topic.clone(), state);
                saturated
            }
        };

        if saturated {
            let warning = Warning::DeltaOverflow {
                topic: record.topic,
                timestamp: record.timestamp,
            };
            self.reporter.warn(format_args!("{}", warning));
            self.warnings.push(warning);
        }
    }

    /// Records a decode failure and carries on with the next record.
    pub fn reject(&mut self, error: RecordParseError) {
        self.reporter.warn(format_args!("skipping record: {}", error));
        self.parse_errors.push(error);
    }

    pub fn accept(&mut self, item: Result<Record, RecordParseError>) {
        match item {
            Ok(record) => self.push(record),
            Err(error) => self.reject(error),
        }
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn finish(self) -> Aggregation {
        let mut warnings = self.warnings;
        if self.records == 0 {
            self.reporter.warn(format_args!("{}", Warning::EmptyInput));
            warnings.push(Warning::EmptyInput);
        }

        let trend_lines: Vec<TrendLine> = self
            .topics
            .into_iter()
            .map(|(topic, state)| TrendLine::from_series(topic, state.series))
            .collect();

        self.reporter.info(format_args!(
            "aggregated {} records into {} trend lines ({} parse errors)",
            self.records,
            trend_lines.len(),
            self.parse_errors.len()
        ));

        Aggregation {
            trend_lines,
            parse_errors: self.parse_errors,
            warnings,
            records: self.records,
        }
    }
}

/// Runs a whole aggregation pass over `items` in arrival order.
pub fn aggregate<I, R>(items: I, reporter: R) -> Aggregation
where
    I: IntoIterator<Item = Result<Record, RecordParseError>>,
    R: Reporter,
{
    let mut aggregator = SeriesAggregator::new(reporter);
    for item in items {
        aggregator.accept(item);
    }
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use crate::logger::{MemoryReporter, NullReporter};
    use log::Level;

    fn records(rows: &[(&str, i64, u64, bool)]) -> Vec<Result<Record, RecordParseError>> {
        rows.iter()
            .map(|&(topic, ts, count, trending)| Ok(Record::new(topic, ts, count, trending)))
            .collect()
    }

    fn deltas(line: &TrendLine) -> Vec<(i64, i64)> {
        line.iter()
            .map(|p| (p.delta_count(), p.delta_delta_count()))
            .collect()
    }

    #[test]
    fn test_single_topic_scenario() {
        let result = aggregate(
            records(&[("T1", 100, 10, false), ("T1", 200, 15, false), ("T1", 300, 13, true)]),
            NullReporter,
        );

        assert_eq!(result.trend_lines.len(), 1);
        let line = result.find("T1").unwrap();
        assert_eq!(line.get(100), Some(&DataPoint::new(100, 10, 0, 0, false)));
        assert_eq!(line.get(200), Some(&DataPoint::new(200, 15, 5, 0, false)));
        assert_eq!(line.get(300), Some(&DataPoint::new(300, 13, -2, -7, true)));
    }

    #[test]
    fn test_increasing_counts_deltas() {
        let result = aggregate(
            records(&[("a", 1, 1, false), ("a", 2, 3, false), ("a", 3, 7, false), ("a", 4, 8, false)]),
            NullReporter,
        );
        let line = result.find("a").unwrap();
        assert_eq!(deltas(line), vec![(0, 0), (2, 0), (4, 2), (1, -3)]);
    }

    #[test]
    fn test_interleaved_topics_are_independent() {
        let result = aggregate(
            records(&[
                ("a", 1, 10, false),
                ("b", 1, 100, false),
                ("a", 2, 12, false),
                ("b", 2, 90, true),
                ("a", 3, 20, false),
                ("b", 3, 95, false),
            ]),
            NullReporter,
        );

        assert_eq!(result.trend_lines.len(), 2);
        assert_eq!(deltas(result.find("a").unwrap()), vec![(0, 0), (2, 0), (8, 6)]);
        assert_eq!(deltas(result.find("b").unwrap()), vec![(0, 0), (-10, 0), (5, 15)]);
    }

    #[test]
    fn test_duplicate_timestamp_last_write_wins() {
        let result = aggregate(
            records(&[("a", 100, 10, false), ("a", 200, 15, false), ("a", 200, 18, true)]),
            NullReporter,
        );
        let line = result.find("a").unwrap();
        assert_eq!(line.len(), 2);
        // The overwriting record still saw 15 as the previous count.
        assert_eq!(line.get(200), Some(&DataPoint::new(200, 18, 3, -2, true)));
    }

    #[test]
    fn test_deltas_follow_arrival_order() {
        let result = aggregate(
            records(&[("a", 300, 30, false), ("a", 100, 10, false), ("a", 200, 25, false)]),
            NullReporter,
        );
        let line = result.find("a").unwrap();
        assert_eq!(line.get(300), Some(&DataPoint::new(300, 30, 0, 0, false)));
        assert_eq!(line.get(100), Some(&DataPoint::new(100, 10, -20, 0, false)));
        assert_eq!(line.get(200), Some(&DataPoint::new(200, 25, 15, 35, false)));
    }

    #[test]
    fn test_zero_count_acts_as_no_prior_value() {
        // Known limitation: a real zero count resets the delta chain.
        let result = aggregate(
            records(&[("a", 1, 5, false), ("a", 2, 0, false), ("a", 3, 4, false)]),
            NullReporter,
        );
        let line = result.find("a").unwrap();
        assert_eq!(line.get(2).map(|p| p.delta_count()), Some(-5));
        assert_eq!(line.get(3).map(|p| p.delta_count()), Some(0));
        // last_delta was -5, so delta-delta is still computed against it.
        assert_eq!(line.get(3).map(|p| p.delta_delta_count()), Some(5));
    }

    #[test]
    fn test_zero_delta_acts_as_no_prior_delta() {
        let result = aggregate(
            records(&[("a", 1, 5, false), ("a", 2, 5, false), ("a", 3, 9, false)]),
            NullReporter,
        );
        let line = result.find("a").unwrap();
        assert_eq!(line.get(3), Some(&DataPoint::new(3, 9, 4, 0, false)));
    }

    #[test]
    fn test_delta_delta_overflow_saturates() {
        let max = i64::MAX as u64;
        let result = aggregate(
            records(&[("a", 1, 1, false), ("a", 2, max, false), ("a", 3, 1, false)]),
            NullReporter,
        );
        let line = result.find("a").unwrap();
        assert_eq!(line.get(2), Some(&DataPoint::new(2, max, i64::MAX - 1, 0, false)));
        assert_eq!(line.get(3), Some(&DataPoint::new(3, 1, -(i64::MAX - 1), i64::MIN, false)));
        assert_eq!(
            result.warnings,
            vec![Warning::DeltaOverflow { topic: "a".to_string(), timestamp: 3 }]
        );
    }

    #[test]
    fn test_count_beyond_i64_saturates_delta() {
        let reporter = MemoryReporter::new();
        let mut aggregator = SeriesAggregator::new(&reporter);
        aggregator.push(Record::new("a", 1, 1, false));
        aggregator.push(Record::new("a", 2, u64::MAX, false));
        let result = aggregator.finish();

        let point = result.find("a").unwrap().get(2).copied().unwrap();
        assert_eq!(point.delta_count(), i64::MAX);
        assert_eq!(result.warnings.len(), 1);
        assert!(reporter.contains("overflowed"));
    }

    #[test]
    fn test_parse_errors_collected_and_skipped() {
        let reporter = MemoryReporter::new();
        let items = vec![
            Ok(Record::new("a", 1, 10, false)),
            Err(RecordParseError::new(2, ParseErrorKind::FieldCount { found: 2 })),
            Ok(Record::new("a", 3, 14, false)),
        ];
        let result = aggregate(items, &reporter);

        assert_eq!(result.parse_errors.len(), 1);
        assert_eq!(result.parse_errors[0].line, 2);
        assert_eq!(result.records, 2);
        assert_eq!(result.find("a").unwrap().get(3).map(|p| p.delta_count()), Some(4));
        assert_eq!(reporter.count_at(Level::Warn), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_input_warns() {
        let reporter = MemoryReporter::new();
        let result = aggregate(Vec::new(), &reporter);
        assert!(result.is_empty());
        assert_eq!(result.warnings, vec![Warning::EmptyInput]);
        assert!(reporter.contains("no records"));
    }

    #[test]
    fn test_only_bad_records_is_empty_input() {
        let items = vec![Err(RecordParseError::new(1, ParseErrorKind::EmptyTopic))];
        let result = aggregate(items, NullReporter);
        assert_eq!(result.warnings, vec![Warning::EmptyInput]);
        assert_eq!(result.parse_errors.len(), 1);
    }

    #[test]
    fn test_prune_short() {
        let mut result = aggregate(
            records(&[("a", 1, 1, false), ("a", 2, 2, false), ("b", 1, 1, false)]),
            NullReporter,
        );
        assert_eq!(result.prune_short(2), 1);
        result.sort_by_topic();
        let topics: Vec<&str> = result.trend_lines.iter().map(|l| l.topic()).collect();
        assert_eq!(topics, vec!["a"]);
    }

    #[test]
    fn test_incremental_push() {
        let mut aggregator = SeriesAggregator::new(NullReporter);
        aggregator.push(Record::new("a", 1, 1, false));
        aggregator.push(Record::new("b", 1, 1, false));
        assert_eq!(aggregator.topic_count(), 2);
        assert_eq!(aggregator.finish().trend_lines.len(), 2);
    }
}

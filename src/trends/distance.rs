use std::collections::BTreeSet;
use std::thread;

use super::types::{DistanceReport, PointDifference};
use crate::config::DistanceConfig;
use crate::error::Result;
use crate::logger::Reporter;
use crate::series::{DataPoint, TrendLine};

/// Scores how differently two trend lines behave over their shared timestamps.
///
/// Each compared timestamp contributes a weighted sum of the absolute
/// differences in count, delta and delta-delta, plus a fixed penalty when the
/// trending flags disagree. By default only timestamps present in both lines
/// are compared; with `zero_fill` every timestamp in either line is compared
/// and the missing side counts as an all-zero, non-trending point.
pub struct DistanceEngine<R: Reporter> {
    config: DistanceConfig,
    reporter: R,
}

impl<R: Reporter> DistanceEngine<R> {
    /// Fails with `Error::Config` if any weight is negative or not finite.
    pub fn new(config: DistanceConfig, reporter: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, reporter })
    }

    pub fn config(&self) -> &DistanceConfig {
        &self.config
    }

    pub fn point_distance(&self, a: &DataPoint, b: &DataPoint) -> f64 {
        let count = (a.count() as f64 - b.count() as f64).abs();
        let delta = (a.delta_count() as f64 - b.delta_count() as f64).abs();
        let delta_delta = (a.delta_delta_count() as f64 - b.delta_delta_count() as f64).abs();

        let mut distance = self.config.count_weight * count
            + self.config.delta_weight * delta
            + self.config.delta_delta_weight * delta_delta;

        if a.trending() != b.trending() {
            distance += self.config.trending_penalty;
        }
        distance
    }

    pub fn compare(&self, a: &TrendLine, b: &TrendLine) -> DistanceReport {
        let breakdown: Vec<PointDifference> = if self.config.zero_fill {
            let timestamps: BTreeSet<i64> = a.timestamps().chain(b.timestamps()).copied().collect();
            timestamps
                .into_iter()
                .map(|ts| {
                    let pa = a.get(ts).copied().unwrap_or_else(|| DataPoint::zero(ts));
                    let pb = b.get(ts).copied().unwrap_or_else(|| DataPoint::zero(ts));
                    PointDifference {
                        timestamp: ts,
                        distance: self.point_distance(&pa, &pb),
                    }
                })
                .collect()
        } else {
            a.iter()
                .filter_map(|pa| {
                    b.get(pa.timestamp()).map(|pb| PointDifference {
                        timestamp: pa.timestamp(),
                        distance: self.point_distance(pa, pb),
                    })
                })
                .collect()
        };

        let report = DistanceReport::new(a.topic(), b.topic(), breakdown);
        if report.is_undefined() {
            self.reporter.debug(format_args!(
                "'{}' and '{}' share no timestamps; distance undefined",
                a.topic(),
                b.topic()
            ));
        } else {
            self.reporter.debug(format_args!(
                "'{}' vs '{}': {} over {} points",
                a.topic(),
                b.topic(),
                report.distance(),
                report.compared_points()
            ));
        }
        report
    }

    /// Compares every unordered pair, in input order.
    pub fn pairwise(&self, lines: &[TrendLine]) -> Vec<DistanceReport> {
        pairs(lines.len())
            .into_iter()
            .map(|(i, j)| self.compare(&lines[i], &lines[j]))
            .collect()
    }

    /// Same result as [`pairwise`](Self::pairwise), computed on up to
    /// `threads` scoped worker threads (0 picks the available parallelism).
    pub fn pairwise_parallel(&self, lines: &[TrendLine], threads: usize) -> Vec<DistanceReport> {
        let pairs = pairs(lines.len());
        if pairs.is_empty() {
            return Vec::new();
        }

        let threads = if threads == 0 {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        } else {
            threads
        };
        let chunk_size = pairs.len().div_ceil(threads.max(1));

        thread::scope(|scope| {
            let workers: Vec<_> = pairs
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|&(i, j)| self.compare(&lines[i], &lines[j]))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            workers
                .into_iter()
                .flat_map(|worker| match worker.join() {
                    Ok(reports) => reports,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }
}

fn pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect()
}

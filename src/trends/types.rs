use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use crate::error::DistanceUndefined;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Distance {
    /// The two trend lines had no timestamps to compare.
    Undefined,
    Defined { total: f64, normalized: f64 },
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Undefined => write!(f, "undefined"),
            Distance::Defined { total, normalized } => {
                write!(f, "{:.3} (normalized {:.3})", total, normalized)
            }
        }
    }
}

/// Contribution of a single compared timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointDifference {
    pub timestamp: i64,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceReport {
    left: String,
    right: String,
    compared_points: usize,
    distance: Distance,
    breakdown: Vec<PointDifference>,
}

impl DistanceReport {
    pub(crate) fn new(left: &str, right: &str, breakdown: Vec<PointDifference>) -> Self {
        let compared_points = breakdown.len();
        let distance = if compared_points == 0 {
            Distance::Undefined
        } else {
            let total: f64 = breakdown.iter().map(|d| d.distance).sum();
            Distance::Defined {
                total,
                normalized: total / compared_points as f64,
            }
        };

        Self {
            left: left.to_string(),
            right: right.to_string(),
            compared_points,
            distance,
            breakdown,
        }
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &str {
        &self.right
    }

    pub fn compared_points(&self) -> usize {
        self.compared_points
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self.distance, Distance::Undefined)
    }

    pub fn total(&self) -> Option<f64> {
        match self.distance {
            Distance::Defined { total, .. } => Some(total),
            Distance::Undefined => None,
        }
    }

    pub fn normalized(&self) -> Option<f64> {
        match self.distance {
            Distance::Defined { normalized, .. } => Some(normalized),
            Distance::Undefined => None,
        }
    }

    /// Ascending by timestamp.
    pub fn breakdown(&self) -> &[PointDifference] {
        &self.breakdown
    }

    /// `(total, normalized)`, or an error when nothing was compared.
    pub fn require(&self) -> Result<(f64, f64), DistanceUndefined> {
        match self.distance {
            Distance::Defined { total, normalized } => Ok((total, normalized)),
            Distance::Undefined => Err(DistanceUndefined {
                left: self.left.clone(),
                right: self.right.clone(),
            }),
        }
    }
}

/// Most similar pairs first; undefined distances sort last.
pub fn sort_by_similarity(reports: &mut [DistanceReport]) {
    reports.sort_by(|a, b| match (a.normalized(), b.normalized()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

//! Typed dimension values, requested values/ranges and domain samples.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DimensionError, DimensionResult};

/// A single typed value on a dimension axis.
///
/// Ordering is defined within one variant family only; comparisons
/// across families yield `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum DimensionValue {
    Number(f64),
    Text(String),
    Boolean(bool),
    Instant(DateTime<Utc>),
}

impl DimensionValue {
    /// Absolute distance between two values of the same family.
    ///
    /// Numeric values use absolute difference, temporal values use
    /// absolute millisecond difference. No other family supports a
    /// distance function.
    pub fn distance(&self, other: &DimensionValue) -> DimensionResult<f64> {
        match (self, other) {
            (DimensionValue::Number(a), DimensionValue::Number(b)) => Ok((a - b).abs()),
            (DimensionValue::Instant(a), DimensionValue::Instant(b)) => {
                Ok((*a - *b).num_milliseconds().abs() as f64)
            }
            _ => Err(DimensionError::UnsupportedType(format!(
                "no distance between {} and {}",
                self.family(),
                other.family()
            ))),
        }
    }

    /// Short name of the variant family, for error messages.
    pub fn family(&self) -> &'static str {
        match self {
            DimensionValue::Number(_) => "number",
            DimensionValue::Text(_) => "text",
            DimensionValue::Boolean(_) => "boolean",
            DimensionValue::Instant(_) => "instant",
        }
    }
}

impl PartialOrd for DimensionValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (DimensionValue::Number(a), DimensionValue::Number(b)) => a.partial_cmp(b),
            (DimensionValue::Text(a), DimensionValue::Text(b)) => Some(a.cmp(b)),
            (DimensionValue::Boolean(a), DimensionValue::Boolean(b)) => Some(a.cmp(b)),
            (DimensionValue::Instant(a), DimensionValue::Instant(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl std::fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DimensionValue::Number(n) => write!(f, "{}", n),
            DimensionValue::Text(s) => write!(f, "{}", s),
            DimensionValue::Boolean(b) => write!(f, "{}", b),
            DimensionValue::Instant(dt) => {
                write!(f, "{}", dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
            }
        }
    }
}

/// A single requested value for a dimension occurrence: a scalar or an
/// inclusive range with both endpoints in the same family.
///
/// Created per-request from raw tokens, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RequestValue {
    Scalar(DimensionValue),
    Range {
        min: DimensionValue,
        max: DimensionValue,
    },
}

impl RequestValue {
    /// Build a range, normalizing the endpoint order so `min <= max`.
    pub fn range(a: DimensionValue, b: DimensionValue) -> Self {
        if let Some(Ordering::Greater) = a.partial_cmp(&b) {
            RequestValue::Range { min: b, max: a }
        } else {
            RequestValue::Range { min: a, max: b }
        }
    }

    /// Lower bound (the value itself for scalars).
    pub fn min_bound(&self) -> &DimensionValue {
        match self {
            RequestValue::Scalar(v) => v,
            RequestValue::Range { min, .. } => min,
        }
    }

    /// Upper bound (the value itself for scalars).
    pub fn max_bound(&self) -> &DimensionValue {
        match self {
            RequestValue::Scalar(v) => v,
            RequestValue::Range { max, .. } => max,
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, RequestValue::Range { .. })
    }
}

impl std::fmt::Display for RequestValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestValue::Scalar(v) => write!(f, "{}", v),
            RequestValue::Range { min, max } => write!(f, "{}/{}", min, max),
        }
    }
}

/// One element of a dimension's domain: an instant/scalar, or an
/// interval when the dimension has a start/end attribute pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainSample {
    Value(DimensionValue),
    Interval {
        start: DimensionValue,
        end: DimensionValue,
    },
}

impl DomainSample {
    /// Lower bound of the sample.
    pub fn start(&self) -> &DimensionValue {
        match self {
            DomainSample::Value(v) => v,
            DomainSample::Interval { start, .. } => start,
        }
    }

    /// Upper bound of the sample.
    pub fn end(&self) -> &DimensionValue {
        match self {
            DomainSample::Value(v) => v,
            DomainSample::Interval { end, .. } => end,
        }
    }

    /// Total-order comparison of this sample against a requested value.
    ///
    /// Handles scalar-vs-scalar, scalar-vs-interval and
    /// interval-vs-interval; an interval that overlaps the reference
    /// compares as `Equal`. Returns `None` for cross-family
    /// comparisons.
    pub fn compare_to(&self, reference: &RequestValue) -> Option<Ordering> {
        let ref_min = reference.min_bound();
        let ref_max = reference.max_bound();
        if let Some(Ordering::Less) = self.end().partial_cmp(ref_min) {
            return Some(Ordering::Less);
        }
        match self.start().partial_cmp(ref_max) {
            Some(Ordering::Greater) => Some(Ordering::Greater),
            Some(_) => Some(Ordering::Equal),
            None => None,
        }
    }
}

/// Result of a nearest-match search.
///
/// `Nearest` is only produced when the domain is non-empty; an empty
/// domain is always reported as `NotFound`, never as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// The requested value exists in the domain (or overlaps it, for
    /// interval domains); the caller can filter with the request as-is.
    Exact(RequestValue),
    /// Closest available value, normalized to the significant boundary
    /// instant for interval domain entries.
    Nearest(DimensionValue),
    /// Nothing in the domain (or nothing within tolerance).
    NotFound,
}

impl MatchOutcome {
    pub fn is_exact(&self) -> bool {
        matches!(self, MatchOutcome::Exact(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant(s: &str) -> DimensionValue {
        DimensionValue::Instant(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc))
    }

    #[test]
    fn test_numeric_distance() {
        let a = DimensionValue::Number(3.0);
        let b = DimensionValue::Number(7.5);
        assert_eq!(a.distance(&b).unwrap(), 4.5);
        assert_eq!(b.distance(&a).unwrap(), 4.5);
    }

    #[test]
    fn test_temporal_distance_is_milliseconds() {
        let a = instant("2024-01-15T12:00:00Z");
        let b = instant("2024-01-15T12:00:01Z");
        assert_eq!(a.distance(&b).unwrap(), 1000.0);
    }

    #[test]
    fn test_distance_unsupported_families() {
        let a = DimensionValue::Text("a".into());
        let b = DimensionValue::Text("b".into());
        assert!(a.distance(&b).is_err());

        let n = DimensionValue::Number(1.0);
        assert!(n.distance(&a).is_err());
    }

    #[test]
    fn test_cross_family_comparison_is_none() {
        let n = DimensionValue::Number(1.0);
        let t = DimensionValue::Text("1".into());
        assert!(n.partial_cmp(&t).is_none());
    }

    #[test]
    fn test_range_normalizes_endpoint_order() {
        let r = RequestValue::range(DimensionValue::Number(9.0), DimensionValue::Number(2.0));
        assert_eq!(r.min_bound(), &DimensionValue::Number(2.0));
        assert_eq!(r.max_bound(), &DimensionValue::Number(9.0));
    }

    #[test]
    fn test_sample_comparison_overlap_is_equal() {
        let sample = DomainSample::Interval {
            start: DimensionValue::Number(5.0),
            end: DimensionValue::Number(10.0),
        };
        let below = RequestValue::Scalar(DimensionValue::Number(4.0));
        let inside = RequestValue::Scalar(DimensionValue::Number(7.0));
        let above = RequestValue::Scalar(DimensionValue::Number(11.0));
        assert_eq!(sample.compare_to(&below), Some(Ordering::Greater));
        assert_eq!(sample.compare_to(&inside), Some(Ordering::Equal));
        assert_eq!(sample.compare_to(&above), Some(Ordering::Less));
    }

    #[test]
    fn test_sample_comparison_boundary_touch_is_equal() {
        let sample = DomainSample::Interval {
            start: DimensionValue::Number(5.0),
            end: DimensionValue::Number(10.0),
        };
        // Touching at a single point still overlaps (inclusive bounds).
        let touch = RequestValue::range(DimensionValue::Number(10.0), DimensionValue::Number(12.0));
        assert_eq!(sample.compare_to(&touch), Some(Ordering::Equal));
    }

    #[test]
    fn test_instant_display_rfc3339() {
        let v = DimensionValue::Instant(Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(v.to_string(), "2020-06-01T00:00:00Z");
    }
}

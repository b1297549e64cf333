//! Per-layer dimension configuration and tolerance expressions.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::value::DimensionValue;

/// Data type tag of a dimension's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimensionDataType {
    Number,
    Text,
    Boolean,
    Temporal,
}

impl DimensionDataType {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "number" => Some(Self::Number),
            "text" | "string" => Some(Self::Text),
            "boolean" => Some(Self::Boolean),
            "temporal" | "time" => Some(Self::Temporal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Temporal => "temporal",
        }
    }

    /// Whether values of this type have a distance function, which is
    /// required for nearest-match and nearest-to-now resolution.
    pub fn supports_distance(&self) -> bool {
        matches!(self, Self::Number | Self::Temporal)
    }
}

impl std::fmt::Display for DimensionDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the dimension extent is advertised to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationMode {
    /// Discrete list of values.
    List,
    /// Continuous interval.
    Continuous,
}

/// Policy resolving the value to use when a dimension is requested
/// without an explicit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultValuePolicy {
    /// Maximum of the full domain.
    Latest,
    /// Domain element closest to the evaluation-time "now" snapshot.
    NearestToNow,
}

impl DefaultValuePolicy {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "latest" => Some(Self::Latest),
            "nearest_to_now" | "nearest-to-now" | "nearest" => Some(Self::NearestToNow),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::NearestToNow => "nearest_to_now",
        }
    }
}

/// Configuration of one dimension on one layer.
///
/// Owned by layer configuration; read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionSpec {
    /// Attribute holding the dimension value (the start, for interval
    /// dimensions).
    pub attribute: String,

    /// End attribute for interval dimensions (start + end pair).
    pub end_attribute: Option<String>,

    /// Disabled dimensions are skipped silently during resolution.
    pub enabled: bool,

    /// How the extent is advertised.
    pub presentation: PresentationMode,

    /// Data type of the dimension values.
    pub data_type: DimensionDataType,

    /// Units label carried into substitution warnings.
    pub units: Option<String>,

    /// Whether a requested value absent from the domain resolves to the
    /// nearest available one.
    pub nearest_match: bool,

    /// Raw acceptable-tolerance expression, e.g. `"1000"`, `"PT1H"` or
    /// the asymmetric `"P1D/PT0S"`. Parsed on demand.
    pub acceptable_interval: Option<String>,

    /// Per-dimension override of the engine-wide default value policy.
    pub default_policy: Option<DefaultValuePolicy>,
}

impl DimensionSpec {
    pub fn new(attribute: impl Into<String>, data_type: DimensionDataType) -> Self {
        Self {
            attribute: attribute.into(),
            end_attribute: None,
            enabled: true,
            presentation: PresentationMode::List,
            data_type,
            units: None,
            nearest_match: false,
            acceptable_interval: None,
            default_policy: None,
        }
    }

    /// Parse the configured tolerance expression, if any.
    pub fn tolerance(&self) -> Result<Option<ToleranceSpec>, ToleranceParseError> {
        match &self.acceptable_interval {
            Some(expr) => Ok(Some(ToleranceSpec::parse(expr, self.data_type)?)),
            None => Ok(None),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToleranceParseError {
    #[error("invalid tolerance expression '{0}'")]
    InvalidExpression(String),
    #[error("tolerance not supported for data type '{0}'")]
    UnsupportedDataType(DimensionDataType),
}

/// One side of a tolerance window.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ToleranceAmount {
    /// Numeric magnitude.
    Magnitude(f64),
    /// Temporal period.
    Period(Duration),
}

/// Parsed acceptable-tolerance expression.
///
/// Symmetric (`"1000"`, `"PT1H"`) or asymmetric below/above
/// (`"10/0"`, `"P1D/PT0S"`). Numeric magnitudes for `Number`
/// dimensions, ISO-8601 periods for `Temporal` ones.
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceSpec {
    below: ToleranceAmount,
    above: ToleranceAmount,
}

impl ToleranceSpec {
    pub fn parse(expr: &str, data_type: DimensionDataType) -> Result<Self, ToleranceParseError> {
        let (below, above) = match expr.split_once('/') {
            Some((b, a)) => (b.trim(), a.trim()),
            None => (expr.trim(), expr.trim()),
        };
        Ok(Self {
            below: Self::parse_amount(below, data_type, expr)?,
            above: Self::parse_amount(above, data_type, expr)?,
        })
    }

    fn parse_amount(
        s: &str,
        data_type: DimensionDataType,
        expr: &str,
    ) -> Result<ToleranceAmount, ToleranceParseError> {
        match data_type {
            DimensionDataType::Number => s
                .parse::<f64>()
                .ok()
                .filter(|m| *m >= 0.0)
                .map(ToleranceAmount::Magnitude)
                .ok_or_else(|| ToleranceParseError::InvalidExpression(expr.to_string())),
            DimensionDataType::Temporal => parse_iso8601_period(s)
                .map(ToleranceAmount::Period)
                .ok_or_else(|| ToleranceParseError::InvalidExpression(expr.to_string())),
            other => Err(ToleranceParseError::UnsupportedDataType(other)),
        }
    }

    /// Derive the acceptable window `[pivot - below, pivot + above]`.
    ///
    /// Returns `None` when the pivot's family does not match the
    /// tolerance amounts (e.g. a text pivot).
    pub fn around(&self, pivot: &DimensionValue) -> Option<AcceptableRange> {
        match (pivot, &self.below, &self.above) {
            (DimensionValue::Number(p), ToleranceAmount::Magnitude(b), ToleranceAmount::Magnitude(a)) => {
                Some(AcceptableRange {
                    min: DimensionValue::Number(p - b),
                    max: DimensionValue::Number(p + a),
                })
            }
            (DimensionValue::Instant(p), ToleranceAmount::Period(b), ToleranceAmount::Period(a)) => {
                Some(AcceptableRange {
                    min: DimensionValue::Instant(*p - *b),
                    max: DimensionValue::Instant(*p + *a),
                })
            }
            _ => None,
        }
    }
}

/// A concrete tolerance window around a pivot value, derived per
/// comparison and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptableRange {
    pub min: DimensionValue,
    pub max: DimensionValue,
}

impl AcceptableRange {
    /// Inclusive containment test.
    pub fn contains(&self, value: &DimensionValue) -> bool {
        use std::cmp::Ordering;
        matches!(
            value.partial_cmp(&self.min),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        ) && matches!(
            value.partial_cmp(&self.max),
            Some(Ordering::Less) | Some(Ordering::Equal)
        )
    }
}

/// Parse a subset of ISO-8601 period expressions: `PnW`, `PnD`,
/// `PTnHnMnS` and combinations like `P1DT12H`. Fractional seconds are
/// truncated to millisecond precision. Year/month components are not
/// supported (no fixed length).
fn parse_iso8601_period(s: &str) -> Option<Duration> {
    let rest = s.trim().strip_prefix(['P', 'p'])?;
    if rest.is_empty() {
        return None;
    }
    if let Some(weeks) = rest.strip_suffix(['W', 'w']) {
        return weeks.parse::<i64>().ok().map(Duration::weeks);
    }

    let (date_part, time_part) = match rest.split_once(['T', 't']) {
        Some((d, t)) => (d, t),
        None => (rest, ""),
    };

    let mut total = Duration::zero();
    let mut seen = false;

    for (number, unit) in components(date_part)? {
        match unit {
            'D' | 'd' => total = total + Duration::days(number as i64),
            _ => return None,
        }
        seen = true;
    }
    for (number, unit) in components(time_part)? {
        match unit {
            'H' | 'h' => total = total + Duration::hours(number as i64),
            'M' | 'm' => total = total + Duration::minutes(number as i64),
            'S' | 's' => total = total + Duration::milliseconds((number * 1000.0) as i64),
            _ => return None,
        }
        seen = true;
    }

    if seen {
        Some(total)
    } else {
        None
    }
}

/// Split a period section into (number, unit-designator) pairs.
fn components(part: &str) -> Option<Vec<(f64, char)>> {
    let mut out = Vec::new();
    let mut digits = String::new();
    for c in part.chars() {
        if c.is_ascii_digit() || c == '.' {
            digits.push(c);
        } else {
            if digits.is_empty() {
                return None;
            }
            out.push((digits.parse::<f64>().ok()?, c));
            digits.clear();
        }
    }
    if digits.is_empty() {
        Some(out)
    } else {
        // Trailing number with no unit designator.
        None
    }
}

//! Typed value conversion from raw request tokens.
//!
//! Each dimension data type has a converter turning the raw textual
//! tokens of one dimension occurrence into typed values or ranges.
//! Converters are pure functions of their input tokens.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use dimension_common::{DimensionDataType, DimensionError, DimensionResult, DimensionValue, RequestValue};
use tracing::debug;

type ConverterFn = fn(&[String]) -> Vec<RequestValue>;

/// Immutable converter table, built once at first use and never
/// mutated afterwards. Safe for concurrent reads without locking.
static CONVERTERS: OnceLock<HashMap<DimensionDataType, ConverterFn>> = OnceLock::new();

fn converters() -> &'static HashMap<DimensionDataType, ConverterFn> {
    CONVERTERS.get_or_init(|| {
        let mut table: HashMap<DimensionDataType, ConverterFn> = HashMap::new();
        table.insert(DimensionDataType::Number, convert_numbers);
        table.insert(DimensionDataType::Text, convert_text);
        table.insert(DimensionDataType::Boolean, convert_booleans);
        table.insert(DimensionDataType::Temporal, convert_instants);
        table
    })
}

/// Convert raw tokens into typed request values for the given data
/// type.
///
/// Blank tokens are discarded before parsing. If exactly one token is a
/// `/`-separated pair parsing into two valid endpoints, the whole token
/// set collapses into a single range. Otherwise each token is parsed
/// independently and unparseable tokens are silently dropped.
pub fn convert(
    raw_tokens: &[String],
    data_type: DimensionDataType,
) -> DimensionResult<Vec<RequestValue>> {
    let converter = converters()
        .get(&data_type)
        .ok_or_else(|| DimensionError::UnsupportedType(data_type.to_string()))?;
    Ok(converter(raw_tokens))
}

/// Shared scalar/range conversion driver for the families that support
/// range tokens.
fn convert_with(
    raw_tokens: &[String],
    parse: fn(&str) -> Option<DimensionValue>,
    allow_range: bool,
) -> Vec<RequestValue> {
    let tokens: Vec<&str> = raw_tokens
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();

    if allow_range {
        let mut range_tokens = tokens.iter().filter(|t| t.contains('/'));
        if let (Some(candidate), None) = (range_tokens.next(), range_tokens.next()) {
            if let Some((lo, hi)) = candidate.split_once('/') {
                if let (Some(lo), Some(hi)) = (parse(lo.trim()), parse(hi.trim())) {
                    // A range token takes over the entire value set for
                    // this dimension occurrence.
                    return vec![RequestValue::range(lo, hi)];
                }
            }
        }
    }

    tokens
        .into_iter()
        .filter_map(|t| match parse(t) {
            Some(v) => Some(RequestValue::Scalar(v)),
            None => {
                debug!(token = t, "dropping unparseable dimension token");
                None
            }
        })
        .collect()
}

fn convert_numbers(raw_tokens: &[String]) -> Vec<RequestValue> {
    convert_with(raw_tokens, parse_number, true)
}

fn convert_text(raw_tokens: &[String]) -> Vec<RequestValue> {
    // Text never forms ranges; every non-blank token is kept.
    convert_with(raw_tokens, parse_text, false)
}

fn convert_booleans(raw_tokens: &[String]) -> Vec<RequestValue> {
    convert_with(raw_tokens, parse_boolean, false)
}

fn convert_instants(raw_tokens: &[String]) -> Vec<RequestValue> {
    convert_with(raw_tokens, parse_temporal, true)
}

fn parse_number(s: &str) -> Option<DimensionValue> {
    s.parse::<f64>().ok().map(DimensionValue::Number)
}

fn parse_text(s: &str) -> Option<DimensionValue> {
    Some(DimensionValue::Text(s.to_string()))
}

fn parse_boolean(s: &str) -> Option<DimensionValue> {
    // Only the two literals are accepted; "yes"/"1" and friends drop.
    if s.eq_ignore_ascii_case("true") {
        Some(DimensionValue::Boolean(true))
    } else if s.eq_ignore_ascii_case("false") {
        Some(DimensionValue::Boolean(false))
    } else {
        None
    }
}

fn parse_temporal(s: &str) -> Option<DimensionValue> {
    parse_instant(s).map(DimensionValue::Instant)
}

/// Parse an ISO 8601 instant leniently: full datetime with timezone,
/// datetime without timezone (assumed UTC), or date only (midnight UTC).
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&ndt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(ts: &[&str]) -> Vec<String> {
        ts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_number_list() {
        let out = convert(&tokens(&["10", "20.5"]), DimensionDataType::Number).unwrap();
        assert_eq!(
            out,
            vec![
                RequestValue::Scalar(DimensionValue::Number(10.0)),
                RequestValue::Scalar(DimensionValue::Number(20.5)),
            ]
        );
    }

    #[test]
    fn test_number_range_token_takes_over() {
        let out = convert(&tokens(&["5", "10/20", "30"]), DimensionDataType::Number).unwrap();
        assert_eq!(
            out,
            vec![RequestValue::range(
                DimensionValue::Number(10.0),
                DimensionValue::Number(20.0)
            )]
        );
    }

    #[test]
    fn test_two_range_tokens_fall_back_to_scalars() {
        // Range capture only applies when exactly one token has a '/'.
        let out = convert(&tokens(&["10/20", "30/40"]), DimensionDataType::Number).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_malformed_and_blank_tokens_dropped_silently() {
        let out = convert(
            &tokens(&["", "  ", "abc", "42"]),
            DimensionDataType::Number,
        )
        .unwrap();
        assert_eq!(out, vec![RequestValue::Scalar(DimensionValue::Number(42.0))]);
    }

    #[test]
    fn test_boolean_literals_only() {
        let out = convert(
            &tokens(&["true", "FALSE", " True "]),
            DimensionDataType::Boolean,
        )
        .unwrap();
        assert_eq!(
            out,
            vec![
                RequestValue::Scalar(DimensionValue::Boolean(true)),
                RequestValue::Scalar(DimensionValue::Boolean(false)),
                RequestValue::Scalar(DimensionValue::Boolean(true)),
            ]
        );

        let none = convert(&tokens(&["yes", "1"]), DimensionDataType::Boolean).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_text_keeps_slash_tokens_as_scalars() {
        let out = convert(&tokens(&["a/b", "c"]), DimensionDataType::Text).unwrap();
        assert_eq!(
            out,
            vec![
                RequestValue::Scalar(DimensionValue::Text("a/b".to_string())),
                RequestValue::Scalar(DimensionValue::Text("c".to_string())),
            ]
        );
    }

    #[test]
    fn test_temporal_range() {
        let out = convert(
            &tokens(&["2024-01-15T00:00:00Z/2024-01-16T00:00:00Z"]),
            DimensionDataType::Temporal,
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].is_range());
    }

    #[test]
    fn test_temporal_date_only() {
        let out = convert(&tokens(&["2024-01-15"]), DimensionDataType::Temporal).unwrap();
        assert_eq!(
            out,
            vec![RequestValue::Scalar(DimensionValue::Instant(
                Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
            ))]
        );
    }

    #[test]
    fn test_reversed_range_normalized() {
        let out = convert(&tokens(&["20/10"]), DimensionDataType::Number).unwrap();
        assert_eq!(
            out,
            vec![RequestValue::range(
                DimensionValue::Number(10.0),
                DimensionValue::Number(20.0)
            )]
        );
    }
}

//! Tests for nearest-match resolution across the three domain shapes.

use chrono::{DateTime, TimeZone, Utc};
use dimension_common::{
    DimensionDataType, DimensionSpec, DimensionValue, DomainSample, MatchOutcome, RequestValue,
};
use dimension_engine::domain::{DomainRecord, Granule, GranuleCatalog, GridMetadataReader, VectorSource};
use dimension_engine::NearestMatchResolver;

fn instant(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap()
}

fn time_value(y: i32, mo: u32, d: u32) -> DimensionValue {
    DimensionValue::Instant(instant(y, mo, d))
}

fn time_source(times: &[DateTime<Utc>]) -> VectorSource {
    VectorSource::new(
        "valid_time",
        None,
        times
            .iter()
            .map(|t| {
                let mut r = DomainRecord::new();
                r.insert("valid_time".to_string(), DimensionValue::Instant(*t));
                r
            })
            .collect(),
    )
}

fn time_spec() -> DimensionSpec {
    let mut s = DimensionSpec::new("valid_time", DimensionDataType::Temporal);
    s.nearest_match = true;
    s
}

// ============================================================================
// Point domains (case A)
// ============================================================================

#[test]
fn test_temporal_nearest_below() {
    let src = time_source(&[
        instant(2020, 1, 1),
        instant(2020, 6, 1),
        instant(2021, 1, 1),
    ]);
    let spec = time_spec();
    let resolver = NearestMatchResolver::new(&src, &spec);

    let outcome = resolver
        .find_nearest(&RequestValue::Scalar(time_value(2020, 3, 1)))
        .unwrap();
    assert_eq!(outcome, MatchOutcome::Nearest(time_value(2020, 1, 1)));
}

#[test]
fn test_temporal_exact() {
    let src = time_source(&[
        instant(2020, 1, 1),
        instant(2020, 6, 1),
        instant(2021, 1, 1),
    ]);
    let spec = time_spec();
    let resolver = NearestMatchResolver::new(&src, &spec);

    let reference = RequestValue::Scalar(time_value(2020, 6, 1));
    let outcome = resolver.find_nearest(&reference).unwrap();
    assert_eq!(outcome, MatchOutcome::Exact(reference));
}

#[test]
fn test_empty_domain_is_not_found_not_error() {
    let src = time_source(&[]);
    let spec = time_spec();
    let resolver = NearestMatchResolver::new(&src, &spec);

    let outcome = resolver
        .find_nearest(&RequestValue::Scalar(time_value(2020, 3, 1)))
        .unwrap();
    assert_eq!(outcome, MatchOutcome::NotFound);
}

#[test]
fn test_temporal_tolerance_excludes_far_values() {
    let src = time_source(&[instant(2020, 1, 1)]);
    let mut spec = time_spec();
    // One day of tolerance, nearest value two months away.
    spec.acceptable_interval = Some("P1D".to_string());
    let resolver = NearestMatchResolver::new(&src, &spec);

    let outcome = resolver
        .find_nearest(&RequestValue::Scalar(time_value(2020, 3, 1)))
        .unwrap();
    assert_eq!(outcome, MatchOutcome::NotFound);

    // Wide enough tolerance finds it again.
    spec.acceptable_interval = Some("P90D".to_string());
    let resolver = NearestMatchResolver::new(&src, &spec);
    let outcome = resolver
        .find_nearest(&RequestValue::Scalar(time_value(2020, 3, 1)))
        .unwrap();
    assert_eq!(outcome, MatchOutcome::Nearest(time_value(2020, 1, 1)));
}

#[test]
fn test_asymmetric_tolerance_only_searches_one_side() {
    let src = time_source(&[instant(2020, 1, 1), instant(2020, 1, 10)]);
    let mut spec = time_spec();
    // Accept matches only before the requested instant.
    spec.acceptable_interval = Some("P30D/PT0S".to_string());
    let resolver = NearestMatchResolver::new(&src, &spec);

    // 2020-01-08 is closer to 2020-01-10, but only the below side is
    // inside the acceptable window.
    let outcome = resolver
        .find_nearest(&RequestValue::Scalar(time_value(2020, 1, 8)))
        .unwrap();
    assert_eq!(outcome, MatchOutcome::Nearest(time_value(2020, 1, 1)));
}

// ============================================================================
// Interval domains (case B)
// ============================================================================

fn interval_catalog(entries: &[(DateTime<Utc>, DateTime<Utc>)]) -> GranuleCatalog {
    GranuleCatalog::new(
        "start_time",
        Some("end_time".to_string()),
        entries
            .iter()
            .enumerate()
            .map(|(i, (s, e))| {
                let mut r = DomainRecord::new();
                r.insert("start_time".to_string(), DimensionValue::Instant(*s));
                r.insert("end_time".to_string(), DimensionValue::Instant(*e));
                Granule::new(format!("granule-{}", i), r)
            })
            .collect(),
    )
    .unwrap()
}

fn interval_spec() -> DimensionSpec {
    let mut s = DimensionSpec::new("start_time", DimensionDataType::Temporal);
    s.end_attribute = Some("end_time".to_string());
    s.nearest_match = true;
    s
}

#[test]
fn test_interval_domain_reference_after_all_entries() {
    // Single interval (2020-01-01, 2020-01-05), reference 2020-01-20:
    // the nearest value is the upper bound of the lower interval.
    let catalog = interval_catalog(&[(instant(2020, 1, 1), instant(2020, 1, 5))]);
    let spec = interval_spec();
    let resolver = NearestMatchResolver::new(&catalog, &spec);

    let outcome = resolver
        .find_nearest(&RequestValue::Scalar(time_value(2020, 1, 20)))
        .unwrap();
    assert_eq!(outcome, MatchOutcome::Nearest(time_value(2020, 1, 5)));
}

#[test]
fn test_interval_domain_picks_closer_side() {
    let catalog = interval_catalog(&[
        (instant(2020, 1, 1), instant(2020, 1, 5)),
        (instant(2020, 2, 1), instant(2020, 2, 5)),
    ]);
    let spec = interval_spec();
    let resolver = NearestMatchResolver::new(&catalog, &spec);

    // 2020-01-30 is two days from the February interval's start and
    // 25 days from the January interval's end.
    let outcome = resolver
        .find_nearest(&RequestValue::Scalar(time_value(2020, 1, 30)))
        .unwrap();
    assert_eq!(outcome, MatchOutcome::Nearest(time_value(2020, 2, 1)));
}

#[test]
fn test_interval_domain_containment_is_exact() {
    let catalog = interval_catalog(&[(instant(2020, 1, 1), instant(2020, 1, 5))]);
    let spec = interval_spec();
    let resolver = NearestMatchResolver::new(&catalog, &spec);

    // A reference touching the interval boundary overlaps it.
    let reference = RequestValue::Scalar(time_value(2020, 1, 5));
    let outcome = resolver.find_nearest(&reference).unwrap();
    assert_eq!(outcome, MatchOutcome::Exact(reference));
}

#[test]
fn test_scalar_inside_interval_is_exact() {
    // A reference strictly inside a domain interval is covered by it
    // and must not fall through to the boundary queries.
    let catalog = interval_catalog(&[(instant(2020, 1, 1), instant(2020, 1, 5))]);
    let spec = interval_spec();
    let resolver = NearestMatchResolver::new(&catalog, &spec);

    let reference = RequestValue::Scalar(time_value(2020, 1, 3));
    let outcome = resolver.find_nearest(&reference).unwrap();
    assert_eq!(outcome, MatchOutcome::Exact(reference));
}

#[test]
fn test_range_containing_domain_interval_is_exact() {
    let catalog = interval_catalog(&[(instant(2020, 1, 1), instant(2020, 1, 5))]);
    let spec = interval_spec();
    let resolver = NearestMatchResolver::new(&catalog, &spec);

    // The requested range fully contains the only domain interval.
    let reference = RequestValue::range(time_value(2019, 12, 25), time_value(2020, 1, 10));
    let outcome = resolver.find_nearest(&reference).unwrap();
    assert_eq!(outcome, MatchOutcome::Exact(reference));
}

#[test]
fn test_range_reference_against_interval_domain() {
    let catalog = interval_catalog(&[
        (instant(2020, 1, 1), instant(2020, 1, 5)),
        (instant(2020, 3, 1), instant(2020, 3, 5)),
    ]);
    let spec = interval_spec();
    let resolver = NearestMatchResolver::new(&catalog, &spec);

    // Requested range sits in the gap, closer to the March interval.
    let reference = RequestValue::range(time_value(2020, 2, 20), time_value(2020, 2, 25));
    let outcome = resolver.find_nearest(&reference).unwrap();
    assert_eq!(outcome, MatchOutcome::Nearest(time_value(2020, 3, 1)));
}

#[test]
fn test_interval_tie_prefers_lower_candidate() {
    let catalog = interval_catalog(&[
        (instant(2020, 1, 1), instant(2020, 1, 10)),
        (instant(2020, 1, 30), instant(2020, 2, 5)),
    ]);
    let spec = interval_spec();
    let resolver = NearestMatchResolver::new(&catalog, &spec);

    // 2020-01-20 is ten days from both the lower end (01-10) and the
    // higher start (01-30): the lower candidate wins.
    let outcome = resolver
        .find_nearest(&RequestValue::Scalar(time_value(2020, 1, 20)))
        .unwrap();
    assert_eq!(outcome, MatchOutcome::Nearest(time_value(2020, 1, 10)));
}

// ============================================================================
// Scan fallback (case C)
// ============================================================================

#[test]
fn test_grid_reader_scan_nearest() {
    let reader = GridMetadataReader::new(vec![
        DomainSample::Value(time_value(2020, 1, 1)),
        DomainSample::Value(time_value(2020, 6, 1)),
        DomainSample::Value(time_value(2021, 1, 1)),
    ]);
    let spec = time_spec();
    let resolver = NearestMatchResolver::new(&reader, &spec);

    let outcome = resolver
        .find_nearest(&RequestValue::Scalar(time_value(2020, 3, 1)))
        .unwrap();
    assert_eq!(outcome, MatchOutcome::Nearest(time_value(2020, 1, 1)));
}

#[test]
fn test_grid_reader_scan_exact_short_circuit() {
    let reader = GridMetadataReader::new(vec![
        DomainSample::Value(time_value(2020, 1, 1)),
        DomainSample::Value(time_value(2020, 6, 1)),
    ]);
    let spec = time_spec();
    let resolver = NearestMatchResolver::new(&reader, &spec);

    let reference = RequestValue::Scalar(time_value(2020, 6, 1));
    let outcome = resolver.find_nearest(&reference).unwrap();
    assert_eq!(outcome, MatchOutcome::Exact(reference));
}

#[test]
fn test_grid_reader_scan_interval_overlap() {
    let reader = GridMetadataReader::new(vec![DomainSample::Interval {
        start: time_value(2020, 1, 1),
        end: time_value(2020, 1, 31),
    }]);
    let spec = time_spec();
    let resolver = NearestMatchResolver::new(&reader, &spec);

    let reference = RequestValue::Scalar(time_value(2020, 1, 15));
    let outcome = resolver.find_nearest(&reference).unwrap();
    assert_eq!(outcome, MatchOutcome::Exact(reference));
}

#[test]
fn test_grid_reader_empty_domain() {
    let reader = GridMetadataReader::new(vec![]);
    let spec = time_spec();
    let resolver = NearestMatchResolver::new(&reader, &spec);

    let outcome = resolver
        .find_nearest(&RequestValue::Scalar(time_value(2020, 1, 1)))
        .unwrap();
    assert_eq!(outcome, MatchOutcome::NotFound);
}

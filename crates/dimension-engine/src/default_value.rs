//! Default ("current") value resolution for dimensions requested
//! without an explicit value.

use chrono::{DateTime, Utc};
use dimension_common::{
    DefaultValuePolicy, DimensionError, DimensionResult, DimensionSpec, DimensionValue,
    MatchOutcome, RequestValue,
};
use tracing::debug;

use crate::domain::DimensionDomainAccessor;
use crate::nearest::NearestMatchResolver;

/// Resolve the value to substitute for an unrequested dimension.
///
/// `Latest` takes the maximum of the full domain; `NearestToNow` runs
/// the nearest-match search against the request's `now` snapshot
/// (captured once per request by the caller). Returns `Ok(None)` when
/// the domain is empty; the caller decides whether that is a
/// configuration error.
pub fn resolve_default(
    accessor: &dyn DimensionDomainAccessor,
    layer: &str,
    dimension: &str,
    spec: &DimensionSpec,
    policy: DefaultValuePolicy,
    now: DateTime<Utc>,
) -> DimensionResult<Option<DimensionValue>> {
    if !spec.enabled {
        return Err(DimensionError::DimensionNotEnabled {
            layer: layer.to_string(),
            dimension: dimension.to_string(),
        });
    }

    match policy {
        DefaultValuePolicy::Latest => latest(accessor, spec),
        DefaultValuePolicy::NearestToNow => {
            if spec.data_type != dimension_common::DimensionDataType::Temporal {
                // "now" has no distance to a non-temporal domain.
                debug!(
                    dimension,
                    data_type = %spec.data_type,
                    "nearest-to-now on non-temporal domain, falling back to latest"
                );
                return latest(accessor, spec);
            }
            let reference = RequestValue::Scalar(DimensionValue::Instant(now));
            let resolver = NearestMatchResolver::new(accessor, spec);
            match resolver.find_nearest(&reference)? {
                MatchOutcome::Exact(_) => Ok(Some(DimensionValue::Instant(now))),
                MatchOutcome::Nearest(v) => Ok(Some(v)),
                MatchOutcome::NotFound => Ok(None),
            }
        }
    }
}

fn latest(
    accessor: &dyn DimensionDomainAccessor,
    spec: &DimensionSpec,
) -> DimensionResult<Option<DimensionValue>> {
    accessor.max_of(&spec.attribute, None)
}

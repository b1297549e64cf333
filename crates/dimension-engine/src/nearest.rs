//! Nearest-match search over a dimension domain.
//!
//! Given a reference value or range and a domain accessor, finds the
//! closest available value under an optional acceptable-tolerance
//! window and classifies the outcome as exact, nearest or not found.

use std::cmp::Ordering;

use dimension_common::{
    AcceptableRange, DimensionError, DimensionResult, DimensionSpec, DimensionValue, Filter,
    MatchOutcome, RequestValue, ToleranceSpec,
};
use tracing::debug;

use crate::domain::DimensionDomainAccessor;

/// Nearest-match search bound to one dimension of one layer.
pub struct NearestMatchResolver<'a> {
    accessor: &'a dyn DimensionDomainAccessor,
    spec: &'a DimensionSpec,
}

impl<'a> NearestMatchResolver<'a> {
    pub fn new(accessor: &'a dyn DimensionDomainAccessor, spec: &'a DimensionSpec) -> Self {
        Self { accessor, spec }
    }

    /// Find the domain value closest to `reference`.
    ///
    /// Never fails merely because the domain is empty; that is a normal
    /// [`MatchOutcome::NotFound`]. Fails with
    /// [`DimensionError::DomainUnavailable`] when the accessor cannot
    /// be queried and [`DimensionError::UnsupportedType`] for data
    /// types without a distance function.
    pub fn find_nearest(&self, reference: &RequestValue) -> DimensionResult<MatchOutcome> {
        if !self.spec.data_type.supports_distance() {
            return Err(DimensionError::UnsupportedType(
                self.spec.data_type.to_string(),
            ));
        }
        let tolerance = self.spec.tolerance().map_err(|e| {
            DimensionError::Configuration {
                dimension: self.spec.attribute.clone(),
                message: e.to_string(),
            }
        })?;

        if !self.accessor.supports_filter_pushdown() {
            return self.scan_fallback(reference, tolerance.as_ref());
        }

        if !reference.is_range() && self.spec.end_attribute.is_none() {
            self.point_search(reference, tolerance.as_ref())
        } else {
            self.interval_search(reference, tolerance.as_ref())
        }
    }

    /// Case A: scalar reference against a pure point domain, resolved
    /// with a pair of max-below / min-above aggregate queries.
    fn point_search(
        &self,
        reference: &RequestValue,
        tolerance: Option<&ToleranceSpec>,
    ) -> DimensionResult<MatchOutcome> {
        let attr = self.spec.attribute.as_str();
        let value = reference.min_bound();
        let window = window_around(tolerance, value);

        let mut below_clauses = vec![Filter::lte(attr, value.clone())];
        let mut above_clauses = vec![Filter::gte(attr, value.clone())];
        if let Some(w) = &window {
            below_clauses.push(Filter::gte(attr, w.min.clone()));
            above_clauses.push(Filter::lte(attr, w.max.clone()));
        }
        let below = self.accessor.max_of(attr, Some(&Filter::and(below_clauses)))?;
        let above = self.accessor.min_of(attr, Some(&Filter::and(above_clauses)))?;

        self.classify(reference, below, above)
    }

    /// Case B: range reference and/or interval domain, resolved with
    /// the two boundary queries and normalization to the significant
    /// boundary instant.
    fn interval_search(
        &self,
        reference: &RequestValue,
        tolerance: Option<&ToleranceSpec>,
    ) -> DimensionResult<MatchOutcome> {
        let start_attr = self.spec.attribute.as_str();
        // The "lower" side compares against the domain's upper bound.
        let end_attr = self
            .spec
            .end_attribute
            .as_deref()
            .unwrap_or(start_attr);
        let ref_lo = reference.min_bound();
        let ref_hi = reference.max_bound();

        // A domain entry overlapping the reference satisfies it as-is,
        // same as the scan path treats overlap as equality.
        let overlap = Filter::and(vec![
            Filter::lte(start_attr, ref_hi.clone()),
            Filter::gte(end_attr, ref_lo.clone()),
        ]);
        if !self.accessor.fetch(&overlap, None)?.is_empty() {
            return Ok(MatchOutcome::Exact(reference.clone()));
        }

        // Highest among entries entirely below the reference,
        // normalized to its upper bound.
        let mut below_clauses = vec![Filter::lte(end_attr, ref_lo.clone())];
        if let Some(w) = window_around(tolerance, ref_lo) {
            below_clauses.push(Filter::gte(end_attr, w.min));
        }
        let below = self
            .accessor
            .max_of(end_attr, Some(&Filter::and(below_clauses)))?;

        // Lowest among entries entirely above the reference,
        // normalized to its lower bound.
        let mut above_clauses = vec![Filter::gte(start_attr, ref_hi.clone())];
        if let Some(w) = window_around(tolerance, ref_hi) {
            above_clauses.push(Filter::lte(start_attr, w.max));
        }
        let above = self
            .accessor
            .min_of(start_attr, Some(&Filter::and(above_clauses)))?;

        self.classify(reference, below, above)
    }

    /// Case C: no filter pushdown. Fetch the entire sorted domain and
    /// linear-scan it against the reference, tracking the last element
    /// below and the first element above, with an early exit on an
    /// exact or overlapping match. O(domain size).
    fn scan_fallback(
        &self,
        reference: &RequestValue,
        tolerance: Option<&ToleranceSpec>,
    ) -> DimensionResult<MatchOutcome> {
        let domain = self.accessor.full_sorted_domain()?;
        debug!(
            size = domain.len(),
            "nearest-match scan fallback over full domain"
        );

        let mut below: Option<DimensionValue> = None;
        let mut above: Option<DimensionValue> = None;
        for sample in &domain {
            match sample.compare_to(reference) {
                Some(Ordering::Less) => below = Some(sample.end().clone()),
                Some(Ordering::Equal) => return Ok(MatchOutcome::Exact(reference.clone())),
                Some(Ordering::Greater) => {
                    above = Some(sample.start().clone());
                    break;
                }
                // Cross-family sample; cannot participate.
                None => {}
            }
        }

        let below = self.within(below, reference.min_bound(), tolerance)?;
        let above = self.within(above, reference.max_bound(), tolerance)?;
        self.classify(reference, below, above)
    }

    /// Discard a candidate outside the acceptable window around its
    /// reference boundary.
    fn within(
        &self,
        candidate: Option<DimensionValue>,
        pivot: &DimensionValue,
        tolerance: Option<&ToleranceSpec>,
    ) -> DimensionResult<Option<DimensionValue>> {
        match (candidate, window_around(tolerance, pivot)) {
            (Some(c), Some(w)) => Ok(if w.contains(&c) { Some(c) } else { None }),
            (c, _) => Ok(c),
        }
    }

    /// Pick between the lower and higher candidates and classify the
    /// outcome. Candidates are already normalized to their significant
    /// boundary; distance is measured from the reference's own relevant
    /// boundary. Ties resolve toward the lower candidate, which keeps
    /// results stable when later data is appended to the domain.
    fn classify(
        &self,
        reference: &RequestValue,
        below: Option<DimensionValue>,
        above: Option<DimensionValue>,
    ) -> DimensionResult<MatchOutcome> {
        let ref_lo = reference.min_bound();
        let ref_hi = reference.max_bound();

        let chosen = match (below, above) {
            (None, None) => return Ok(MatchOutcome::NotFound),
            (Some(b), None) => (b, ref_lo),
            (None, Some(a)) => (a, ref_hi),
            (Some(b), Some(a)) => {
                let d_below = ref_lo.distance(&b)?;
                let d_above = ref_hi.distance(&a)?;
                if d_below <= d_above {
                    (b, ref_lo)
                } else {
                    (a, ref_hi)
                }
            }
        };

        // A candidate meeting its reference boundary satisfies the
        // request as-is.
        if chosen.0 == *chosen.1 {
            Ok(MatchOutcome::Exact(reference.clone()))
        } else {
            Ok(MatchOutcome::Nearest(chosen.0))
        }
    }
}

fn window_around(
    tolerance: Option<&ToleranceSpec>,
    pivot: &DimensionValue,
) -> Option<AcceptableRange> {
    tolerance.and_then(|t| t.around(pivot))
}

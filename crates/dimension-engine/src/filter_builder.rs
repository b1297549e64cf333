//! Builds inclusion filters from resolved request values.
//!
//! Values reaching the builder are always resolved; default/current
//! placeholders are turned into concrete values by the orchestrator
//! before any filter is built.

use dimension_common::{Filter, RequestValue};

/// Accumulates per-dimension filters: the values of one dimension
/// occurrence are ORed together, and occurrences are ANDed with each
/// other (and, ultimately, with the layer's base definition filter).
#[derive(Debug, Default)]
pub struct DimensionFilterBuilder {
    clauses: Vec<Filter>,
}

impl DimensionFilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the filter clause for one dimension occurrence. An empty
    /// value list appends nothing.
    pub fn append_filters(
        &mut self,
        attribute: &str,
        end_attribute: Option<&str>,
        values: &[RequestValue],
    ) {
        if values.is_empty() {
            return;
        }
        let per_value: Vec<Filter> = values
            .iter()
            .map(|v| value_filter(attribute, end_attribute, v))
            .collect();
        self.clauses.push(Filter::or(per_value));
    }

    /// Combined filter: AND of all appended occurrence clauses.
    pub fn build(self) -> Filter {
        Filter::and(self.clauses)
    }
}

fn value_filter(attribute: &str, end_attribute: Option<&str>, value: &RequestValue) -> Filter {
    match (value, end_attribute) {
        // Scalar on a point dimension: plain equality.
        (RequestValue::Scalar(v), None) => Filter::eq(attribute, v.clone()),
        // Scalar on an interval dimension: containment between start
        // and end, inclusive.
        (RequestValue::Scalar(v), Some(end)) => Filter::and(vec![
            Filter::lte(attribute, v.clone()),
            Filter::gte(end, v.clone()),
        ]),
        // Range on a point dimension: between, inclusive.
        (RequestValue::Range { min, max }, None) => {
            Filter::between(attribute, min.clone(), max.clone())
        }
        // Range on an interval dimension: overlap.
        (RequestValue::Range { min, max }, Some(end)) => Filter::and(vec![
            Filter::lte(attribute, max.clone()),
            Filter::gte(end, min.clone()),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dimension_common::DimensionValue;

    fn num(n: f64) -> DimensionValue {
        DimensionValue::Number(n)
    }

    #[test]
    fn test_scalar_equality() {
        let mut b = DimensionFilterBuilder::new();
        b.append_filters("elev", None, &[RequestValue::Scalar(num(100.0))]);
        assert_eq!(b.build(), Filter::eq("elev", num(100.0)));
    }

    #[test]
    fn test_scalar_containment_on_interval_dimension() {
        let mut b = DimensionFilterBuilder::new();
        b.append_filters("start", Some("end"), &[RequestValue::Scalar(num(5.0))]);
        let f = b.build();
        assert_eq!(
            f,
            Filter::and(vec![
                Filter::lte("start", num(5.0)),
                Filter::gte("end", num(5.0)),
            ])
        );
    }

    #[test]
    fn test_range_between() {
        let mut b = DimensionFilterBuilder::new();
        b.append_filters("elev", None, &[RequestValue::range(num(10.0), num(20.0))]);
        assert_eq!(b.build(), Filter::between("elev", num(10.0), num(20.0)));
    }

    #[test]
    fn test_range_overlap_on_interval_dimension() {
        let mut b = DimensionFilterBuilder::new();
        b.append_filters(
            "start",
            Some("end"),
            &[RequestValue::range(num(10.0), num(20.0))],
        );
        assert_eq!(
            b.build(),
            Filter::and(vec![
                Filter::lte("start", num(20.0)),
                Filter::gte("end", num(10.0)),
            ])
        );
    }

    #[test]
    fn test_multiple_values_or_combined_dimensions_and_combined() {
        let mut b = DimensionFilterBuilder::new();
        b.append_filters(
            "elev",
            None,
            &[
                RequestValue::Scalar(num(10.0)),
                RequestValue::Scalar(num(20.0)),
            ],
        );
        b.append_filters("depth", None, &[RequestValue::Scalar(num(5.0))]);
        let f = b.build();
        assert_eq!(
            f,
            Filter::and(vec![
                Filter::or(vec![
                    Filter::eq("elev", num(10.0)),
                    Filter::eq("elev", num(20.0)),
                ]),
                Filter::eq("depth", num(5.0)),
            ])
        );
    }

    #[test]
    fn test_empty_values_append_nothing() {
        let mut b = DimensionFilterBuilder::new();
        b.append_filters("elev", None, &[]);
        assert_eq!(b.build(), Filter::All);
    }
}

//! Opaque attribute filters produced by the filter builder.
//!
//! The engine only composes filters via AND/OR; evaluation against
//! records is the domain accessor's concern.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::value::DimensionValue;

/// A boolean predicate over named attributes. All comparisons are
/// inclusive and defined within one value family; comparing across
/// families (or against a missing attribute) matches nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Matches every record.
    All,
    Eq {
        attribute: String,
        value: DimensionValue,
    },
    Lte {
        attribute: String,
        value: DimensionValue,
    },
    Gte {
        attribute: String,
        value: DimensionValue,
    },
    Between {
        attribute: String,
        min: DimensionValue,
        max: DimensionValue,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(attribute: impl Into<String>, value: DimensionValue) -> Self {
        Filter::Eq {
            attribute: attribute.into(),
            value,
        }
    }

    pub fn lte(attribute: impl Into<String>, value: DimensionValue) -> Self {
        Filter::Lte {
            attribute: attribute.into(),
            value,
        }
    }

    pub fn gte(attribute: impl Into<String>, value: DimensionValue) -> Self {
        Filter::Gte {
            attribute: attribute.into(),
            value,
        }
    }

    pub fn between(
        attribute: impl Into<String>,
        min: DimensionValue,
        max: DimensionValue,
    ) -> Self {
        Filter::Between {
            attribute: attribute.into(),
            min,
            max,
        }
    }

    /// Conjunction; flattens nested ANDs and elides `All`.
    pub fn and(filters: Vec<Filter>) -> Self {
        let mut flat = Vec::new();
        for f in filters {
            match f {
                Filter::All => {}
                Filter::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Filter::All,
            1 => flat.into_iter().next().unwrap(),
            _ => Filter::And(flat),
        }
    }

    /// Disjunction; flattens nested ORs. Callers must pass at least one
    /// clause.
    pub fn or(filters: Vec<Filter>) -> Self {
        debug_assert!(!filters.is_empty(), "empty OR group");
        let mut flat = Vec::new();
        for f in filters {
            match f {
                Filter::Or(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            1 => flat.into_iter().next().unwrap(),
            _ => Filter::Or(flat),
        }
    }

    /// Evaluate against a record exposed as an attribute lookup.
    pub fn evaluate<F>(&self, lookup: &F) -> bool
    where
        F: Fn(&str) -> Option<DimensionValue>,
    {
        match self {
            Filter::All => true,
            Filter::Eq { attribute, value } => lookup(attribute)
                .map(|v| v == *value)
                .unwrap_or(false),
            Filter::Lte { attribute, value } => lookup(attribute)
                .and_then(|v| v.partial_cmp(value))
                .map(|ord| ord != Ordering::Greater)
                .unwrap_or(false),
            Filter::Gte { attribute, value } => lookup(attribute)
                .and_then(|v| v.partial_cmp(value))
                .map(|ord| ord != Ordering::Less)
                .unwrap_or(false),
            Filter::Between {
                attribute,
                min,
                max,
            } => lookup(attribute)
                .map(|v| {
                    matches!(
                        v.partial_cmp(min),
                        Some(Ordering::Greater) | Some(Ordering::Equal)
                    ) && matches!(
                        v.partial_cmp(max),
                        Some(Ordering::Less) | Some(Ordering::Equal)
                    )
                })
                .unwrap_or(false),
            Filter::And(inner) => inner.iter().all(|f| f.evaluate(lookup)),
            Filter::Or(inner) => inner.iter().any(|f| f.evaluate(lookup)),
        }
    }
}

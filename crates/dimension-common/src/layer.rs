//! Per-layer dimension configuration consumed by the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::filter::Filter;
use crate::spec::DimensionSpec;

/// Read-only view of a layer's dimension setup: the attribute schema
/// the engine validates against, the layer's base definition filter,
/// and the custom dimensions declared on it, keyed by dimension name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDimensions {
    /// Layer name, used in warnings and error messages.
    pub name: String,

    /// Attribute names available on the layer's schema.
    pub schema: Vec<String>,

    /// Pre-existing definition filter, ANDed with every resolution.
    pub base_filter: Filter,

    /// Custom dimensions declared on the layer.
    pub dimensions: BTreeMap<String, DimensionSpec>,
}

impl LayerDimensions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Vec::new(),
            base_filter: Filter::All,
            dimensions: BTreeMap::new(),
        }
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.schema.iter().any(|a| a == attribute)
    }

    /// Look up a dimension by name, case-insensitively.
    pub fn dimension(&self, name: &str) -> Option<(&str, &DimensionSpec)> {
        self.dimensions
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(k, v)| (k.as_str(), v))
    }
}

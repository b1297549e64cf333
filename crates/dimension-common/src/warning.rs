//! User-visible warnings for nearest and default substitutions.

use serde::{Deserialize, Serialize};

use crate::value::DimensionValue;

/// What kind of substitution happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// The requested value was replaced by the nearest available one.
    Nearest,
    /// No value was found in the domain (within tolerance).
    NotFound,
    /// No value was requested and the default was substituted.
    DefaultSubstituted,
}

/// Annotation returned to the caller whenever a resolution did not use
/// the value exactly as requested. Callers translate these into
/// response warnings rather than failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionWarning {
    pub layer: String,
    pub dimension: String,
    /// Substituted value, when one exists.
    pub value: Option<DimensionValue>,
    pub units: Option<String>,
    pub kind: WarningKind,
}

impl DimensionWarning {
    pub fn new(
        layer: impl Into<String>,
        dimension: impl Into<String>,
        value: Option<DimensionValue>,
        units: Option<String>,
        kind: WarningKind,
    ) -> Self {
        Self {
            layer: layer.into(),
            dimension: dimension.into(),
            value,
            units,
            kind,
        }
    }
}

impl std::fmt::Display for DimensionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let units = self.units.as_deref().unwrap_or("");
        match (&self.kind, &self.value) {
            (WarningKind::Nearest, Some(v)) => write!(
                f,
                "99 Nearest value used: {}={}{} ({})",
                self.dimension, v, units, self.layer
            ),
            (WarningKind::DefaultSubstituted, Some(v)) => write!(
                f,
                "99 Default value used: {}={}{} ({})",
                self.dimension, v, units, self.layer
            ),
            _ => write!(
                f,
                "99 No acceptable value found for dimension {} ({})",
                self.dimension, self.layer
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_warning_message() {
        let w = DimensionWarning::new(
            "topp:states",
            "elevation",
            Some(DimensionValue::Number(100.0)),
            Some("m".to_string()),
            WarningKind::Nearest,
        );
        assert_eq!(
            w.to_string(),
            "99 Nearest value used: elevation=100m (topp:states)"
        );
    }

    #[test]
    fn test_not_found_warning_message() {
        let w = DimensionWarning::new("layer", "time", None, None, WarningKind::NotFound);
        assert_eq!(
            w.to_string(),
            "99 No acceptable value found for dimension time (layer)"
        );
    }
}

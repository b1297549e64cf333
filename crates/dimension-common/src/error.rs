//! Error types for dimension resolution.

use thiserror::Error;

/// Result type alias using DimensionError.
pub type DimensionResult<T> = Result<T, DimensionError>;

/// Primary error type for dimension resolution operations.
///
/// All variants are terminal for the single dimension/layer being
/// resolved and propagate to the caller. Malformed individual value
/// tokens and "no match in domain" are not errors (the former are
/// dropped during conversion, the latter is a normal
/// [`MatchOutcome::NotFound`](crate::MatchOutcome) outcome).
#[derive(Debug, Error)]
pub enum DimensionError {
    /// No converter or distance function exists for the data type.
    #[error("no converter or distance function for data type '{0}'")]
    UnsupportedType(String),

    /// An operation was requested against a disabled or absent dimension.
    #[error("dimension '{dimension}' is not enabled on layer '{layer}'")]
    DimensionNotEnabled { layer: String, dimension: String },

    /// An enabled dimension lacks a resolvable default value.
    #[error("configuration error for dimension '{dimension}': {message}")]
    Configuration { dimension: String, message: String },

    /// A dimension attribute does not resolve against the layer schema.
    #[error("attribute '{attribute}' not found in schema of layer '{layer}'")]
    AttributeNotFound { layer: String, attribute: String },

    /// The backing store for a dimension domain could not be queried.
    #[error("dimension domain unavailable: {0}")]
    DomainUnavailable(String),

    /// Dimension resolution exceeded the configured time budget.
    #[error("dimension resolution exceeded the {0}s time budget")]
    Timeout(u64),
}

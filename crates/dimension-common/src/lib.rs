//! Common types for the dimension resolution engine.
//!
//! Shared between the engine and its callers: typed dimension values,
//! per-layer dimension configuration, the opaque filter predicate tree,
//! substitution warnings and the error taxonomy.

pub mod error;
pub mod filter;
pub mod layer;
pub mod spec;
pub mod value;
pub mod warning;

pub use error::{DimensionError, DimensionResult};
pub use filter::Filter;
pub use layer::LayerDimensions;
pub use spec::{
    AcceptableRange, DefaultValuePolicy, DimensionDataType, DimensionSpec, PresentationMode,
    ToleranceSpec,
};
pub use value::{DimensionValue, DomainSample, MatchOutcome, RequestValue};
pub use warning::{DimensionWarning, WarningKind};

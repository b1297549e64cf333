//! Dimension resolution and nearest-match engine.
//!
//! Interprets multi-valued, multi-typed request dimensions (time,
//! elevation and arbitrary custom dimensions), converts raw textual
//! parameters into typed values or ranges, builds query filters against
//! per-layer dimension domains, and resolves requested values absent
//! from a domain to the nearest available one under a configurable
//! tolerance.
//!
//! The engine is synchronous and stateless across requests: every
//! resolution is a pure computation over request-scoped inputs plus
//! read-only queries to a [`DimensionDomainAccessor`].

pub mod config;
pub mod convert;
pub mod default_value;
pub mod domain;
pub mod filter_builder;
pub mod nearest;
pub mod orchestrator;

pub use config::EngineConfig;
pub use convert::convert;
pub use domain::{
    DimensionDomainAccessor, GranuleCatalog, GridMetadataReader, SortHint, VectorSource,
};
pub use filter_builder::DimensionFilterBuilder;
pub use nearest::NearestMatchResolver;
pub use orchestrator::{
    CustomDimensionOrchestrator, DomainAccessorProvider, ResolvedDimension, ResolvedFilters,
    StaticAccessors,
};

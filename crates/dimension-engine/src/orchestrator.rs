//! Per-layer orchestration of custom dimension resolution.
//!
//! Drives conversion, default fallback, nearest-match substitution and
//! filter composition for every enabled custom dimension of a layer,
//! producing one combined filter plus the warnings accumulated along
//! the way.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use chrono::{DateTime, Utc};
use dimension_common::{
    DimensionError, DimensionResult, DimensionSpec, DimensionWarning, Filter, LayerDimensions,
    MatchOutcome, RequestValue, WarningKind,
};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::convert;
use crate::default_value::resolve_default;
use crate::domain::DimensionDomainAccessor;
use crate::filter_builder::DimensionFilterBuilder;
use crate::nearest::NearestMatchResolver;

/// Supplies the domain accessor bound to one dimension of a layer.
/// The binding is selected once per layer at setup time.
pub trait DomainAccessorProvider {
    fn accessor_for(
        &self,
        layer: &LayerDimensions,
        dimension: &str,
    ) -> DimensionResult<&dyn DimensionDomainAccessor>;
}

/// Provider over a fixed accessor-per-dimension table.
pub struct StaticAccessors {
    accessors: BTreeMap<String, Box<dyn DimensionDomainAccessor>>,
}

impl StaticAccessors {
    pub fn new() -> Self {
        Self {
            accessors: BTreeMap::new(),
        }
    }

    pub fn with(
        mut self,
        dimension: impl Into<String>,
        accessor: Box<dyn DimensionDomainAccessor>,
    ) -> Self {
        self.accessors.insert(dimension.into(), accessor);
        self
    }
}

impl Default for StaticAccessors {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainAccessorProvider for StaticAccessors {
    fn accessor_for(
        &self,
        _layer: &LayerDimensions,
        dimension: &str,
    ) -> DimensionResult<&dyn DimensionDomainAccessor> {
        self.accessors
            .get(dimension)
            .map(|b| b.as_ref())
            .ok_or_else(|| {
                DimensionError::DomainUnavailable(format!(
                    "no domain accessor bound for dimension '{}'",
                    dimension
                ))
            })
    }
}

/// Result of resolving one dimension.
#[derive(Debug, Clone)]
pub struct ResolvedDimension {
    pub filter: Filter,
    pub warning: Option<DimensionWarning>,
}

/// Result of resolving all enabled dimensions of a layer.
#[derive(Debug, Clone)]
pub struct ResolvedFilters {
    /// AND of the layer's base definition filter and every
    /// per-dimension filter.
    pub filter: Filter,
    pub warnings: Vec<DimensionWarning>,
}

/// Drives dimension resolution for a layer.
pub struct CustomDimensionOrchestrator<'a> {
    config: EngineConfig,
    accessors: &'a dyn DomainAccessorProvider,
}

impl<'a> CustomDimensionOrchestrator<'a> {
    pub fn new(config: EngineConfig, accessors: &'a dyn DomainAccessorProvider) -> Self {
        Self { config, accessors }
    }

    /// Resolve every enabled custom dimension of `layer` against the
    /// raw request parameters and compose the combined filter.
    ///
    /// `now` is the request's evaluation-time snapshot, captured once
    /// by the caller. Disabled dimensions are skipped silently; a
    /// schema mismatch aborts the whole resolution with no partial
    /// filter.
    pub fn resolve_filters(
        &self,
        layer: &LayerDimensions,
        raw_params: &HashMap<String, String>,
        now: DateTime<Utc>,
    ) -> DimensionResult<ResolvedFilters> {
        let started = Instant::now();
        let budget = self.config.resolution_budget();

        let mut clauses = vec![layer.base_filter.clone()];
        let mut warnings = Vec::new();

        for (name, spec) in &layer.dimensions {
            if !spec.enabled {
                debug!(layer = %layer.name, dimension = %name, "skipping disabled dimension");
                continue;
            }
            // Time budget is checked between whole per-dimension
            // resolutions only.
            if let Some(budget) = budget {
                if started.elapsed() > budget {
                    return Err(DimensionError::Timeout(budget.as_secs()));
                }
            }

            let resolved = self.resolve_one(layer, name, spec, lookup_param(raw_params, name), now)?;
            clauses.push(resolved.filter);
            warnings.extend(resolved.warning);
        }

        Ok(ResolvedFilters {
            filter: Filter::and(clauses),
            warnings,
        })
    }

    /// Resolve a single named dimension. Returns the per-dimension
    /// filter only; composing it with the base filter and other
    /// dimensions is the caller's concern.
    pub fn resolve(
        &self,
        layer: &LayerDimensions,
        dimension_name: &str,
        raw_tokens: Option<&[String]>,
        now: DateTime<Utc>,
    ) -> DimensionResult<ResolvedDimension> {
        let (name, spec) = layer.dimension(dimension_name).ok_or_else(|| {
            DimensionError::DimensionNotEnabled {
                layer: layer.name.clone(),
                dimension: dimension_name.to_string(),
            }
        })?;
        if !spec.enabled {
            return Err(DimensionError::DimensionNotEnabled {
                layer: layer.name.clone(),
                dimension: name.to_string(),
            });
        }
        let raw = raw_tokens.map(|t| t.to_vec());
        self.resolve_one(layer, name, spec, raw, now)
    }

    fn resolve_one(
        &self,
        layer: &LayerDimensions,
        name: &str,
        spec: &DimensionSpec,
        raw_tokens: Option<Vec<String>>,
        now: DateTime<Utc>,
    ) -> DimensionResult<ResolvedDimension> {
        self.check_schema(layer, spec)?;
        let accessor = self.accessors.accessor_for(layer, name)?;

        let values = match raw_tokens {
            Some(tokens) => convert::convert(&tokens, spec.data_type)?,
            None => Vec::new(),
        };

        if values.is_empty() {
            // Absent (or fully unparseable) value: substitute the
            // configured default.
            return self.resolve_with_default(layer, name, spec, accessor, now);
        }

        let (values, warning) = if spec.nearest_match && spec.data_type.supports_distance() {
            self.apply_nearest_match(layer, name, spec, accessor, values)?
        } else {
            if spec.nearest_match {
                debug!(
                    dimension = %name,
                    data_type = %spec.data_type,
                    "nearest match configured on a type without a distance function, using values as-is"
                );
            }
            (values, None)
        };

        let mut builder = DimensionFilterBuilder::new();
        builder.append_filters(&spec.attribute, spec.end_attribute.as_deref(), &values);
        Ok(ResolvedDimension {
            filter: builder.build(),
            warning,
        })
    }

    fn resolve_with_default(
        &self,
        layer: &LayerDimensions,
        name: &str,
        spec: &DimensionSpec,
        accessor: &dyn DimensionDomainAccessor,
        now: DateTime<Utc>,
    ) -> DimensionResult<ResolvedDimension> {
        let policy = spec.default_policy.unwrap_or(self.config.default_policy);
        let value = resolve_default(accessor, &layer.name, name, spec, policy, now)?.ok_or_else(
            || DimensionError::Configuration {
                dimension: name.to_string(),
                message: format!(
                    "enabled dimension on layer '{}' has no request value and no resolvable default",
                    layer.name
                ),
            },
        )?;

        let warning = DimensionWarning::new(
            layer.name.clone(),
            name,
            Some(value.clone()),
            spec.units.clone(),
            WarningKind::DefaultSubstituted,
        );
        warn!(layer = %layer.name, dimension = %name, value = %value, "default value substituted");

        let mut builder = DimensionFilterBuilder::new();
        builder.append_filters(
            &spec.attribute,
            spec.end_attribute.as_deref(),
            &[RequestValue::Scalar(value)],
        );
        Ok(ResolvedDimension {
            filter: builder.build(),
            warning: Some(warning),
        })
    }

    /// Run the nearest-match search for each requested value,
    /// substituting resolved values and collecting the first warning.
    fn apply_nearest_match(
        &self,
        layer: &LayerDimensions,
        name: &str,
        spec: &DimensionSpec,
        accessor: &dyn DimensionDomainAccessor,
        values: Vec<RequestValue>,
    ) -> DimensionResult<(Vec<RequestValue>, Option<DimensionWarning>)> {
        let resolver = NearestMatchResolver::new(accessor, spec);
        let mut out = Vec::with_capacity(values.len());
        let mut warning = None;

        for value in values {
            match resolver.find_nearest(&value)? {
                MatchOutcome::Exact(v) => out.push(v),
                MatchOutcome::Nearest(nearest) => {
                    warn!(
                        layer = %layer.name,
                        dimension = %name,
                        requested = %value,
                        nearest = %nearest,
                        "nearest value substituted"
                    );
                    warning.get_or_insert_with(|| {
                        DimensionWarning::new(
                            layer.name.clone(),
                            name,
                            Some(nearest.clone()),
                            spec.units.clone(),
                            WarningKind::Nearest,
                        )
                    });
                    out.push(RequestValue::Scalar(nearest));
                }
                MatchOutcome::NotFound => {
                    warn!(
                        layer = %layer.name,
                        dimension = %name,
                        requested = %value,
                        "no nearest value within tolerance"
                    );
                    warning.get_or_insert_with(|| {
                        DimensionWarning::new(
                            layer.name.clone(),
                            name,
                            None,
                            spec.units.clone(),
                            WarningKind::NotFound,
                        )
                    });
                    // Keep the original value; the resulting filter
                    // matches nothing for it, which is the intended
                    // "empty content plus warning" behavior.
                    out.push(value);
                }
            }
        }

        Ok((out, warning))
    }

    fn check_schema(&self, layer: &LayerDimensions, spec: &DimensionSpec) -> DimensionResult<()> {
        for attribute in std::iter::once(&spec.attribute).chain(spec.end_attribute.iter()) {
            if !layer.has_attribute(attribute) {
                return Err(DimensionError::AttributeNotFound {
                    layer: layer.name.clone(),
                    attribute: attribute.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Locate the raw parameter for a dimension by case-insensitive,
/// prefix-stripped key lookup, and split it into value tokens.
fn lookup_param(raw_params: &HashMap<String, String>, dimension: &str) -> Option<Vec<String>> {
    raw_params
        .iter()
        .find(|(key, _)| {
            // Keys are caller-supplied; slice only on a char boundary.
            let stripped = match key.get(..4) {
                Some(prefix) if prefix.eq_ignore_ascii_case("dim_") => &key[4..],
                _ => key.as_str(),
            };
            stripped.eq_ignore_ascii_case(dimension)
        })
        .map(|(_, raw)| raw.split(',').map(|t| t.to_string()).collect())
}

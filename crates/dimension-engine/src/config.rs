//! Configuration for the dimension engine.

use dimension_common::DefaultValuePolicy;
use serde::{Deserialize, Serialize};

/// Engine-wide configuration, passed explicitly into the orchestrator
/// and treated as immutable for the duration of a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default-value policy for dimensions requested without a value,
    /// unless overridden per dimension.
    pub default_policy: DefaultValuePolicy,

    /// Optional time budget for a whole resolution, checked between
    /// per-dimension resolutions (never inside a single search).
    pub resolution_timeout_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_policy: DefaultValuePolicy::Latest,
            resolution_timeout_secs: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("DIMENSION_DEFAULT_POLICY") {
            if let Some(policy) = DefaultValuePolicy::from_str(&val) {
                config.default_policy = policy;
            }
        }

        if let Ok(val) = std::env::var("DIMENSION_RESOLUTION_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.resolution_timeout_secs = Some(secs);
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.resolution_timeout_secs == Some(0) {
            return Err("resolution_timeout_secs must be > 0 when set".to_string());
        }
        Ok(())
    }

    /// The time budget as a duration, if configured.
    pub fn resolution_budget(&self) -> Option<std::time::Duration> {
        self.resolution_timeout_secs
            .map(std::time::Duration::from_secs)
    }
}

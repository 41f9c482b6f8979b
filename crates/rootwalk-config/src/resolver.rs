//! Resolver configuration.

use super::{ConfigError, Result};
use rootwalk_resolver::{DEFAULT_MAX_HOPS, ResolverConfig, RootHints};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// The `resolver` section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSection {
    /// Hop budget for one resolution, sub-resolutions included.
    pub max_hops: u32,

    /// Per-attempt query timeout (milliseconds).
    pub query_timeout_ms: u64,

    /// Wall-clock limit for a whole resolution (milliseconds).
    pub deadline_ms: Option<u64>,

    /// Seed for nameserver ordering. Unset means random.
    pub seed: Option<u64>,

    /// Destination port for every query.
    pub port: u16,

    /// Root hints file in BIND format. Unset means the built-in table.
    pub root_hints: Option<PathBuf>,
}

impl Default for ResolverSection {
    fn default() -> Self {
        let defaults = ResolverConfig::default();
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            query_timeout_ms: defaults.query_timeout.as_millis() as u64,
            deadline_ms: None,
            seed: None,
            port: defaults.port,
            root_hints: None,
        }
    }
}

impl ResolverSection {
    pub fn validate(&self) -> Result<()> {
        if self.max_hops == 0 {
            return Err(ConfigError::InvalidValue {
                field: "resolver.max_hops".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.query_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "resolver.query_timeout_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if self.deadline_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "resolver.deadline_ms".to_string(),
                message: "must be greater than 0 when set".to_string(),
            });
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "resolver.port".to_string(),
                message: "must not be 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// Converts to the resolver's runtime configuration.
    pub fn to_resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            max_hops: self.max_hops,
            query_timeout: self.query_timeout(),
            deadline: self.deadline_ms.map(Duration::from_millis),
            seed: self.seed,
            port: self.port,
        }
    }

    /// Loads the configured root hints, or the built-in table.
    pub fn load_hints(&self) -> Result<RootHints> {
        match &self.root_hints {
            Some(path) => RootHints::from_file(path)
                .map_err(|e| ConfigError::Validation(format!("root hints: {e}"))),
            None => Ok(RootHints::builtin()),
        }
    }
}

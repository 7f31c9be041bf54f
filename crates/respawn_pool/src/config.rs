//! # Pool Configuration
//!
//! Loaded once at startup from TOML:
//!
//! ```toml
//! default_count = 16
//!
//! [[prewarm]]
//! prototype = "bullet"
//! count = 64
//!
//! [[prewarm]]
//! prototype = "muzzle_flash"
//! count = 8
//! ```

use serde::Deserialize;

use crate::error::{PoolError, PoolResult};

/// Free instances a pool is prewarmed with when it is created lazily
/// (i.e. on first request without an explicit prepare).
pub const DEFAULT_POOL_COUNT: usize = 20;

/// One prewarm request: build the named prototype's pool ahead of time.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct PrewarmEntry {
    /// Prototype name, resolved against the host registry when applied.
    pub prototype: String,
    /// Number of free instances to pre-create.
    pub count: usize,
}

/// Pool registry configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PoolsConfig {
    /// Prewarm size for pools created lazily on first acquire.
    pub default_count: usize,
    /// Pools to build ahead of time.
    pub prewarm: Vec<PrewarmEntry>,
}

impl Default for PoolsConfig {
    fn default() -> Self {
        Self {
            default_count: DEFAULT_POOL_COUNT,
            prewarm: Vec::new(),
        }
    }
}

impl PoolsConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidConfig`] for malformed TOML, empty prototype
    /// names, or duplicate prewarm entries.
    pub fn from_toml_str(text: &str) -> PoolResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|err| PoolError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration contents.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidConfig`] for empty prototype names or duplicate
    /// prewarm entries.
    pub fn validate(&self) -> PoolResult<()> {
        for (i, entry) in self.prewarm.iter().enumerate() {
            if entry.prototype.is_empty() {
                return Err(PoolError::InvalidConfig(format!(
                    "prewarm entry {i} has an empty prototype name"
                )));
            }
            if self.prewarm[..i].iter().any(|e| e.prototype == entry.prototype) {
                return Err(PoolError::InvalidConfig(format!(
                    "duplicate prewarm entry for prototype '{}'",
                    entry.prototype
                )));
            }
        }
        Ok(())
    }
}

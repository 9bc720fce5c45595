//! Engine configuration.
//!
//! Supports a `lynx.toml` configuration file, environment variables, and
//! programmatic defaults.
//!
//! # Priority (highest to lowest)
//!
//! 1. Environment variables (`LYNX_*`, e.g. `LYNX_IVF__NLIST=256`)
//! 2. Configuration file (`lynx.toml`)
//! 3. Default values

use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// IVF index configuration section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct IvfConfig {
    /// Number of k-means clusters.
    pub nlist: usize,
    /// Number of clusters probed per query.
    pub nprobe: usize,
    /// Maximum k-means iterations.
    pub max_iterations: usize,
    /// k-means convergence tolerance on the maximum centroid shift.
    pub tolerance: f64,
}

impl Default for IvfConfig {
    fn default() -> Self {
        Self {
            nlist: 100,
            nprobe: 10,
            max_iterations: 100,
            tolerance: 1e-4,
        }
    }
}

/// Snapshot cache configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Path of the binary vector cache used for warm restarts.
    pub path: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: "data/vector_cache.bin".to_string(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Distance metric shared by both indexes.
    pub metric: DistanceMetric,
    /// IVF index section.
    pub ivf: IvfConfig,
    /// Snapshot cache section.
    pub snapshot: SnapshotConfig,
}

impl EngineConfig {
    /// Loads configuration from defaults, an optional `lynx.toml`, and
    /// `LYNX_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when the file cannot be parsed
    /// or a value fails validation.
    pub fn load<P: AsRef<Path>>(config_file: P) -> Result<Self> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("LYNX_").split("__"))
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when `nlist == 0`,
    /// `nprobe` is outside `1..=nlist`, `max_iterations == 0`, the
    /// tolerance is not positive, or the snapshot path is empty.
    pub fn validate(&self) -> Result<()> {
        if self.ivf.nlist == 0 {
            return Err(Error::InvalidConfig("ivf.nlist must be greater than 0".into()));
        }
        if self.ivf.nprobe == 0 || self.ivf.nprobe > self.ivf.nlist {
            return Err(Error::InvalidConfig(format!(
                "ivf.nprobe must be in 1..={}, got {}",
                self.ivf.nlist, self.ivf.nprobe
            )));
        }
        if self.ivf.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "ivf.max_iterations must be greater than 0".into(),
            ));
        }
        if !self.ivf.tolerance.is_finite() || self.ivf.tolerance <= 0.0 {
            return Err(Error::InvalidConfig(
                "ivf.tolerance must be a positive number".into(),
            ));
        }
        if self.snapshot.path.is_empty() {
            return Err(Error::InvalidConfig("snapshot.path must not be empty".into()));
        }
        Ok(())
    }
}

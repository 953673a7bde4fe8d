//! Runtime configuration.
//!
//! Every struct deserializes with `#[serde(default)]`, so a config file only
//! needs the keys it wants to change. Command-line flags are applied on top
//! of the loaded file by the binaries.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shape::ShapeId;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Shape the light starts with.
    pub shape: ShapeId,
    /// Image to prefilter into a light texture. Untextured light when unset.
    pub texture: Option<PathBuf>,
    /// OBJ file with the light's geometry; a unit quad when unset.
    pub mesh: Option<PathBuf>,
    /// Where to write the clipped level-0 image before filtering.
    pub dump_clipped: Option<PathBuf>,
    /// Worker threads for texture builds; rayon picks when unset.
    pub jobs: Option<usize>,
    pub filter: FilterConfig,
    pub window: WindowConfig,
    pub light: LightConfig,
    /// Start with the light and camera animation running.
    pub animate: bool,
}

/// Blur parameters of the light texture builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    /// Kernel side used for interior texels of level 0 and every texel of
    /// coarser levels. Must be odd.
    pub interior_kernel_size: usize,
    pub interior_sigma: f32,
    /// Texels of reach past the boundary kept by every exterior kernel.
    pub overlap: u32,
    /// Radius of the widest exterior kernel.
    pub max_dist: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            interior_kernel_size: 15,
            interior_sigma: 9.0,
            overlap: 7,
            max_dist: 55,
        }
    }
}

impl FilterConfig {
    /// Rejects parameters that would produce degenerate kernels.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interior_kernel_size % 2 == 0 {
            return Err(ConfigError::Invalid(format!(
                "filter.interior_kernel_size {} must be odd",
                self.interior_kernel_size
            )));
        }
        if !(self.interior_sigma > 0.0 && self.interior_sigma.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "filter.interior_sigma {} must be positive",
                self.interior_sigma
            )));
        }
        if self.overlap == 0 || self.overlap > self.max_dist {
            return Err(ConfigError::Invalid(format!(
                "filter.overlap {} must be in 1..={}",
                self.overlap, self.max_dist
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            title: "Bezier Area Light".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    /// Emitted radiance.
    pub le: [f32; 3],
    pub two_sided: bool,
    /// Bob up and down and spin while animating.
    pub moving: bool,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            le: [1.0, 1.0, 1.0],
            two_sided: false,
            moving: false,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config file {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "malformed config file {}: {source}", path.display())
            }
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl Config {
    /// Reads a JSON config file. Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Checks values a file can get wrong but the types cannot rule out.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.filter.validate()?;
        if self.jobs == Some(0) {
            return Err(ConfigError::Invalid("jobs must be at least 1".to_string()));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} is empty",
                self.window.width, self.window.height
            )));
        }
        Ok(())
    }
}

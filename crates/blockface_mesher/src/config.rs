use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Which mesher implementation builds chunk geometry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MesherKind {
    /// One unit quad per visible voxel face.
    #[default]
    Basic,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MesherConfig {
    pub mesher: MesherKind,
    /// Outward inset applied to every atlas rectangle, in UV units.
    pub uv_padding: f32,
    /// Voxel catalog path, relative to the config file.
    pub catalog: Option<PathBuf>,
}

impl Default for MesherConfig {
    fn default() -> Self {
        Self {
            mesher: MesherKind::Basic,
            uv_padding: 0.0,
            catalog: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        source: toml::de::Error,
    },
    InvalidPadding {
        value: f32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read mesher config {}: {source}", path.display())
            }
            Self::Parse { source } => write!(f, "failed to parse mesher config: {source}"),
            Self::InvalidPadding { value } => {
                write!(f, "uv_padding must be a finite value >= 0, got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::Parse { source } => Some(source),
            Self::InvalidPadding { .. } => None,
        }
    }
}

impl MesherConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|source| ConfigError::Parse { source })?;
        if !config.uv_padding.is_finite() || config.uv_padding < 0.0 {
            return Err(ConfigError::InvalidPadding {
                value: config.uv_padding,
            });
        }
        Ok(config)
    }

    /// Loads the config at `path`, resolving `catalog` against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&source)?;
        if let (Some(catalog), Some(dir)) = (config.catalog.as_mut(), path.parent()) {
            if catalog.is_relative() {
                *catalog = dir.join(&*catalog);
            }
        }
        Ok(config)
    }
}

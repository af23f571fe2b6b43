//! Baker configuration, loadable from TOML
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bake::DegeneratePolicy;
use crate::error::{BakeError, Result};

/// Default location of the precomputed `.mdl` meshes
pub const DEFAULT_ASSET_DIR: &str = "res/mdl";

/// Which backend to try first at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendPreference {
    #[default]
    Accelerated,
    Portable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeConfig {
    pub backend: BackendPreference,
    /// Worker count for the accelerated backend; unset lets the pool decide
    pub threads: Option<usize>,
    pub degenerate: DegeneratePolicy,
    pub asset_dir: PathBuf,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            backend: BackendPreference::default(),
            threads: None,
            degenerate: DegeneratePolicy::default(),
            asset_dir: PathBuf::from(DEFAULT_ASSET_DIR),
        }
    }
}

impl BakeConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BakeError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| BakeError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| BakeError::Config(e.to_string()))
    }
}

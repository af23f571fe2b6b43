//! Precomputed mesh files stored as raw pre-bake buffers
use std::path::{Path, PathBuf};

use crate::bake::Baker;
use crate::config::BakeConfig;
use crate::error::{BakeError, Result};
use crate::layout::PRE_BAKE_STRIDE;

pub const MESH_EXTENSION: &str = "mdl";

/// Read a mesh file verbatim. The length is validated by the baker, not here.
pub fn read_mesh_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| BakeError::AssetLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Named meshes under a common directory, e.g. `res/mdl/sphere.mdl`
#[derive(Debug, Clone)]
pub struct MeshLibrary {
    root: PathBuf,
}

impl MeshLibrary {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &BakeConfig) -> Self {
        Self::new(config.asset_dir.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name).with_extension(MESH_EXTENSION)
    }

    pub fn load_raw(&self, name: &str) -> Result<Vec<u8>> {
        read_mesh_file(self.path_for(name))
    }

    pub fn load_baked(&self, baker: &Baker, name: &str) -> Result<Vec<u8>> {
        let raw = self.load_raw(name)?;
        let baked = baker.bake(&raw)?;
        log::info!(
            "loaded mesh '{}' ({} vertices) from {}",
            name,
            raw.len() / PRE_BAKE_STRIDE,
            self.root.display()
        );
        Ok(baked)
    }

    pub fn sphere(&self, baker: &Baker) -> Result<Vec<u8>> {
        self.load_baked(baker, "sphere")
    }

    pub fn arrow(&self, baker: &Baker) -> Result<Vec<u8>> {
        self.load_baked(baker, "arrow")
    }
}

impl Default for MeshLibrary {
    fn default() -> Self {
        Self::from_config(&BakeConfig::default())
    }
}

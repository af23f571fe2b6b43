//! Error type shared by every baking, loading and configuration path
use std::path::PathBuf;

/// Errors raised by the baker, the primitive generators and mesh loading
#[derive(thiserror::Error, Debug)]
pub enum BakeError {
    /// Buffer length is not a positive multiple of the expected unit
    #[error("invalid buffer size: {len} bytes is not a positive multiple of {unit} bytes")]
    InvalidBufferSize { len: usize, unit: usize },

    /// Zero (or non-invertible) UV determinant under `DegeneratePolicy::Reject`
    #[error("degenerate UV mapping on face {face}")]
    DegenerateUv { face: usize },

    /// The accelerated backend could not be brought up
    #[error("native backend unavailable: {0}")]
    NativeBackendUnavailable(String),

    /// Mesh file missing or unreadable
    #[error("failed to load mesh asset {}: {source}", path.display())]
    AssetLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Index triple refers past the end of the vertex list
    #[error("index {index} out of range for {len} vertices")]
    IndexOutOfRange { index: usize, len: usize },

    /// Vertex records could not be decoded
    #[error("malformed vertex data: {0}")]
    Decode(String),

    /// Configuration file could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BakeError>;

//! Tanbake Core Library - tangent-space baking for interleaved vertex buffers
//!
//! Turns flat, pre-triangulated `uv | normal | position` buffers into
//! `uv | bitangent | tangent | normal | position` buffers with one flat
//! tangent basis per face, and generates the primitives that feed it.

pub mod assets;
pub mod bake;
pub mod config;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod primitives;

// Re-export commonly used types
pub use assets::MeshLibrary;
pub use bake::{bake, BakeBackend, Baker, DegeneratePolicy, ParallelBaker, PortableBaker};
pub use config::{BackendPreference, BakeConfig};
pub use error::{BakeError, Result};
pub use geometry::{triangulate, Face, TangentBasis};
pub use layout::{ScreenVertex, VertexIn, VertexOut};
pub use primitives::{cube, screen_triangle, BoundingBox, Rect};

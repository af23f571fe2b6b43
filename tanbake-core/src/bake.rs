//! Tangent baking with interchangeable execution backends
//!
//! A [`Baker`] is selected once at startup and handed to whoever needs to
//! bake. Both backends run the same per-face computation, so their outputs
//! are byte-identical for the same input.
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{BackendPreference, BakeConfig};
use crate::error::{BakeError, Result};
use crate::geometry::{self, Face, TangentBasis};
use crate::layout::{self, VertexIn, VertexOut};

/// Faces handed to a single rayon task at minimum
const PARALLEL_MIN_FACES: usize = 256;

/// What to do with a face whose UV determinant cannot be inverted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Invert anyway and let Inf/NaN flow into the output
    #[default]
    Propagate,
    /// Emit a zero tangent and bitangent whenever the basis is not finite
    Zero,
    /// Fail the whole bake with `DegenerateUv` naming the first such face
    Reject,
}

impl DegeneratePolicy {
    /// Apply the policy to a computed basis. `None` means the face is rejected.
    pub fn apply(self, basis: TangentBasis) -> Option<TangentBasis> {
        if !basis.is_degenerate() {
            return Some(basis);
        }
        match self {
            DegeneratePolicy::Propagate => Some(basis),
            DegeneratePolicy::Zero => Some(TangentBasis::zero(basis.inv_det)),
            DegeneratePolicy::Reject => None,
        }
    }
}

/// Compute and emit one face under `policy`
pub fn bake_face(face: &Face, index: usize, policy: DegeneratePolicy) -> Result<[VertexOut; 3]> {
    policy
        .apply(face.tangent_basis())
        .map(|basis| face.bake(&basis))
        .ok_or(BakeError::DegenerateUv { face: index })
}

/// An execution strategy for baking a list of faces
pub trait BakeBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Bake every face in order, returning three records per face
    fn bake_faces(&self, faces: &[Face], policy: DegeneratePolicy) -> Result<Vec<VertexOut>>;
}

/// Sequential single-threaded backend, always available
#[derive(Debug, Default, Clone, Copy)]
pub struct PortableBaker;

impl BakeBackend for PortableBaker {
    fn name(&self) -> &'static str {
        "portable"
    }

    fn bake_faces(&self, faces: &[Face], policy: DegeneratePolicy) -> Result<Vec<VertexOut>> {
        let mut out = Vec::with_capacity(faces.len() * layout::VERTICES_PER_FACE);
        let step = (faces.len() / 5).max(1);

        for (index, face) in faces.iter().enumerate() {
            out.extend(bake_face(face, index, policy)?);

            if index % step == 0 {
                log::trace!(
                    "baked {}/{} faces ({:.0}%)",
                    index,
                    faces.len(),
                    index as f32 / faces.len() as f32 * 100.0
                );
            }
        }

        Ok(out)
    }
}

/// Multi-threaded backend running on a dedicated rayon pool
pub struct ParallelBaker {
    pool: rayon::ThreadPool,
}

impl ParallelBaker {
    /// Build the worker pool. `threads` of `None` lets rayon pick.
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("tanbake-{}", i));
        if let Some(threads) = threads {
            builder = builder.num_threads(threads);
        }

        let pool = builder
            .build()
            .map_err(|e| BakeError::NativeBackendUnavailable(e.to_string()))?;

        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl BakeBackend for ParallelBaker {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn bake_faces(&self, faces: &[Face], policy: DegeneratePolicy) -> Result<Vec<VertexOut>> {
        self.pool.install(|| {
            // Rejection is decided up front so the reported face is the
            // lowest failing index, as with the sequential backend
            if policy == DegeneratePolicy::Reject {
                let rejected = faces
                    .par_iter()
                    .with_min_len(PARALLEL_MIN_FACES)
                    .position_first(|face| face.tangent_basis().is_degenerate());
                if let Some(face) = rejected {
                    return Err(BakeError::DegenerateUv { face });
                }
            }

            Ok(faces
                .par_iter()
                .with_min_len(PARALLEL_MIN_FACES)
                .flat_map_iter(|face| {
                    let basis = face.tangent_basis();
                    face.bake(&policy.apply(basis).unwrap_or(basis))
                })
                .collect())
        })
    }
}

/// The baking strategy chosen for this process
pub struct Baker {
    backend: Box<dyn BakeBackend>,
    policy: DegeneratePolicy,
}

impl Baker {
    pub fn new(backend: Box<dyn BakeBackend>, policy: DegeneratePolicy) -> Self {
        Self { backend, policy }
    }

    pub fn portable() -> Self {
        Self::new(Box::new(PortableBaker), DegeneratePolicy::default())
    }

    pub fn accelerated(threads: Option<usize>) -> Result<Self> {
        let backend = ParallelBaker::new(threads)?;
        Ok(Self::new(Box::new(backend), DegeneratePolicy::default()))
    }

    /// Pick a backend from `config`, downgrading to the portable one if the
    /// accelerated backend cannot start.
    pub fn select(config: &BakeConfig) -> Self {
        Self::select_with(config, |threads| {
            ParallelBaker::new(threads).map(|b| Box::new(b) as Box<dyn BakeBackend>)
        })
    }

    /// Same as [`Baker::select`] with a caller-supplied accelerated backend
    pub fn select_with<F>(config: &BakeConfig, accelerated: F) -> Self
    where
        F: FnOnce(Option<usize>) -> Result<Box<dyn BakeBackend>>,
    {
        let backend: Box<dyn BakeBackend> = match config.backend {
            BackendPreference::Portable => Box::new(PortableBaker),
            BackendPreference::Accelerated => match accelerated(config.threads) {
                Ok(backend) => backend,
                Err(e) => {
                    log::warn!("{}; falling back to the portable backend, baking will be slower", e);
                    Box::new(PortableBaker)
                }
            },
        };

        log::info!(
            "using {} bake backend (degenerate UVs: {:?})",
            backend.name(),
            config.degenerate
        );
        Self::new(backend, config.degenerate)
    }

    pub fn with_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn policy(&self) -> DegeneratePolicy {
        self.policy
    }

    /// Bake a pre-bake buffer into a freshly allocated post-bake buffer
    pub fn bake(&self, input: &[u8]) -> Result<Vec<u8>> {
        let vertices = layout::decode_vertices(input)?;
        let baked = self.bake_vertices(&vertices)?;

        let out = layout::encode(&baked);
        debug_assert_eq!(out.len(), layout::baked_len(input.len()));
        log::debug!(
            "baked {} vertices ({} -> {} bytes) with {}",
            vertices.len(),
            input.len(),
            out.len(),
            self.backend.name()
        );
        Ok(out)
    }

    /// Typed form of [`Baker::bake`]
    pub fn bake_vertices(&self, vertices: &[VertexIn]) -> Result<Vec<VertexOut>> {
        let faces = geometry::faces(vertices)?;
        self.backend.bake_faces(faces, self.policy)
    }
}

impl Default for Baker {
    fn default() -> Self {
        Self::portable()
    }
}

impl std::fmt::Debug for Baker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Baker")
            .field("backend", &self.backend.name())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Bake with the portable backend and the reference degenerate handling
pub fn bake(input: &[u8]) -> Result<Vec<u8>> {
    Baker::portable().bake(input)
}

//! Triangle faces, per-face tangent bases and indexed-mesh expansion
//!
//! [`face_normals`] is library API for callers assembling their own meshes;
//! the bundled front ends bake meshes that already carry normals.
use bytemuck::{Pod, Zeroable};
use nalgebra::{Point3, Vector2, Vector3};

use crate::error::{BakeError, Result};
use crate::layout::{VertexIn, VertexOut, PRE_BAKE_FACE_BYTES, PRE_BAKE_STRIDE, VERTICES_PER_FACE};

/// Tangent and bitangent shared by the three vertices of a face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentBasis {
    pub tangent: Vector3<f32>,
    pub bitangent: Vector3<f32>,
    /// Reciprocal of the UV determinant; Inf or NaN for a degenerate mapping
    pub inv_det: f32,
}

impl TangentBasis {
    pub fn zero(inv_det: f32) -> Self {
        Self {
            tangent: Vector3::zeros(),
            bitangent: Vector3::zeros(),
            inv_det,
        }
    }

    /// True when the determinant could not be inverted or the basis
    /// overflowed, i.e. any component is Inf or NaN
    pub fn is_degenerate(&self) -> bool {
        !self.inv_det.is_finite()
            || self
                .tangent
                .iter()
                .chain(self.bitangent.iter())
                .any(|c| !c.is_finite())
    }
}

/// A triangle: three consecutive pre-bake vertices
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Face {
    pub vertices: [VertexIn; 3],
}

impl Face {
    pub fn new(v0: VertexIn, v1: VertexIn, v2: VertexIn) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    fn position(&self, i: usize) -> Vector3<f32> {
        Vector3::from(self.vertices[i].position)
    }

    fn uv(&self, i: usize) -> Vector2<f32> {
        Vector2::from(self.vertices[i].uv)
    }

    /// Solve the UV-derivative system for this face.
    ///
    /// The determinant is inverted unconditionally, so a zero determinant
    /// yields infinite or NaN components. The result is neither normalized
    /// nor orthogonalized against the vertex normals.
    pub fn tangent_basis(&self) -> TangentBasis {
        let edge1 = self.position(1) - self.position(0);
        let edge2 = self.position(2) - self.position(0);

        let delta_uv1 = self.uv(1) - self.uv(0);
        let delta_uv2 = self.uv(2) - self.uv(0);

        let det = delta_uv1.x * delta_uv2.y - delta_uv2.x * delta_uv1.y;
        let f = 1.0 / det;

        TangentBasis {
            tangent: (edge1 * delta_uv2.y - edge2 * delta_uv1.y) * f,
            bitangent: (edge2 * delta_uv1.x - edge1 * delta_uv2.x) * f,
            inv_det: f,
        }
    }

    /// Emit the three post-bake records, each carrying the same flat basis
    pub fn bake(&self, basis: &TangentBasis) -> [VertexOut; 3] {
        let tangent: [f32; 3] = basis.tangent.into();
        let bitangent: [f32; 3] = basis.bitangent.into();
        self.vertices.map(|v| VertexOut {
            uv: v.uv,
            bitangent,
            tangent,
            normal: v.normal,
            position: v.position,
        })
    }

    /// Geometric face normal from the winding of the positions
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let edge1 = self.position(1) - self.position(0);
        let edge2 = self.position(2) - self.position(0);

        edge1.cross(&edge2).normalize()
    }
}

/// View a flat, already-triangulated vertex list as faces without copying
pub fn faces(vertices: &[VertexIn]) -> Result<&[Face]> {
    let invalid = || BakeError::InvalidBufferSize {
        len: vertices.len() * PRE_BAKE_STRIDE,
        unit: PRE_BAKE_FACE_BYTES,
    };
    if vertices.is_empty() || vertices.len() % VERTICES_PER_FACE != 0 {
        return Err(invalid());
    }

    bytemuck::try_cast_slice(vertices).map_err(|_| invalid())
}

/// Expand an indexed mesh into a flat triangle list.
///
/// Shared vertices are duplicated once per referencing triangle.
pub fn triangulate<T: Copy>(vertices: &[T], indices: &[[usize; 3]]) -> Result<Vec<T>> {
    let mut out = Vec::with_capacity(indices.len() * VERTICES_PER_FACE);
    for &index in indices.iter().flatten() {
        let vertex = vertices.get(index).ok_or(BakeError::IndexOutOfRange {
            index,
            len: vertices.len(),
        })?;
        out.push(*vertex);
    }
    Ok(out)
}

/// Flat normals for a triangulated position list, one per vertex
pub fn face_normals(positions: &[Point3<f32>]) -> Result<Vec<Vector3<f32>>> {
    if positions.len() % VERTICES_PER_FACE != 0 {
        return Err(BakeError::InvalidBufferSize {
            len: positions.len(),
            unit: VERTICES_PER_FACE,
        });
    }

    let mut normals = Vec::with_capacity(positions.len());
    for triangle in positions.chunks_exact(VERTICES_PER_FACE) {
        let edge1 = triangle[1] - triangle[0];
        let edge2 = triangle[2] - triangle[0];
        let normal = edge1.cross(&edge2).normalize();
        normals.extend([normal; 3]);
    }
    Ok(normals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_face(normal: [f32; 3]) -> Face {
        Face::new(
            VertexIn::new([0.0, 0.0], normal, [0.0, 0.0, 0.0]),
            VertexIn::new([1.0, 0.0], normal, [1.0, 0.0, 0.0]),
            VertexIn::new([0.0, 1.0], normal, [0.0, 1.0, 0.0]),
        )
    }

    #[test]
    fn test_unit_triangle_basis() {
        let basis = unit_face([0.0, 0.0, 1.0]).tangent_basis();
        assert_eq!(basis.inv_det, 1.0);
        assert_eq!(basis.tangent, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(basis.bitangent, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_basis_keeps_uv_stretch() {
        // UVs covering half the edge length double the tangent magnitude
        let face = Face::new(
            VertexIn::new([0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 0.0]),
            VertexIn::new([0.5, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
            VertexIn::new([0.0, 0.5], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        );
        let basis = face.tangent_basis();
        assert_relative_eq!(basis.tangent.norm(), 2.0, epsilon = 1e-6);
        assert_relative_eq!(basis.bitangent.norm(), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_basis_not_orthogonalized_against_normal() {
        let basis = unit_face([0.0, 0.6, 0.8]).tangent_basis();
        let normal = Vector3::new(0.0, 0.6, 0.8);
        assert_relative_eq!(basis.bitangent.dot(&normal), 0.6, epsilon = 1e-6);
        assert_eq!(basis.bitangent, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_degenerate_uv_propagates_non_finite() {
        let normal = [0.0, 0.0, 1.0];
        let face = Face::new(
            VertexIn::new([0.5, 0.5], normal, [0.0, 0.0, 0.0]),
            VertexIn::new([0.5, 0.5], normal, [1.0, 0.0, 0.0]),
            VertexIn::new([0.5, 0.5], normal, [0.0, 1.0, 0.0]),
        );
        let basis = face.tangent_basis();
        assert!(basis.is_degenerate());
        assert!(basis.tangent.iter().any(|c| !c.is_finite()));
    }

    #[test]
    fn test_overflowing_basis_is_degenerate() {
        // Tiny but non-zero determinant: 1/det is finite, the basis is not
        let normal = [0.0, 0.0, 1.0];
        let face = Face::new(
            VertexIn::new([0.0, 0.0], normal, [0.0, 0.0, 0.0]),
            VertexIn::new([1e-19, 0.0], normal, [1e20, 0.0, 0.0]),
            VertexIn::new([0.0, 1e-19], normal, [0.0, 1e20, 0.0]),
        );
        let basis = face.tangent_basis();
        assert!(basis.inv_det.is_finite());
        assert!(basis.tangent.iter().any(|c| c.is_infinite()));
        assert!(basis.is_degenerate());
    }

    #[test]
    fn test_unit_basis_is_not_degenerate() {
        assert!(!unit_face([0.0, 0.0, 1.0]).tangent_basis().is_degenerate());
    }

    #[test]
    fn test_bake_is_flat_and_positional() {
        let face = unit_face([0.0, 0.0, 1.0]);
        let basis = face.tangent_basis();
        let out = face.bake(&basis);

        for (vin, vout) in face.vertices.iter().zip(out.iter()) {
            assert_eq!(vin.uv, vout.uv);
            assert_eq!(vin.normal, vout.normal);
            assert_eq!(vin.position, vout.position);
            assert_eq!(vout.tangent, [1.0, 0.0, 0.0]);
            assert_eq!(vout.bitangent, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn test_calculate_normal() {
        let normal = unit_face([0.0, 0.0, 1.0]).calculate_normal();
        assert_relative_eq!(normal, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_faces_requires_whole_triangles() {
        let v = VertexIn::default();
        assert!(faces(&[v, v]).is_err());
        assert!(faces(&[]).is_err());
        let vertices: Vec<VertexIn> = (0..6)
            .map(|i| VertexIn::new([0.0, 0.0], [0.0, 0.0, 1.0], [i as f32, 0.0, 0.0]))
            .collect();
        let split = faces(&vertices).unwrap();
        assert_eq!(split.len(), 2);
        assert_eq!(split[1].vertices[0].position, [3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_triangulate_duplicates_shared_vertices() {
        let quad = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let flat = triangulate(&quad, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        assert_eq!(
            flat,
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
        );
    }

    #[test]
    fn test_triangulate_out_of_range() {
        let result = triangulate(&[1u8, 2, 3], &[[0, 1, 3]]);
        assert!(matches!(
            result,
            Err(BakeError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_face_normals_replicated() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let normals = face_normals(&positions).unwrap();
        assert_eq!(normals.len(), 3);
        for n in normals {
            assert_relative_eq!(n, Vector3::new(-1.0, 0.0, 0.0));
        }
    }
}

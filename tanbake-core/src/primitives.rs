//! Procedural primitives in the pre-bake layout
//!
//! The flat 2-D helpers ([`primitive_square`], [`primitive_quad`]) are
//! library API for callers building their own screen-space geometry.
use nalgebra::Point3;

use crate::bake::Baker;
use crate::error::Result;
use crate::layout::{encode, ScreenVertex, VertexIn};

/// Depth of the full-screen triangle, just in front of the far plane
pub const SCREEN_DEPTH: f32 = 0.9999;

/// Corner indices of the cube, two triangles per side
const CUBE_INDICES: [[usize; 3]; 12] = [
    [0, 2, 3],
    [0, 1, 2],
    [1, 7, 2],
    [1, 6, 7],
    [6, 5, 4],
    [4, 7, 6],
    [3, 4, 5],
    [3, 5, 0],
    [3, 7, 4],
    [3, 2, 7],
    [0, 6, 1],
    [0, 5, 6],
];

const CUBE_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// UV unwrap, indexed per sub-triangle into `CUBE_UVS`
const CUBE_UV_INDICES: [[usize; 3]; 12] = [
    [0, 2, 3],
    [0, 1, 2],
    [0, 2, 3],
    [0, 1, 2],
    [0, 1, 2],
    [2, 3, 0],
    [2, 3, 0],
    [2, 0, 1],
    [0, 2, 3],
    [0, 1, 2],
    [3, 1, 2],
    [3, 0, 1],
];

/// One normal per side, in the order the sides appear in `CUBE_INDICES`
const CUBE_NORMALS: [[f32; 3]; 6] = [
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0],
    [0.0, 0.0, -1.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
];

/// Axis-aligned box the cube is stretched to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    fn corners(&self) -> [[f32; 3]; 8] {
        let (xm, ym, zm) = (self.min.x, self.min.y, self.min.z);
        let (xx, yx, zx) = (self.max.x, self.max.y, self.max.z);
        [
            [xm, ym, zx],
            [xx, ym, zx],
            [xx, yx, zx],
            [xm, yx, zx],
            [xm, yx, zm],
            [xm, ym, zm],
            [xx, ym, zm],
            [xx, yx, zm],
        ]
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
    }
}

/// 2-D rectangle for the flat helpers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Rect {
    pub fn new(min: [f32; 2], max: [f32; 2]) -> Self {
        Self { min, max }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new([-1.0, -1.0], [1.0, 1.0])
    }
}

/// Flat-shaded cube: 6 sides x 2 triangles x 3 vertices
pub fn cube(bounds: &BoundingBox) -> Vec<VertexIn> {
    let corners = bounds.corners();
    CUBE_INDICES
        .iter()
        .zip(CUBE_UV_INDICES.iter())
        .enumerate()
        .flat_map(|(triangle, (corner, uv))| {
            let normal = CUBE_NORMALS[triangle / 2];
            (0..3).map(move |k| VertexIn::new(CUBE_UVS[uv[k]], normal, corners[corner[k]]))
        })
        .collect()
}

/// Pre-bake buffer of [`cube`]
pub fn cube_bytes(bounds: &BoundingBox) -> Vec<u8> {
    encode(&cube(bounds))
}

/// Post-bake buffer of [`cube`]
pub fn baked_cube(baker: &Baker, bounds: &BoundingBox) -> Result<Vec<u8>> {
    baker.bake(&cube_bytes(bounds))
}

/// Right triangle covering `rect` with its right angle at `rect.min`
pub fn primitive_triangle(rect: &Rect) -> [[f32; 2]; 3] {
    let ([xm, ym], [xx, yx]) = (rect.min, rect.max);
    [[xm, ym], [xx, ym], [xm, yx]]
}

/// Two triangles covering `rect`
pub fn primitive_square(rect: &Rect) -> [[f32; 2]; 6] {
    let ([xm, ym], [xx, yx]) = (rect.min, rect.max);
    [[xm, ym], [xx, ym], [xx, yx], [xm, ym], [xx, yx], [xm, yx]]
}

/// Corners of `rect`, counter-clockwise from `rect.min`
pub fn primitive_quad(rect: &Rect) -> [[f32; 2]; 4] {
    let ([xm, ym], [xx, yx]) = (rect.min, rect.max);
    [[xm, ym], [xx, ym], [xx, yx], [xm, yx]]
}

/// Oversized triangle that covers clip space, for full-screen passes.
///
/// Not baked: the records carry a position only.
pub fn screen_triangle() -> [ScreenVertex; 3] {
    primitive_triangle(&Rect::new([-1.0, -1.0], [3.0, 3.0])).map(|[x, y]| ScreenVertex {
        position: [x, y, SCREEN_DEPTH],
    })
}

pub fn screen_triangle_bytes() -> Vec<u8> {
    encode(&screen_triangle())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::triangulate;
    use crate::layout::{decode_baked, POST_BAKE_STRIDE, PRE_BAKE_STRIDE};
    use nalgebra::Vector3;

    #[test]
    fn test_cube_vertex_count() {
        let vertices = cube(&BoundingBox::default());
        assert_eq!(vertices.len(), 36);
        assert_eq!(cube_bytes(&BoundingBox::default()).len(), 36 * PRE_BAKE_STRIDE);
    }

    #[test]
    fn test_baked_cube_stride() {
        let baked = baked_cube(&Baker::portable(), &BoundingBox::default()).unwrap();
        assert_eq!(baked.len(), 36 * POST_BAKE_STRIDE);
        assert_eq!(decode_baked(&baked).unwrap().len(), 36);
    }

    #[test]
    fn test_cube_normals_match_winding() {
        let vertices = cube(&BoundingBox::default());
        for triangle in vertices.chunks_exact(3) {
            let p: Vec<Vector3<f32>> = triangle.iter().map(|v| Vector3::from(v.position)).collect();
            let winding = (p[1] - p[0]).cross(&(p[2] - p[0])).normalize();
            let normal = Vector3::from(triangle[0].normal);
            assert!(winding.dot(&normal) > 0.999, "normal {:?} vs winding {:?}", normal, winding);
            assert!(triangle.iter().all(|v| v.normal == triangle[0].normal));
        }
    }

    #[test]
    fn test_cube_respects_bounds() {
        let bounds = BoundingBox::new(Point3::new(0.0, 1.0, 2.0), Point3::new(3.0, 5.0, 4.0));
        for v in cube(&bounds) {
            assert!(v.position[0] == 0.0 || v.position[0] == 3.0);
            assert!(v.position[1] == 1.0 || v.position[1] == 5.0);
            assert!(v.position[2] == 2.0 || v.position[2] == 4.0);
        }
    }

    #[test]
    fn test_cube_front_face_tangent() {
        // Front side spans 2 units per UV unit on the default box
        let baked = decode_baked(&baked_cube(&Baker::portable(), &BoundingBox::default()).unwrap()).unwrap();
        assert_eq!(baked[0].tangent, [2.0, 0.0, 0.0]);
        assert_eq!(baked[0].bitangent, [0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_cube_matches_index_tables() {
        let bounds = BoundingBox::default();
        let positions = triangulate(&bounds.corners(), &CUBE_INDICES).unwrap();
        let uvs = triangulate(&CUBE_UVS, &CUBE_UV_INDICES).unwrap();
        for ((v, position), uv) in cube(&bounds).iter().zip(positions).zip(uvs) {
            assert_eq!(v.position, position);
            assert_eq!(v.uv, uv);
        }
    }

    #[test]
    fn test_screen_triangle() {
        let tri = screen_triangle();
        assert_eq!(tri[0].position, [-1.0, -1.0, SCREEN_DEPTH]);
        assert_eq!(tri[1].position, [3.0, -1.0, SCREEN_DEPTH]);
        assert_eq!(tri[2].position, [-1.0, 3.0, SCREEN_DEPTH]);
        assert_eq!(screen_triangle_bytes().len(), 36);
    }

    #[test]
    fn test_flat_helpers() {
        let rect = Rect::default();
        assert_eq!(primitive_triangle(&rect), [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0]]);
        assert_eq!(primitive_square(&rect).len(), 6);
        assert_eq!(primitive_quad(&rect)[2], [1.0, 1.0]);
    }
}

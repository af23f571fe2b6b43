//! Interleaved vertex buffer layouts for the pre-bake and post-bake stages
//!
//! Buffers carry no header, length prefix or padding. Floats are 32-bit
//! IEEE-754 in native byte order, tightly packed, one record after another.
use bytemuck::{Pod, Zeroable};
use nom::{
    combinator::all_consuming,
    multi::count,
    number::{complete::f32 as float32, Endianness},
    sequence::tuple,
    IResult,
};

use crate::error::{BakeError, Result};

pub const SIZE_OF_FLOAT: usize = 4;
pub const FLOATS_PER_VERTEX_IN: usize = 8;
pub const FLOATS_PER_VERTEX_OUT: usize = 14;
pub const VERTICES_PER_FACE: usize = 3;

/// Stride of one pre-bake vertex: uv(8) normal(12) position(12)
pub const PRE_BAKE_STRIDE: usize = FLOATS_PER_VERTEX_IN * SIZE_OF_FLOAT;
/// Stride of one post-bake vertex: uv(8) bitangent(12) tangent(12) normal(12) position(12)
pub const POST_BAKE_STRIDE: usize = FLOATS_PER_VERTEX_OUT * SIZE_OF_FLOAT;
/// Stride of one full-screen pass vertex: position(12)
pub const SCREEN_STRIDE: usize = 3 * SIZE_OF_FLOAT;

pub const PRE_BAKE_FACE_BYTES: usize = VERTICES_PER_FACE * PRE_BAKE_STRIDE;
pub const POST_BAKE_FACE_BYTES: usize = VERTICES_PER_FACE * POST_BAKE_STRIDE;

/// Pre-bake vertex record
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct VertexIn {
    pub uv: [f32; 2],
    pub normal: [f32; 3],
    pub position: [f32; 3],
}

impl VertexIn {
    pub fn new(uv: [f32; 2], normal: [f32; 3], position: [f32; 3]) -> Self {
        Self {
            uv,
            normal,
            position,
        }
    }
}

/// Post-bake vertex record
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct VertexOut {
    pub uv: [f32; 2],
    pub bitangent: [f32; 3],
    pub tangent: [f32; 3],
    pub normal: [f32; 3],
    pub position: [f32; 3],
}

/// Position-only record used by full-screen passes
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ScreenVertex {
    pub position: [f32; 3],
}

/// Fail unless `len` is a positive multiple of `unit`
pub fn check_face_aligned(len: usize, unit: usize) -> Result<()> {
    if len == 0 || len % unit != 0 {
        return Err(BakeError::InvalidBufferSize { len, unit });
    }
    Ok(())
}

/// Size in bytes of the post-bake buffer produced from `input_len` pre-bake bytes
pub fn baked_len(input_len: usize) -> usize {
    (input_len / PRE_BAKE_STRIDE) * POST_BAKE_STRIDE
}

/// Reinterpret a slice of records as the raw wire buffer
pub fn encode<T: Pod>(records: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(records).to_vec()
}

/// Decode a pre-bake buffer. The length must cover whole faces.
///
/// This is the bake hot path: the bytes are copied once into aligned
/// records, whatever the alignment of `data`.
pub fn decode_vertices(data: &[u8]) -> Result<Vec<VertexIn>> {
    check_face_aligned(data.len(), PRE_BAKE_FACE_BYTES)?;
    Ok(bytemuck::allocation::pod_collect_to_vec(data))
}

/// Decode a post-bake buffer field by field. The length must cover whole faces.
pub fn decode_baked(data: &[u8]) -> Result<Vec<VertexOut>> {
    check_face_aligned(data.len(), POST_BAKE_FACE_BYTES)?;
    let vertex_count = data.len() / POST_BAKE_STRIDE;
    run(data, all_consuming(count(vertex_out, vertex_count)))
}

fn run<'a, O>(
    data: &'a [u8],
    mut parser: impl FnMut(&'a [u8]) -> IResult<&'a [u8], O>,
) -> Result<O> {
    match parser(data) {
        Ok((_, output)) => Ok(output),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(BakeError::Decode(format!(
            "{:?} at byte {}",
            e.code,
            data.len() - e.input.len()
        ))),
        Err(nom::Err::Incomplete(needed)) => {
            Err(BakeError::Decode(format!("incomplete record: {:?}", needed)))
        }
    }
}

fn native_f32(input: &[u8]) -> IResult<&[u8], f32> {
    float32(Endianness::Native)(input)
}

fn vec2(input: &[u8]) -> IResult<&[u8], [f32; 2]> {
    let (input, (x, y)) = tuple((native_f32, native_f32))(input)?;
    Ok((input, [x, y]))
}

fn vec3(input: &[u8]) -> IResult<&[u8], [f32; 3]> {
    let (input, (x, y, z)) = tuple((native_f32, native_f32, native_f32))(input)?;
    Ok((input, [x, y, z]))
}

fn vertex_out(input: &[u8]) -> IResult<&[u8], VertexOut> {
    let (input, (uv, bitangent, tangent, normal, position)) =
        tuple((vec2, vec3, vec3, vec3, vec3))(input)?;
    Ok((
        input,
        VertexOut {
            uv,
            bitangent,
            tangent,
            normal,
            position,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_face() -> [VertexIn; 3] {
        [
            VertexIn::new([0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 0.0]),
            VertexIn::new([1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
            VertexIn::new([0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ]
    }

    #[test]
    fn test_record_sizes() {
        assert_eq!(std::mem::size_of::<VertexIn>(), PRE_BAKE_STRIDE);
        assert_eq!(std::mem::size_of::<VertexOut>(), POST_BAKE_STRIDE);
        assert_eq!(std::mem::size_of::<ScreenVertex>(), SCREEN_STRIDE);
        assert_eq!(PRE_BAKE_STRIDE, 32);
        assert_eq!(POST_BAKE_STRIDE, 56);
    }

    #[test]
    fn test_baked_len() {
        assert_eq!(baked_len(96), 168);
        assert_eq!(baked_len(36 * 32), 36 * 56);
    }

    #[test]
    fn test_rejects_unaligned_length() {
        let result = decode_vertices(&[0u8; 33]);
        assert!(matches!(
            result,
            Err(BakeError::InvalidBufferSize { len: 33, unit: 96 })
        ));
    }

    #[test]
    fn test_rejects_partial_face() {
        // One whole vertex is still not a whole face
        let result = decode_vertices(&[0u8; 32]);
        assert!(matches!(result, Err(BakeError::InvalidBufferSize { .. })));
    }

    #[test]
    fn test_rejects_empty_buffer() {
        assert!(matches!(
            decode_vertices(&[]),
            Err(BakeError::InvalidBufferSize { len: 0, .. })
        ));
    }

    #[test]
    fn test_decode_from_unaligned_offset() {
        let face = sample_face();
        let mut data = vec![0xAAu8];
        data.extend_from_slice(&encode(&face));

        let decoded = decode_vertices(&data[1..]).unwrap();
        assert_eq!(decoded, face.to_vec());
    }

    #[test]
    fn test_field_order_on_the_wire() {
        let vertex = VertexIn::new([1.0, 2.0], [3.0, 4.0, 5.0], [6.0, 7.0, 8.0]);
        let bytes = encode(&[vertex]);
        let floats: Vec<f32> = bytes
            .chunks_exact(SIZE_OF_FLOAT)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        assert_eq!(floats, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_decode_baked_requires_whole_faces() {
        assert!(decode_baked(&[0u8; POST_BAKE_STRIDE]).is_err());
        let records = decode_baked(&[0u8; POST_BAKE_FACE_BYTES]).unwrap();
        assert_eq!(records.len(), 3);
    }
}

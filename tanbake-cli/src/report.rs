//! Coloured terminal summaries of vertex buffers
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Vector3;
use std::io::Write;
use tanbake_core::layout::{POST_BAKE_STRIDE, PRE_BAKE_STRIDE, SCREEN_STRIDE};
use tanbake_core::{ScreenVertex, VertexIn, VertexOut};

/// Statistics gathered from one buffer
#[derive(Debug, Clone, PartialEq)]
pub struct MeshReport {
    pub label: String,
    pub stride: usize,
    pub vertices: usize,
    pub bounds: Option<([f32; 3], [f32; 3])>,
    /// Shortest and longest tangent, post-bake buffers only
    pub tangent_length: Option<(f32, f32)>,
    /// Vertices whose tangent or bitangent has an Inf/NaN component
    pub non_finite: usize,
}

impl MeshReport {
    pub fn pre_bake(label: &str, vertices: &[VertexIn]) -> Self {
        Self {
            label: label.to_string(),
            stride: PRE_BAKE_STRIDE,
            vertices: vertices.len(),
            bounds: bounds(vertices.iter().map(|v| v.position)),
            tangent_length: None,
            non_finite: 0,
        }
    }

    pub fn baked(label: &str, vertices: &[VertexOut]) -> Self {
        let mut lengths = vertices
            .iter()
            .filter(|v| v.tangent.iter().all(|c| c.is_finite()))
            .map(|v| Vector3::from(v.tangent).norm());
        let tangent_length = lengths
            .next()
            .map(|first| lengths.fold((first, first), |(lo, hi), l| (lo.min(l), hi.max(l))));

        let non_finite = vertices
            .iter()
            .filter(|v| {
                v.tangent
                    .iter()
                    .chain(v.bitangent.iter())
                    .any(|c| !c.is_finite())
            })
            .count();

        Self {
            label: label.to_string(),
            stride: POST_BAKE_STRIDE,
            vertices: vertices.len(),
            bounds: bounds(vertices.iter().map(|v| v.position)),
            tangent_length,
            non_finite,
        }
    }

    pub fn screen(label: &str, vertices: &[ScreenVertex]) -> Self {
        Self {
            label: label.to_string(),
            stride: SCREEN_STRIDE,
            vertices: vertices.len(),
            bounds: bounds(vertices.iter().map(|v| v.position)),
            tangent_length: None,
            non_finite: 0,
        }
    }

    pub fn faces(&self) -> usize {
        self.vertices / 3
    }

    pub fn bytes(&self) -> usize {
        self.vertices * self.stride
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.queue(SetForegroundColor(Color::Cyan))?;
        writer.queue(Print(format!("{}\n", self.label)))?;
        writer.queue(ResetColor)?;

        row(writer, "vertices", &self.vertices.to_string())?;
        row(writer, "faces", &self.faces().to_string())?;
        row(writer, "stride", &format!("{} bytes", self.stride))?;
        row(writer, "size", &format!("{} bytes", self.bytes()))?;

        if let Some((min, max)) = self.bounds {
            row(
                writer,
                "bounds",
                &format!(
                    "({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
                    min[0], min[1], min[2], max[0], max[1], max[2]
                ),
            )?;
        }

        if let Some((lo, hi)) = self.tangent_length {
            row(writer, "tangent length", &format!("{:.4} .. {:.4}", lo, hi))?;
        }

        if self.stride == POST_BAKE_STRIDE {
            let color = if self.non_finite == 0 {
                Color::Green
            } else {
                Color::Yellow
            };
            writer.queue(Print(format!("  {:<16}", "non-finite")))?;
            writer.queue(SetForegroundColor(color))?;
            writer.queue(Print(format!("{}\n", self.non_finite)))?;
            writer.queue(ResetColor)?;
        }

        writer.flush()
    }
}

fn row<W: Write>(writer: &mut W, key: &str, value: &str) -> std::io::Result<()> {
    writer.queue(SetForegroundColor(Color::DarkGrey))?;
    writer.queue(Print(format!("  {:<16}", key)))?;
    writer.queue(ResetColor)?;
    writer.queue(Print(format!("{}\n", value)))?;
    Ok(())
}

fn bounds(positions: impl Iterator<Item = [f32; 3]>) -> Option<([f32; 3], [f32; 3])> {
    positions.fold(None, |acc, p| match acc {
        None => Some((p, p)),
        Some((mut min, mut max)) => {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
            Some((min, max))
        }
    })
}

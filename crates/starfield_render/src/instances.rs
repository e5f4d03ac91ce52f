//! GPU instance packing
//!
//! Converts a recorded frame into flat instance buffers a GPU host can upload
//! directly: one [`DiscInstance`] per star and one [`LineInstance`] per
//! stroked segment. All types derive Pod and Zeroable for safe buffer casts.

use bytemuck::{Pod, Zeroable};
use starfield_core::Paint;
use starfield_math::{Rgba, Vec2};

use crate::recording::DrawCommand;

/// A filled disc
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DiscInstance {
    /// Center in surface pixels
    pub center: [f32; 2],
    pub radius: f32,
    /// Padding to align to 16 bytes
    pub _padding: f32,
    /// RGBA color
    pub color: [f32; 4],
}

/// A stroked line with per-endpoint colors
///
/// Gradients are resolved to the endpoint colors; the shader interpolates
/// linearly along the segment.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LineInstance {
    pub from: [f32; 2],
    pub to: [f32; 2],
    /// RGBA color at `from`
    pub color_from: [f32; 4],
    /// RGBA color at `to`
    pub color_to: [f32; 4],
    pub width: f32,
    /// Padding to align to 16 bytes
    pub _padding: [f32; 3],
}

/// Instance buffers for one frame
#[derive(Clone, Debug, Default)]
pub struct InstanceBatch {
    pub discs: Vec<DiscInstance>,
    pub lines: Vec<LineInstance>,
}

impl InstanceBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Pack a command list
    ///
    /// Clears reset the batch, so passing several frames keeps only the last.
    pub fn from_commands(commands: &[DrawCommand]) -> Self {
        let mut batch = Self::new();
        for command in commands {
            batch.push(command);
        }
        batch
    }

    /// Add a single command
    pub fn push(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::Clear { .. } => self.clear(),
            DrawCommand::Disc { center, radius, color } => self.discs.push(DiscInstance {
                center: center.to_array(),
                radius: *radius,
                _padding: 0.0,
                color: color.to_array(),
            }),
            DrawCommand::Line { from, to, stroke } => self.lines.push(LineInstance {
                from: from.to_array(),
                to: to.to_array(),
                color_from: sample_paint(&stroke.paint, *from).to_array(),
                color_to: sample_paint(&stroke.paint, *to).to_array(),
                width: stroke.width,
                _padding: [0.0; 3],
            }),
        }
    }

    /// Drop all instances
    pub fn clear(&mut self) {
        self.discs.clear();
        self.lines.clear();
    }

    /// Disc buffer as raw bytes
    pub fn disc_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.discs)
    }

    /// Line buffer as raw bytes
    pub fn line_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.lines)
    }

    /// Total instance count
    pub fn len(&self) -> usize {
        self.discs.len() + self.lines.len()
    }

    /// Check if the batch is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Color of a paint at a point
///
/// Gradients project the point onto the gradient axis and interpolate between
/// the two stops, clamping outside them.
pub fn sample_paint(paint: &Paint, point: Vec2) -> Rgba {
    match paint {
        Paint::Solid(color) => *color,
        Paint::LinearGradient { start, end, stops } => {
            let axis = *end - *start;
            let len_sq = axis.length_squared();
            let t = if len_sq > 0.0 {
                ((point - *start).dot(axis) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };

            let [a, b] = stops;
            let span = b.offset - a.offset;
            let local = if span > 0.0 {
                ((t - a.offset) / span).clamp(0.0, 1.0)
            } else if t < b.offset {
                0.0
            } else {
                1.0
            };
            lerp_color(a.color, b.color, local)
        }
    }
}

fn lerp_color(a: Rgba, b: Rgba, t: f32) -> Rgba {
    Rgba::new(
        a.r + (b.r - a.r) * t,
        a.g + (b.g - a.g) * t,
        a.b + (b.b - a.b) * t,
        a.a + (b.a - a.a) * t,
    )
}

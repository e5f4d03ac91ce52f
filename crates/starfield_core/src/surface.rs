//! Drawing surface abstraction
//!
//! The host owns the actual surface (a canvas, a window, an offscreen
//! buffer). The simulation only sees it through these traits: it resizes the
//! surface once at init and otherwise only issues draw calls.

use starfield_math::{Rgba, Size2, Vec2};

/// A color stop on a linear gradient
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient (0.0 = start, 1.0 = end)
    pub offset: f32,
    pub color: Rgba,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// How a stroke is colored
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    /// Single color
    Solid(Rgba),
    /// Two-stop linear gradient between two points
    LinearGradient {
        start: Vec2,
        end: Vec2,
        stops: [GradientStop; 2],
    },
}

/// Stroke style for lines
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub paint: Paint,
    pub width: f32,
}

impl Stroke {
    /// Solid stroke of the given color and width
    pub fn solid(color: Rgba, width: f32) -> Self {
        Self { paint: Paint::Solid(color), width }
    }
}

/// 2D drawing context of a surface
pub trait DrawContext {
    /// Clear a rectangle to transparent
    fn clear_rect(&mut self, origin: Vec2, extent: Vec2);

    /// Fill a disc
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    /// Stroke a straight line segment
    fn stroke_line(&mut self, from: Vec2, to: Vec2, stroke: &Stroke);
}

/// A drawable surface owned by the host
pub trait Surface {
    /// Current pixel size of the surface
    fn size(&self) -> Size2;

    /// Set the pixel size of the surface
    fn resize(&mut self, size: Size2);

    /// Size of the full viewport the surface should cover
    fn viewport(&self) -> Size2;

    /// Drawing context, or `None` when the surface is detached/unavailable
    fn context(&mut self) -> Option<&mut dyn DrawContext>;
}

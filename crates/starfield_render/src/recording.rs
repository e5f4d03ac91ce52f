//! Recording surface
//!
//! A [`Surface`] that keeps every draw call as a [`DrawCommand`] instead of
//! rasterizing. Used by the headless runner and by tests, and as the input to
//! instance packing for GPU hosts.

use starfield_core::{DrawContext, Stroke, Surface};
use starfield_math::{Rgba, Size2, Vec2};

/// A recorded draw call
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Clear a rectangle to transparent
    Clear { origin: Vec2, extent: Vec2 },
    /// Filled disc
    Disc { center: Vec2, radius: f32, color: Rgba },
    /// Stroked line segment
    Line { from: Vec2, to: Vec2, stroke: Stroke },
}

/// Surface that records draw commands
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    size: Size2,
    viewport: Size2,
    attached: bool,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// Create a surface for a viewport of the given size
    ///
    /// The surface starts at zero size; the simulation sizes it on init.
    pub fn new(viewport: Size2) -> Self {
        Self {
            size: Size2::default(),
            viewport,
            attached: true,
            commands: Vec::new(),
        }
    }

    /// Change the viewport (does not resize the surface itself)
    pub fn set_viewport(&mut self, viewport: Size2) {
        self.viewport = viewport;
    }

    /// Attach or detach the drawing context
    pub fn set_attached(&mut self, attached: bool) {
        if self.attached != attached {
            log::debug!("Recording surface {}", if attached { "attached" } else { "detached" });
        }
        self.attached = attached;
    }

    /// Whether a drawing context is available
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// All recorded commands
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the list empty
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Commands since the most recent clear (the latest frame)
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear { .. }))
            .unwrap_or(0);
        &self.commands[start..]
    }

    /// Number of recorded line commands
    pub fn line_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Line { .. })).count()
    }

    /// Number of recorded disc commands
    pub fn disc_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Disc { .. })).count()
    }
}

impl DrawContext for RecordingSurface {
    fn clear_rect(&mut self, origin: Vec2, extent: Vec2) {
        self.commands.push(DrawCommand::Clear { origin, extent });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Disc { center, radius, color });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, stroke: &Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke: stroke.clone() });
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size2 {
        self.size
    }

    fn resize(&mut self, size: Size2) {
        self.size = size;
    }

    fn viewport(&self) -> Size2 {
        self.viewport
    }

    fn context(&mut self) -> Option<&mut dyn DrawContext> {
        if self.attached {
            Some(self)
        } else {
            None
        }
    }
}

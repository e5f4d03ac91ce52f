//! Starfield rendering backends
//!
//! The simulation draws through `starfield_core::DrawContext`. This crate
//! provides the backends that do not need a windowing system:
//!
//! - [`RecordingSurface`] - Records draw calls as [`DrawCommand`]s
//! - [`InstanceBatch`] - Packs a recorded frame into Pod instance buffers

pub mod instances;
pub mod recording;

pub use instances::{sample_paint, DiscInstance, InstanceBatch, LineInstance};
pub use recording::{DrawCommand, RecordingSurface};

// Re-export core types for convenience
pub use starfield_core::{DrawContext, Paint, Stroke, Surface};

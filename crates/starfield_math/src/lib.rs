//! 2D Mathematics Library
//!
//! This crate provides the small set of geometric and color types shared by
//! the starfield engine crates.
//!
//! ## Core Types
//!
//! - [`Vec2`] - 2D point/vector in surface pixels
//! - [`Size2`] - Pixel extent of a drawing surface
//! - [`Rgba`] - Color with hex string parsing

mod vec2;
pub mod color;

pub use vec2::{Vec2, Size2};
pub use color::{Rgba, ColorParseError};

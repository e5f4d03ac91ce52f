//! Starfield - animated starfield background
//!
//! Library half of the `starfield` binary: configuration loading and the
//! systems that drive a [`starfield_core::Simulation`] without a window.

pub mod config;
pub mod systems;

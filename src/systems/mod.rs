//! Application systems
//!
//! Frame pacing and the headless runner, kept out of main.rs so they can be
//! tested on their own.

mod frame_loop;
mod headless;

pub use frame_loop::{FrameLoopSystem, Pacing, MAX_FRAME_STEP};
pub use headless::{HeadlessRunner, RunSummary};

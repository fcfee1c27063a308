//! Recorded frame (draw stream) types.
//!
//! Responsibilities:
//! - hold the clip-space geometry the graphics context produced, in issue order
//! - group consecutive primitives that share pipeline state into batches
//! - carry overlay text runs for the glyph renderer

mod cmd;
mod frame;

pub use cmd::{Batch, BatchKind, ClearOp, ClipVertex, TextRun};
pub use frame::Frame;

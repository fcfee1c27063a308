//! GPU rendering subsystem.
//!
//! Renderers consume a recorded [`Frame`](crate::scene::Frame) and issue
//! wgpu commands. Each renderer owns its GPU resources (pipelines, buffers)
//! and creates them lazily on first use.
//!
//! Convention:
//! - mesh geometry arrives already in clip space
//! - viewports and text positions arrive in GL window pixels and are
//!   flipped to top-left origin here

mod common;
mod ctx;
pub mod mesh;
pub mod text;

pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::MeshRenderer;
pub use text::TextRenderer;

//! Coordinate types shared by the graphics context and the renderers.
//!
//! Two pixel spaces meet here:
//! - GL window space: origin bottom-left, +Y up (what `Gl::viewport` and
//!   `Gl::draw_text` speak)
//! - surface space: origin top-left, +Y down (what wgpu viewports and the
//!   glyph renderer speak)

mod viewport;

pub use viewport::{Viewport, ViewportRect};

//! Immediate-mode graphics context.
//!
//! [`Gl`] is the fixed-function surface scene code draws against: matrix
//! stacks, `begin`/`vertex`/`end` emission, current color, viewport and
//! projection setup, clear/flush and bitmap text.
//!
//! Two implementations live here:
//! - [`Immediate`] transforms vertices on the CPU and records a
//!   [`Frame`](crate::scene::Frame) for the wgpu backend
//! - [`Recorder`] keeps every call verbatim, for asserting call sequences

mod immediate;
mod recorder;

use std::fmt;

use crate::paint::Color;

pub use immediate::Immediate;
pub use recorder::{GlCall, Recorder};

/// Primitive assembly mode for `begin`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Primitive {
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
    Quads,
    QuadStrip,
}

impl Primitive {
    /// Whether the primitive rasterizes as lines rather than filled triangles.
    #[inline]
    pub fn is_line(self) -> bool {
        matches!(self, Primitive::Lines | Primitive::LineStrip | Primitive::LineLoop)
    }
}

/// Matrix stack targeted by matrix operations.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum MatrixMode {
    #[default]
    ModelView,
    Projection,
}

/// Color interpolation across a primitive.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum ShadeModel {
    /// Every vertex of a primitive takes the provoking vertex color.
    Flat,
    #[default]
    Smooth,
}

/// Server-side capabilities toggled with `enable`/`disable`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Capability {
    DepthTest,
}

/// Buffers cleared by `clear`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR: ClearMask = ClearMask { color: true, depth: false };
    pub const DEPTH: ClearMask = ClearMask { color: false, depth: true };
    pub const COLOR_DEPTH: ClearMask = ClearMask { color: true, depth: true };
}

impl std::ops::BitOr for ClearMask {
    type Output = ClearMask;

    fn bitor(self, rhs: ClearMask) -> ClearMask {
        ClearMask {
            color: self.color || rhs.color,
            depth: self.depth || rhs.depth,
        }
    }
}

/// Misuse of the context. Errors are recorded, never raised: the offending
/// call has no effect, exactly like a fixed-function driver.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum GlError {
    /// Call not allowed in the current state (e.g. a transform inside `begin`/`end`).
    InvalidOperation(&'static str),
    /// Argument out of range.
    InvalidValue(&'static str),
    StackOverflow(MatrixMode),
    StackUnderflow(MatrixMode),
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlError::InvalidOperation(call) => write!(f, "invalid operation: {call}"),
            GlError::InvalidValue(what) => write!(f, "invalid value: {what}"),
            GlError::StackOverflow(mode) => write!(f, "{mode:?} matrix stack overflow"),
            GlError::StackUnderflow(mode) => write!(f, "{mode:?} matrix stack underflow"),
        }
    }
}

impl std::error::Error for GlError {}

/// Fixed-function drawing surface.
///
/// Angles are in degrees. Matrix operations post-multiply the current
/// matrix of the stack selected by [`Gl::matrix_mode`].
pub trait Gl {
    fn clear_color(&mut self, color: Color);
    fn clear(&mut self, mask: ClearMask);
    fn shade_model(&mut self, model: ShadeModel);
    fn enable(&mut self, cap: Capability);
    fn disable(&mut self, cap: Capability);

    /// Sets the viewport in window pixels, origin bottom-left.
    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    fn matrix_mode(&mut self, mode: MatrixMode);
    fn load_identity(&mut self);
    fn push_matrix(&mut self);
    fn pop_matrix(&mut self);
    fn translate(&mut self, x: f32, y: f32, z: f32);
    fn rotate(&mut self, angle: f32, x: f32, y: f32, z: f32);
    fn scale(&mut self, x: f32, y: f32, z: f32);

    /// Multiplies the current matrix by a symmetric perspective frustum
    /// (`fovy` in degrees).
    fn perspective(&mut self, fovy: f32, aspect: f32, near: f32, far: f32);

    fn color(&mut self, color: Color);
    fn begin(&mut self, primitive: Primitive);
    fn vertex(&mut self, x: f32, y: f32, z: f32);
    fn end(&mut self);

    /// Draws a line of bitmap text with its baseline at `(x, y)` in window
    /// pixels, origin bottom-left. The current viewport has no effect.
    fn draw_text(&mut self, x: i32, y: i32, color: Color, font: &str, size: f32, text: &str);

    fn flush(&mut self);

    /// Opaque current color from components.
    fn color3(&mut self, r: f32, g: f32, b: f32) {
        self.color(Color::rgb(r, g, b));
    }
}

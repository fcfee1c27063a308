use bytemuck::{Pod, Zeroable};

use crate::coords::ViewportRect;
use crate::paint::Color;

/// Vertex after the model-view and projection transforms.
///
/// `position` is homogeneous clip space with wgpu's `[0, w]` depth range.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ClipVertex {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

impl ClipVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x4, // position
        1 => Float32x4  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ClipVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// How a batch's vertex list is assembled.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BatchKind {
    /// Every 3 vertices form a triangle.
    Triangles,
    /// Every 2 vertices form a line segment.
    Lines,
}

/// Consecutive primitives sharing kind, viewport and depth state.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub kind: BatchKind,
    pub viewport: ViewportRect,
    pub depth_test: bool,
    pub vertices: Vec<ClipVertex>,
}

impl Batch {
    #[inline]
    pub fn primitive_count(&self) -> usize {
        match self.kind {
            BatchKind::Triangles => self.vertices.len() / 3,
            BatchKind::Lines => self.vertices.len() / 2,
        }
    }
}

/// Buffers to clear before the frame's batches are drawn.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearOp {
    /// Clear color, or `None` to keep the previous contents.
    pub color: Option<Color>,
    pub depth: bool,
}

/// One line of overlay text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Baseline start in GL window pixels (origin bottom-left).
    pub x: i32,
    pub y: i32,
    pub color: Color,
    /// Requested face name; resolved by the font system with fallback.
    pub font: String,
    /// Size in pixels.
    pub size: f32,
    pub text: String,
}

use crate::paint::Color;

use super::{Capability, ClearMask, Gl, MatrixMode, Primitive, ShadeModel};

/// One call made against a [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    ClearColor(Color),
    Clear(ClearMask),
    ShadeModel(ShadeModel),
    Enable(Capability),
    Disable(Capability),
    Viewport { x: i32, y: i32, width: u32, height: u32 },
    MatrixMode(MatrixMode),
    LoadIdentity,
    PushMatrix,
    PopMatrix,
    Translate([f32; 3]),
    Rotate { angle: f32, axis: [f32; 3] },
    Scale([f32; 3]),
    Perspective { fovy: f32, aspect: f32, near: f32, far: f32 },
    Color(Color),
    Begin(Primitive),
    Vertex([f32; 3]),
    End,
    DrawText { x: i32, y: i32, color: Color, font: String, size: f32, text: String },
    Flush,
}

/// [`Gl`] implementation that records calls without executing them.
///
/// Used to pin down the exact call sequence scene code issues.
#[derive(Debug, Default)]
pub struct Recorder {
    calls: Vec<GlCall>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Returns the recorded calls and starts over.
    pub fn take(&mut self) -> Vec<GlCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Index of the first call matching `pred`.
    pub fn position(&self, pred: impl Fn(&GlCall) -> bool) -> Option<usize> {
        self.calls.iter().position(pred)
    }

    pub fn count(&self, pred: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    fn push(&mut self, call: GlCall) {
        self.calls.push(call);
    }
}

impl Gl for Recorder {
    fn clear_color(&mut self, color: Color) {
        self.push(GlCall::ClearColor(color));
    }

    fn clear(&mut self, mask: ClearMask) {
        self.push(GlCall::Clear(mask));
    }

    fn shade_model(&mut self, model: ShadeModel) {
        self.push(GlCall::ShadeModel(model));
    }

    fn enable(&mut self, cap: Capability) {
        self.push(GlCall::Enable(cap));
    }

    fn disable(&mut self, cap: Capability) {
        self.push(GlCall::Disable(cap));
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.push(GlCall::Viewport { x, y, width, height });
    }

    fn matrix_mode(&mut self, mode: MatrixMode) {
        self.push(GlCall::MatrixMode(mode));
    }

    fn load_identity(&mut self) {
        self.push(GlCall::LoadIdentity);
    }

    fn push_matrix(&mut self) {
        self.push(GlCall::PushMatrix);
    }

    fn pop_matrix(&mut self) {
        self.push(GlCall::PopMatrix);
    }

    fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.push(GlCall::Translate([x, y, z]));
    }

    fn rotate(&mut self, angle: f32, x: f32, y: f32, z: f32) {
        self.push(GlCall::Rotate { angle, axis: [x, y, z] });
    }

    fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.push(GlCall::Scale([x, y, z]));
    }

    fn perspective(&mut self, fovy: f32, aspect: f32, near: f32, far: f32) {
        self.push(GlCall::Perspective { fovy, aspect, near, far });
    }

    fn color(&mut self, color: Color) {
        self.push(GlCall::Color(color));
    }

    fn begin(&mut self, primitive: Primitive) {
        self.push(GlCall::Begin(primitive));
    }

    fn vertex(&mut self, x: f32, y: f32, z: f32) {
        self.push(GlCall::Vertex([x, y, z]));
    }

    fn end(&mut self) {
        self.push(GlCall::End);
    }

    fn draw_text(&mut self, x: i32, y: i32, color: Color, font: &str, size: f32, text: &str) {
        self.push(GlCall::DrawText {
            x,
            y,
            color,
            font: font.to_string(),
            size,
            text: text.to_string(),
        });
    }

    fn flush(&mut self) {
        self.push(GlCall::Flush);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_call_order() {
        let mut gl = Recorder::new();
        gl.push_matrix();
        gl.color3(1.0, 0.0, 0.0);
        gl.pop_matrix();

        assert_eq!(
            gl.calls(),
            &[
                GlCall::PushMatrix,
                GlCall::Color(Color::rgb(1.0, 0.0, 0.0)),
                GlCall::PopMatrix,
            ]
        );
    }

    #[test]
    fn take_empties_the_log() {
        let mut gl = Recorder::new();
        gl.flush();
        assert_eq!(gl.take(), vec![GlCall::Flush]);
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn position_and_count_filter_calls() {
        let mut gl = Recorder::new();
        gl.begin(Primitive::Quads);
        gl.vertex(0.0, 0.0, 0.0);
        gl.vertex(1.0, 0.0, 0.0);
        gl.end();

        assert_eq!(gl.position(|c| matches!(c, GlCall::End)), Some(3));
        assert_eq!(gl.count(|c| matches!(c, GlCall::Vertex(_))), 2);
    }
}

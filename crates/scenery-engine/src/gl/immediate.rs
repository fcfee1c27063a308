use glam::{Mat4, Vec3, Vec4};

use crate::coords::ViewportRect;
use crate::paint::Color;
use crate::scene::{BatchKind, ClipVertex, Frame, TextRun};

use super::{Capability, ClearMask, Gl, GlError, MatrixMode, Primitive, ShadeModel};

const MODELVIEW_STACK_DEPTH: usize = 32;
const PROJECTION_STACK_DEPTH: usize = 4;

/// Maps GL clip-space depth (`[-w, w]`) onto wgpu's `[0, w]`.
const GL_TO_WGPU_CLIP: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 0.5, 0.0, //
    0.0, 0.0, 0.5, 1.0, //
]);

#[derive(Debug, Clone)]
struct MatrixStack {
    mode: MatrixMode,
    stack: Vec<Mat4>,
    max_depth: usize,
}

impl MatrixStack {
    fn new(mode: MatrixMode, max_depth: usize) -> Self {
        Self { mode, stack: vec![Mat4::IDENTITY], max_depth }
    }

    #[inline]
    fn top(&self) -> Mat4 {
        self.stack.last().copied().unwrap_or(Mat4::IDENTITY)
    }

    #[inline]
    fn top_mut(&mut self) -> &mut Mat4 {
        if self.stack.is_empty() {
            self.stack.push(Mat4::IDENTITY);
        }
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push(&mut self) -> Result<(), GlError> {
        if self.stack.len() >= self.max_depth {
            return Err(GlError::StackOverflow(self.mode));
        }
        self.stack.push(self.top());
        Ok(())
    }

    fn pop(&mut self) -> Result<(), GlError> {
        if self.stack.len() <= 1 {
            return Err(GlError::StackUnderflow(self.mode));
        }
        self.stack.pop();
        Ok(())
    }

    #[inline]
    fn multiply(&mut self, m: Mat4) {
        let top = self.top_mut();
        *top *= m;
    }
}

#[derive(Debug, Clone)]
struct Pending {
    primitive: Primitive,
    vertices: Vec<ClipVertex>,
}

/// CPU-side fixed-function context that records a [`Frame`].
///
/// State persists across frames (matrices, viewport, colors, capabilities);
/// only the recorded geometry is handed out by [`Immediate::take_frame`].
///
/// Vertices are transformed to clip space as they are emitted, so a batch
/// needs no per-draw uniforms on the GPU side.
#[derive(Debug, Clone)]
pub struct Immediate {
    modelview: MatrixStack,
    projection: MatrixStack,
    mode: MatrixMode,

    color: Color,
    clear_color: Color,
    shade: ShadeModel,
    depth_test: bool,
    viewport: ViewportRect,
    /// Window size in pixels; text raster positions are window coordinates.
    surface: (u32, u32),

    pending: Option<Pending>,
    scratch: Vec<ClipVertex>,

    frame: Frame,
    errors: Vec<GlError>,
}

impl Default for Immediate {
    fn default() -> Self {
        Self {
            modelview: MatrixStack::new(MatrixMode::ModelView, MODELVIEW_STACK_DEPTH),
            projection: MatrixStack::new(MatrixMode::Projection, PROJECTION_STACK_DEPTH),
            mode: MatrixMode::ModelView,
            color: Color::WHITE,
            clear_color: Color::rgba(0.0, 0.0, 0.0, 0.0),
            shade: ShadeModel::Smooth,
            depth_test: false,
            viewport: ViewportRect::default(),
            surface: (0, 0),
            pending: None,
            scratch: Vec::new(),
            frame: Frame::new(),
            errors: Vec::new(),
        }
    }
}

impl Immediate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context whose viewport already covers a `width` × `height` surface.
    pub fn with_viewport(width: u32, height: u32) -> Self {
        Self {
            viewport: ViewportRect::new(0, 0, width, height),
            surface: (width, height),
            ..Self::default()
        }
    }

    /// Window size that bounds text raster positions. The viewport is not touched.
    pub fn set_surface_size(&mut self, width: u32, height: u32) {
        self.surface = (width, height);
    }

    /// Hands out the frame recorded so far and starts an empty one.
    ///
    /// A primitive still open between `begin` and `end` is dropped.
    pub fn take_frame(&mut self) -> Frame {
        if self.pending.take().is_some() {
            self.record(GlError::InvalidOperation("frame taken inside begin/end"));
        }
        std::mem::take(&mut self.frame)
    }

    /// Frame recorded so far.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn errors(&self) -> &[GlError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<GlError> {
        std::mem::take(&mut self.errors)
    }

    pub fn current_viewport(&self) -> ViewportRect {
        self.viewport
    }

    pub fn depth_test_enabled(&self) -> bool {
        self.depth_test
    }

    /// Top of the given matrix stack.
    pub fn matrix(&self, mode: MatrixMode) -> Mat4 {
        match mode {
            MatrixMode::ModelView => self.modelview.top(),
            MatrixMode::Projection => self.projection.top(),
        }
    }

    pub fn stack_depth(&self, mode: MatrixMode) -> usize {
        match mode {
            MatrixMode::ModelView => self.modelview.stack.len(),
            MatrixMode::Projection => self.projection.stack.len(),
        }
    }

    #[inline]
    fn record(&mut self, err: GlError) {
        log::trace!("gl error: {err}");
        self.errors.push(err);
    }

    /// Rejects state changes between `begin` and `end`. Returns `true` when the call may proceed.
    #[inline]
    fn outside_begin(&mut self, call: &'static str) -> bool {
        if self.pending.is_some() {
            self.record(GlError::InvalidOperation(call));
            return false;
        }
        true
    }

    #[inline]
    fn current_stack(&mut self) -> &mut MatrixStack {
        match self.mode {
            MatrixMode::ModelView => &mut self.modelview,
            MatrixMode::Projection => &mut self.projection,
        }
    }

    fn multiply_current(&mut self, call: &'static str, m: Mat4) {
        if self.outside_begin(call) {
            self.current_stack().multiply(m);
        }
    }

    fn assemble(&mut self, pending: Pending) {
        let Pending { primitive, vertices } = pending;
        let flat = self.shade == ShadeModel::Flat;
        let out = &mut self.scratch;
        out.clear();

        let mut emit = |idx: &[usize], provoking: usize| {
            for &i in idx {
                let mut v = vertices[i];
                if flat {
                    v.color = vertices[provoking].color;
                }
                out.push(v);
            }
        };

        let n = vertices.len();
        match primitive {
            Primitive::Triangles => {
                for t in 0..n / 3 {
                    let b = t * 3;
                    emit(&[b, b + 1, b + 2], b + 2);
                }
            }
            Primitive::TriangleStrip => {
                for i in 2..n {
                    // Keep a consistent winding: odd triangles swap their first two vertices.
                    if i % 2 == 0 {
                        emit(&[i - 2, i - 1, i], i);
                    } else {
                        emit(&[i - 1, i - 2, i], i);
                    }
                }
            }
            Primitive::TriangleFan => {
                for i in 2..n {
                    emit(&[0, i - 1, i], i);
                }
            }
            Primitive::Quads => {
                for q in 0..n / 4 {
                    let b = q * 4;
                    emit(&[b, b + 1, b + 2, b, b + 2, b + 3], b + 3);
                }
            }
            Primitive::QuadStrip => {
                for q in 0..n.saturating_sub(2) / 2 {
                    let b = q * 2;
                    emit(&[b, b + 1, b + 3, b, b + 3, b + 2], b + 3);
                }
            }
            Primitive::Lines => {
                for l in 0..n / 2 {
                    let b = l * 2;
                    emit(&[b, b + 1], b + 1);
                }
            }
            Primitive::LineStrip => {
                for i in 1..n {
                    emit(&[i - 1, i], i);
                }
            }
            Primitive::LineLoop => {
                for i in 1..n {
                    emit(&[i - 1, i], i);
                }
                if n > 2 {
                    emit(&[n - 1, 0], 0);
                }
            }
        }

        let kind = if primitive.is_line() { BatchKind::Lines } else { BatchKind::Triangles };
        self.frame.push_geometry(kind, self.viewport, self.depth_test, &self.scratch);
    }
}

impl Gl for Immediate {
    fn clear_color(&mut self, color: Color) {
        if self.outside_begin("clear_color") {
            self.clear_color = color.clamped();
        }
    }

    fn clear(&mut self, mask: ClearMask) {
        if !self.outside_begin("clear") {
            return;
        }
        let color = mask.color.then_some(self.clear_color);
        self.frame.record_clear(color, mask.depth);
    }

    fn shade_model(&mut self, model: ShadeModel) {
        if self.outside_begin("shade_model") {
            self.shade = model;
        }
    }

    fn enable(&mut self, cap: Capability) {
        if self.outside_begin("enable") {
            match cap {
                Capability::DepthTest => self.depth_test = true,
            }
        }
    }

    fn disable(&mut self, cap: Capability) {
        if self.outside_begin("disable") {
            match cap {
                Capability::DepthTest => self.depth_test = false,
            }
        }
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        if self.outside_begin("viewport") {
            self.viewport = ViewportRect::new(x, y, width, height);
        }
    }

    fn matrix_mode(&mut self, mode: MatrixMode) {
        if self.outside_begin("matrix_mode") {
            self.mode = mode;
        }
    }

    fn load_identity(&mut self) {
        if self.outside_begin("load_identity") {
            *self.current_stack().top_mut() = Mat4::IDENTITY;
        }
    }

    fn push_matrix(&mut self) {
        if !self.outside_begin("push_matrix") {
            return;
        }
        if let Err(e) = self.current_stack().push() {
            self.record(e);
        }
    }

    fn pop_matrix(&mut self) {
        if !self.outside_begin("pop_matrix") {
            return;
        }
        if let Err(e) = self.current_stack().pop() {
            self.record(e);
        }
    }

    fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.multiply_current("translate", Mat4::from_translation(Vec3::new(x, y, z)));
    }

    fn rotate(&mut self, angle: f32, x: f32, y: f32, z: f32) {
        let axis = Vec3::new(x, y, z);
        // A zero axis has no rotation; fixed-function drivers leave the matrix alone.
        let m = match axis.try_normalize() {
            Some(axis) => Mat4::from_axis_angle(axis, angle.to_radians()),
            None => Mat4::IDENTITY,
        };
        self.multiply_current("rotate", m);
    }

    fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.multiply_current("scale", Mat4::from_scale(Vec3::new(x, y, z)));
    }

    fn perspective(&mut self, fovy: f32, aspect: f32, near: f32, far: f32) {
        if !(near > 0.0 && far > near && aspect > 0.0 && fovy > 0.0 && fovy < 180.0) {
            if self.outside_begin("perspective") {
                self.record(GlError::InvalidValue("perspective frustum"));
            }
            return;
        }
        self.multiply_current(
            "perspective",
            Mat4::perspective_rh_gl(fovy.to_radians(), aspect, near, far),
        );
    }

    fn color(&mut self, color: Color) {
        // Legal inside begin/end: sets the color of the following vertices.
        self.color = color;
    }

    fn begin(&mut self, primitive: Primitive) {
        if !self.outside_begin("begin") {
            return;
        }
        self.pending = Some(Pending { primitive, vertices: Vec::new() });
    }

    fn vertex(&mut self, x: f32, y: f32, z: f32) {
        let Some(pending) = self.pending.as_mut() else {
            // Outside begin/end a vertex is simply undefined; nothing to record.
            return;
        };
        let mvp = GL_TO_WGPU_CLIP * self.projection.top() * self.modelview.top();
        let clip: Vec4 = mvp * Vec4::new(x, y, z, 1.0);
        pending.vertices.push(ClipVertex {
            position: clip.to_array(),
            color: self.color.clamped().to_array(),
        });
    }

    fn end(&mut self) {
        match self.pending.take() {
            Some(pending) => self.assemble(pending),
            None => self.record(GlError::InvalidOperation("end without begin")),
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, color: Color, font: &str, size: f32, text: &str) {
        if !self.outside_begin("draw_text") || text.is_empty() {
            return;
        }

        // Window coordinates: the viewport neither offsets nor clips text.
        let (w, h) = self.surface;
        if x < 0 || y < 0 || x as u32 >= w || y as u32 >= h {
            log::trace!("text '{text}' at ({x}, {y}) lies outside the {w}x{h} window; dropped");
            return;
        }

        self.frame.push_text(TextRun {
            x,
            y,
            color: color.clamped(),
            font: font.to_string(),
            size,
            text: text.to_string(),
        });
    }

    fn flush(&mut self) {
        if self.outside_begin("flush") {
            self.frame.flushed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn quad(gl: &mut Immediate) {
        gl.begin(Primitive::Quads);
        gl.color3(1.0, 0.0, 0.0);
        gl.vertex(-1.0, -1.0, 0.0);
        gl.vertex(1.0, -1.0, 0.0);
        gl.color3(0.0, 0.0, 1.0);
        gl.vertex(1.0, 1.0, 0.0);
        gl.color3(0.0, 1.0, 0.0);
        gl.vertex(-1.0, 1.0, 0.0);
        gl.end();
    }

    // ── matrix stacks ─────────────────────────────────────────────────────

    #[test]
    fn push_pop_restores_matrix() {
        let mut gl = Immediate::new();
        gl.translate(1.0, 2.0, 3.0);
        let before = gl.matrix(MatrixMode::ModelView);

        gl.push_matrix();
        gl.rotate(90.0, 0.0, 1.0, 0.0);
        gl.scale(2.0, 2.0, 2.0);
        gl.pop_matrix();

        assert_eq!(gl.matrix(MatrixMode::ModelView), before);
        assert!(gl.errors().is_empty());
    }

    #[test]
    fn pop_on_empty_stack_records_underflow() {
        let mut gl = Immediate::new();
        gl.pop_matrix();
        assert_eq!(gl.errors(), &[GlError::StackUnderflow(MatrixMode::ModelView)]);
        assert_eq!(gl.stack_depth(MatrixMode::ModelView), 1);
    }

    #[test]
    fn projection_stack_overflows_at_its_depth() {
        let mut gl = Immediate::new();
        gl.matrix_mode(MatrixMode::Projection);
        for _ in 0..PROJECTION_STACK_DEPTH {
            gl.push_matrix();
        }
        assert_eq!(gl.stack_depth(MatrixMode::Projection), PROJECTION_STACK_DEPTH);
        assert_eq!(gl.errors(), &[GlError::StackOverflow(MatrixMode::Projection)]);
    }

    #[test]
    fn matrix_mode_selects_stack() {
        let mut gl = Immediate::new();
        gl.matrix_mode(MatrixMode::Projection);
        gl.translate(0.0, 0.0, -5.0);
        gl.matrix_mode(MatrixMode::ModelView);
        assert_eq!(gl.matrix(MatrixMode::ModelView), Mat4::IDENTITY);
        assert_ne!(gl.matrix(MatrixMode::Projection), Mat4::IDENTITY);

        gl.matrix_mode(MatrixMode::Projection);
        gl.load_identity();
        assert_eq!(gl.matrix(MatrixMode::Projection), Mat4::IDENTITY);
    }

    #[test]
    fn transforms_compose_in_call_order() {
        let mut gl = Immediate::with_viewport(10, 10);
        gl.translate(1.0, 0.0, 0.0);
        gl.scale(2.0, 2.0, 2.0);
        gl.begin(Primitive::Lines);
        gl.vertex(1.0, 0.0, 0.0);
        gl.vertex(0.0, 0.0, 0.0);
        gl.end();

        let v = gl.frame().batches[0].vertices[0].position;
        // scale first (x = 2), then translate (x = 3)
        assert!(approx(v[0], 3.0));
    }

    // ── begin/end rules ───────────────────────────────────────────────────

    #[test]
    fn transforms_inside_begin_are_rejected() {
        let mut gl = Immediate::new();
        gl.begin(Primitive::Quads);
        gl.rotate(270.0, 0.0, 1.0, 0.0);
        gl.translate(0.0, -1.3, 0.0);
        gl.scale(50.0, 50.0, 50.0);
        gl.end();

        assert_eq!(gl.matrix(MatrixMode::ModelView), Mat4::IDENTITY);
        assert_eq!(
            gl.errors(),
            &[
                GlError::InvalidOperation("rotate"),
                GlError::InvalidOperation("translate"),
                GlError::InvalidOperation("scale"),
            ]
        );
    }

    #[test]
    fn end_without_begin_is_an_error() {
        let mut gl = Immediate::new();
        gl.end();
        assert_eq!(gl.take_errors(), vec![GlError::InvalidOperation("end without begin")]);
        assert!(gl.errors().is_empty());
    }

    #[test]
    fn vertex_outside_begin_is_ignored() {
        let mut gl = Immediate::new();
        gl.vertex(0.0, 0.0, 0.0);
        assert!(gl.frame().is_empty());
    }

    // ── assembly ──────────────────────────────────────────────────────────

    #[test]
    fn quad_becomes_two_triangles() {
        let mut gl = Immediate::with_viewport(10, 10);
        quad(&mut gl);
        let batch = &gl.frame().batches[0];
        assert_eq!(batch.kind, BatchKind::Triangles);
        assert_eq!(batch.primitive_count(), 2);
    }

    #[test]
    fn flat_shading_uses_provoking_vertex_color() {
        let mut gl = Immediate::with_viewport(10, 10);
        gl.shade_model(ShadeModel::Flat);
        quad(&mut gl);
        let green = Color::rgb(0.0, 1.0, 0.0).to_array();
        assert!(gl.frame().batches[0].vertices.iter().all(|v| v.color == green));
    }

    #[test]
    fn smooth_shading_keeps_vertex_colors() {
        let mut gl = Immediate::with_viewport(10, 10);
        quad(&mut gl);
        let first = gl.frame().batches[0].vertices[0].color;
        assert_eq!(first, Color::rgb(1.0, 0.0, 0.0).to_array());
    }

    #[test]
    fn strip_fan_and_quad_strip_counts() {
        let mut gl = Immediate::with_viewport(10, 10);
        for prim in [Primitive::TriangleStrip, Primitive::TriangleFan, Primitive::QuadStrip] {
            gl.begin(prim);
            for i in 0..6 {
                gl.vertex(i as f32, (i % 2) as f32, 0.0);
            }
            gl.end();
        }
        // strip: 4 triangles, fan: 4 triangles, quad strip: 2 quads = 4 triangles
        assert_eq!(gl.frame().batches[0].primitive_count(), 12);
    }

    #[test]
    fn line_loop_closes() {
        let mut gl = Immediate::with_viewport(10, 10);
        gl.begin(Primitive::LineLoop);
        gl.vertex(0.0, 0.0, 0.0);
        gl.vertex(1.0, 0.0, 0.0);
        gl.vertex(1.0, 1.0, 0.0);
        gl.end();
        let batch = &gl.frame().batches[0];
        assert_eq!(batch.kind, BatchKind::Lines);
        assert_eq!(batch.primitive_count(), 3);
    }

    #[test]
    fn incomplete_primitives_are_dropped() {
        let mut gl = Immediate::with_viewport(10, 10);
        gl.begin(Primitive::Triangles);
        gl.vertex(0.0, 0.0, 0.0);
        gl.vertex(1.0, 0.0, 0.0);
        gl.end();
        assert!(gl.frame().batches.is_empty());
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn perspective_maps_near_and_far_to_wgpu_depth_range() {
        let mut gl = Immediate::with_viewport(100, 100);
        gl.matrix_mode(MatrixMode::Projection);
        gl.perspective(60.0, 1.0, 1.0, 100.0);
        gl.matrix_mode(MatrixMode::ModelView);

        gl.begin(Primitive::Lines);
        gl.vertex(0.0, 0.0, -1.0);
        gl.vertex(0.0, 0.0, -100.0);
        gl.end();

        let vs = &gl.frame().batches[0].vertices;
        let near = vs[0].position;
        let far = vs[1].position;
        assert!(approx(near[2] / near[3], 0.0));
        assert!(approx(far[2] / far[3], 1.0));
    }

    #[test]
    fn degenerate_perspective_is_rejected() {
        let mut gl = Immediate::new();
        gl.matrix_mode(MatrixMode::Projection);
        gl.perspective(60.0, 0.0, 1.0, 100.0);
        assert_eq!(gl.matrix(MatrixMode::Projection), Mat4::IDENTITY);
        assert_eq!(gl.errors(), &[GlError::InvalidValue("perspective frustum")]);
    }

    // ── frame state ───────────────────────────────────────────────────────

    #[test]
    fn batches_carry_viewport_and_depth_state() {
        let mut gl = Immediate::with_viewport(800, 600);
        gl.enable(Capability::DepthTest);
        quad(&mut gl);
        let batch = &gl.frame().batches[0];
        assert!(batch.depth_test);
        assert_eq!(batch.viewport, ViewportRect::new(0, 0, 800, 600));
    }

    #[test]
    fn clear_uses_clear_color() {
        let mut gl = Immediate::new();
        gl.clear_color(Color::rgba(0.0, 0.0, 0.0, 1.0));
        gl.clear(ClearMask::COLOR | ClearMask::DEPTH);
        let clear = gl.frame().clear.unwrap();
        assert_eq!(clear.color, Some(Color::rgba(0.0, 0.0, 0.0, 1.0)));
        assert!(clear.depth);
    }

    #[test]
    fn text_positions_ignore_the_viewport() {
        let mut gl = Immediate::with_viewport(800, 600);
        gl.viewport(400, 0, 400, 300);
        gl.draw_text(370, 70, Color::rgb(1.0, 1.0, 0.0), "Helvetica", 12.0, "hello");
        // outside the 400x300 viewport but inside the window
        gl.draw_text(500, 450, Color::WHITE, "Helvetica", 12.0, "upper");
        gl.draw_text(10, 10, Color::WHITE, "Helvetica", 12.0, "");
        gl.draw_text(800, 10, Color::WHITE, "Helvetica", 12.0, "offscreen");
        gl.draw_text(-1, 10, Color::WHITE, "Helvetica", 12.0, "offscreen");

        let placed: Vec<(i32, i32)> = gl.frame().texts.iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(placed, vec![(370, 70), (500, 450)]);
        assert_eq!(gl.current_viewport(), ViewportRect::new(400, 0, 400, 300));
    }

    #[test]
    fn surface_size_bounds_text_without_moving_viewport() {
        let mut gl = Immediate::new();
        gl.draw_text(5, 5, Color::WHITE, "Helvetica", 12.0, "no window yet");
        assert!(gl.frame().texts.is_empty());

        gl.set_surface_size(100, 50);
        gl.draw_text(5, 5, Color::WHITE, "Helvetica", 12.0, "visible");
        assert_eq!(gl.frame().texts.len(), 1);
        assert_eq!(gl.current_viewport(), ViewportRect::default());
    }

    #[test]
    fn take_frame_resets_recording_but_keeps_state() {
        let mut gl = Immediate::with_viewport(10, 10);
        gl.enable(Capability::DepthTest);
        quad(&mut gl);
        gl.flush();

        let frame = gl.take_frame();
        assert!(frame.flushed);
        assert_eq!(frame.batches.len(), 1);
        assert!(gl.frame().is_empty());
        assert!(!gl.frame().flushed);
        assert!(gl.depth_test_enabled());
    }
}

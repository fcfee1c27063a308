use scenery_engine::gl::{Gl, Primitive};
use scenery_engine::paint::Color;

/// Square line grid in the XZ plane, centred on the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Grid {
    /// Lines run from `-half_extent` to `half_extent` on both axes.
    pub half_extent: i32,
    pub color: Color,
}

impl Default for Grid {
    fn default() -> Self {
        Self { half_extent: 10, color: Color::rgb(0.4, 0.4, 0.4) }
    }
}

impl Grid {
    pub fn render(&self, gl: &mut dyn Gl) {
        if self.half_extent <= 0 {
            return;
        }
        let n = self.half_extent as f32;

        gl.color(self.color);
        gl.begin(Primitive::Lines);
        for i in -self.half_extent..=self.half_extent {
            let t = i as f32;
            gl.vertex(t, 0.0, -n);
            gl.vertex(t, 0.0, n);
            gl.vertex(-n, 0.0, t);
            gl.vertex(n, 0.0, t);
        }
        gl.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenery_engine::gl::{GlCall, Recorder};

    #[test]
    fn default_grid_has_21_lines_each_way() {
        let mut gl = Recorder::new();
        Grid::default().render(&mut gl);
        assert_eq!(gl.count(|c| matches!(c, GlCall::Vertex(_))), 21 * 4);
        assert_eq!(gl.count(|c| *c == GlCall::Begin(Primitive::Lines)), 1);
    }

    #[test]
    fn empty_grid_draws_nothing() {
        let mut gl = Recorder::new();
        Grid { half_extent: 0, ..Grid::default() }.render(&mut gl);
        assert!(gl.calls().is_empty());
    }
}

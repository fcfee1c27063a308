use crate::gl::{Gl, Primitive};

use super::slice_table;

/// Open-ended (optionally tapered) tube.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Cylinder {
    pub base_radius: f32,
    pub top_radius: f32,
    pub height: f32,
    /// Subdivisions around the Z axis.
    pub slices: u32,
    /// Subdivisions along the Z axis.
    pub stacks: u32,
}

impl Default for Cylinder {
    fn default() -> Self {
        Self {
            base_radius: 1.0,
            top_radius: 1.0,
            height: 1.0,
            slices: 20,
            stacks: 20,
        }
    }
}

impl Cylinder {
    /// Emits one quad strip per stack using the current color.
    ///
    /// Fewer than 2 slices or 0 stacks draws nothing.
    pub fn render(&self, gl: &mut dyn Gl) {
        if self.slices < 2 || self.stacks == 0 {
            return;
        }

        let ring = slice_table(self.slices);
        let delta_r = (self.top_radius - self.base_radius) / self.stacks as f32;
        let delta_z = self.height / self.stacks as f32;

        for j in 0..self.stacks {
            let (r0, z0) = (self.base_radius + delta_r * j as f32, delta_z * j as f32);
            let (r1, z1) = (r0 + delta_r, z0 + delta_z);

            gl.begin(Primitive::QuadStrip);
            for &(s, c) in &ring {
                gl.vertex(r0 * s, r0 * c, z0);
                gl.vertex(r1 * s, r1 * c, z1);
            }
            gl.end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{GlCall, Recorder};

    #[test]
    fn one_strip_per_stack() {
        let mut gl = Recorder::new();
        let cyl = Cylinder { slices: 8, stacks: 3, ..Cylinder::default() };
        cyl.render(&mut gl);

        assert_eq!(gl.count(|c| *c == GlCall::Begin(Primitive::QuadStrip)), 3);
        assert_eq!(gl.count(|c| matches!(c, GlCall::Vertex(_))), 3 * 2 * 9);
    }

    #[test]
    fn spans_zero_to_height_along_z() {
        let mut gl = Recorder::new();
        let cyl = Cylinder { height: 4.0, slices: 4, stacks: 2, ..Cylinder::default() };
        cyl.render(&mut gl);

        let zs: Vec<f32> = gl
            .calls()
            .iter()
            .filter_map(|c| if let GlCall::Vertex(v) = c { Some(v[2]) } else { None })
            .collect();
        let min = zs.iter().copied().fold(f32::INFINITY, f32::min);
        let max = zs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert_eq!((min, max), (0.0, 4.0));
    }

    #[test]
    fn taper_interpolates_radius() {
        let mut gl = Recorder::new();
        let cone = Cylinder { base_radius: 2.0, top_radius: 0.0, height: 1.0, slices: 4, stacks: 1 };
        cone.render(&mut gl);

        // Second vertex of the strip is on the top ring (radius 0).
        let GlCall::Vertex(top) = gl.calls()[2] else { panic!("expected vertex") };
        assert_eq!((top[0], top[1]), (0.0, 0.0));
        let GlCall::Vertex(base) = gl.calls()[1] else { panic!("expected vertex") };
        assert!((base[1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_tessellation_draws_nothing() {
        let mut gl = Recorder::new();
        Cylinder { slices: 1, ..Cylinder::default() }.render(&mut gl);
        Cylinder { stacks: 0, ..Cylinder::default() }.render(&mut gl);
        assert!(gl.calls().is_empty());
    }
}

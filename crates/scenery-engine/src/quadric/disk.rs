use crate::gl::{Gl, Primitive};

use super::slice_table;

/// Flat annulus (or full disk when `inner_radius` is 0) in the `z = 0` plane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Disk {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub slices: u32,
    /// Concentric rings between the inner and outer radius.
    pub loops: u32,
}

impl Default for Disk {
    fn default() -> Self {
        Self {
            inner_radius: 0.0,
            outer_radius: 1.0,
            slices: 20,
            loops: 1,
        }
    }
}

impl Disk {
    /// Emits one quad strip per loop, or a fan for a solid center loop.
    ///
    /// Fewer than 2 slices, 0 loops or `outer_radius < inner_radius` draws nothing.
    pub fn render(&self, gl: &mut dyn Gl) {
        if self.slices < 2 || self.loops == 0 || self.outer_radius < self.inner_radius {
            return;
        }

        let ring = slice_table(self.slices);
        let delta_r = (self.outer_radius - self.inner_radius) / self.loops as f32;

        for l in 0..self.loops {
            let r_in = self.inner_radius + delta_r * l as f32;
            let r_out = r_in + delta_r;

            if r_in == 0.0 {
                gl.begin(Primitive::TriangleFan);
                gl.vertex(0.0, 0.0, 0.0);
                // Reverse order keeps the fan facing +Z like the strips.
                for &(s, c) in ring.iter().rev() {
                    gl.vertex(r_out * s, r_out * c, 0.0);
                }
                gl.end();
                continue;
            }

            gl.begin(Primitive::QuadStrip);
            for &(s, c) in &ring {
                gl.vertex(r_out * s, r_out * c, 0.0);
                gl.vertex(r_in * s, r_in * c, 0.0);
            }
            gl.end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{GlCall, Recorder};

    fn radii(gl: &Recorder) -> Vec<f32> {
        gl.calls()
            .iter()
            .filter_map(|c| if let GlCall::Vertex(v) = c { Some(v[0].hypot(v[1])) } else { None })
            .collect()
    }

    #[test]
    fn annulus_stays_between_radii() {
        let mut gl = Recorder::new();
        let disk = Disk { inner_radius: 1.5, outer_radius: 2.0, slices: 100, loops: 120 };
        disk.render(&mut gl);

        assert_eq!(gl.count(|c| *c == GlCall::Begin(Primitive::QuadStrip)), 120);
        assert_eq!(gl.count(|c| matches!(c, GlCall::Vertex(_))), 120 * 2 * 101);
        assert!(radii(&gl).iter().all(|&r| r > 1.5 - 1e-4 && r < 2.0 + 1e-4));
    }

    #[test]
    fn solid_disk_starts_with_a_fan() {
        let mut gl = Recorder::new();
        Disk { slices: 6, loops: 2, ..Disk::default() }.render(&mut gl);

        assert_eq!(gl.calls()[0], GlCall::Begin(Primitive::TriangleFan));
        assert_eq!(gl.calls()[1], GlCall::Vertex([0.0, 0.0, 0.0]));
        assert_eq!(gl.count(|c| *c == GlCall::Begin(Primitive::QuadStrip)), 1);
    }

    #[test]
    fn lies_in_the_xy_plane() {
        let mut gl = Recorder::new();
        Disk::default().render(&mut gl);
        assert!(gl.calls().iter().all(|c| !matches!(c, GlCall::Vertex(v) if v[2] != 0.0)));
    }

    #[test]
    fn inverted_radii_draw_nothing() {
        let mut gl = Recorder::new();
        Disk { inner_radius: 2.0, outer_radius: 1.0, ..Disk::default() }.render(&mut gl);
        assert!(gl.calls().is_empty());
    }
}

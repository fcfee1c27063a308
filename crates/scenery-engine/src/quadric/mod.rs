//! Quadric primitives tessellated through the graphics context.
//!
//! Geometry follows the GLU conventions: a cylinder runs along +Z from
//! `z = 0` to `z = height`, a disk lies in the `z = 0` plane, and slices
//! start on +Y and advance towards +X.

mod cylinder;
mod disk;

pub use cylinder::Cylinder;
pub use disk::Disk;

use std::f32::consts::TAU;

/// `(sin, cos)` of each slice boundary, `slices + 1` entries (the last closes the ring).
fn slice_table(slices: u32) -> Vec<(f32, f32)> {
    (0..=slices)
        .map(|i| {
            // The closing entry reuses angle 0 exactly, so the seam has no crack.
            let a = if i == slices { 0.0 } else { TAU * i as f32 / slices as f32 };
            a.sin_cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_table_closes_the_ring() {
        let t = slice_table(4);
        assert_eq!(t.len(), 5);
        assert_eq!(t[0], t[4]);
        assert!((t[1].0 - 1.0).abs() < 1e-6); // quarter turn: sin = 1
    }
}

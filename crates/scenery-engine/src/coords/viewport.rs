/// Surface size in pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Pixel rectangle in GL window space (origin bottom-left).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ViewportRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ViewportRect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Converts to a top-left-origin rect on a surface `surface_height`
    /// pixels tall, as `(x, y, width, height)`.
    ///
    /// The result is not clamped to the surface; wgpu callers clamp.
    pub fn to_top_left(self, surface_height: u32) -> (f32, f32, f32, f32) {
        let top = surface_height as f32 - (self.y as f32 + self.height as f32);
        (self.x as f32, top, self.width as f32, self.height as f32)
    }

    /// Clamps the rect to a `surface_width` × `surface_height` surface and
    /// converts it to top-left origin. Returns `None` if nothing is left.
    pub fn clamped_top_left(
        self,
        surface_width: u32,
        surface_height: u32,
    ) -> Option<(f32, f32, f32, f32)> {
        let (x, y, w, h) = self.to_top_left(surface_height);
        let x0 = x.max(0.0);
        let y0 = y.max(0.0);
        let x1 = (x + w).min(surface_width as f32);
        let y1 = (y + h).min(surface_height as f32);
        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some((x0, y0, x1 - x0, y1 - y0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_surface_maps_to_origin() {
        let r = ViewportRect::new(0, 0, 800, 600);
        assert_eq!(r.to_top_left(600), (0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn bottom_right_quarter_flips_y() {
        // GL (400, 0) bottom-left is the lower half of the surface.
        let r = ViewportRect::new(400, 0, 400, 300);
        assert_eq!(r.to_top_left(600), (400.0, 300.0, 400.0, 300.0));
    }

    #[test]
    fn clamp_trims_overhang() {
        let r = ViewportRect::new(-100, 0, 300, 100);
        assert_eq!(r.clamped_top_left(200, 100), Some((0.0, 0.0, 200.0, 100.0)));
    }

    #[test]
    fn clamp_rejects_offscreen_rect() {
        let r = ViewportRect::new(500, 0, 100, 100);
        assert_eq!(r.clamped_top_left(200, 100), None);
        assert!(ViewportRect::new(0, 0, 0, 10).is_empty());
    }
}

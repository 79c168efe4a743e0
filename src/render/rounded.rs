//! Anti-aliased rounded-rectangle coverage.
//!
//! The image clip is the user-visible frame, so its corners must read as
//! smooth curves rather than stair-steps. Coverage is computed from the
//! signed distance to the rounded-rect boundary, giving a one-pixel
//! anti-aliased edge at any radius.

/// A rounded rectangle in pixel space, radius clamped to half the shorter
/// side so the corner arcs never overlap.
#[derive(Debug, Clone, Copy)]
pub struct RoundedRect {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    radius: f32,
}

impl RoundedRect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32, radius: f32) -> Self {
        let w = (x1 - x0).max(0.0);
        let h = (y1 - y0).max(0.0);
        let radius = radius.clamp(0.0, w.min(h) / 2.0);
        Self { x0, y0, x1, y1, radius }
    }

    pub fn left(&self) -> f32 {
        self.x0
    }

    pub fn top(&self) -> f32 {
        self.y0
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Signed distance from a point to the boundary (negative inside).
    fn distance(&self, px: f32, py: f32) -> f32 {
        let (cx, cy) = self.center();
        let hx = self.width() / 2.0 - self.radius;
        let hy = self.height() / 2.0 - self.radius;
        let qx = (px - cx).abs() - hx;
        let qy = (py - cy).abs() - hy;
        let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
        outside + qx.max(qy).min(0.0) - self.radius
    }

    /// Coverage of the pixel whose center is (px, py), in [0, 1].
    pub fn coverage(&self, px: f32, py: f32) -> f32 {
        if self.width() == 0.0 || self.height() == 0.0 {
            return 0.0;
        }
        (0.5 - self.distance(px, py)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_fully_covered() {
        let rr = RoundedRect::new(0.0, 0.0, 100.0, 60.0, 12.0);
        assert_eq!(rr.coverage(50.0, 30.0), 1.0);
    }

    #[test]
    fn outside_uncovered() {
        let rr = RoundedRect::new(0.0, 0.0, 100.0, 60.0, 12.0);
        assert_eq!(rr.coverage(-5.0, 30.0), 0.0);
        assert_eq!(rr.coverage(50.0, 70.0), 0.0);
    }

    #[test]
    fn zero_radius_keeps_square_corners() {
        let rr = RoundedRect::new(0.0, 0.0, 40.0, 40.0, 0.0);
        // Pixel centers just inside each corner are fully covered.
        assert_eq!(rr.coverage(0.5, 0.5), 1.0);
        assert_eq!(rr.coverage(39.5, 39.5), 1.0);
    }

    #[test]
    fn rounded_corner_is_clipped() {
        let rr = RoundedRect::new(0.0, 0.0, 40.0, 40.0, 10.0);
        // The literal corner pixel sits well outside the arc.
        assert_eq!(rr.coverage(0.5, 0.5), 0.0);
        // The arc midpoint is covered.
        let d = 10.0 - 10.0 / std::f32::consts::SQRT_2;
        assert!(rr.coverage(d + 1.5, d + 1.5) > 0.9);
    }

    #[test]
    fn edge_is_antialiased() {
        let rr = RoundedRect::new(0.0, 0.0, 40.0, 40.0, 8.0);
        // Sample along the top edge: coverage transitions smoothly.
        let on_edge = rr.coverage(20.0, 0.0);
        assert!(on_edge > 0.0 && on_edge < 1.0);
    }

    #[test]
    fn radius_clamped_to_half_extent() {
        let rr = RoundedRect::new(0.0, 0.0, 20.0, 10.0, 50.0);
        // Degenerates to a capsule, still covered at the center.
        assert_eq!(rr.coverage(10.0, 5.0), 1.0);
    }
}

//! Tiling plan computation.
//!
//! A [`TilingPlan`] fixes the scaled watermark dimensions and the grid of
//! placements for one compositing run. The policy is bit-exact and must not
//! drift: the watermark is scaled (aspect-preserving) to one quarter of the
//! base image's width, spacing between repetitions is half the scaled
//! watermark's height, and placements step from the origin by
//! `scaled dimension + spacing` while strictly inside the base image.
//!
//! Plans are computed once per watermark request and discarded after
//! compositing.

/// Divisor applied to the base width to size the watermark.
const SCALE_DIVISOR: u32 = 4;

/// Grid geometry for one compositing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilingPlan {
    base_width: u32,
    base_height: u32,
    /// Watermark width after scaling.
    pub scaled_width: u32,
    /// Watermark height after scaling (aspect-preserving).
    pub scaled_height: u32,
    /// Gap between repetitions on both axes.
    pub spacing: u32,
}

impl TilingPlan {
    /// Compute the plan for a base image and a watermark at its natural size.
    ///
    /// Degenerate inputs (base narrower than the divisor, zero-sized
    /// watermark) are clamped so the scaled watermark is at least 1x1.
    pub fn new(
        base_width: u32,
        base_height: u32,
        watermark_width: u32,
        watermark_height: u32,
    ) -> Self {
        let scaled_width = (base_width / SCALE_DIVISOR).max(1);
        let scaled_height = if watermark_width == 0 {
            1
        } else {
            let ratio = scaled_width as f64 / watermark_width as f64;
            ((watermark_height as f64 * ratio).round() as u32).max(1)
        };

        Self {
            base_width,
            base_height,
            scaled_width,
            scaled_height,
            spacing: scaled_height / 2,
        }
    }

    /// Top-left corners of every watermark repetition.
    ///
    /// X steps by `scaled_width + spacing` from 0 while strictly less than
    /// the base width; Y analogously over the height. Placements near the
    /// right/bottom edge are clipped by the compositor.
    pub fn placements(&self) -> Vec<(u32, u32)> {
        let step_x = self.scaled_width + self.spacing;
        let step_y = self.scaled_height + self.spacing;

        let mut positions = Vec::new();
        let mut y = 0;
        while y < self.base_height {
            let mut x = 0;
            while x < self.base_width {
                positions.push((x, y));
                x += step_x;
            }
            y += step_y;
        }
        positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test: the reference geometry - 800x600 base, 400x100 watermark
    #[test]
    fn test_reference_plan_dimensions() {
        let plan = TilingPlan::new(800, 600, 400, 100);
        assert_eq!(plan.scaled_width, 200);
        assert_eq!(plan.scaled_height, 50);
        assert_eq!(plan.spacing, 25);
    }

    #[test]
    fn test_reference_plan_placements() {
        let plan = TilingPlan::new(800, 600, 400, 100);
        let positions = plan.placements();

        let xs: Vec<u32> = positions.iter().filter(|(_, y)| *y == 0).map(|(x, _)| *x).collect();
        assert_eq!(xs, vec![0, 225, 450, 675]);

        let ys: Vec<u32> = positions.iter().filter(|(x, _)| *x == 0).map(|(_, y)| *y).collect();
        assert_eq!(ys, vec![0, 75, 150, 225, 300, 375, 450, 525]);

        // 4 columns x 8 rows
        assert_eq!(positions.len(), 32);
    }

    #[test]
    fn test_aspect_ratio_preserved_with_rounding() {
        // 300/4 = 75 wide; 75 * (77/123) = 46.95... rounds to 47
        let plan = TilingPlan::new(300, 300, 123, 77);
        assert_eq!(plan.scaled_width, 75);
        assert_eq!(plan.scaled_height, 47);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let a = TilingPlan::new(800, 600, 400, 100);
        let b = TilingPlan::new(800, 600, 400, 100);
        assert_eq!(a, b);
        assert_eq!(a.placements(), b.placements());
    }

    #[test]
    fn test_origin_always_covered() {
        let plan = TilingPlan::new(10, 10, 500, 500);
        assert_eq!(plan.placements()[0], (0, 0));
    }

    #[test]
    fn test_narrow_base_clamps_to_one_pixel() {
        let plan = TilingPlan::new(3, 3, 400, 100);
        assert_eq!(plan.scaled_width, 1);
        assert!(plan.scaled_height >= 1);
        assert!(!plan.placements().is_empty());
    }

    #[test]
    fn test_zero_spacing_when_watermark_is_flat() {
        // Scaled height 1 gives spacing 0; steps still advance
        let plan = TilingPlan::new(100, 4, 400, 8);
        assert_eq!(plan.scaled_height, 1);
        assert_eq!(plan.spacing, 0);
        let positions = plan.placements();
        assert_eq!(positions.iter().filter(|(x, _)| *x == 0).count(), 4);
    }
}

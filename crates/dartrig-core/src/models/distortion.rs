use serde::{Deserialize, Serialize};

use crate::math::{Real, Vec2};

/// Brown-Conrady distortion with three radial and two tangential terms.
///
/// `undistort` inverts the model by fixed-point iteration; `iters = 0`
/// falls back to the default iteration count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BrownConrady5 {
    pub k1: Real,
    pub k2: Real,
    pub k3: Real,
    pub p1: Real,
    pub p2: Real,
    #[serde(default)]
    pub iters: u32,
}

impl BrownConrady5 {
    fn distort_impl(&self, x: Real, y: Real) -> (Real, Real) {
        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let r6 = r4 * r2;

        let radial = 1.0 + self.k1 * r2 + self.k2 * r4 + self.k3 * r6;

        let x_tan = 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
        let y_tan = self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;

        (x * radial + x_tan, y * radial + y_tan)
    }

    /// Apply distortion to normalized image coordinates.
    pub fn distort(&self, n_undist: &Vec2) -> Vec2 {
        let (xd, yd) = self.distort_impl(n_undist.x, n_undist.y);
        Vec2::new(xd, yd)
    }

    /// Remove distortion from normalized image coordinates.
    pub fn undistort(&self, n_dist: &Vec2) -> Vec2 {
        let mut x = n_dist.x;
        let mut y = n_dist.y;

        let iters = if self.iters == 0 { 8 } else { self.iters };
        for _ in 0..iters {
            let (xd, yd) = self.distort_impl(x, y);
            x -= xd - n_dist.x;
            y -= yd - n_dist.y;
        }
        Vec2::new(x, y)
    }

    /// Distortion coefficients in `[k1, k2, p1, p2, k3]` order.
    pub fn coefficients(&self) -> [Real; 5] {
        [self.k1, self.k2, self.p1, self.p2, self.k3]
    }
}

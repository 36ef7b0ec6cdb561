use serde::{Deserialize, Serialize};

use crate::math::{Mat3, Real, Vec2};

/// Standard pinhole intrinsics with optional skew.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Focal length in pixels along X.
    pub fx: Real,
    /// Focal length in pixels along Y.
    pub fy: Real,
    /// Principal point X coordinate in pixels.
    pub cx: Real,
    /// Principal point Y coordinate in pixels.
    pub cy: Real,
    /// Skew term (typically 0).
    pub skew: Real,
}

impl CameraIntrinsics {
    /// Return the 3x3 camera intrinsics matrix K.
    pub fn k_matrix(&self) -> Mat3 {
        Mat3::new(
            self.fx, self.skew, self.cx, 0.0, self.fy, self.cy, 0.0, 0.0, 1.0,
        )
    }

    /// Convert normalized image coordinates into pixel coordinates.
    pub fn normalized_to_pixel(&self, n: &Vec2) -> Vec2 {
        let u = self.fx * n.x + self.skew * n.y + self.cx;
        let v = self.fy * n.y + self.cy;
        Vec2::new(u, v)
    }

    /// Convert pixel coordinates into normalized image coordinates.
    pub fn pixel_to_normalized(&self, px: &Vec2) -> Vec2 {
        let ny = (px.y - self.cy) / self.fy;
        let nx = (px.x - self.cx - self.skew * ny) / self.fx;
        Vec2::new(nx, ny)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_intrinsics() -> CameraIntrinsics {
        CameraIntrinsics {
            fx: 800.0,
            fy: 780.0,
            cx: 640.0,
            cy: 360.0,
            skew: 0.0,
        }
    }

    #[test]
    fn pixel_normalized_roundtrip() {
        let k = make_intrinsics();
        let px = Vec2::new(712.0, 388.5);
        let n = k.pixel_to_normalized(&px);
        let back = k.normalized_to_pixel(&n);
        assert_relative_eq!(back, px, epsilon = 1e-12);
    }

    #[test]
    fn k_matrix_layout() {
        let k = make_intrinsics();
        let m = k.k_matrix();
        assert_eq!(m[(0, 0)], 800.0);
        assert_eq!(m[(1, 1)], 780.0);
        assert_eq!(m[(0, 2)], 640.0);
        assert_eq!(m[(1, 2)], 360.0);
        assert_eq!(m[(2, 2)], 1.0);
    }
}

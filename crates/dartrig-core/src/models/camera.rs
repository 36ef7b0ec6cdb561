use serde::{Deserialize, Serialize};

use super::{BrownConrady5, CameraIntrinsics};
use crate::math::{Pt3, Real, Vec2, Vec3};

/// A backprojected viewing ray in the camera frame (unit direction).
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub dir: Vec3,
}

/// Pinhole camera: intrinsics plus Brown-Conrady lens distortion.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PinholeCamera {
    pub intrinsics: CameraIntrinsics,
    pub distortion: BrownConrady5,
}

impl PinholeCamera {
    pub fn new(intrinsics: CameraIntrinsics, distortion: BrownConrady5) -> Self {
        Self {
            intrinsics,
            distortion,
        }
    }

    /// Project a point expressed in the camera frame into pixels.
    ///
    /// Returns `None` for points on or behind the image plane.
    pub fn project_point(&self, p_c: &Pt3) -> Option<Vec2> {
        if p_c.z <= 0.0 {
            return None;
        }
        let n_u = Vec2::new(p_c.x / p_c.z, p_c.y / p_c.z);
        let n_d = self.distortion.distort(&n_u);
        Some(self.intrinsics.normalized_to_pixel(&n_d))
    }

    /// Backproject a pixel into a unit viewing ray in the camera frame.
    pub fn backproject_pixel(&self, px: &Vec2) -> Ray {
        let n_d = self.intrinsics.pixel_to_normalized(px);
        let n_u = self.distortion.undistort(&n_d);
        let dir = Vec3::new(n_u.x, n_u.y, 1.0);
        Ray {
            dir: dir / dir.norm(),
        }
    }

    /// Reprojection residual (pixels) for one 2D-3D correspondence.
    ///
    /// Points that do not project return `None` and must be treated as
    /// a degraded observation by the caller, not as a hard failure.
    pub fn residual(&self, p_c: &Pt3, observed: &Vec2) -> Option<Real> {
        self.project_point(p_c).map(|px| (px - observed).norm())
    }
}

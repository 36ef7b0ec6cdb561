//! Mathematical type definitions shared across the workspace.

use nalgebra::{Isometry3, Matrix3, Point2, Point3, Vector2, Vector3};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates.
pub type Pt2 = Point2<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;
/// 3D rigid transform (SE(3)) using [`Real`].
pub type Iso3 = Isometry3<Real>;

/// Convert a 2D point into homogeneous coordinates `(x, y, 1)`.
pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

/// Convert a 3D homogeneous vector `(x, y, w)` back to `(x/w, y/w)`.
///
/// The caller is responsible for ensuring that `w != 0`.
pub fn from_homogeneous(v: &Vec3) -> Pt2 {
    Pt2::new(v.x / v.z, v.y / v.z)
}

/// Geodesic angle between two rotation matrices, in radians.
///
/// Computed from the trace of `R_a^T R_b`, clamped against numerical
/// drift outside `[-1, 1]`.
pub fn rotation_angle(r_a: &Mat3, r_b: &Mat3) -> Real {
    let r_diff = r_a.transpose() * r_b;
    ((r_diff.trace() - 1.0) * 0.5).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Rotation3;

    #[test]
    fn homogeneous_roundtrip() {
        let p = Pt2::new(3.0, -2.0);
        let h = to_homogeneous(&p);
        assert_relative_eq!(from_homogeneous(&h), p);
    }

    #[test]
    fn rotation_angle_identity_is_zero() {
        let r = Mat3::identity();
        assert!(rotation_angle(&r, &r) < 1e-12);
    }

    #[test]
    fn rotation_angle_matches_axis_angle() {
        let r = Rotation3::from_euler_angles(0.0, 0.0, 0.3);
        let angle = rotation_angle(&Mat3::identity(), r.matrix());
        assert_relative_eq!(angle, 0.3, epsilon = 1e-12);
    }
}

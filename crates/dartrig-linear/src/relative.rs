//! Relative rigid transform between two cameras observing the same
//! planar marker.
//!
//! Given camera-from-marker poses `T_A` and `T_B` estimated
//! independently, the transform from camera A to camera B is
//! `R = R_B R_A^T` with `t = t_B - t_A`. The translation convention
//! (difference of camera-frame marker translations, not the composed
//! SE(3) translation) matches the rig's stored calibration data.

use dartrig_core::{rotation_angle, Iso3, Mat3, Real, Vec3};

/// Relative rotation and translation from camera A to camera B.
#[derive(Debug, Clone, Copy)]
pub struct RelativePose {
    pub rotation: Mat3,
    pub translation: Vec3,
}

/// Compose camera-from-marker poses into a relative A-to-B pose.
pub fn relative_pose(cam_a_from_marker: &Iso3, cam_b_from_marker: &Iso3) -> RelativePose {
    let r_a_binding = cam_a_from_marker.rotation.to_rotation_matrix();
    let r_b_binding = cam_b_from_marker.rotation.to_rotation_matrix();
    let r_a = r_a_binding.matrix();
    let r_b = r_b_binding.matrix();

    RelativePose {
        rotation: r_b * r_a.transpose(),
        translation: cam_b_from_marker.translation.vector - cam_a_from_marker.translation.vector,
    }
}

/// Discrepancy between two relative-pose estimates.
///
/// Returns `(rotation_angle_rad, translation_distance)`; both are zero
/// for identical estimates.
pub fn pose_discrepancy(a: &RelativePose, b: &RelativePose) -> (Real, Real) {
    let angle = rotation_angle(&a.rotation, &b.rotation);
    let dist = (a.translation - b.translation).norm();
    (angle, dist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Isometry3, Rotation3, Translation3, Vector3};

    fn make_iso(angles: (Real, Real, Real), t: (Real, Real, Real)) -> Iso3 {
        let rot = Rotation3::from_euler_angles(angles.0, angles.1, angles.2);
        let tr = Translation3::new(t.0, t.1, t.2);
        Isometry3::from_parts(tr, rot.into())
    }

    #[test]
    fn identity_for_identical_poses() {
        let pose = make_iso((0.1, -0.05, 0.2), (0.2, -0.1, 1.0));
        let rel = relative_pose(&pose, &pose);

        assert!(rotation_angle(&rel.rotation, &Mat3::identity()) < 1e-12);
        assert!(rel.translation.norm() < 1e-12);
    }

    #[test]
    fn forward_and_reverse_are_inverse() {
        let pose_a = make_iso((0.05, 0.1, -0.02), (0.0, 0.0, 1.0));
        let pose_b = make_iso((0.15, -0.05, 0.1), (0.2, -0.1, 1.1));

        let ab = relative_pose(&pose_a, &pose_b);
        let ba = relative_pose(&pose_b, &pose_a);

        let composed = ab.rotation * ba.rotation;
        assert!(rotation_angle(&composed, &Mat3::identity()) < 1e-10);
        assert!((ab.translation + ba.translation).norm() < 1e-10);
    }

    #[test]
    fn recovers_known_relative_rotation() {
        let marker_pose_in_a = make_iso((0.0, 0.0, 0.0), (0.0, 0.0, 1.0));
        let rel_gt = Rotation3::from_euler_angles(0.0, 0.2, 0.0);

        // Camera B sees the marker through the extra rotation.
        let marker_pose_in_b = Isometry3::from_parts(
            Translation3::from(rel_gt * Vector3::new(0.0, 0.0, 1.0)),
            (rel_gt * marker_pose_in_a.rotation.to_rotation_matrix()).into(),
        );

        let rel = relative_pose(&marker_pose_in_a, &marker_pose_in_b);
        assert!(rotation_angle(&rel.rotation, rel_gt.matrix()) < 1e-10);
    }

    #[test]
    fn discrepancy_is_zero_for_equal_estimates() {
        let pose_a = make_iso((0.05, 0.1, -0.02), (0.0, 0.0, 1.0));
        let pose_b = make_iso((0.15, -0.05, 0.1), (0.2, -0.1, 1.1));
        let rel = relative_pose(&pose_a, &pose_b);

        let (ang, dist) = pose_discrepancy(&rel, &rel);
        assert!(ang < 1e-12 && dist < 1e-12);
    }
}

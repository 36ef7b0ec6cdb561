use dartrig_core::{Iso3, Mat3, Real};
use nalgebra::{Matrix3, Rotation3, Translation3, UnitQuaternion, Vector3};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoseError {
    #[error("intrinsics matrix is not invertible")]
    SingularK,
    #[error("svd failed")]
    SvdFailed,
}

/// Estimate pose of a planar target (Z=0) relative to a camera, given
/// intrinsics K and homography H (plane -> image).
///
/// This is the classic decomposition of a plane-induced homography into
/// a rotation and translation. Returns an [`Iso3`] mapping target
/// coordinates into camera coordinates.
pub fn planar_pose_from_homography(kmtx: &Mat3, hmtx: &Mat3) -> Result<Iso3, PoseError> {
    let k_inv = kmtx.try_inverse().ok_or(PoseError::SingularK)?;

    let h1 = hmtx.column(0);
    let h2 = hmtx.column(1);
    let h3 = hmtx.column(2).into_owned();

    let k_inv_h1 = k_inv * h1;
    let k_inv_h2 = k_inv * h2;

    // Scale factor λ: normalize first two columns (average for robustness)
    let norm1 = k_inv_h1.norm();
    let norm2 = k_inv_h2.norm();
    let lambda = 1.0 / ((norm1 + norm2) * 0.5);

    let r1 = (lambda * k_inv_h1).into_owned();
    let r2 = (lambda * k_inv_h2).into_owned();
    let r3 = r1.cross(&r2);

    let mut r_mat = Matrix3::<Real>::zeros();
    r_mat.set_column(0, &r1);
    r_mat.set_column(1, &r2);
    r_mat.set_column(2, &r3);

    // Project onto SO(3) (polar decomposition via SVD)
    let svd = r_mat.svd(true, true);
    let u = svd.u.ok_or(PoseError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(PoseError::SvdFailed)?;
    let mut r_orth = u * v_t;

    // Ensure det(R) > 0
    if r_orth.determinant() < 0.0 {
        let mut u_flipped = u;
        u_flipped.column_mut(2).neg_mut();
        r_orth = u_flipped * v_t;
    }

    Ok(build_iso(r_orth, lambda, &k_inv, &h3))
}

fn build_iso(r_orth: Matrix3<Real>, lambda: Real, k_inv: &Mat3, h3: &Vector3<Real>) -> Iso3 {
    let t_vec: Vector3<Real> = (lambda * (k_inv * h3)).into_owned();

    let rot = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(r_orth));
    let trans = Translation3::from(t_vec);

    Iso3::from_parts(trans, rot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dartrig_core::CameraIntrinsics;
    use nalgebra::{Isometry3, Rotation3, Vector3};

    fn make_kmtx() -> Mat3 {
        CameraIntrinsics {
            fx: 800.0,
            fy: 780.0,
            cx: 640.0,
            cy: 360.0,
            skew: 0.0,
        }
        .k_matrix()
    }

    #[test]
    fn recovers_synthetic_pose() {
        let kmtx = make_kmtx();

        let rot = Rotation3::from_euler_angles(0.1, -0.05, 0.2);
        let t = Vector3::new(0.1, -0.05, 1.0);
        let iso_gt = Isometry3::from_parts(Translation3::from(t), rot.into());

        // For a plane Z=0, homography is H = K [r1 r2 t]
        let r_mat_binding = iso_gt.rotation.to_rotation_matrix();
        let r_mat = r_mat_binding.matrix();

        let mut hmtx = Mat3::zeros();
        hmtx.set_column(0, &(kmtx * r_mat.column(0)));
        hmtx.set_column(1, &(kmtx * r_mat.column(1)));
        hmtx.set_column(2, &(kmtx * iso_gt.translation.vector));

        let iso_est = planar_pose_from_homography(&kmtx, &hmtx).unwrap();

        let t_est = iso_est.translation.vector;
        assert!((t_est - iso_gt.translation.vector).norm() < 1e-3);

        let r_est_binding = iso_est.rotation.to_rotation_matrix();
        let angle = dartrig_core::rotation_angle(r_est_binding.matrix(), r_mat);
        assert!(angle < 1e-3, "rotation error too large: {}", angle);
    }

    #[test]
    fn singular_k_is_an_error() {
        let kmtx = Mat3::zeros();
        let hmtx = Mat3::identity();
        assert!(matches!(
            planar_pose_from_homography(&kmtx, &hmtx),
            Err(PoseError::SingularK)
        ));
    }
}

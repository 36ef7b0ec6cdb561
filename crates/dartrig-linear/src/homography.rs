//! Plane-to-image homography estimation.
//!
//! Normalized DLT: both point sets are Hartley-conditioned (centroid
//! at the origin, mean distance √2) before the linear solve, which
//! keeps the 2n×9 system well scaled when metric marker coordinates
//! meet pixel-magnitude detections.

use dartrig_core::{to_homogeneous, Mat3, Pt2, Real};
use nalgebra::DMatrix;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomographyError {
    #[error("need at least 4 point correspondences, got {0}")]
    NotEnoughPoints(usize),
    #[error("degenerate point configuration (coincident points)")]
    DegeneratePoints,
    #[error("svd failed")]
    SvdFailed,
}

/// Similarity transform conditioning a point set for DLT, with its
/// inverse. `None` when all points coincide.
fn conditioning_transform(points: &[Pt2]) -> Option<(Mat3, Mat3)> {
    let n = points.len() as Real;
    let cx = points.iter().map(|p| p.x).sum::<Real>() / n;
    let cy = points.iter().map(|p| p.y).sum::<Real>() / n;

    let mean_dist = points
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<Real>()
        / n;
    if mean_dist <= Real::EPSILON {
        return None;
    }

    let s = Real::sqrt(2.0) / mean_dist;
    let t = Mat3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let t_inv = Mat3::new(1.0 / s, 0.0, cx, 0.0, 1.0 / s, cy, 0.0, 0.0, 1.0);
    Some((t, t_inv))
}

/// Estimate H such that x' ~ H x using the normalized DLT.
pub fn dlt_homography(world: &[Pt2], image: &[Pt2]) -> Result<Mat3, HomographyError> {
    let n = world.len();
    if n < 4 || image.len() != n {
        return Err(HomographyError::NotEnoughPoints(n.min(image.len())));
    }

    let (t_world, _) = conditioning_transform(world).ok_or(HomographyError::DegeneratePoints)?;
    let (t_image, t_image_inv) =
        conditioning_transform(image).ok_or(HomographyError::DegeneratePoints)?;

    // Two rows of A h = 0 per correspondence, in conditioned coords.
    let mut rows = Vec::with_capacity(2 * n * 9);
    for (pw, pi) in world.iter().zip(image) {
        let w = t_world * to_homogeneous(pw);
        let q = t_image * to_homogeneous(pi);
        let (x, y) = (w.x, w.y);
        let (u, v) = (q.x, q.y);

        rows.extend_from_slice(&[-x, -y, -1.0, 0.0, 0.0, 0.0, u * x, u * y, u]);
        rows.extend_from_slice(&[0.0, 0.0, 0.0, -x, -y, -1.0, v * x, v * y, v]);
    }
    let a = DMatrix::<Real>::from_row_slice(2 * n, 9, &rows);

    // Nullspace direction: right singular vector of the smallest
    // singular value.
    let svd = a.svd(false, true);
    let v_t = svd.v_t.ok_or(HomographyError::SvdFailed)?;
    let h = v_t.row(v_t.nrows() - 1).clone_owned();
    let h_conditioned = Mat3::from_row_slice(h.as_slice());

    // Undo the conditioning, then fix the projective scale.
    let mut h_mat = t_image_inv * h_conditioned * t_world;
    let scale = h_mat[(2, 2)];
    if scale.abs() > Real::EPSILON {
        h_mat /= scale;
    }

    Ok(h_mat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dartrig_core::from_homogeneous;

    #[test]
    fn scaling_homography() {
        let w = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(1.0, 0.0),
            Pt2::new(1.0, 1.0),
            Pt2::new(0.0, 1.0),
        ];
        let img = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(2.0, 0.0),
            Pt2::new(2.0, 2.0),
            Pt2::new(0.0, 2.0),
        ];

        let h = dlt_homography(&w, &img).unwrap();
        assert!((h[(0, 0)] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn maps_marker_corners_exactly() {
        // Four exact correspondences determine H; it must reproduce them.
        let w = vec![
            Pt2::new(-0.025, 0.025),
            Pt2::new(0.025, 0.025),
            Pt2::new(0.025, -0.025),
            Pt2::new(-0.025, -0.025),
        ];
        let img = vec![
            Pt2::new(310.0, 215.0),
            Pt2::new(402.0, 220.0),
            Pt2::new(398.0, 305.0),
            Pt2::new(305.0, 300.0),
        ];

        let h = dlt_homography(&w, &img).unwrap();
        for (pw, pi) in w.iter().zip(&img) {
            let mapped = from_homogeneous(&(h * to_homogeneous(pw)));
            assert!((mapped - pi).norm() < 1e-6);
        }
    }

    #[test]
    fn conditioning_is_undone() {
        // Centimeter-scale marker frame against pixel-scale detections:
        // the returned H must still map the raw inputs directly.
        let w = vec![
            Pt2::new(-0.025, 0.025),
            Pt2::new(0.025, 0.025),
            Pt2::new(0.025, -0.025),
            Pt2::new(-0.025, -0.025),
            Pt2::new(0.0, 0.0),
        ];
        let img: Vec<Pt2> = w
            .iter()
            .map(|p| Pt2::new(4000.0 * p.x + 640.0, -4000.0 * p.y + 360.0))
            .collect();

        let h = dlt_homography(&w, &img).unwrap();
        for (pw, pi) in w.iter().zip(&img) {
            let mapped = from_homogeneous(&(h * to_homogeneous(pw)));
            assert!((mapped - pi).norm() < 1e-6);
        }
        assert!((h[(2, 2)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn too_few_points_is_an_error() {
        let pts = vec![Pt2::new(0.0, 0.0); 3];
        assert!(matches!(
            dlt_homography(&pts, &pts),
            Err(HomographyError::NotEnoughPoints(3))
        ));
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let same = vec![Pt2::new(1.0, 1.0); 4];
        let img = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(1.0, 0.0),
            Pt2::new(1.0, 1.0),
            Pt2::new(0.0, 1.0),
        ];
        assert!(matches!(
            dlt_homography(&same, &img),
            Err(HomographyError::DegeneratePoints)
        ));
    }
}

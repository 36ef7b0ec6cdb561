use dartrig_core::{CameraIntrinsics, Mat3, Real};
use nalgebra::DMatrix;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntrinsicsError {
    #[error("need at least 3 homographies for intrinsics estimation, got {0}")]
    NotEnoughViews(usize),
    #[error("svd failed")]
    SvdFailed,
    #[error("degenerate configuration in intrinsics estimation")]
    Degenerate,
}

/// Build the 6-vector v_ij(H) as in Zhang's method.
fn v_ij(hmtx: &Mat3, i: usize, j: usize) -> nalgebra::SVector<Real, 6> {
    let hi = hmtx.column(i);
    let hj = hmtx.column(j);

    nalgebra::SVector::<Real, 6>::from_row_slice(&[
        hi[0] * hj[0],
        hi[0] * hj[1] + hi[1] * hj[0],
        hi[1] * hj[1],
        hi[2] * hj[0] + hi[0] * hj[2],
        hi[2] * hj[1] + hi[1] * hj[2],
        hi[2] * hj[2],
    ])
}

/// Estimate camera intrinsics K from a set of plane homographies H_k
/// using Zhang's closed-form solution (no distortion).
///
/// Requires at least 3 homographies for a stable solution. Degenerate
/// pose sets (e.g. pure translations of the pattern) are reported as
/// [`IntrinsicsError::Degenerate`] so that the calibration session can
/// keep its samples and ask for more varied views.
pub fn estimate_intrinsics_from_homographies(
    hmtxs: &[Mat3],
) -> Result<CameraIntrinsics, IntrinsicsError> {
    if hmtxs.len() < 3 {
        return Err(IntrinsicsError::NotEnoughViews(hmtxs.len()));
    }

    let m = hmtxs.len();
    let mut vmtx = DMatrix::<Real>::zeros(2 * m, 6);

    for (k, hmtx) in hmtxs.iter().enumerate() {
        let v11 = v_ij(hmtx, 0, 0);
        let v22 = v_ij(hmtx, 1, 1);
        let v12 = v_ij(hmtx, 0, 1);

        vmtx.row_mut(2 * k).copy_from(&v12.transpose());
        vmtx.row_mut(2 * k + 1).copy_from(&(v11 - v22).transpose());
    }

    // Solve V b = 0 via SVD: take the singular vector corresponding to
    // the smallest singular value.
    let svd = vmtx.svd(true, true);
    let v_t = svd.v_t.ok_or(IntrinsicsError::SvdFailed)?;
    let b = v_t.row(v_t.nrows() - 1);

    let b11 = b[0];
    let b12 = b[1];
    let b22 = b[2];
    let b13 = b[3];
    let b23 = b[4];
    let b33 = b[5];

    // From Zhang's paper:
    //
    // v0 = (B12 B13 - B11 B23) / (B11 B22 - B12^2)
    // λ = B33 - (B13^2 + v0 (B12 B13 - B11 B23)) / B11
    // α = sqrt(λ / B11)
    // β = sqrt(λ B11 / (B11 B22 - B12^2))
    // γ = -B12 α^2 β / λ
    // u0 = γ v0 / β - B13 α^2 / λ

    let denom = b11 * b22 - b12 * b12;
    let denom_norm = b11 * b11 + b22 * b22;
    let denom_rel = if denom_norm > 0.0 {
        denom.abs() / denom_norm
    } else {
        0.0
    };
    if denom_rel <= 1e-6 {
        return Err(IntrinsicsError::Degenerate);
    }

    let v0 = (b12 * b13 - b11 * b23) / denom;
    let lambda = b33 - (b13 * b13 + v0 * (b12 * b13 - b11 * b23)) / b11;

    if lambda.signum() != b11.signum() {
        return Err(IntrinsicsError::Degenerate);
    }

    let alpha = (lambda / b11).sqrt();
    let beta = (lambda * b11 / denom).sqrt();
    let gamma = -b12 * alpha * alpha * beta / lambda;
    let u0 = gamma * v0 / beta - b13 * alpha * alpha / lambda;

    Ok(CameraIntrinsics {
        fx: alpha,
        fy: beta,
        cx: u0,
        cy: v0,
        skew: gamma,
    })
}

//! Intrinsic calibration sessions.
//!
//! A [`CalibrationSession`] owns all state for one camera's
//! calibration run: accepted samples accumulate until
//! [`finalize`](CalibrationSession::finalize) solves for intrinsics
//! and distortion and computes the aggregate reprojection error.
//! Sessions are independent values; several cameras calibrate
//! concurrently without sharing anything.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use dartrig_core::{
    BrownConrady5, CameraIntrinsics, Iso3, PinholeCamera, PointCorrespondences, Pt2, Pt3, Real,
};
use dartrig_linear::{
    dlt_homography, estimate_intrinsics_from_homographies, planar_pose_from_homography,
};

use crate::config::CalibrationConfig;
use crate::error::PipelineError;

/// Solved model for one camera.
#[derive(Debug, Clone)]
pub struct SolvedIntrinsics {
    pub intrinsics: CameraIntrinsics,
    pub distortion: BrownConrady5,
    /// Camera-from-target pose for each input sample, same order.
    pub poses: Vec<Iso3>,
}

/// Geometric solver capability: N planar samples in, camera model and
/// per-sample poses out.
pub trait IntrinsicsSolver {
    fn solve(&self, samples: &[PointCorrespondences]) -> Result<SolvedIntrinsics>;
}

/// Closed-form solver: per-sample DLT homographies, Zhang intrinsics,
/// planar pose decomposition per view. Distortion is initialized to
/// zero at this stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearIntrinsicsSolver;

impl IntrinsicsSolver for LinearIntrinsicsSolver {
    fn solve(&self, samples: &[PointCorrespondences]) -> Result<SolvedIntrinsics> {
        let mut homographies = Vec::with_capacity(samples.len());
        for (idx, sample) in samples.iter().enumerate() {
            let h = dlt_homography(&sample.planar_points(), &sample.points_2d)
                .with_context(|| format!("homography for sample {idx}"))?;
            homographies.push(h);
        }

        let intrinsics = estimate_intrinsics_from_homographies(&homographies)?;
        let kmtx = intrinsics.k_matrix();

        let mut poses = Vec::with_capacity(homographies.len());
        for (idx, h) in homographies.iter().enumerate() {
            let pose = planar_pose_from_homography(&kmtx, h)
                .with_context(|| format!("pose for sample {idx}"))?;
            poses.push(pose);
        }

        Ok(SolvedIntrinsics {
            intrinsics,
            distortion: BrownConrady5::default(),
            poses,
        })
    }
}

/// Final calibration output for one camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub intrinsics: CameraIntrinsics,
    pub distortion: BrownConrady5,
    /// Mean per-sample reprojection error, pixels. Always >= 0.
    pub mean_reproj_error: Real,
    /// Number of samples the solve consumed.
    pub num_samples: usize,
}

pub struct CalibrationSession<S = LinearIntrinsicsSolver> {
    config: CalibrationConfig,
    solver: S,
    samples: Vec<PointCorrespondences>,
    report: Option<CalibrationReport>,
}

impl CalibrationSession<LinearIntrinsicsSolver> {
    pub fn new(config: CalibrationConfig) -> Self {
        Self::with_solver(config, LinearIntrinsicsSolver)
    }
}

impl<S: IntrinsicsSolver> CalibrationSession<S> {
    pub fn with_solver(config: CalibrationConfig, solver: S) -> Self {
        Self {
            config,
            solver,
            samples: Vec::new(),
            report: None,
        }
    }

    /// Append one accepted sample (object points and their detections).
    pub fn add_sample(
        &mut self,
        object_points: Vec<Pt3>,
        image_points: Vec<Pt2>,
    ) -> Result<(), PipelineError> {
        let sample = PointCorrespondences::new(object_points, image_points)
            .map_err(PipelineError::Solver)?;
        self.samples.push(sample);
        Ok(())
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Solve for intrinsics from the accumulated samples.
    ///
    /// Idempotent: once a report exists it is returned unchanged until
    /// [`reset`](Self::reset). A solver failure leaves the samples
    /// intact so the caller may add more and retry; success clears
    /// them (the session is complete).
    pub fn finalize(&mut self) -> Result<CalibrationReport, PipelineError> {
        if let Some(report) = &self.report {
            return Ok(report.clone());
        }

        if self.samples.len() < self.config.min_captures {
            return Err(PipelineError::InsufficientSamples {
                got: self.samples.len(),
                need: self.config.min_captures,
            });
        }

        let solved = self.solver.solve(&self.samples)?;
        let mean_error = mean_reprojection_error(&self.samples, &solved)
            .ok_or_else(|| anyhow!("no sample produced a valid reprojection"))?;

        log::info!(
            "calibration solved from {} samples, mean reprojection error {:.4} px",
            self.samples.len(),
            mean_error
        );

        let report = CalibrationReport {
            intrinsics: solved.intrinsics,
            distortion: solved.distortion,
            mean_reproj_error: mean_error,
            num_samples: self.samples.len(),
        };
        self.samples.clear();
        self.report = Some(report.clone());
        Ok(report)
    }

    /// Discard accumulated samples and any finalized report.
    ///
    /// Aborting between sample additions is exactly this: no partial
    /// report ever becomes observable.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.report = None;
    }
}

/// Mean over samples of (sum of L2 point residuals / points in the
/// sample), reprojecting through the solved model and per-sample pose.
fn mean_reprojection_error(
    samples: &[PointCorrespondences],
    solved: &SolvedIntrinsics,
) -> Option<Real> {
    let camera = PinholeCamera::new(solved.intrinsics, solved.distortion);

    let mut total = 0.0;
    let mut counted = 0usize;
    for (sample, pose) in samples.iter().zip(&solved.poses) {
        let mut sample_error = 0.0;
        let mut points = 0usize;
        for (p3, p2) in sample.points_3d.iter().zip(&sample.points_2d) {
            let p_cam = pose.transform_point(p3);
            if let Some(residual) = camera.residual(&p_cam, &p2.coords) {
                sample_error += residual;
                points += 1;
            }
        }
        if points > 0 {
            total += sample_error / points as Real;
            counted += 1;
        }
    }

    (counted > 0).then(|| total / counted as Real)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Isometry3, Rotation3, Translation3, Vector3};

    fn ground_truth_camera() -> PinholeCamera {
        PinholeCamera::new(
            CameraIntrinsics {
                fx: 800.0,
                fy: 780.0,
                cx: 640.0,
                cy: 360.0,
                skew: 0.0,
            },
            BrownConrady5::default(),
        )
    }

    fn grid_points(cols: usize, rows: usize, pitch: Real) -> Vec<Pt3> {
        let mut pts = Vec::with_capacity(cols * rows);
        for r in 0..rows {
            for c in 0..cols {
                pts.push(Pt3::new(c as Real * pitch, r as Real * pitch, 0.0));
            }
        }
        pts
    }

    fn view_pose(i: usize) -> Iso3 {
        let a = i as Real * 0.07 - 0.3;
        let rot = Rotation3::from_euler_angles(0.15 + a, -0.1 + 0.5 * a, 0.05 * a);
        Isometry3::from_parts(
            Translation3::new(-0.12 + 0.02 * i as Real, 0.05 - 0.01 * i as Real, 0.9),
            rot.into(),
        )
    }

    fn add_synthetic_samples(session: &mut CalibrationSession, n: usize) {
        let cam = ground_truth_camera();
        let object = grid_points(5, 4, 0.05);
        for i in 0..n {
            let pose = view_pose(i);
            let image: Vec<Pt2> = object
                .iter()
                .map(|p| {
                    let px = cam.project_point(&pose.transform_point(p)).unwrap();
                    Pt2::new(px.x, px.y)
                })
                .collect();
            session.add_sample(object.clone(), image).unwrap();
        }
    }

    #[test]
    fn fourteen_samples_are_not_enough() {
        let mut session = CalibrationSession::new(CalibrationConfig::default());
        add_synthetic_samples(&mut session, 14);

        match session.finalize() {
            Err(PipelineError::InsufficientSamples { got, need }) => {
                assert_eq!((got, need), (14, 15));
            }
            other => panic!("expected InsufficientSamples, got {other:?}"),
        }
        // Samples untouched by the failed finalize.
        assert_eq!(session.sample_count(), 14);
    }

    #[test]
    fn fifteenth_sample_unlocks_finalize() {
        let mut session = CalibrationSession::new(CalibrationConfig::default());
        add_synthetic_samples(&mut session, 14);
        assert!(session.finalize().is_err());

        add_synthetic_samples(&mut session, 1);
        // Re-add view 0 would duplicate; sample 15 uses pose index 0
        // again, which is still a valid distinct observation set.
        let report = session.finalize().expect("calibration should solve");

        assert!(report.mean_reproj_error >= 0.0);
        assert!(
            report.mean_reproj_error < 1.0,
            "noise-free views should reproject tightly, got {}",
            report.mean_reproj_error
        );
        assert_eq!(report.num_samples, 15);
        assert!((report.intrinsics.fx - 800.0).abs() < 10.0);
        assert!((report.intrinsics.fy - 780.0).abs() < 10.0);
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut session = CalibrationSession::new(CalibrationConfig::default());
        add_synthetic_samples(&mut session, 15);

        let first = session.finalize().unwrap();
        let second = session.finalize().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn reset_discards_everything() {
        let mut session = CalibrationSession::new(CalibrationConfig::default());
        add_synthetic_samples(&mut session, 15);
        session.finalize().unwrap();

        session.reset();
        assert_eq!(session.sample_count(), 0);
        assert!(matches!(
            session.finalize(),
            Err(PipelineError::InsufficientSamples { got: 0, need: 15 })
        ));
    }

    struct FailingSolver;

    impl IntrinsicsSolver for FailingSolver {
        fn solve(&self, _samples: &[PointCorrespondences]) -> Result<SolvedIntrinsics> {
            Err(anyhow!("backend unavailable"))
        }
    }

    #[test]
    fn solver_failure_preserves_samples() {
        let mut session =
            CalibrationSession::with_solver(CalibrationConfig::default(), FailingSolver);
        let object = grid_points(5, 4, 0.05);
        let image: Vec<Pt2> = object.iter().map(|p| Pt2::new(p.x, p.y)).collect();
        for _ in 0..15 {
            session
                .add_sample(object.clone(), image.clone())
                .unwrap();
        }

        assert!(matches!(
            session.finalize(),
            Err(PipelineError::Solver(_))
        ));
        assert_eq!(session.sample_count(), 15, "samples must survive a retry");
    }

    #[test]
    fn sessions_do_not_share_state() {
        let mut a = CalibrationSession::new(CalibrationConfig::default());
        let b = CalibrationSession::new(CalibrationConfig::default());
        add_synthetic_samples(&mut a, 3);
        assert_eq!(a.sample_count(), 3);
        assert_eq!(b.sample_count(), 0);
    }
}

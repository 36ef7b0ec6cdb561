//! Relative camera transforms from shared marker observations.
//!
//! Two calibrated cameras observing the same physical markers at the
//! same instant each solve an independent camera-from-marker pose; the
//! rig transform between them is the composition of those poses. The
//! confidence of the result comes from how well independent markers
//! agree on that transform.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use dartrig_core::{
    marker_object_points, CameraIntrinsics, Iso3, MarkerObservation, Mat3, PointCorrespondences,
    Real, Vec3,
};
use dartrig_linear::{dlt_homography, planar_pose_from_homography, pose_discrepancy, RelativePose};

use crate::error::PipelineError;

/// Confidence assigned when only one common marker is available.
///
/// A single sample gives no consistency evidence, so the value is a
/// fixed conservative constant rather than a fabricated estimate; it
/// is strictly below the confidence of any multi-marker solve whose
/// estimates agree.
pub const SINGLE_MARKER_CONFIDENCE: Real = 0.5;

/// Rotation residual scale (radians) for the confidence mapping.
const ANGLE_SCALE: Real = 0.05;
/// Translation residual scale (meters) for the confidence mapping.
const TRANSLATION_SCALE: Real = 0.01;

/// Rigid transform from camera `from` to camera `to`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtrinsicTransform {
    pub from: String,
    pub to: String,
    /// Orthonormal rotation matrix.
    pub rotation: Mat3,
    pub translation: Vec3,
    /// Agreement of the per-marker estimates, [0, 1].
    pub confidence: Real,
}

/// Perspective-pose capability: one planar view in, camera-from-target
/// pose out.
pub trait PoseSolver {
    fn solve(&self, view: &PointCorrespondences, intrinsics: &CameraIntrinsics) -> Result<Iso3>;
}

/// Planar pose via DLT homography decomposition; exact for the four
/// coplanar corners a square marker contributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomographyPoseSolver;

impl PoseSolver for HomographyPoseSolver {
    fn solve(&self, view: &PointCorrespondences, intrinsics: &CameraIntrinsics) -> Result<Iso3> {
        let h = dlt_homography(&view.planar_points(), &view.points_2d)?;
        Ok(planar_pose_from_homography(&intrinsics.k_matrix(), &h)?)
    }
}

pub struct ExtrinsicSolver<S = HomographyPoseSolver> {
    solver: S,
}

impl Default for ExtrinsicSolver<HomographyPoseSolver> {
    fn default() -> Self {
        Self {
            solver: HomographyPoseSolver,
        }
    }
}

impl<S: PoseSolver> ExtrinsicSolver<S> {
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    /// Compute the transform from camera A to camera B from
    /// simultaneous marker observations.
    ///
    /// Observation sets must come from one synchronized frame pair;
    /// each set belongs to a single camera and names the transform's
    /// endpoints. Fails with
    /// [`PipelineError::InsufficientCorrespondence`] when the sets
    /// share no marker id.
    pub fn compute(
        &self,
        observations_a: &[MarkerObservation],
        observations_b: &[MarkerObservation],
        marker_size: Real,
        intrinsics_a: &CameraIntrinsics,
        intrinsics_b: &CameraIntrinsics,
    ) -> Result<ExtrinsicTransform, PipelineError> {
        let from = camera_of(observations_a)?.to_string();
        let to = camera_of(observations_b)?.to_string();

        let by_id_b: HashMap<u32, &MarkerObservation> = observations_b
            .iter()
            .map(|obs| (obs.marker_id, obs))
            .collect();

        // Ascending marker id for a deterministic reference choice.
        let mut common: Vec<(&MarkerObservation, &MarkerObservation)> = observations_a
            .iter()
            .filter_map(|a| by_id_b.get(&a.marker_id).map(|b| (a, *b)))
            .collect();
        common.sort_by_key(|(a, _)| a.marker_id);

        if common.is_empty() {
            return Err(PipelineError::InsufficientCorrespondence);
        }

        let object = marker_object_points(marker_size);
        let mut estimates: Vec<RelativePose> = Vec::with_capacity(common.len());

        for (obs_a, obs_b) in &common {
            match self.marker_relative_pose(obs_a, obs_b, &object, intrinsics_a, intrinsics_b) {
                Ok(rel) => estimates.push(rel),
                Err(err) => {
                    // A bad detection degrades this marker's
                    // contribution, not the whole solve.
                    log::debug!("marker {} pose failed: {err:#}", obs_a.marker_id);
                }
            }
        }

        let Some(reference) = estimates.first() else {
            return Err(PipelineError::Solver(anyhow!(
                "no common marker produced a valid pose pair"
            )));
        };

        let confidence = if estimates.len() < 2 {
            SINGLE_MARKER_CONFIDENCE
        } else {
            consistency_confidence(reference, &estimates[1..])
        };

        Ok(ExtrinsicTransform {
            from,
            to,
            rotation: reference.rotation,
            translation: reference.translation,
            confidence,
        })
    }

    fn marker_relative_pose(
        &self,
        obs_a: &MarkerObservation,
        obs_b: &MarkerObservation,
        object: &[dartrig_core::Pt3; 4],
        intrinsics_a: &CameraIntrinsics,
        intrinsics_b: &CameraIntrinsics,
    ) -> Result<RelativePose> {
        let view_a = PointCorrespondences::new(object.to_vec(), obs_a.corners.to_vec())?;
        let view_b = PointCorrespondences::new(object.to_vec(), obs_b.corners.to_vec())?;

        let pose_a = self.solver.solve(&view_a, intrinsics_a)?;
        let pose_b = self.solver.solve(&view_b, intrinsics_b)?;

        Ok(dartrig_linear::relative_pose(&pose_a, &pose_b))
    }
}

/// The single camera an observation set belongs to.
///
/// Empty sets carry no endpoint and cannot correspond to anything;
/// mixed sets mean the caller grouped observations wrong.
fn camera_of(observations: &[MarkerObservation]) -> Result<&str, PipelineError> {
    let first = observations
        .first()
        .ok_or(PipelineError::InsufficientCorrespondence)?;
    if let Some(stray) = observations
        .iter()
        .find(|obs| obs.camera_id != first.camera_id)
    {
        return Err(PipelineError::Solver(anyhow!(
            "observation set mixes cameras '{}' and '{}'",
            first.camera_id,
            stray.camera_id
        )));
    }
    Ok(&first.camera_id)
}

/// Map the worst per-marker disagreement with the reference estimate
/// into [0, 1]; identical estimates give 1.0.
fn consistency_confidence(reference: &RelativePose, others: &[RelativePose]) -> Real {
    let (mut worst_angle, mut worst_dist) = (0.0_f64, 0.0_f64);
    for estimate in others {
        let (angle, dist) = pose_discrepancy(reference, estimate);
        worst_angle = worst_angle.max(angle);
        worst_dist = worst_dist.max(dist);
    }
    1.0 / (1.0 + worst_angle / ANGLE_SCALE + worst_dist / TRANSLATION_SCALE)
}

/// Calibrated transforms of the rig, keyed by ordered camera pair.
///
/// A transform becomes stale the moment either endpoint's intrinsics
/// change; [`invalidate_camera`](ExtrinsicStore::invalidate_camera)
/// must be called then so that no stale entry can be read.
#[derive(Debug, Default)]
pub struct ExtrinsicStore {
    transforms: HashMap<(String, String), ExtrinsicTransform>,
}

impl ExtrinsicStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, transform: ExtrinsicTransform) {
        self.transforms
            .insert((transform.from.clone(), transform.to.clone()), transform);
    }

    pub fn get(&self, from: &str, to: &str) -> Option<&ExtrinsicTransform> {
        self.transforms.get(&(from.to_string(), to.to_string()))
    }

    /// Drop every transform touching `camera_id`, in both directions.
    pub fn invalidate_camera(&mut self, camera_id: &str) {
        self.transforms
            .retain(|(from, to), _| from != camera_id && to != camera_id);
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

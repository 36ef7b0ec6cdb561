//! High-level entry crate for the `dartrig` multi-camera dart tracker.
//!
//! The rig follows one path from pixels to points: camera feeds are
//! aligned by [`pipeline::FrameSynchronizer`], each camera is
//! calibrated through a quality-gated [`pipeline::CalibrationSession`],
//! camera pairs are related by [`pipeline::ExtrinsicSolver`], and a
//! triangulated impact in board coordinates is scored by
//! [`core::score`].
//!
//! ## Calibrating one camera
//!
//! ```no_run
//! use dartrig::pipeline::{CalibrationConfig, CalibrationSession, QualityGate, QualityThresholds};
//!
//! # fn detect() -> (Vec<dartrig::core::Pt3>, Vec<dartrig::core::Pt2>) { (vec![], vec![]) }
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut gate = QualityGate::new(QualityThresholds::default());
//! let mut session = CalibrationSession::new(CalibrationConfig::default());
//!
//! while !gate.is_complete() {
//!     let (object, image) = detect();
//!     let metrics = gate.evaluate(&image, (1280, 720));
//!     for line in gate.generate_feedback(&metrics) {
//!         println!("{line}");
//!     }
//!     if gate.is_acceptable(&metrics) {
//!         gate.record_accepted();
//!         session.add_sample(object, image)?;
//!     }
//! }
//!
//! let report = session.finalize()?;
//! println!("mean reprojection error: {:.3} px", report.mean_reproj_error);
//! # Ok(())
//! # }
//! ```
//!
//! ## Scoring an impact
//!
//! ```
//! use dartrig::core::{score, Pt2};
//!
//! // 130 mm out along the first sector, between the rings.
//! let result = score(&Pt2::new(0.13, 0.0));
//! assert_eq!(result.points, 20);
//! ```
//!
//! ## Module Organization
//!
//! - **[`core`]**: math types, camera models, marker observations, board scoring
//! - **[`linear`]**: closed-form solvers (homography, Zhang intrinsics, planar pose)
//! - **[`pipeline`]**: frame sync, quality gating, calibration sessions, extrinsics
//! - **[`prelude`]**: convenient re-exports for common use cases
//!
//! The `dartrig` crate is the public compatibility boundary. Lower-level
//! crates are intended for advanced usage and may evolve more quickly.

/// Math types, camera models, marker observations and board scoring.
pub mod core {
    pub use dartrig_core::*;
}

/// Closed-form geometric solvers.
pub mod linear {
    pub use dartrig_linear::*;
}

/// Frame synchronization, quality gating, calibration and extrinsics.
pub mod pipeline {
    pub use dartrig_pipeline::*;
}

/// Convenient re-exports for common use cases.
///
/// Import with `use dartrig::prelude::*;` to get started quickly.
pub mod prelude {
    pub use crate::core::{
        score, BrownConrady5, CameraIntrinsics, Iso3, MarkerObservation, PinholeCamera,
        PointCorrespondences, Pt2, Pt3, Real, ScoreResult, Vec2, Vec3,
    };

    pub use crate::pipeline::{
        CalibrationConfig, CalibrationReport, CalibrationSession, ExtrinsicSolver, ExtrinsicStore,
        ExtrinsicTransform, FrameQueue, FrameSynchronizer, PipelineError, QualityGate,
        QualityMetrics, QualityThresholds, RigConfig, SyncConfig, SyncedFrameSet,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn facade_reaches_every_layer() {
        let result = score(&Pt2::new(0.13, 0.0));
        assert_eq!(result.points, 20);

        let sync: FrameSynchronizer<u8> =
            FrameSynchronizer::new(vec!["cam1".to_string()], SyncConfig::default());
        assert!(!sync.is_synced());

        let session = CalibrationSession::new(CalibrationConfig::default());
        assert_eq!(session.sample_count(), 0);
    }
}

//! Stateful pipeline components for `dartrig`.
//!
//! This crate turns per-camera marker observations into a validated
//! calibration and a queryable rig:
//! - [`FrameSynchronizer`] aligns independent camera feeds,
//! - [`FrameQueue`] buffers frames for downstream work without ever
//!   blocking a producer,
//! - [`QualityGate`] scores calibration-pattern detections and emits
//!   operator feedback,
//! - [`CalibrationSession`] accumulates accepted samples and solves
//!   for camera intrinsics,
//! - [`ExtrinsicSolver`] and [`ExtrinsicStore`] maintain the relative
//!   transforms between calibrated cameras.

/// Configuration value objects.
pub mod config;
/// Pipeline error taxonomy.
pub mod error;
/// Relative camera transforms.
pub mod extrinsics;
/// Intrinsic calibration sessions.
pub mod intrinsics;
/// Bounded frame queue with drop-oldest backpressure.
pub mod queue;
/// Calibration quality gate.
pub mod quality;
/// Multi-camera frame synchronization.
pub mod sync;

pub use config::*;
pub use error::*;
pub use extrinsics::*;
pub use intrinsics::*;
pub use queue::*;
pub use quality::*;
pub use sync::*;

//! Linear geometric solvers for `dartrig`.
//!
//! Closed-form building blocks used by the calibration pipeline:
//! - DLT homography estimation,
//! - Zhang's intrinsics from plane homographies,
//! - planar pose decomposition (homography + K -> SE(3)),
//! - relative rigid transform between two camera-from-marker poses.

mod homography;
mod intrinsics;
mod planar_pose;
mod relative;

pub use homography::*;
pub use intrinsics::*;
pub use planar_pose::*;
pub use relative::*;

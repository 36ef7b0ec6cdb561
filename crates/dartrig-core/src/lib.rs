//! Core geometry primitives for `dartrig`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Pt2`, `Iso3`, ...),
//! - the pinhole camera model (intrinsics + Brown-Conrady distortion),
//! - observation types for planar marker detections,
//! - the marker-detection adapter trait,
//! - fixed dartboard geometry and the impact scorer.

/// Dartboard geometry constants, scoring zones and the impact scorer.
pub mod board;
/// Marker detection adapter trait.
pub mod detect;
/// Linear algebra type aliases and helpers.
pub mod math;
/// Camera models (intrinsics, distortion, projection).
pub mod models;
/// Marker observations and point correspondences.
pub mod observation;

pub use board::*;
pub use detect::*;
pub use math::*;
pub use models::*;
pub use observation::*;

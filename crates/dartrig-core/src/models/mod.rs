//! Camera models.
//!
//! A camera is a pinhole projection composed with Brown-Conrady lens
//! distortion and the intrinsics matrix K:
//!
//! `pixel = K ∘ distortion ∘ projection(p_camera)`

mod camera;
mod distortion;
mod intrinsics;

pub use camera::*;
pub use distortion::*;
pub use intrinsics::*;

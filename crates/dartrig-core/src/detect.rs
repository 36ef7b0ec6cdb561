//! Marker-detection adapter.
//!
//! Feature detection itself is an external capability. The pipeline
//! consumes it through [`MarkerDetector`], which maps a decoded image
//! buffer to a (possibly empty) set of detected planar markers.

use crate::math::Pt2;

/// A raw marker detection: identifier plus ordered corner polygon.
#[derive(Debug, Clone)]
pub struct DetectedMarker {
    pub marker_id: u32,
    pub corners: [Pt2; 4],
}

/// A decoded grayscale image buffer handed over by the capture layer.
#[derive(Debug, Clone)]
pub struct ImageBuffer<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

/// External marker detection capability.
///
/// Implementations are assumed correct; an empty result is a normal
/// outcome (no markers in view), never an error.
pub trait MarkerDetector {
    fn detect(&self, image: &ImageBuffer<'_>) -> Vec<DetectedMarker>;
}

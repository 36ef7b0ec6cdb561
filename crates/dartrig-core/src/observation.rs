//! Observation types for marker detections and calibration data.
//!
//! [`PointCorrespondences`] is the canonical 2D-3D correspondence
//! container used by the intrinsic and extrinsic solvers.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::detect::DetectedMarker;
use crate::math::{Pt2, Pt3, Real};

/// A single detected planar marker as seen by one camera.
///
/// The corner polygon is ordered (top-left, top-right, bottom-right,
/// bottom-left in the marker's own frame) and immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerObservation {
    /// Marker identifier from the detection dictionary.
    pub marker_id: u32,
    /// Ordered corner polygon in image coordinates.
    pub corners: [Pt2; 4],
    /// Identifier of the observing camera.
    pub camera_id: String,
    /// Capture timestamp of the source frame, seconds on the session clock.
    pub timestamp: Real,
}

impl MarkerObservation {
    /// Stamp a raw detection with its capture context.
    pub fn from_detection(detection: DetectedMarker, camera_id: &str, timestamp: Real) -> Self {
        Self {
            marker_id: detection.marker_id,
            corners: detection.corners,
            camera_id: camera_id.to_string(),
            timestamp,
        }
    }
}

/// 2D-3D point correspondences for one calibration view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointCorrespondences {
    /// 3D points in target/world coordinates.
    pub points_3d: Vec<Pt3>,
    /// Corresponding 2D pixel observations.
    pub points_2d: Vec<Pt2>,
}

impl PointCorrespondences {
    /// Construct a validated correspondence set.
    ///
    /// # Errors
    ///
    /// Returns an error if the 3D and 2D point counts differ or fewer
    /// than 4 correspondences are given (the minimum for a planar
    /// homography).
    pub fn new(points_3d: Vec<Pt3>, points_2d: Vec<Pt2>) -> Result<Self> {
        ensure!(
            points_3d.len() == points_2d.len(),
            "3D / 2D point counts must match: {} vs {}",
            points_3d.len(),
            points_2d.len()
        );
        ensure!(
            points_3d.len() >= 4,
            "need at least 4 correspondences, got {}",
            points_3d.len()
        );
        Ok(Self {
            points_3d,
            points_2d,
        })
    }

    /// Number of correspondences.
    pub fn len(&self) -> usize {
        self.points_3d.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points_3d.is_empty()
    }

    /// Planar (Z=0) target points as 2D.
    pub fn planar_points(&self) -> Vec<Pt2> {
        self.points_3d
            .iter()
            .map(|p3| Pt2::new(p3.x, p3.y))
            .collect()
    }
}

/// Object points of a square marker of side `size`, centred at the
/// origin on the plane Z=0, in detector corner order.
pub fn marker_object_points(size: Real) -> [Pt3; 4] {
    let h = size * 0.5;
    [
        Pt3::new(-h, h, 0.0),
        Pt3::new(h, h, 0.0),
        Pt3::new(h, -h, 0.0),
        Pt3::new(-h, -h, 0.0),
    ]
}

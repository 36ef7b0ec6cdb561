//! Calibration quality gate.
//!
//! Scores a single camera's detection of the calibration pattern
//! before intrinsics exist: corner-position noise stands in for
//! reprojection error, convex-hull coverage measures conditioning,
//! and centroid motion measures stability. The gate itself only
//! evaluates; acceptance is the caller's decision via
//! [`QualityGate::is_acceptable`], recorded with
//! [`QualityGate::record_accepted`].

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use dartrig_core::{Pt2, Real};

use crate::config::QualityThresholds;

const HISTORY_WINDOW: usize = 10;
/// Pixel scale mapping centroid motion to the stability score.
const STABILITY_SCALE: Real = 50.0;

/// Per-frame quality metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Windowed mean of the corner-coordinate standard deviation; a
    /// noise proxy while no intrinsics exist yet. Always >= 0.
    pub reprojection_error: Real,
    /// Convex-hull area of the detected corners over image area, [0, 1].
    pub coverage: Real,
    /// Pattern steadiness derived from centroid motion, [0, 1].
    pub stability: Real,
    /// Samples accepted so far for this camera.
    pub pose_count: usize,
}

pub struct QualityGate {
    thresholds: QualityThresholds,
    error_history: VecDeque<Real>,
    centroid_history: VecDeque<Pt2>,
    accepted: usize,
}

impl QualityGate {
    pub fn new(thresholds: QualityThresholds) -> Self {
        Self {
            thresholds,
            error_history: VecDeque::with_capacity(HISTORY_WINDOW),
            centroid_history: VecDeque::with_capacity(HISTORY_WINDOW),
            accepted: 0,
        }
    }

    /// Evaluate one detection against the pattern history.
    ///
    /// An empty corner set means "insufficient data": the error and
    /// coverage metrics default to 0.0 and the histories are left
    /// untouched.
    pub fn evaluate(&mut self, corners: &[Pt2], image_dimensions: (u32, u32)) -> QualityMetrics {
        QualityMetrics {
            reprojection_error: self.update_error(corners),
            coverage: coverage(corners, image_dimensions),
            stability: self.update_stability(corners),
            pose_count: self.accepted,
        }
    }

    /// Whether a sample with these metrics should be stored.
    pub fn is_acceptable(&self, metrics: &QualityMetrics) -> bool {
        metrics.reprojection_error <= self.thresholds.error_threshold
            && metrics.coverage >= self.thresholds.coverage_threshold
            && metrics.stability >= self.thresholds.stability_threshold
    }

    /// Whether enough samples have been accepted to finish the sweep.
    pub fn is_complete(&self) -> bool {
        self.accepted >= self.thresholds.min_poses
    }

    /// Record that the caller stored a sample for this camera.
    pub fn record_accepted(&mut self) {
        self.accepted += 1;
    }

    /// Operator feedback in fixed priority order.
    ///
    /// Pure in the metrics and thresholds: the same inputs always
    /// produce the same messages in the same order.
    pub fn generate_feedback(&self, metrics: &QualityMetrics) -> Vec<String> {
        let mut feedback = Vec::new();

        if metrics.reprojection_error > self.thresholds.error_threshold {
            feedback.push("Move board more slowly".to_string());
        }
        if metrics.coverage < self.thresholds.coverage_threshold {
            feedback.push("Cover more image area".to_string());
        }
        if metrics.stability < self.thresholds.stability_threshold {
            feedback.push("Hold board more steady".to_string());
        }
        if metrics.pose_count < self.thresholds.min_poses {
            feedback.push(format!(
                "Need {} more poses",
                self.thresholds.min_poses - metrics.pose_count
            ));
        }

        if feedback.is_empty() {
            feedback.push("Good capture!".to_string());
        }
        feedback
    }

    fn update_error(&mut self, corners: &[Pt2]) -> Real {
        if corners.is_empty() {
            return 0.0;
        }

        self.error_history.push_back(corner_std(corners));
        if self.error_history.len() > HISTORY_WINDOW {
            self.error_history.pop_front();
        }

        self.error_history.iter().sum::<Real>() / self.error_history.len() as Real
    }

    fn update_stability(&mut self, corners: &[Pt2]) -> Real {
        if corners.is_empty() {
            return 0.0;
        }

        let n = corners.len() as Real;
        let centroid = Pt2::new(
            corners.iter().map(|p| p.x).sum::<Real>() / n,
            corners.iter().map(|p| p.y).sum::<Real>() / n,
        );

        self.centroid_history.push_back(centroid);
        if self.centroid_history.len() > HISTORY_WINDOW {
            self.centroid_history.pop_front();
        }

        // Assume stable until at least two positions are known.
        if self.centroid_history.len() < 2 {
            return 1.0;
        }

        let displacements: Vec<Real> = self
            .centroid_history
            .iter()
            .zip(self.centroid_history.iter().skip(1))
            .map(|(a, b)| (b - a).norm())
            .collect();
        let movement = displacements.iter().sum::<Real>() / displacements.len() as Real;

        1.0 / (1.0 + movement / STABILITY_SCALE)
    }
}

/// Pooled standard deviation over all corner coordinates.
fn corner_std(corners: &[Pt2]) -> Real {
    let values: Vec<Real> = corners.iter().flat_map(|p| [p.x, p.y]).collect();
    let n = values.len() as Real;
    let mean = values.iter().sum::<Real>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<Real>() / n;
    var.sqrt()
}

/// Fraction of the image covered by the convex hull of the corners.
fn coverage(corners: &[Pt2], image_dimensions: (u32, u32)) -> Real {
    if corners.is_empty() {
        return 0.0;
    }
    let (w, h) = image_dimensions;
    let image_area = w as Real * h as Real;
    if image_area <= 0.0 {
        return 0.0;
    }

    let hull = convex_hull(corners);
    (polygon_area(&hull) / image_area).clamp(0.0, 1.0)
}

/// Convex hull by Andrew's monotone chain, counter-clockwise.
fn convex_hull(points: &[Pt2]) -> Vec<Pt2> {
    let mut pts: Vec<Pt2> = points.to_vec();
    pts.sort_by(|a, b| (a.x, a.y).partial_cmp(&(b.x, b.y)).unwrap_or(std::cmp::Ordering::Equal));
    pts.dedup_by(|a, b| a == b);

    if pts.len() < 3 {
        return pts;
    }

    let cross = |o: &Pt2, a: &Pt2, b: &Pt2| (a - o).perp(&(b - o));

    let mut hull: Vec<Pt2> = Vec::with_capacity(pts.len() * 2);
    for p in pts.iter().chain(pts.iter().rev().skip(1)) {
        while hull.len() >= 2 && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }
    hull.pop();
    hull
}

/// Shoelace polygon area (absolute).
fn polygon_area(polygon: &[Pt2]) -> Real {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for (a, b) in polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1).take(polygon.len()))
    {
        acc += a.x * b.y - b.x * a.y;
    }
    acc.abs() * 0.5
}

//! Fixed dartboard geometry and impact scoring.
//!
//! All radii are standard-board measurements in meters and are not
//! configurable at runtime. Positions handed to the scorer are 2D
//! board-plane coordinates: origin at the bull's-eye centre.
//!
//! Bull ordering follows the geometry rather than the legacy code
//! path: the inner disc (smaller radius) is the 50-point double bull
//! and is tested first, the surrounding ring scores 25.

use std::f64::consts::TAU;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::math::{Pt2, Real};

/// Outer radius of the double ring (board edge of the scoring area).
pub const DOUBLE_RING_RADIUS: Real = 0.170;
/// Centre radius of the triple ring.
pub const TRIPLE_RING_RADIUS: Real = 0.107;
/// Outer radius of the 25-point single bull.
pub const BULL_OUTER_RADIUS: Real = 0.0318;
/// Radius of the 50-point double bull (inner disc).
pub const BULL_INNER_RADIUS: Real = 0.0127;
/// Half-width of the double/triple ring tolerance band.
pub const RING_BAND: Real = 0.008;

/// Standard sector layout, counter-clockwise from angle 0.
pub const SECTOR_LAYOUT: [u32; 20] = [
    20, 1, 18, 4, 13, 6, 10, 15, 2, 17, 3, 19, 7, 16, 8, 11, 14, 9, 12, 5,
];

/// Angular width of one sector.
pub const SECTOR_WIDTH: Real = TAU / 20.0;

/// Geometric extent of a scoring zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ZoneShape {
    /// Full wedge between two angles, `[start, end)`.
    Sector { angle_start: Real, angle_end: Real },
    /// Annulus between two radii.
    Ring { radius_inner: Real, radius_outer: Real },
    /// Disc around the origin.
    Disc { radius: Real },
}

/// One entry of the static scoring-zone table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringZone {
    pub label: String,
    pub base_points: u32,
    pub multiplier: u32,
    pub shape: ZoneShape,
}

/// Score for one impact query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub points: u32,
    /// Position-quality estimate in `[0, 1]`.
    pub confidence: Real,
}

impl ScoreResult {
    /// The degraded "no score" outcome for invalid input.
    pub const fn none() -> Self {
        Self {
            points: 0,
            confidence: 0.0,
        }
    }
}

/// The full zone table, derived once from the board constants.
///
/// 20 sectors × {single, double, triple} plus the two bull zones.
pub fn scoring_zones() -> &'static [ScoringZone] {
    static ZONES: OnceLock<Vec<ScoringZone>> = OnceLock::new();
    ZONES.get_or_init(build_zones)
}

fn build_zones() -> Vec<ScoringZone> {
    let mut zones = Vec::with_capacity(SECTOR_LAYOUT.len() * 3 + 2);

    zones.push(ScoringZone {
        label: "double_bull".to_string(),
        base_points: 50,
        multiplier: 1,
        shape: ZoneShape::Disc {
            radius: BULL_INNER_RADIUS,
        },
    });
    zones.push(ScoringZone {
        label: "single_bull".to_string(),
        base_points: 25,
        multiplier: 1,
        shape: ZoneShape::Ring {
            radius_inner: BULL_INNER_RADIUS,
            radius_outer: BULL_OUTER_RADIUS,
        },
    });

    for (i, &number) in SECTOR_LAYOUT.iter().enumerate() {
        let angle = SECTOR_WIDTH * i as Real;
        zones.push(ScoringZone {
            label: format!("single_{number}"),
            base_points: number,
            multiplier: 1,
            shape: ZoneShape::Sector {
                angle_start: angle,
                angle_end: angle + SECTOR_WIDTH,
            },
        });
        zones.push(ScoringZone {
            label: format!("double_{number}"),
            base_points: number,
            multiplier: 2,
            shape: ZoneShape::Ring {
                radius_inner: DOUBLE_RING_RADIUS - RING_BAND,
                radius_outer: DOUBLE_RING_RADIUS + RING_BAND,
            },
        });
        zones.push(ScoringZone {
            label: format!("triple_{number}"),
            base_points: number,
            multiplier: 3,
            shape: ZoneShape::Ring {
                radius_inner: TRIPLE_RING_RADIUS - RING_BAND,
                radius_outer: TRIPLE_RING_RADIUS + RING_BAND,
            },
        });
    }

    zones
}

/// Map a board-plane impact position to a score.
///
/// This function is total: degenerate input (non-finite coordinates)
/// yields [`ScoreResult::none`] rather than an error or panic.
pub fn score(position: &Pt2) -> ScoreResult {
    if !position.x.is_finite() || !position.y.is_finite() {
        return ScoreResult::none();
    }

    let distance = position.coords.norm();
    let mut angle = position.y.atan2(position.x);
    if angle < 0.0 {
        angle += TAU;
    }

    // Bulls first: inner 50-point disc, then the 25-point ring.
    if distance <= BULL_INNER_RADIUS {
        return ScoreResult {
            points: 50,
            confidence: 0.95,
        };
    }
    if distance <= BULL_OUTER_RADIUS {
        return ScoreResult {
            points: 25,
            confidence: 0.90,
        };
    }

    let section_index = ((angle / SECTOR_WIDTH) as usize).min(SECTOR_LAYOUT.len() - 1);
    let base_points = SECTOR_LAYOUT[section_index];

    let multiplier = if (distance - DOUBLE_RING_RADIUS).abs() < RING_BAND {
        2
    } else if (distance - TRIPLE_RING_RADIUS).abs() < RING_BAND {
        3
    } else {
        1
    };

    ScoreResult {
        points: base_points * multiplier,
        confidence: scoring_confidence(distance, angle),
    }
}

/// Position-quality estimate for a sector hit.
///
/// The radial term decays with distance from the nearest ring-band
/// midline, the angular term with proximity to the sector boundary;
/// both are monotonic and the product is clamped to `[0, 1]`.
fn scoring_confidence(distance: Real, angle: Real) -> Real {
    let radial_dist = (distance - DOUBLE_RING_RADIUS)
        .abs()
        .min((distance - TRIPLE_RING_RADIUS).abs());
    let radial_term = 1.0 / (1.0 + radial_dist / RING_BAND);

    let within = angle.rem_euclid(SECTOR_WIDTH);
    let boundary_margin = within.min(SECTOR_WIDTH - within);
    let angular_term = boundary_margin / (SECTOR_WIDTH * 0.5);

    (radial_term * angular_term).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_double_bull() {
        let r = score(&Pt2::origin());
        assert_eq!(r.points, 50);
        assert_eq!(r.confidence, 0.95);
    }

    // Geometrically consistent ordering: the inner disc scores 50 and
    // the surrounding 25-point ring is reachable. The legacy code
    // checked the larger radius first, which made the 25 branch dead.
    #[test]
    fn bull_ordering_inner_disc_before_outer_ring() {
        let inner = score(&Pt2::new(BULL_INNER_RADIUS * 0.5, 0.0));
        assert_eq!(inner.points, 50);

        let ring = score(&Pt2::new(0.02, 0.0));
        assert_eq!(ring.points, 25);
        assert_eq!(ring.confidence, 0.90);
    }

    #[test]
    fn double_ring_at_angle_zero_scores_forty() {
        // Sector 0 is the 20; mid-sector to stay off the boundary.
        let a = SECTOR_WIDTH * 0.5;
        let p = Pt2::new(DOUBLE_RING_RADIUS * a.cos(), DOUBLE_RING_RADIUS * a.sin());
        let r = score(&p);
        assert_eq!(r.points, 40);
        assert!(r.confidence > 0.0 && r.confidence <= 1.0);
    }

    #[test]
    fn double_ring_exactly_along_angle_zero() {
        let r = score(&Pt2::new(DOUBLE_RING_RADIUS, 0.0));
        assert_eq!(r.points, 40);
    }

    #[test]
    fn triple_ring_scores_triple() {
        let a = SECTOR_WIDTH * 2.5; // middle of sector index 2 -> 18
        let p = Pt2::new(TRIPLE_RING_RADIUS * a.cos(), TRIPLE_RING_RADIUS * a.sin());
        assert_eq!(score(&p).points, 54);
    }

    #[test]
    fn far_outside_rings_is_single() {
        let a = SECTOR_WIDTH * 0.5;
        let p = Pt2::new(0.25 * a.cos(), 0.25 * a.sin());
        let r = score(&p);
        assert_eq!(r.points, 20);
        assert!(r.confidence >= 0.0 && r.confidence <= 1.0);
    }

    #[test]
    fn sector_layout_selection() {
        // Middle of sector index 1 -> base 1.
        let a = SECTOR_WIDTH * 1.5;
        let p = Pt2::new(0.08 * a.cos(), 0.08 * a.sin());
        assert_eq!(score(&p).points, 1);
    }

    #[test]
    fn non_finite_input_degrades_to_no_score() {
        assert_eq!(score(&Pt2::new(Real::NAN, 0.0)), ScoreResult::none());
        assert_eq!(score(&Pt2::new(0.1, Real::INFINITY)), ScoreResult::none());
    }

    #[test]
    fn confidence_monotonic_in_boundary_margin() {
        let d = 0.14; // between the rings
        let mid = scoring_confidence(d, SECTOR_WIDTH * 0.5);
        let near_edge = scoring_confidence(d, SECTOR_WIDTH * 0.05);
        assert!(mid > near_edge);
    }

    #[test]
    fn confidence_monotonic_in_radial_offset() {
        let a = SECTOR_WIDTH * 0.5;
        let on_ring = scoring_confidence(DOUBLE_RING_RADIUS, a);
        let off_ring = scoring_confidence(DOUBLE_RING_RADIUS + 0.02, a);
        assert!(on_ring > off_ring);
    }

    // The zone table is published to UI consumers as JSON.
    #[test]
    fn zone_table_serializes_for_consumers() {
        let json = serde_json::to_string(scoring_zones()).unwrap();
        let zones: Vec<ScoringZone> = serde_json::from_str(&json).unwrap();
        assert_eq!(zones.as_slice(), scoring_zones());

        let hit = serde_json::to_value(score(&Pt2::origin())).unwrap();
        assert_eq!(hit["points"], 50);
    }

    #[test]
    fn zone_table_is_complete() {
        let zones = scoring_zones();
        assert_eq!(zones.len(), 20 * 3 + 2);
        assert!(zones.iter().any(|z| z.label == "double_bull"));
        assert!(zones.iter().any(|z| z.label == "triple_20"));

        // Sector wedges tile the full circle.
        let sector_total: Real = zones
            .iter()
            .filter_map(|z| match z.shape {
                ZoneShape::Sector {
                    angle_start,
                    angle_end,
                } => Some(angle_end - angle_start),
                _ => None,
            })
            .sum();
        assert!((sector_total - TAU).abs() < 1e-9);
    }
}

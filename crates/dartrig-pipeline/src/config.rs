//! Configuration value objects.
//!
//! Each component takes an immutable config constructed per instance;
//! instances never share container identity. Defaults follow the rig's
//! deployed values.

use serde::{Deserialize, Serialize};

use dartrig_core::Real;

/// Frame synchronizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum latest-frame timestamp skew across cameras, milliseconds.
    /// Default is one frame interval at 60 Hz.
    pub sync_threshold_ms: Real,
    /// Per-camera buffer retention window, seconds.
    pub retention_window_s: Real,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sync_threshold_ms: 16.67,
            retention_window_s: 1.0,
        }
    }
}

impl SyncConfig {
    /// Sync threshold in seconds.
    pub fn sync_threshold_s(&self) -> Real {
        self.sync_threshold_ms / 1000.0
    }
}

/// Quality-gate acceptance thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Number of accepted poses required before calibration can run.
    pub min_poses: usize,
    /// Upper bound on the windowed corner-noise estimate.
    pub error_threshold: Real,
    /// Lower bound on convex-hull image coverage.
    pub coverage_threshold: Real,
    /// Lower bound on the pattern stability score.
    pub stability_threshold: Real,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_poses: 15,
            error_threshold: 0.5,
            coverage_threshold: 0.7,
            stability_threshold: 0.8,
        }
    }
}

/// Intrinsic calibration session settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Minimum accepted samples before `finalize` may run.
    pub min_captures: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self { min_captures: 15 }
    }
}

/// Static rig description consumed at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigConfig {
    /// Identifiers of the configured cameras.
    pub cameras: Vec<String>,
    /// Physical side length of the reference markers, meters.
    pub marker_size: Real,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub quality: QualityThresholds,
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployed_values() {
        let sync = SyncConfig::default();
        assert_eq!(sync.sync_threshold_ms, 16.67);
        assert_eq!(sync.retention_window_s, 1.0);

        let q = QualityThresholds::default();
        assert_eq!(q.min_poses, 15);
        assert_eq!(q.error_threshold, 0.5);
        assert_eq!(q.coverage_threshold, 0.7);
        assert_eq!(q.stability_threshold, 0.8);

        assert_eq!(CalibrationConfig::default().min_captures, 15);
    }

    #[test]
    fn rig_config_json_roundtrip() {
        let cfg = RigConfig {
            cameras: vec!["cam1".into(), "cam2".into()],
            marker_size: 0.05,
            sync: SyncConfig::default(),
            quality: QualityThresholds::default(),
            calibration: CalibrationConfig::default(),
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let restored: RigConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cfg);
    }

    #[test]
    fn omitted_sections_fall_back_to_defaults() {
        let json = r#"{"cameras": ["cam1"], "marker_size": 0.05}"#;
        let cfg: RigConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.sync, SyncConfig::default());
        assert_eq!(cfg.quality, QualityThresholds::default());
    }
}

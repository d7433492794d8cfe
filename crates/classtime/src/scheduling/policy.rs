use serde::{Deserialize, Serialize};

/// How a qualification mismatch (teacher assigned outside their subject list)
/// is treated. The sites this engine consolidated never blocked on it, so the
/// default stays advisory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationMode {
    /// Skip the check entirely.
    Off,
    /// Admit the write and surface a warning on the outcome.
    #[default]
    Warn,
    /// Reject the write with a qualification error.
    Enforce,
}

const DEFAULT_MEDIUM_RATIO: f32 = 0.5;
const DEFAULT_HIGH_RATIO: f32 = 0.8;

/// Load tier cut points as fractions of a teacher's weekly capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadThresholds {
    medium: f32,
    high: f32,
}

impl LoadThresholds {
    pub fn new(medium: f32, high: f32) -> Self {
        let medium = if medium.is_finite() && medium > 0.0 && medium < 1.0 {
            medium
        } else {
            DEFAULT_MEDIUM_RATIO
        };
        let high = if high.is_finite() && high > medium && high <= 1.0 {
            high
        } else {
            DEFAULT_HIGH_RATIO.max(medium)
        };

        Self { medium, high }
    }

    pub fn medium(&self) -> f32 {
        self.medium
    }

    pub fn high(&self) -> f32 {
        self.high
    }
}

impl Default for LoadThresholds {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIUM_RATIO, DEFAULT_HIGH_RATIO)
    }
}

/// Policy dials governing write admission and load classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulingPolicy {
    #[serde(default)]
    pub qualification: QualificationMode,
    /// Admit substitute/exam overlays dated before today. Off by default;
    /// turning it on permits back-dated record corrections.
    #[serde(default)]
    pub allow_past_overlays: bool,
    #[serde(default)]
    pub load_thresholds: LoadThresholds,
}

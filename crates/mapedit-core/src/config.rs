//! Per-editor configuration.

use crate::feature::FeatureStyle;
use crate::geometry::GeometryKind;
use crate::measure::{AreaFormat, CoordinateFormat, LengthFormat, Measurer, Metric};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default coalescing window for measurement recomputation.
pub const DEFAULT_DEBOUNCE_MS: u64 = 50;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Options recognized by a [`GeometryEditor`](crate::editor::GeometryEditor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Override of the kind's minimum committable vertex count.
    pub min_vertices: Option<usize>,
    /// Show a pointer-following preview vertex (lines and polygons only).
    pub ghost_enabled: bool,
    /// Coalescing window for measurement on pointer moves, in milliseconds.
    pub debounce_ms: u64,
    /// Keep listening for clicks after a finish so a new session can start.
    pub rearm_after_finish: bool,
    pub metric: Metric,
    pub length: LengthFormat,
    pub area: AreaFormat,
    pub coordinates: CoordinateFormat,
    pub style: FeatureStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_vertices: None,
            ghost_enabled: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            rearm_after_finish: false,
            metric: Metric::default(),
            length: LengthFormat::default(),
            area: AreaFormat::default(),
            coordinates: CoordinateFormat::default(),
            style: FeatureStyle::default(),
        }
    }
}

impl EditorConfig {
    /// Defaults for a kind. Point editors keep placing points until stopped.
    pub fn for_kind(kind: GeometryKind) -> Self {
        Self {
            rearm_after_finish: kind.commits_on_place(),
            ..Self::default()
        }
    }

    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_vertices == Some(0) {
            return Err(ConfigError::Invalid {
                field: "min_vertices",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.length.km_threshold.is_finite() && self.length.km_threshold > 0.0) {
            return Err(ConfigError::Invalid {
                field: "length.km_threshold",
                reason: format!("must be positive, got {}", self.length.km_threshold),
            });
        }
        if !(self.area.km2_threshold.is_finite() && self.area.km2_threshold > 0.0) {
            return Err(ConfigError::Invalid {
                field: "area.km2_threshold",
                reason: format!("must be positive, got {}", self.area.km2_threshold),
            });
        }
        Ok(())
    }

    /// Build the measurer described by this configuration.
    pub fn measurer(&self) -> Measurer {
        Measurer::new(self.metric, self.length, self.area, self.coordinates)
    }
}

//! Session configuration.

use mapedit_core::config::{ConfigError, EditorConfig};
use mapedit_core::geometry::GeometryKind;
use mapedit_core::session::SwitchPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Map view used to convert between screen pixels and map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Screen pixels per map unit.
    pub scale: f64,
    /// Screen position of the map origin.
    pub offset: [f64; 2],
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: [0.0, 0.0],
        }
    }
}

/// Configuration for a whole editing session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub switch_policy: SwitchPolicy,
    /// Per-kind overrides of `switch_policy`.
    pub switch_overrides: HashMap<GeometryKind, SwitchPolicy>,
    /// Editor options; kinds without an entry use their defaults.
    pub editors: HashMap<GeometryKind, EditorConfig>,
    pub view: ViewConfig,
}

impl SessionConfig {
    /// Editor configuration for a kind.
    pub fn editor_config(&self, kind: GeometryKind) -> EditorConfig {
        self.editors
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| EditorConfig::for_kind(kind))
    }

    /// Check every editor configuration and the view.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for config in self.editors.values() {
            config.validate()?;
        }
        if !(self.view.scale.is_finite() && self.view.scale > 0.0) {
            return Err(ConfigError::Invalid {
                field: "view.scale",
                reason: format!("must be positive, got {}", self.view.scale),
            });
        }
        Ok(())
    }
}

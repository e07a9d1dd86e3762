//! Committed features and their paint style.

use crate::geometry::{GeometryKind, Vertex};
use crate::measure::Label;
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for committed features.
pub type FeatureId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Measurement orange used by the default style.
    pub fn measure() -> Self {
        Self::new(255, 120, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// CSS hex form (`#rrggbbaa`), as map style specs expect.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Paint properties for a geometry and its labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureStyle {
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
    /// Polygon fill (None = no fill).
    pub fill_color: Option<SerializableColor>,
    /// Vertex label color.
    pub label_color: SerializableColor,
    /// Segment label color, kept distinct so midpoint labels read differently.
    pub segment_label_color: SerializableColor,
    pub opacity: f64,
}

impl Default for FeatureStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::measure(),
            stroke_width: 2.0,
            fill_color: Some(SerializableColor::new(255, 120, 0, 64)),
            label_color: SerializableColor::new(51, 51, 51, 255),
            segment_label_color: SerializableColor::new(0, 102, 204, 255),
            opacity: 1.0,
        }
    }
}

/// A finished geometry handed over by an editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommittedFeature {
    pub id: FeatureId,
    pub kind: GeometryKind,
    /// Final vertices; polygons are closed (first == last).
    pub vertices: Vec<Vertex>,
    pub labels: Vec<Label>,
    pub style: FeatureStyle,
}

impl CommittedFeature {
    /// Create a feature with a fresh id.
    pub fn new(kind: GeometryKind, vertices: Vec<Vertex>, labels: Vec<Label>, style: FeatureStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            vertices,
            labels,
            style,
        }
    }
}

//! Source and layer descriptions for one editor kind.

use mapedit_core::feature::FeatureStyle;
use mapedit_core::geometry::GeometryKind;
use mapedit_core::measure::LabelKind;
use serde::{Deserialize, Serialize};

/// Which collection a source holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceRole {
    /// The geometry under construction.
    Preview,
    /// Finished features.
    Committed,
}

impl SourceRole {
    pub fn name(self) -> &'static str {
        match self {
            SourceRole::Preview => "preview",
            SourceRole::Committed => "committed",
        }
    }
}

/// Source id for an editor kind and role, e.g. `mapedit-polygon-preview`.
pub fn source_id(kind: GeometryKind, role: SourceRole) -> String {
    format!("mapedit-{}-{}", kind.name(), role.name())
}

/// Paint type of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Line,
    Fill,
    Circle,
    Symbol,
}

/// Which features of a source a layer paints, by their `role` property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerFilter {
    Geometry,
    Vertices,
    /// Label features of the listed kinds.
    Labels(Vec<LabelKind>),
}

/// A host layer to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub id: String,
    pub source: String,
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    pub filter: LayerFilter,
    /// CSS hex color.
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    pub opacity: f64,
}

impl LayerDescriptor {
    fn new(kind: GeometryKind, role: SourceRole, suffix: &str, layer_type: LayerType, filter: LayerFilter) -> Self {
        Self {
            id: format!("{}-{}", source_id(kind, role), suffix),
            source: source_id(kind, role),
            layer_type,
            filter,
            color: String::new(),
            width: None,
            opacity: 1.0,
        }
    }

    fn paint(mut self, color: String, width: Option<f64>, opacity: f64) -> Self {
        self.color = color;
        self.width = width;
        self.opacity = opacity;
        self
    }
}

/// Layers for an editor kind, bottom to top.
///
/// Segment labels get their own layer and color so midpoint lengths read
/// differently from cumulative vertex labels.
pub fn layers_for(kind: GeometryKind, style: &FeatureStyle) -> Vec<LayerDescriptor> {
    let stroke = style.stroke_color.to_hex();
    let opacity = style.opacity.clamp(0.0, 1.0);
    let mut layers = Vec::new();

    for role in [SourceRole::Committed, SourceRole::Preview] {
        match kind {
            GeometryKind::Point => layers.push(
                LayerDescriptor::new(kind, role, "points", LayerType::Circle, LayerFilter::Geometry).paint(
                    stroke.clone(),
                    Some(style.stroke_width * 2.0),
                    opacity,
                ),
            ),
            GeometryKind::LineString | GeometryKind::Polygon => {
                if kind == GeometryKind::Polygon {
                    if let Some(fill) = style.fill_color {
                        layers.push(
                            LayerDescriptor::new(kind, role, "fill", LayerType::Fill, LayerFilter::Geometry)
                                .paint(fill.to_hex(), None, opacity),
                        );
                    }
                }
                layers.push(
                    LayerDescriptor::new(kind, role, "line", LayerType::Line, LayerFilter::Geometry).paint(
                        stroke.clone(),
                        Some(style.stroke_width),
                        opacity,
                    ),
                );
                if role == SourceRole::Preview {
                    layers.push(
                        LayerDescriptor::new(kind, role, "vertices", LayerType::Circle, LayerFilter::Vertices)
                            .paint(stroke.clone(), Some(style.stroke_width * 1.5), opacity),
                    );
                }
            }
        }

        let vertex_kinds = vec![LabelKind::Vertex, LabelKind::Preview, LabelKind::Area, LabelKind::Perimeter];
        layers.push(
            LayerDescriptor::new(kind, role, "labels", LayerType::Symbol, LayerFilter::Labels(vertex_kinds))
                .paint(style.label_color.to_hex(), None, 1.0),
        );
        if kind == GeometryKind::LineString {
            layers.push(
                LayerDescriptor::new(
                    kind,
                    role,
                    "segment-labels",
                    LayerType::Symbol,
                    LayerFilter::Labels(vec![LabelKind::Segment]),
                )
                .paint(style.segment_label_color.to_hex(), None, 1.0),
            );
        }
    }
    layers
}

//! Ordered collection of committed features.

use crate::feature::{CommittedFeature, FeatureId};
use crate::geometry::{GeometryKind, Vertex};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;

/// Committed features, keyed by id and kept in commit order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureStore {
    features: HashMap<FeatureId, CommittedFeature>,
    /// Commit order (oldest first).
    order: Vec<FeatureId>,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feature. A feature with the same id is replaced in place.
    pub fn add(&mut self, feature: CommittedFeature) {
        let id = feature.id;
        if self.features.insert(id, feature).is_none() {
            self.order.push(id);
        }
    }

    /// Remove a feature.
    pub fn remove(&mut self, id: FeatureId) -> Option<CommittedFeature> {
        self.order.retain(|&fid| fid != id);
        self.features.remove(&id)
    }

    pub fn get(&self, id: FeatureId) -> Option<&CommittedFeature> {
        self.features.get(&id)
    }

    /// Features in commit order.
    pub fn iter(&self) -> impl Iterator<Item = &CommittedFeature> {
        self.order.iter().filter_map(|id| self.features.get(id))
    }

    pub fn clear(&mut self) {
        self.features.clear();
        self.order.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Export as a GeoJSON FeatureCollection.
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.iter().map(feature_to_geojson).collect::<Vec<_>>(),
        })
    }

    /// Serialize the store to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a store from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// GeoJSON coordinate pair.
pub fn position(v: Vertex) -> Value {
    json!([v.x, v.y])
}

/// GeoJSON geometry object for a vertex list of the given kind.
///
/// Returns `Value::Null` for an empty point.
pub fn geometry_to_geojson(kind: GeometryKind, vertices: &[Vertex]) -> Value {
    let coords = || vertices.iter().copied().map(position).collect::<Vec<_>>();
    match kind {
        GeometryKind::Point => match vertices.first() {
            Some(&v) => json!({ "type": "Point", "coordinates": position(v) }),
            None => Value::Null,
        },
        GeometryKind::LineString => json!({ "type": "LineString", "coordinates": coords() }),
        GeometryKind::Polygon => json!({ "type": "Polygon", "coordinates": [coords()] }),
    }
}

/// GeoJSON Feature for a committed feature, labels and paint in properties.
pub fn feature_to_geojson(feature: &CommittedFeature) -> Value {
    json!({
        "type": "Feature",
        "id": feature.id.to_string(),
        "geometry": geometry_to_geojson(feature.kind, &feature.vertices),
        "properties": {
            "kind": feature.kind.name(),
            "labels": feature.labels.iter().map(|l| l.text.as_str()).collect::<Vec<_>>(),
            "stroke": feature.style.stroke_color.to_hex(),
            "strokeWidth": feature.style.stroke_width,
            "fill": feature.style.fill_color.map(|c| c.to_hex()),
        },
    })
}

//! GeoJSON encoding of editor output for host sources.
//!
//! Every feature carries a `role` property (`geometry`, `vertex` or `label`)
//! that the layers from [`layers_for`](crate::layer::layers_for) filter on.

use mapedit_core::feature::CommittedFeature;
use mapedit_core::geometry::{GeometryKind, Vertex};
use mapedit_core::measure::Label;
use mapedit_core::sink::GeometryUpdate;
use mapedit_core::store::{feature_to_geojson, geometry_to_geojson, position};
use serde_json::{Value, json};

/// An empty FeatureCollection.
pub fn empty_collection() -> Value {
    collection(Vec::new())
}

fn collection(features: Vec<Value>) -> Value {
    json!({ "type": "FeatureCollection", "features": features })
}

fn label_feature(label: &Label) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": position(label.position) },
        "properties": { "role": "label", "labelKind": label.kind, "text": label.text },
    })
}

fn vertex_feature(v: Vertex, ghost: bool) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": position(v) },
        "properties": { "role": "vertex", "ghost": ghost },
    })
}

/// Geometry of a preview, which may not be a valid final shape yet.
fn preview_geometry(kind: GeometryKind, vertices: &[Vertex]) -> Option<Value> {
    match (kind, vertices.len()) {
        (_, 0) => None,
        (GeometryKind::Point, _) => Some(geometry_to_geojson(kind, vertices)),
        (_, 1) => None,
        (GeometryKind::Polygon, n) if n >= 3 => {
            let mut ring = vertices.to_vec();
            ring.push(vertices[0]);
            Some(geometry_to_geojson(kind, &ring))
        }
        _ => Some(geometry_to_geojson(GeometryKind::LineString, vertices)),
    }
}

/// Encode a preview snapshot: geometry, vertex handles and labels.
pub fn preview_collection(update: &GeometryUpdate) -> Value {
    let mut features = Vec::with_capacity(update.vertices.len() + update.labels.len() + 1);
    if let Some(geometry) = preview_geometry(update.kind, &update.vertices) {
        features.push(json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": { "role": "geometry", "kind": update.kind.name() },
        }));
    }
    let ghost_index = update.real_vertices().len();
    features.extend(
        update
            .vertices
            .iter()
            .enumerate()
            .map(|(i, &v)| vertex_feature(v, update.ghost_included && i == ghost_index)),
    );
    features.extend(update.labels.iter().map(label_feature));
    collection(features)
}

/// Encode committed features with their labels.
pub fn committed_collection<'a>(features: impl IntoIterator<Item = &'a CommittedFeature>) -> Value {
    let mut out = Vec::new();
    for feature in features {
        let mut geometry = feature_to_geojson(feature);
        geometry["properties"]["role"] = json!("geometry");
        out.push(geometry);
        out.extend(feature.labels.iter().map(label_feature));
    }
    collection(out)
}

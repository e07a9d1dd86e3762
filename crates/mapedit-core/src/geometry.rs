//! Geometry kinds and the per-kind editing policy.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A coordinate in the buffer under construction.
///
/// `x` is the longitude and `y` the latitude for geographic editors, or plain
/// planar x/y (metres) for editors configured with [`Metric::Planar`](crate::measure::Metric).
pub type Vertex = Point;

/// Tolerance under which two vertices are treated as the same position.
pub const COINCIDENT_EPSILON: f64 = 1e-12;

/// The kind of geometry an editor builds. Fixed per editor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
}

impl GeometryKind {
    /// All kinds, in registration order used by the controls.
    pub const ALL: [GeometryKind; 3] = [
        GeometryKind::Point,
        GeometryKind::LineString,
        GeometryKind::Polygon,
    ];

    /// Minimum number of real vertices needed to commit.
    pub fn min_vertices(self) -> usize {
        match self {
            GeometryKind::Point => 1,
            GeometryKind::LineString => 2,
            GeometryKind::Polygon => 3,
        }
    }

    /// Whether a pointer-following preview vertex trails the placed ones.
    pub fn uses_ghost(self) -> bool {
        !matches!(self, GeometryKind::Point)
    }

    /// Whether placing a vertex finishes the geometry right away.
    pub fn commits_on_place(self) -> bool {
        matches!(self, GeometryKind::Point)
    }

    /// Whether the committed vertex list is a closed ring.
    pub fn closes_ring(self) -> bool {
        matches!(self, GeometryKind::Polygon)
    }

    /// Lowercase name used for source and layer ids.
    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::Point => "point",
            GeometryKind::LineString => "linestring",
            GeometryKind::Polygon => "polygon",
        }
    }
}

/// Check if two vertices sit on the same position.
pub fn coincident(a: Vertex, b: Vertex) -> bool {
    (a.x - b.x).abs() <= COINCIDENT_EPSILON && (a.y - b.y).abs() <= COINCIDENT_EPSILON
}

//! Derived measurement: lengths, areas and their label text.
//!
//! Everything here is pure. Lengths come out in kilometres and areas in
//! square metres, whatever the metric; the formatters expect those units.

use crate::geometry::{GeometryKind, Vertex, coincident};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Mean Earth radius in kilometres, used for great-circle distances.
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0088;

/// WGS84 equatorial radius in metres, used for spherical ring areas.
pub const EARTH_EQUATORIAL_RADIUS_M: f64 = 6_378_137.0;

/// How coordinates are interpreted for measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// Longitude/latitude in degrees, measured on the sphere.
    #[default]
    Geodesic,
    /// Planar coordinates in metres.
    Planar,
}

/// Length of a single segment, in kilometres.
pub fn segment_length(a: Vertex, b: Vertex, metric: Metric) -> f64 {
    match metric {
        Metric::Geodesic => haversine_km(a, b),
        Metric::Planar => ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt() / 1000.0,
    }
}

/// Sum of segment lengths along a polyline, in kilometres.
pub fn line_length(vertices: &[Vertex], metric: Metric) -> f64 {
    vertices
        .windows(2)
        .map(|w| segment_length(w[0], w[1], metric))
        .sum()
}

/// Area enclosed by a ring, in square metres.
///
/// The ring may be open or explicitly closed; fewer than three distinct
/// positions give zero.
pub fn polygon_area(ring: &[Vertex], metric: Metric) -> f64 {
    let ring = open_ring(ring);
    if ring.len() < 3 {
        return 0.0;
    }
    match metric {
        Metric::Geodesic => spherical_ring_area(ring),
        Metric::Planar => shoelace_area(ring),
    }
}

/// Perimeter of a ring (closing segment included), in kilometres.
pub fn polygon_perimeter(ring: &[Vertex], metric: Metric) -> f64 {
    let ring = open_ring(ring);
    match (ring.first(), ring.last()) {
        (Some(&first), Some(&last)) if ring.len() > 1 => {
            line_length(ring, metric) + segment_length(last, first, metric)
        }
        _ => 0.0,
    }
}

/// Midpoint of a segment in coordinate space.
pub fn midpoint(a: Vertex, b: Vertex) -> Vertex {
    a.midpoint(b)
}

/// Vertex average of a ring, used to anchor whole-geometry labels.
pub fn centroid(ring: &[Vertex]) -> Option<Vertex> {
    let ring = open_ring(ring);
    if ring.is_empty() {
        return None;
    }
    let n = ring.len() as f64;
    let (sx, sy) = ring.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Vertex::new(sx / n, sy / n))
}

/// Strip an explicit closing vertex.
fn open_ring(ring: &[Vertex]) -> &[Vertex] {
    match (ring.first(), ring.last()) {
        (Some(&first), Some(&last)) if ring.len() > 1 && coincident(first, last) => &ring[..ring.len() - 1],
        _ => ring,
    }
}

fn haversine_km(a: Vertex, b: Vertex) -> f64 {
    let (lat1, lat2) = (a.y.to_radians(), b.y.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b.x - a.x).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_MEAN_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Spherical excess approximation: sum of (lon[i+1] - lon[i-1]) * sin(lat[i]).
fn spherical_ring_area(ring: &[Vertex]) -> f64 {
    let n = ring.len();
    let total: f64 = (0..n)
        .map(|i| {
            let lower = ring[(i + n - 1) % n];
            let middle = ring[i];
            let upper = ring[(i + 1) % n];
            (upper.x.to_radians() - lower.x.to_radians()) * middle.y.to_radians().sin()
        })
        .sum();
    (total * EARTH_EQUATORIAL_RADIUS_M * EARTH_EQUATORIAL_RADIUS_M / 2.0).abs()
}

fn shoelace_area(ring: &[Vertex]) -> f64 {
    let n = ring.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    (twice / 2.0).abs()
}

/// Unit switching and precision for length labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthFormat {
    /// Lengths at or above this many kilometres are shown in km.
    pub km_threshold: f64,
    pub km_precision: usize,
    pub m_precision: usize,
}

impl Default for LengthFormat {
    fn default() -> Self {
        Self {
            km_threshold: 1.0,
            km_precision: 3,
            m_precision: 2,
        }
    }
}

impl LengthFormat {
    /// Format a length given in kilometres.
    pub fn format(&self, km: f64) -> String {
        if km >= self.km_threshold {
            format!("{:.*}km", self.km_precision, km)
        } else {
            format!("{:.*}m", self.m_precision, km * 1000.0)
        }
    }
}

/// Unit switching and precision for area labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaFormat {
    /// Areas at or above this many square metres are shown in km².
    pub km2_threshold: f64,
    pub km2_precision: usize,
    pub m2_precision: usize,
}

impl Default for AreaFormat {
    fn default() -> Self {
        Self {
            km2_threshold: 1_000_000.0,
            km2_precision: 3,
            m2_precision: 2,
        }
    }
}

impl AreaFormat {
    /// Format an area given in square metres.
    pub fn format(&self, m2: f64) -> String {
        if m2 >= self.km2_threshold {
            format!("{:.*}km²", self.km2_precision, m2 / 1_000_000.0)
        } else {
            format!("{:.*}m²", self.m2_precision, m2)
        }
    }
}

/// Precision of coordinate text on point labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateFormat {
    pub precision: usize,
}

impl Default for CoordinateFormat {
    fn default() -> Self {
        Self { precision: 6 }
    }
}

impl CoordinateFormat {
    pub fn format(&self, v: Vertex) -> String {
        format!("{:.*}, {:.*}", self.precision, v.x, self.precision, v.y)
    }
}

/// Where a label is attached, so renderers can style each kind differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    /// Cumulative length at a vertex, or coordinate text for points.
    Vertex,
    /// Length of one placed segment, at its midpoint.
    Segment,
    /// Live total including the ghost segment, at the ghost.
    Preview,
    /// Enclosed area of a polygon.
    Area,
    /// Perimeter of a polygon.
    Perimeter,
}

/// A formatted measurement attached to a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub kind: LabelKind,
    pub position: Vertex,
    pub text: String,
}

/// A label formatting function: value in, text out.
pub type FormatFn = Arc<dyn Fn(f64) -> String + Send + Sync>;

/// Per-editor measurement settings: metric plus the formatters.
#[derive(Clone)]
pub struct Measurer {
    pub metric: Metric,
    length: FormatFn,
    area: FormatFn,
    coordinates: CoordinateFormat,
}

impl fmt::Debug for Measurer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Measurer")
            .field("metric", &self.metric)
            .field("coordinates", &self.coordinates)
            .finish_non_exhaustive()
    }
}

impl Default for Measurer {
    fn default() -> Self {
        Self::new(
            Metric::default(),
            LengthFormat::default(),
            AreaFormat::default(),
            CoordinateFormat::default(),
        )
    }
}

impl Measurer {
    /// Create a measurer from numeric formats.
    pub fn new(metric: Metric, length: LengthFormat, area: AreaFormat, coordinates: CoordinateFormat) -> Self {
        Self {
            metric,
            length: Arc::new(move |km| length.format(km)),
            area: Arc::new(move |m2| area.format(m2)),
            coordinates,
        }
    }

    /// Replace the length formatter.
    pub fn set_length_formatter(&mut self, f: FormatFn) {
        self.length = f;
    }

    /// Replace the area formatter.
    pub fn set_area_formatter(&mut self, f: FormatFn) {
        self.area = f;
    }

    pub fn format_length(&self, km: f64) -> String {
        (self.length)(km)
    }

    pub fn format_area(&self, m2: f64) -> String {
        (self.area)(m2)
    }

    /// Rebuild `out` with the labels for a geometry snapshot.
    ///
    /// `real` are the placed vertices; `ghost` is included only in preview
    /// labels. `out` is cleared first so the caller can reuse its allocation.
    pub fn labels(&self, kind: GeometryKind, real: &[Vertex], ghost: Option<Vertex>, out: &mut Vec<Label>) {
        out.clear();
        match kind {
            GeometryKind::Point => {
                out.extend(real.iter().map(|&v| Label {
                    kind: LabelKind::Vertex,
                    position: v,
                    text: self.coordinates.format(v),
                }));
            }
            GeometryKind::LineString => self.line_labels(real, ghost, out),
            GeometryKind::Polygon => self.polygon_labels(real, ghost, out),
        }
    }

    fn line_labels(&self, real: &[Vertex], ghost: Option<Vertex>, out: &mut Vec<Label>) {
        let mut total = 0.0;
        for w in real.windows(2) {
            let segment = segment_length(w[0], w[1], self.metric);
            total += segment;
            out.push(Label {
                kind: LabelKind::Segment,
                position: midpoint(w[0], w[1]),
                text: self.format_length(segment),
            });
            out.push(Label {
                kind: LabelKind::Vertex,
                position: w[1],
                text: self.format_length(total),
            });
        }

        if let (Some(ghost), Some(&last)) = (ghost, real.last()) {
            if !coincident(ghost, last) {
                total += segment_length(last, ghost, self.metric);
                out.push(Label {
                    kind: LabelKind::Preview,
                    position: ghost,
                    text: self.format_length(total),
                });
            }
        }
    }

    fn polygon_labels(&self, real: &[Vertex], ghost: Option<Vertex>, out: &mut Vec<Label>) {
        let mut ring = real.to_vec();
        if let (Some(ghost), Some(&last)) = (ghost, real.last()) {
            if !coincident(ghost, last) {
                ring.push(ghost);
            }
        }
        if ring.len() < 3 {
            return;
        }
        let Some(anchor) = centroid(&ring) else {
            return;
        };
        out.push(Label {
            kind: LabelKind::Area,
            position: anchor,
            text: self.format_area(polygon_area(&ring, self.metric)),
        });
        out.push(Label {
            kind: LabelKind::Perimeter,
            position: anchor,
            text: self.format_length(polygon_perimeter(&ring, self.metric)),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_segment_length_one_degree_latitude() {
        let km = segment_length(Point::new(0.0, 0.0), Point::new(0.0, 1.0), Metric::Geodesic);
        assert!((km - 111.195).abs() < 0.01, "got {km}");
    }

    #[test]
    fn test_line_length_sums_segments() {
        let pts = [Point::new(0.0, 0.0), Point::new(0.0, 1.0), Point::new(0.0, 2.0)];
        let total = line_length(&pts, Metric::Geodesic);
        let single = segment_length(pts[0], pts[1], Metric::Geodesic);
        assert!((total - 2.0 * single).abs() < 1e-9);
    }

    #[test]
    fn test_planar_length_in_km() {
        let km = line_length(&[Point::new(0.0, 0.0), Point::new(300.0, 400.0)], Metric::Planar);
        assert!((km - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_planar_area() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(0.0, 0.0),
        ];
        assert!((polygon_area(&square, Metric::Planar) - 100.0).abs() < f64::EPSILON);
        assert!((polygon_perimeter(&square, Metric::Planar) - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_geodesic_area_one_degree_cell() {
        let cell = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let area = polygon_area(&cell, Metric::Geodesic);
        let expected = 1.239_12e10;
        assert!(((area - expected) / expected).abs() < 1e-3, "got {area}");
    }

    #[test]
    fn test_degenerate_area_is_zero() {
        let two = [Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert_eq!(polygon_area(&two, Metric::Geodesic), 0.0);
    }

    #[test]
    fn test_length_format_boundary() {
        let fmt = LengthFormat::default();
        assert_eq!(fmt.format(0.999), "999.00m");
        assert_eq!(fmt.format(1.0), "1.000km");
        assert_eq!(fmt.format(3.14159), "3.142km");
    }

    #[test]
    fn test_area_format_boundary() {
        let fmt = AreaFormat::default();
        assert_eq!(fmt.format(0.45), "0.45m²");
        assert_eq!(fmt.format(999_999.0), "999999.00m²");
        assert_eq!(fmt.format(1_000_000.0), "1.000km²");
    }

    #[test]
    fn test_custom_precision() {
        let fmt = LengthFormat {
            km_threshold: 1.0,
            km_precision: 1,
            m_precision: 0,
        };
        assert_eq!(fmt.format(0.5), "500m");
        assert_eq!(fmt.format(2.26), "2.3km");
    }

    #[test]
    fn test_line_labels_segments_and_preview() {
        let m = Measurer::default();
        let real = [Point::new(0.0, 0.0), Point::new(0.0, 1.0), Point::new(0.0, 2.0)];
        let mut labels = Vec::new();
        m.labels(GeometryKind::LineString, &real, Some(Point::new(0.0, 3.0)), &mut labels);

        let segments: Vec<_> = labels.iter().filter(|l| l.kind == LabelKind::Segment).collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].position, Point::new(0.0, 0.5));
        assert_eq!(labels.iter().filter(|l| l.kind == LabelKind::Preview).count(), 1);
    }

    #[test]
    fn test_line_labels_skip_ghost_on_last_vertex() {
        let m = Measurer::default();
        let real = [Point::new(0.0, 0.0)];
        let mut labels = Vec::new();
        m.labels(GeometryKind::LineString, &real, Some(Point::new(0.0, 0.0)), &mut labels);
        assert!(labels.is_empty());
    }

    #[test]
    fn test_polygon_labels_need_three_vertices() {
        let m = Measurer::new(Metric::Planar, LengthFormat::default(), AreaFormat::default(), CoordinateFormat::default());
        let mut labels = Vec::new();
        let real = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        m.labels(GeometryKind::Polygon, &real, None, &mut labels);
        assert!(labels.is_empty());

        m.labels(GeometryKind::Polygon, &real, Some(Point::new(10.0, 10.0)), &mut labels);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].kind, LabelKind::Area);
        assert_eq!(labels[0].text, "50.00m²");
    }

    #[test]
    fn test_point_labels_show_coordinates() {
        let m = Measurer::default();
        let mut labels = Vec::new();
        m.labels(GeometryKind::Point, &[Point::new(12.5, -3.25)], None, &mut labels);
        assert_eq!(labels[0].text, "12.500000, -3.250000");
    }

    #[test]
    fn test_custom_formatter() {
        let mut m = Measurer::default();
        m.set_length_formatter(Arc::new(|km| format!("{:.0} mi", km / 1.609_344)));
        assert_eq!(m.format_length(1.609_344 * 3.0), "3 mi");
    }
}

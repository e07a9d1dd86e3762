//! Vertex accumulation for the geometry under construction.
//!
//! The buffer stores the placed ("real") vertices followed, for line strings
//! and polygons, by a single trailing ghost vertex that follows the pointer.
//! The ghost never reaches committed output or measurement unless a later
//! placement promotes it.

use crate::geometry::{GeometryKind, Vertex, coincident};

/// Ordered vertices of one editing session, plus the optional ghost.
#[derive(Debug, Clone)]
pub struct GeometryBuffer {
    kind: GeometryKind,
    /// Real vertices, then the ghost when `ghost_present` is set.
    vertices: Vec<Vertex>,
    ghost_present: bool,
    ghost_enabled: bool,
    min_vertices: usize,
}

impl GeometryBuffer {
    /// Create an empty buffer using the kind's default policy.
    pub fn new(kind: GeometryKind) -> Self {
        Self::with_options(kind, true, None)
    }

    /// Create an empty buffer with explicit ghost and minimum-vertex settings.
    ///
    /// The ghost is only ever used for kinds that support it, and the minimum
    /// never drops below one vertex.
    pub fn with_options(kind: GeometryKind, ghost_enabled: bool, min_vertices: Option<usize>) -> Self {
        Self {
            kind,
            vertices: Vec::new(),
            ghost_present: false,
            ghost_enabled: ghost_enabled && kind.uses_ghost(),
            min_vertices: min_vertices.unwrap_or_else(|| kind.min_vertices()).max(1),
        }
    }

    /// Geometry kind of this buffer.
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    /// Minimum real vertices needed for [`finish`](Self::finish) to succeed.
    pub fn min_vertices(&self) -> usize {
        self.min_vertices
    }

    /// Clear all vertices and the ghost.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.ghost_present = false;
    }

    /// Number of real (placed) vertices.
    pub fn len(&self) -> usize {
        self.vertices.len() - usize::from(self.ghost_present)
    }

    /// Check if no vertex has been placed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a session is in progress (at least one real vertex).
    pub fn is_drawing(&self) -> bool {
        !self.is_empty()
    }

    /// The placed vertices, ghost excluded.
    pub fn real_vertices(&self) -> &[Vertex] {
        &self.vertices[..self.len()]
    }

    /// The placed vertices followed by the ghost, if any.
    pub fn preview_vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Current ghost position.
    pub fn ghost(&self) -> Option<Vertex> {
        if self.ghost_present {
            self.vertices.last().copied()
        } else {
            None
        }
    }

    /// Place a real vertex and return the real vertices.
    ///
    /// The first placement starts the session. Later placements promote the
    /// ghost to a real vertex at `v` and push a fresh ghost on top of it. A
    /// placement on top of the last real vertex only moves the ghost, so the
    /// repeated clicks of a double-click never stack duplicate vertices.
    pub fn place_vertex(&mut self, v: Vertex) -> &[Vertex] {
        let Some(&last) = self.real_vertices().last() else {
            self.vertices.clear();
            self.vertices.push(v);
            if self.ghost_enabled {
                self.vertices.push(v);
                self.ghost_present = true;
            }
            return self.real_vertices();
        };

        if coincident(last, v) {
            self.update_ghost(v);
            return self.real_vertices();
        }

        if self.ghost_present {
            if let Some(ghost) = self.vertices.last_mut() {
                *ghost = v;
            }
        }
        self.vertices.push(v);
        self.real_vertices()
    }

    /// Move the ghost without adding a real vertex.
    ///
    /// Returns `false` when there is no session or no ghost.
    pub fn update_ghost(&mut self, v: Vertex) -> bool {
        if !self.is_drawing() || !self.ghost_present {
            return false;
        }
        match self.vertices.last_mut() {
            Some(ghost) => {
                *ghost = v;
                true
            }
            None => false,
        }
    }

    /// Turn the ghost into a real vertex, keeping a new ghost on top of it.
    ///
    /// Does nothing when the ghost sits on the last real vertex.
    pub fn promote_ghost(&mut self) -> bool {
        match self.ghost() {
            Some(ghost) => {
                let promoted = self.real_vertices().last().is_none_or(|&last| !coincident(last, ghost));
                if promoted {
                    self.vertices.push(ghost);
                }
                promoted
            }
            None => false,
        }
    }

    /// Remove the most recently placed real vertex.
    ///
    /// The ghost stays at the last pointer position, trailing the new last
    /// vertex. Removing the only real vertex ends the session. Returns `false`
    /// when there was nothing to remove.
    pub fn revoke_last(&mut self) -> bool {
        let count = self.len();
        if count == 0 {
            return false;
        }
        self.vertices.remove(count - 1);
        if self.is_empty() {
            self.reset();
        }
        true
    }

    /// Real vertices, closed for polygons. The closing vertex is never stored.
    pub fn committable_vertices(&self) -> Vec<Vertex> {
        let real = self.real_vertices();
        let mut out = Vec::with_capacity(real.len() + 1);
        out.extend_from_slice(real);
        if self.kind.closes_ring() {
            if let Some(&first) = real.first() {
                out.push(first);
            }
        }
        out
    }

    /// Drop the ghost and return the finished vertex list.
    ///
    /// Returns `None` and leaves the buffer untouched when there are fewer
    /// real vertices than the minimum; the caller decides whether to discard.
    pub fn finish(&mut self) -> Option<Vec<Vertex>> {
        if self.len() < self.min_vertices {
            return None;
        }
        let out = self.committable_vertices();
        self.reset();
        Some(out)
    }
}

//! Render sink contract: how an editor hands snapshots to the host.
//!
//! An editor never paints anything itself. After every mutating step it
//! pushes a [`GeometryUpdate`] to its sink; the sink owns the host-side
//! sources and layers and decides how to draw them.

use crate::feature::CommittedFeature;
use crate::geometry::{GeometryKind, Vertex};
use crate::measure::Label;
use serde::{Deserialize, Serialize};

/// Snapshot of the geometry under construction.
///
/// Editors keep one of these and rewrite it in place on every step, so the
/// pointer-move path does not allocate a new snapshot per event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "geometry-update", rename_all = "camelCase")]
pub struct GeometryUpdate {
    pub kind: GeometryKind,
    /// Placed vertices, then the ghost when `ghost_included` is set.
    pub vertices: Vec<Vertex>,
    pub ghost_included: bool,
    pub labels: Vec<Label>,
}

impl GeometryUpdate {
    /// Create an empty snapshot.
    pub fn new(kind: GeometryKind) -> Self {
        Self {
            kind,
            vertices: Vec::new(),
            ghost_included: false,
            labels: Vec::new(),
        }
    }

    /// Clear vertices and labels, keeping the allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.labels.clear();
        self.ghost_included = false;
    }

    /// Check if the snapshot shows nothing.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.labels.is_empty()
    }

    /// Placed vertices only.
    pub fn real_vertices(&self) -> &[Vertex] {
        let n = self.vertices.len() - usize::from(self.ghost_included && !self.vertices.is_empty());
        &self.vertices[..n]
    }
}

/// Which host input events an editor currently listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputMask {
    pub click: bool,
    pub pointer_move: bool,
    pub right_click: bool,
    pub double_click: bool,
}

impl InputMask {
    /// Not listening to anything.
    pub const NONE: Self = Self {
        click: false,
        pointer_move: false,
        right_click: false,
        double_click: false,
    };

    /// Listening to every editing event.
    pub const ALL: Self = Self {
        click: true,
        pointer_move: true,
        right_click: true,
        double_click: true,
    };

    /// Only listening for the click that starts a new session.
    pub const CLICK_ONLY: Self = Self {
        click: true,
        pointer_move: false,
        right_click: false,
        double_click: false,
    };

    /// Check if any event is subscribed.
    pub fn is_listening(self) -> bool {
        self != Self::NONE
    }
}

/// Cursor styles an editor asks the host for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
}

/// Receiver of editor output; implemented by the host adapter.
pub trait RenderSink {
    /// Create the sources and layers for this editor's kind.
    fn open(&mut self, kind: GeometryKind);

    /// Show the current preview snapshot.
    fn push(&mut self, update: &GeometryUpdate);

    /// Add a committed feature to the persistent layer.
    fn commit(&mut self, feature: &CommittedFeature);

    /// Remove every committed feature from the persistent layer.
    fn clear_committed(&mut self);

    /// Subscribe to or unsubscribe from host input events.
    fn set_input(&mut self, mask: InputMask);

    /// Change the map cursor.
    fn set_cursor(&mut self, cursor: Cursor);

    /// Remove the sources and layers created by [`open`](Self::open).
    fn close(&mut self);

    /// Deliver work deferred until the surface became available.
    fn sync(&mut self) {}
}

/// Sink that drops everything; for editors without a visual surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn open(&mut self, _kind: GeometryKind) {}
    fn push(&mut self, _update: &GeometryUpdate) {}
    fn commit(&mut self, _feature: &CommittedFeature) {}
    fn clear_committed(&mut self) {}
    fn set_input(&mut self, _mask: InputMask) {}
    fn set_cursor(&mut self, _cursor: Cursor) {}
    fn close(&mut self) {}
}

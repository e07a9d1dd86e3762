//! Render sink that drives a [`HostRenderer`].

use crate::geojson::{committed_collection, empty_collection, preview_collection};
use crate::host::{HostRenderer, RenderResult};
use crate::layer::{LayerDescriptor, SourceRole, layers_for, source_id};
use crate::ready::ReadySignal;
use mapedit_core::feature::{CommittedFeature, FeatureStyle};
use mapedit_core::geometry::GeometryKind;
use mapedit_core::sink::{Cursor, GeometryUpdate, InputMask, RenderSink};
use std::cell::RefCell;
use std::rc::Rc;

/// Calls received before the host was ready.
#[derive(Debug, Default)]
struct Pending {
    open: Option<GeometryKind>,
    preview: Option<GeometryUpdate>,
    committed_dirty: bool,
    input: Option<InputMask>,
    cursor: Option<Cursor>,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.open.is_none()
            && self.preview.is_none()
            && !self.committed_dirty
            && self.input.is_none()
            && self.cursor.is_none()
    }
}

/// [`RenderSink`] over a shared host map.
///
/// Owns the sources and layers of one editor kind and the collection of
/// features that editor committed. Until the host signals readiness no host
/// call is made: the sink keeps the pending open and only the latest preview,
/// and replays them on the first call after readiness (or on [`flush`](Self::flush)).
/// Host failures are logged and never reach the editor.
pub struct HostSink<H: HostRenderer> {
    host: Rc<RefCell<H>>,
    ready: ReadySignal,
    style: FeatureStyle,
    /// Kind whose sources and layers exist on the host.
    live: Option<GeometryKind>,
    layers: Vec<LayerDescriptor>,
    committed: Vec<CommittedFeature>,
    pending: Pending,
}

impl<H: HostRenderer> HostSink<H> {
    pub fn new(host: Rc<RefCell<H>>, ready: ReadySignal, style: FeatureStyle) -> Self {
        Self {
            host,
            ready,
            style,
            live: None,
            layers: Vec::new(),
            committed: Vec::new(),
            pending: Pending::default(),
        }
    }

    /// Features committed through this sink, oldest first.
    pub fn committed(&self) -> &[CommittedFeature] {
        &self.committed
    }

    /// Whether calls are waiting for the host.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Replay pending calls if the host is ready. Returns whether the sink is
    /// in sync with the host.
    pub fn flush(&mut self) -> bool {
        if !self.ready.is_ready() {
            return false;
        }
        if self.pending.is_empty() {
            return true;
        }
        let pending = std::mem::take(&mut self.pending);
        log::debug!("Replaying deferred host calls: {:?}", pending);
        if let Some(kind) = pending.open {
            self.create(kind);
        }
        if pending.committed_dirty {
            self.sync_committed();
        }
        if let Some(update) = pending.preview {
            self.sync_preview(&update);
        }
        if let Some(mask) = pending.input {
            self.host.borrow_mut().set_input(mask);
        }
        if let Some(cursor) = pending.cursor {
            self.host.borrow_mut().set_cursor(cursor);
        }
        true
    }

    fn create(&mut self, kind: GeometryKind) {
        if self.live.is_some() {
            return;
        }
        let layers = layers_for(kind, &self.style);
        let mut host = self.host.borrow_mut();
        for role in [SourceRole::Committed, SourceRole::Preview] {
            let id = source_id(kind, role);
            warn_on_error(host.add_source(&id, empty_collection()), "add source");
        }
        for layer in &layers {
            warn_on_error(host.add_layer(layer), "add layer");
        }
        drop(host);
        self.layers = layers;
        self.live = Some(kind);
        // Committed features may predate the sources.
        if !self.committed.is_empty() {
            self.sync_committed();
        }
    }

    fn sync_preview(&mut self, update: &GeometryUpdate) {
        let Some(kind) = self.live else {
            return;
        };
        let id = source_id(kind, SourceRole::Preview);
        let result = self
            .host
            .borrow_mut()
            .set_source_data(&id, preview_collection(update));
        warn_on_error(result, "update preview");
    }

    fn sync_committed(&mut self) {
        let Some(kind) = self.live else {
            return;
        };
        let id = source_id(kind, SourceRole::Committed);
        let data = committed_collection(&self.committed);
        warn_on_error(self.host.borrow_mut().set_source_data(&id, data), "update committed");
    }
}

fn warn_on_error(result: RenderResult<()>, action: &str) {
    if let Err(e) = result {
        log::warn!("Host failed to {}: {}", action, e);
    }
}

impl<H: HostRenderer> RenderSink for HostSink<H> {
    fn open(&mut self, kind: GeometryKind) {
        if self.flush() {
            self.create(kind);
        } else {
            self.pending.open = Some(kind);
        }
    }

    fn push(&mut self, update: &GeometryUpdate) {
        if self.flush() {
            self.sync_preview(update);
        } else {
            match self.pending.preview.as_mut() {
                Some(preview) => preview.clone_from(update),
                None => self.pending.preview = Some(update.clone()),
            }
        }
    }

    fn commit(&mut self, feature: &CommittedFeature) {
        self.committed.push(feature.clone());
        if self.flush() {
            self.sync_committed();
        } else {
            self.pending.committed_dirty = true;
        }
    }

    fn clear_committed(&mut self) {
        self.committed.clear();
        if self.flush() {
            self.sync_committed();
        } else {
            self.pending.committed_dirty = true;
        }
    }

    fn set_input(&mut self, mask: InputMask) {
        if self.flush() {
            self.host.borrow_mut().set_input(mask);
        } else {
            self.pending.input = Some(mask);
        }
    }

    fn sync(&mut self) {
        self.flush();
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        if self.flush() {
            self.host.borrow_mut().set_cursor(cursor);
        } else {
            self.pending.cursor = Some(cursor);
        }
    }

    fn close(&mut self) {
        if !self.ready.is_ready() {
            self.pending = Pending::default();
            return;
        }
        let Some(kind) = self.live.take() else {
            return;
        };
        let mut host = self.host.borrow_mut();
        for layer in self.layers.drain(..).rev() {
            warn_on_error(host.remove_layer(&layer.id), "remove layer");
        }
        for role in [SourceRole::Preview, SourceRole::Committed] {
            warn_on_error(host.remove_source(&source_id(kind, role)), "remove source");
        }
    }
}

//! Incremental geometry editor.
//!
//! One [`GeometryEditor`] per geometry kind. It turns editing input (click,
//! move, right-click, double-click, finish, cancel) into buffer mutations,
//! keeps the measurement labels in sync and pushes every change to its
//! [`RenderSink`]. Insufficient geometry and out-of-order input are silent
//! no-ops reported through [`EditOutcome`], never errors.

use crate::accumulator::GeometryBuffer;
use crate::config::EditorConfig;
use crate::feature::{CommittedFeature, FeatureId};
use crate::geometry::{GeometryKind, Vertex, coincident};
use crate::input::EditorInput;
use crate::measure::{FormatFn, LabelKind, Measurer};
use crate::sink::{Cursor, GeometryUpdate, InputMask, RenderSink};
use crate::throttle::Throttle;

/// Lifecycle state of an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    /// Not listening to input.
    #[default]
    Idle,
    /// Started: listening to input, possibly drawing.
    Active,
}

/// What an editing call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Nothing changed (wrong state, unsubscribed input, nothing to undo).
    Ignored,
    /// The preview changed.
    Updated,
    /// A feature was committed.
    Committed(FeatureId),
    /// Finish was requested but the geometry had too few vertices.
    Discarded,
    /// The session was cancelled.
    Cancelled,
}

impl EditOutcome {
    /// Check if the call had any effect.
    pub fn is_handled(self) -> bool {
        self != EditOutcome::Ignored
    }
}

/// Callback receiving ownership of each committed feature.
pub type FinishCallback = Box<dyn FnMut(CommittedFeature)>;

/// Callback invoked when a finish is discarded for lack of vertices.
pub type DiscardCallback = Box<dyn FnMut()>;

/// Stateful editor building one geometry kind.
pub struct GeometryEditor {
    kind: GeometryKind,
    config: EditorConfig,
    state: EditorState,
    input: InputMask,
    buffer: GeometryBuffer,
    measurer: Measurer,
    /// Reused preview snapshot.
    snapshot: GeometryUpdate,
    throttle: Throttle,
    sink: Box<dyn RenderSink>,
    /// Whether the sink's sources and layers exist.
    opened: bool,
    on_finish: Option<FinishCallback>,
    on_discard: Option<DiscardCallback>,
    events_handled: u64,
}

impl GeometryEditor {
    /// Create an editor with the kind's default configuration.
    pub fn new(kind: GeometryKind, sink: Box<dyn RenderSink>) -> Self {
        Self::with_config(kind, EditorConfig::for_kind(kind), sink)
    }

    /// Create an editor with an explicit configuration.
    pub fn with_config(kind: GeometryKind, config: EditorConfig, sink: Box<dyn RenderSink>) -> Self {
        Self {
            kind,
            state: EditorState::Idle,
            input: InputMask::NONE,
            buffer: GeometryBuffer::with_options(kind, config.ghost_enabled, config.min_vertices),
            measurer: config.measurer(),
            snapshot: GeometryUpdate::new(kind),
            throttle: Throttle::from_millis(config.debounce_ms),
            sink,
            opened: false,
            on_finish: None,
            on_discard: None,
            events_handled: 0,
            config,
        }
    }

    /// Replace the length label formatter.
    pub fn with_length_formatter(mut self, f: FormatFn) -> Self {
        self.measurer.set_length_formatter(f);
        self
    }

    /// Replace the area label formatter.
    pub fn with_area_formatter(mut self, f: FormatFn) -> Self {
        self.measurer.set_area_formatter(f);
        self
    }

    /// Set the callback receiving committed features.
    pub fn on_finish(&mut self, f: impl FnMut(CommittedFeature) + 'static) {
        self.on_finish = Some(Box::new(f));
    }

    /// Set the callback invoked when a finish is discarded.
    pub fn on_discard(&mut self, f: impl FnMut() + 'static) {
        self.on_discard = Some(Box::new(f));
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Check if the editor is started.
    pub fn is_active(&self) -> bool {
        self.state == EditorState::Active
    }

    /// Check if a session holds placed vertices.
    pub fn is_drawing(&self) -> bool {
        self.buffer.is_drawing()
    }

    /// Input events the editor currently consumes.
    pub fn input_mask(&self) -> InputMask {
        self.input
    }

    /// The geometry under construction.
    pub fn buffer(&self) -> &GeometryBuffer {
        &self.buffer
    }

    /// The last snapshot pushed to the sink.
    pub fn snapshot(&self) -> &GeometryUpdate {
        &self.snapshot
    }

    /// Number of input events that had an effect.
    pub fn events_handled(&self) -> u64 {
        self.events_handled
    }

    /// Start listening to input. Creates the sink's layers on first use.
    pub fn start(&mut self) -> EditOutcome {
        if self.is_active() {
            return EditOutcome::Ignored;
        }
        if !self.opened {
            self.sink.open(self.kind);
            self.opened = true;
        }
        self.state = EditorState::Active;
        self.set_input(InputMask::ALL);
        self.sink.set_cursor(Cursor::Crosshair);
        log::debug!("{:?} editor started", self.kind);
        EditOutcome::Updated
    }

    /// Route a translated input event, if subscribed.
    pub fn dispatch(&mut self, input: EditorInput) -> EditOutcome {
        let outcome = match input {
            EditorInput::Click(v) => self.on_click(v),
            EditorInput::Move(v) => self.on_pointer_move(v),
            EditorInput::RightClick => self.on_right_click(),
            EditorInput::DoubleClick(v) => self.on_double_click(v),
            EditorInput::Undo => self.undo(),
            EditorInput::Finish => self.finish(),
            EditorInput::Cancel => self.cancel(),
        };
        if outcome.is_handled() {
            self.events_handled += 1;
        }
        outcome
    }

    /// Place a vertex. Points commit right away.
    pub fn on_click(&mut self, v: Vertex) -> EditOutcome {
        if !self.is_active() || !self.input.click {
            return EditOutcome::Ignored;
        }
        if !self.buffer.is_drawing() && self.input != InputMask::ALL {
            // Re-armed after a finish: a new session starts here.
            self.set_input(InputMask::ALL);
            self.sink.set_cursor(Cursor::Crosshair);
        }
        self.buffer.place_vertex(v);
        if self.kind.commits_on_place() {
            return self.finish();
        }
        self.refresh(true);
        EditOutcome::Updated
    }

    /// Move the ghost. Measurement is coalesced; the preview is not.
    pub fn on_pointer_move(&mut self, v: Vertex) -> EditOutcome {
        if !self.is_active() || !self.input.pointer_move {
            return EditOutcome::Ignored;
        }
        if !self.buffer.update_ghost(v) {
            return EditOutcome::Ignored;
        }
        self.throttle.mark_dirty();
        let measure = self.throttle.should_run();
        log::trace!("{:?} ghost at ({}, {}), measure: {}", self.kind, v.x, v.y, measure);
        self.refresh(measure);
        EditOutcome::Updated
    }

    /// Delete the last placed vertex.
    pub fn on_right_click(&mut self) -> EditOutcome {
        if !self.is_active() || !self.input.right_click {
            return EditOutcome::Ignored;
        }
        self.revoke()
    }

    /// Keyboard undo of the last placed vertex.
    pub fn undo(&mut self) -> EditOutcome {
        if !self.is_active() || !self.buffer.is_drawing() {
            return EditOutcome::Ignored;
        }
        self.revoke()
    }

    fn revoke(&mut self) -> EditOutcome {
        if !self.buffer.revoke_last() {
            return EditOutcome::Ignored;
        }
        if !self.buffer.is_drawing() {
            log::debug!("{:?} session emptied by undo", self.kind);
        }
        self.refresh(true);
        EditOutcome::Updated
    }

    /// Finish from a double-click at `v`.
    ///
    /// The double-click position becomes the last vertex unless it sits on the
    /// last placed one, so a double-click right after the first click
    /// discards the session.
    pub fn on_double_click(&mut self, v: Vertex) -> EditOutcome {
        if !self.is_active() || !self.input.double_click || !self.buffer.is_drawing() {
            return EditOutcome::Ignored;
        }
        self.buffer.update_ghost(v);
        self.buffer.promote_ghost();
        self.finish()
    }

    /// Commit the current geometry, or discard it if it is too small.
    ///
    /// Drops the high-frequency listeners either way. With
    /// `rearm_after_finish` the editor keeps listening for the click that
    /// starts the next session; otherwise it goes idle.
    pub fn finish(&mut self) -> EditOutcome {
        if !self.is_active() || !self.buffer.is_drawing() {
            return EditOutcome::Ignored;
        }

        let mut labels = Vec::new();
        self.measurer
            .labels(self.kind, self.buffer.real_vertices(), None, &mut labels);

        let outcome = match self.buffer.finish() {
            Some(vertices) => {
                let feature = CommittedFeature::new(self.kind, vertices, labels, self.config.style.clone());
                let id = feature.id;
                log::debug!("{:?} committed {} with {} vertices", self.kind, id, feature.vertices.len());
                self.sink.commit(&feature);
                if let Some(callback) = self.on_finish.as_mut() {
                    callback(feature);
                }
                EditOutcome::Committed(id)
            }
            None => {
                log::debug!(
                    "{:?} discarded: {} of {} vertices",
                    self.kind,
                    self.buffer.len(),
                    self.buffer.min_vertices()
                );
                self.buffer.reset();
                if let Some(callback) = self.on_discard.as_mut() {
                    callback();
                }
                EditOutcome::Discarded
            }
        };

        self.clear_preview();
        if self.config.rearm_after_finish {
            self.set_input(InputMask::CLICK_ONLY);
        } else {
            self.state = EditorState::Idle;
            self.set_input(InputMask::NONE);
        }
        self.sink.set_cursor(Cursor::Default);
        outcome
    }

    /// Drop the session and stop listening. No callbacks fire.
    pub fn cancel(&mut self) -> EditOutcome {
        if !self.is_active() && !self.buffer.is_drawing() {
            return EditOutcome::Ignored;
        }
        self.buffer.reset();
        self.clear_preview();
        self.state = EditorState::Idle;
        self.set_input(InputMask::NONE);
        self.sink.set_cursor(Cursor::Default);
        log::debug!("{:?} editor cancelled", self.kind);
        EditOutcome::Cancelled
    }

    /// Remove every committed feature from the sink.
    pub fn clear(&mut self) {
        self.sink.clear_committed();
    }

    /// Cancel and remove the sink's layers.
    pub fn close(&mut self) {
        self.cancel();
        if self.opened {
            self.sink.close();
            self.opened = false;
        }
    }

    /// Let the sink deliver deferred work, e.g. once its host is ready.
    pub fn sync_sink(&mut self) {
        self.sink.sync();
    }

    /// Run coalesced measurement whose window has passed.
    pub fn tick(&mut self) -> EditOutcome {
        if !self.buffer.is_drawing() || !self.throttle.should_run() {
            return EditOutcome::Ignored;
        }
        self.refresh(true);
        EditOutcome::Updated
    }

    /// Run pending measurement now, regardless of the window.
    pub fn flush_measurement(&mut self) -> EditOutcome {
        if !self.buffer.is_drawing() || !self.throttle.is_pending() {
            return EditOutcome::Ignored;
        }
        self.refresh(true);
        EditOutcome::Updated
    }

    fn set_input(&mut self, mask: InputMask) {
        self.input = mask;
        self.sink.set_input(mask);
    }

    /// Rewrite the snapshot from the buffer and push it.
    fn refresh(&mut self, measure: bool) {
        self.snapshot.vertices.clear();
        self.snapshot
            .vertices
            .extend_from_slice(self.buffer.preview_vertices());
        self.snapshot.ghost_included = self.buffer.ghost().is_some();
        if measure {
            self.measurer.labels(
                self.kind,
                self.buffer.real_vertices(),
                self.buffer.ghost(),
                &mut self.snapshot.labels,
            );
            self.throttle.mark_ran();
        } else {
            self.track_preview_label();
        }
        self.sink.push(&self.snapshot);
    }

    /// Keep the live total at the ghost while its text waits for the
    /// coalesced recompute.
    fn track_preview_label(&mut self) {
        let last = self.buffer.real_vertices().last().copied();
        let ghost = self
            .buffer
            .ghost()
            .filter(|&g| last.is_some_and(|last| !coincident(g, last)));
        match ghost {
            Some(ghost) => {
                for label in self.snapshot.labels.iter_mut().filter(|l| l.kind == LabelKind::Preview) {
                    label.position = ghost;
                }
            }
            None => self.snapshot.labels.retain(|l| l.kind != LabelKind::Preview),
        }
    }

    fn clear_preview(&mut self) {
        self.throttle.reset();
        self.snapshot.clear();
        self.sink.push(&self.snapshot);
    }
}

impl Drop for GeometryEditor {
    fn drop(&mut self) {
        self.close();
    }
}

//! Session controller: at most one editor listens to input at a time.

use crate::editor::{EditOutcome, GeometryEditor};
use crate::events::{EventBus, SessionEvent};
use crate::geometry::GeometryKind;
use crate::input::EditorInput;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use thiserror::Error;

/// Session controller errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No editor registered for {0:?}")]
    NotRegistered(GeometryKind),
    #[error("Editor for {found:?} registered under {expected:?}")]
    KindMismatch {
        expected: GeometryKind,
        found: GeometryKind,
    },
}

/// What happens to an in-progress session when another editor is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SwitchPolicy {
    /// Commit it if it has enough vertices, discard it otherwise.
    #[default]
    Finish,
    /// Drop it.
    Cancel,
}

/// Owns one editor per kind and routes input to the active one.
#[derive(Default)]
pub struct SessionController {
    editors: HashMap<GeometryKind, GeometryEditor>,
    active: Option<GeometryKind>,
    policy: SwitchPolicy,
    overrides: HashMap<GeometryKind, SwitchPolicy>,
    events: EventBus,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller with a default switch policy.
    pub fn with_policy(policy: SwitchPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Set the switch policy used for kinds without an override.
    pub fn set_switch_policy(&mut self, policy: SwitchPolicy) {
        self.policy = policy;
    }

    /// Override the switch policy for one kind.
    pub fn set_switch_policy_for(&mut self, kind: GeometryKind, policy: SwitchPolicy) {
        self.overrides.insert(kind, policy);
    }

    /// The policy applied when leaving `kind`.
    pub fn switch_policy(&self, kind: GeometryKind) -> SwitchPolicy {
        self.overrides.get(&kind).copied().unwrap_or(self.policy)
    }

    /// Register an editor, returning the one it replaces.
    ///
    /// The editor is stopped on the way in; only [`activate`](Self::activate)
    /// starts editors once they are owned by the controller.
    pub fn register(
        &mut self,
        kind: GeometryKind,
        mut editor: GeometryEditor,
    ) -> Result<Option<GeometryEditor>, SessionError> {
        if editor.kind() != kind {
            return Err(SessionError::KindMismatch {
                expected: kind,
                found: editor.kind(),
            });
        }
        editor.cancel();
        if self.active == Some(kind) {
            self.active = None;
            self.events.publish(SessionEvent::Deactivated { kind });
        }
        let replaced = self.editors.insert(kind, editor);
        if let Some(mut old) = replaced {
            old.cancel();
            Ok(Some(old))
        } else {
            Ok(None)
        }
    }

    /// Make `kind` the only editor listening to input.
    ///
    /// The previously active editor is finished or cancelled according to its
    /// switch policy, then stops listening.
    pub fn activate(&mut self, kind: GeometryKind) -> Result<(), SessionError> {
        if !self.editors.contains_key(&kind) {
            return Err(SessionError::NotRegistered(kind));
        }
        if self.active == Some(kind) && self.editors.get(&kind).is_some_and(GeometryEditor::is_active) {
            return Ok(());
        }
        self.deactivate_current();

        let editor = self
            .editors
            .get_mut(&kind)
            .ok_or(SessionError::NotRegistered(kind))?;
        editor.start();
        self.active = Some(kind);
        log::debug!("Activated {:?} editor", kind);
        self.events.publish(SessionEvent::Activated { kind });
        Ok(())
    }

    /// Cancel whichever editor is active.
    pub fn deactivate_all(&mut self) {
        if let Some(kind) = self.active.take() {
            if let Some(editor) = self.editors.get_mut(&kind) {
                editor.cancel();
            }
            self.events.publish(SessionEvent::Deactivated { kind });
        }
    }

    /// Remove the committed features of every editor.
    pub fn clear_all(&mut self) {
        for editor in self.editors.values_mut() {
            editor.clear();
        }
        self.events.publish(SessionEvent::Cleared);
    }

    /// Route input to the active editor.
    pub fn dispatch(&mut self, input: EditorInput) -> EditOutcome {
        let Some(kind) = self.active else {
            return EditOutcome::Ignored;
        };
        let Some(editor) = self.editors.get_mut(&kind) else {
            return EditOutcome::Ignored;
        };
        let outcome = editor.dispatch(input);
        let still_active = editor.is_active();
        publish_outcome(&mut self.events, kind, outcome);
        if !still_active {
            self.active = None;
            self.events.publish(SessionEvent::Deactivated { kind });
        }
        outcome
    }

    /// Let every editor's sink deliver deferred work.
    pub fn sync_sinks(&mut self) {
        for editor in self.editors.values_mut() {
            editor.sync_sink();
        }
    }

    /// Let the active editor run coalesced measurement.
    pub fn tick(&mut self) -> EditOutcome {
        self.active
            .and_then(|kind| self.editors.get_mut(&kind))
            .map_or(EditOutcome::Ignored, GeometryEditor::tick)
    }

    /// The kind of the active editor.
    pub fn active(&self) -> Option<GeometryKind> {
        self.active
    }

    pub fn editor(&self, kind: GeometryKind) -> Option<&GeometryEditor> {
        self.editors.get(&kind)
    }

    /// Receive session events from now on.
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn deactivate_current(&mut self) {
        let Some(kind) = self.active.take() else {
            return;
        };
        let policy = self.switch_policy(kind);
        if let Some(editor) = self.editors.get_mut(&kind) {
            if policy == SwitchPolicy::Finish {
                let outcome = editor.finish();
                publish_outcome(&mut self.events, kind, outcome);
            }
            // Also drops a re-armed click listener left by finish.
            editor.cancel();
        }
        log::debug!("Deactivated {:?} editor ({:?})", kind, policy);
        self.events.publish(SessionEvent::Deactivated { kind });
    }
}

fn publish_outcome(events: &mut EventBus, kind: GeometryKind, outcome: EditOutcome) {
    match outcome {
        EditOutcome::Committed(id) => events.publish(SessionEvent::Committed { kind, id }),
        EditOutcome::Discarded => events.publish(SessionEvent::Discarded { kind }),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{InputMask, NullSink};
    use kurbo::Point;

    fn controller() -> SessionController {
        let mut c = SessionController::new();
        for kind in GeometryKind::ALL {
            c.register(kind, GeometryEditor::new(kind, Box::new(NullSink)))
                .unwrap();
        }
        c
    }

    fn handled(c: &SessionController, kind: GeometryKind) -> u64 {
        c.editor(kind).map_or(0, GeometryEditor::events_handled)
    }

    #[test]
    fn test_activate_unregistered_kind() {
        let mut c = SessionController::new();
        assert_eq!(
            c.activate(GeometryKind::Polygon),
            Err(SessionError::NotRegistered(GeometryKind::Polygon))
        );
        assert_eq!(c.active(), None);
    }

    #[test]
    fn test_register_kind_mismatch() {
        let mut c = SessionController::new();
        let editor = GeometryEditor::new(GeometryKind::Point, Box::new(NullSink));
        assert!(matches!(
            c.register(GeometryKind::Polygon, editor),
            Err(SessionError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_mutual_exclusion() {
        let mut c = controller();
        c.activate(GeometryKind::LineString).unwrap();
        c.dispatch(EditorInput::Click(Point::new(0.0, 0.0)));
        assert_eq!(handled(&c, GeometryKind::LineString), 1);

        c.activate(GeometryKind::Polygon).unwrap();
        let line = c.editor(GeometryKind::LineString).unwrap();
        assert_eq!(line.input_mask(), InputMask::NONE);
        assert!(!line.is_drawing());

        c.dispatch(EditorInput::Click(Point::new(1.0, 1.0)));
        c.dispatch(EditorInput::Move(Point::new(2.0, 2.0)));
        assert_eq!(handled(&c, GeometryKind::LineString), 1);
        assert_eq!(handled(&c, GeometryKind::Polygon), 2);

        let listening = GeometryKind::ALL
            .iter()
            .filter(|k| c.editor(**k).is_some_and(|e| e.input_mask().is_listening()))
            .count();
        assert_eq!(listening, 1);
    }

    fn listening(c: &SessionController) -> Vec<GeometryKind> {
        GeometryKind::ALL
            .into_iter()
            .filter(|k| c.editor(*k).is_some_and(GeometryEditor::is_active))
            .collect()
    }

    #[test]
    fn test_registered_editor_starts_only_through_activate() {
        let mut c = controller();
        c.activate(GeometryKind::LineString).unwrap();

        let mut started = GeometryEditor::new(GeometryKind::Polygon, Box::new(NullSink));
        started.start();
        c.register(GeometryKind::Polygon, started).unwrap();
        assert_eq!(listening(&c), vec![GeometryKind::LineString]);
        assert_eq!(
            c.editor(GeometryKind::Polygon).map(GeometryEditor::input_mask),
            Some(InputMask::NONE)
        );

        c.activate(GeometryKind::Polygon).unwrap();
        assert_eq!(listening(&c), vec![GeometryKind::Polygon]);
        assert_eq!(c.active(), Some(GeometryKind::Polygon));
    }

    #[test]
    fn test_switch_finish_policy_commits() {
        let mut c = controller();
        let events = c.subscribe();
        c.activate(GeometryKind::LineString).unwrap();
        c.dispatch(EditorInput::Click(Point::new(0.0, 0.0)));
        c.dispatch(EditorInput::Click(Point::new(0.0, 1.0)));
        c.activate(GeometryKind::Point).unwrap();

        let received: Vec<_> = events.try_iter().collect();
        assert!(received.iter().any(|e| matches!(
            e,
            SessionEvent::Committed {
                kind: GeometryKind::LineString,
                ..
            }
        )));
        assert_eq!(
            received.last(),
            Some(&SessionEvent::Activated {
                kind: GeometryKind::Point
            })
        );
    }

    #[test]
    fn test_switch_cancel_override() {
        let mut c = controller();
        c.set_switch_policy_for(GeometryKind::LineString, SwitchPolicy::Cancel);
        let events = c.subscribe();
        c.activate(GeometryKind::LineString).unwrap();
        c.dispatch(EditorInput::Click(Point::new(0.0, 0.0)));
        c.dispatch(EditorInput::Click(Point::new(0.0, 1.0)));
        c.activate(GeometryKind::Polygon).unwrap();

        assert!(
            events
                .try_iter()
                .all(|e| !matches!(e, SessionEvent::Committed { .. }))
        );
        assert_eq!(c.switch_policy(GeometryKind::Polygon), SwitchPolicy::Finish);
    }

    #[test]
    fn test_reactivate_same_kind_is_noop() {
        let mut c = controller();
        c.activate(GeometryKind::LineString).unwrap();
        c.dispatch(EditorInput::Click(Point::new(0.0, 0.0)));
        c.activate(GeometryKind::LineString).unwrap();
        assert!(c.editor(GeometryKind::LineString).unwrap().is_drawing());
    }

    #[test]
    fn test_finish_returns_to_none_active() {
        let mut c = controller();
        c.activate(GeometryKind::LineString).unwrap();
        c.dispatch(EditorInput::Click(Point::new(0.0, 0.0)));
        c.dispatch(EditorInput::Click(Point::new(0.0, 1.0)));
        assert!(matches!(c.dispatch(EditorInput::Finish), EditOutcome::Committed(_)));
        assert_eq!(c.active(), None);
        assert_eq!(c.dispatch(EditorInput::Click(Point::ZERO)), EditOutcome::Ignored);
    }

    #[test]
    fn test_point_editor_stays_active() {
        let mut c = controller();
        c.activate(GeometryKind::Point).unwrap();
        c.dispatch(EditorInput::Click(Point::new(1.0, 1.0)));
        c.dispatch(EditorInput::Click(Point::new(2.0, 2.0)));
        assert_eq!(c.active(), Some(GeometryKind::Point));
        assert_eq!(handled(&c, GeometryKind::Point), 2);
    }

    #[test]
    fn test_deactivate_all_cancels() {
        let mut c = controller();
        c.activate(GeometryKind::Polygon).unwrap();
        c.dispatch(EditorInput::Click(Point::new(0.0, 0.0)));
        c.deactivate_all();
        assert_eq!(c.active(), None);
        assert!(!c.editor(GeometryKind::Polygon).unwrap().is_drawing());
        c.deactivate_all();
    }

    #[test]
    fn test_clear_all_publishes() {
        let mut c = controller();
        let events = c.subscribe();
        c.clear_all();
        assert_eq!(events.try_recv(), Ok(SessionEvent::Cleared));
    }
}

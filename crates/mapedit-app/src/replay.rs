//! Headless replay of recorded editing input.

use crate::config::SessionConfig;
use kurbo::{Affine, Point, Vec2};
use mapedit_core::config::ConfigError;
use mapedit_core::editor::GeometryEditor;
use mapedit_core::geometry::GeometryKind;
use mapedit_core::input::{InputTranslator, KeyEvent, Modifiers, PointerEvent};
use mapedit_core::session::{SessionController, SessionError};
use mapedit_core::store::FeatureStore;
use mapedit_render::{HostSink, ReadyNotifier, ReadySignal, RecordingHost, ready_pair};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// One recorded input step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Select an editing control.
    Activate(GeometryKind),
    /// Switch every control off.
    Deactivate,
    /// Raw pointer event in screen pixels.
    Pointer(PointerEvent),
    /// Key press, e.g. `"Enter"`.
    Key(String),
    Modifiers(Modifiers),
    /// Touch placement under the crosshair at this screen position.
    Crosshair(Point),
    /// Let coalesced measurement run.
    Tick,
    /// Remove all committed features.
    Clear,
    /// The host finished loading.
    Ready,
}

/// A replay script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    pub config: SessionConfig,
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse a script from JSON.
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let script: Self = serde_json::from_str(json)?;
        script.config.validate()?;
        Ok(script)
    }

    /// Read and parse a script file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// An editing session over an in-memory host.
pub struct Session {
    host: Rc<RefCell<RecordingHost>>,
    ready: ReadySignal,
    notifier: ReadyNotifier,
    controller: SessionController,
    translator: InputTranslator,
    store: Rc<RefCell<FeatureStore>>,
}

impl Session {
    /// Build a controller with one editor per kind. The host starts out not
    /// ready.
    pub fn new(config: &SessionConfig) -> Result<Self, ReplayError> {
        config.validate()?;
        let view = Affine::scale(config.view.scale)
            .then_translate(Vec2::new(config.view.offset[0], config.view.offset[1]));
        let host = Rc::new(RefCell::new(RecordingHost::with_view(view)));
        let (ready, notifier) = ready_pair();
        let store = Rc::new(RefCell::new(FeatureStore::new()));

        let mut controller = SessionController::with_policy(config.switch_policy);
        for (&kind, &policy) in &config.switch_overrides {
            controller.set_switch_policy_for(kind, policy);
        }
        for kind in GeometryKind::ALL {
            let editor_config = config.editor_config(kind);
            let sink = HostSink::new(host.clone(), ready.clone(), editor_config.style.clone());
            let mut editor = GeometryEditor::with_config(kind, editor_config, Box::new(sink));
            let target = store.clone();
            editor.on_finish(move |feature| target.borrow_mut().add(feature));
            editor.on_discard(move || log::info!("{:?} discarded: not enough vertices", kind));
            controller.register(kind, editor)?;
        }

        Ok(Self {
            host,
            ready,
            notifier,
            controller,
            translator: InputTranslator::new(),
            store,
        })
    }

    pub fn host(&self) -> Rc<RefCell<RecordingHost>> {
        self.host.clone()
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Snapshot of the committed features.
    pub fn features(&self) -> FeatureStore {
        self.store.borrow().clone()
    }

    /// Signal that the host finished loading and replay deferred host calls.
    pub fn mark_ready(&mut self) {
        self.notifier.notify();
        self.controller.sync_sinks();
    }

    /// Resolves once the host is ready.
    pub async fn ready(&self) {
        self.ready.wait().await;
    }

    /// Apply one step.
    pub fn apply(&mut self, step: Step) -> Result<(), ReplayError> {
        match step {
            Step::Activate(kind) => self.controller.activate(kind)?,
            Step::Deactivate => self.controller.deactivate_all(),
            Step::Pointer(event) => {
                let inputs: Vec<_> = self
                    .translator
                    .handle_pointer_event(event, &*self.host.borrow())
                    .collect();
                for input in inputs {
                    self.controller.dispatch(input);
                }
            }
            Step::Key(key) => {
                if let Some(input) = self.translator.handle_key_event(&KeyEvent::Pressed(key)) {
                    self.controller.dispatch(input);
                }
            }
            Step::Modifiers(modifiers) => self.translator.set_modifiers(modifiers),
            Step::Crosshair(center) => {
                let input = self.translator.crosshair_tap(center, &*self.host.borrow());
                self.controller.dispatch(input);
            }
            Step::Tick => {
                self.controller.tick();
            }
            Step::Clear => {
                self.controller.clear_all();
                self.store.borrow_mut().clear();
            }
            Step::Ready => self.mark_ready(),
        }
        Ok(())
    }
}

/// Replay a script and return the committed features.
///
/// Scripts without a `ready` step get a host that is ready from the start.
pub async fn replay(script: Script) -> Result<FeatureStore, ReplayError> {
    let mut session = Session::new(&script.config)?;
    let events = session.controller.subscribe();
    if !script.steps.contains(&Step::Ready) {
        session.mark_ready();
    }

    let total = script.steps.len();
    for step in script.steps {
        log::debug!("Step: {:?}", step);
        session.apply(step)?;
        for event in events.try_iter() {
            log::info!("{:?}", event);
        }
    }

    session.ready().await;
    let features = session.features();
    log::info!("Replayed {} steps, {} features committed", total, features.len());
    Ok(features)
}

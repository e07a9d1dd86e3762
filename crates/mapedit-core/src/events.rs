//! Session event notifications.

use crate::feature::FeatureId;
use crate::geometry::GeometryKind;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Events published by the session controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// An editor became the active one.
    Activated { kind: GeometryKind },
    /// The active editor stopped listening.
    Deactivated { kind: GeometryKind },
    /// A feature was committed.
    Committed { kind: GeometryKind, id: FeatureId },
    /// A finish was discarded for lack of vertices.
    Discarded { kind: GeometryKind },
    /// All committed features were removed.
    Cleared,
}

/// Fan-out of [`SessionEvent`]s to any number of receivers.
///
/// Receivers that have been dropped are pruned on the next publish.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<SessionEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new receiver; it sees every event published from now on.
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Send an event to all live receivers.
    pub fn publish(&mut self, event: SessionEvent) {
        log::trace!("Session event: {:?}", event);
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

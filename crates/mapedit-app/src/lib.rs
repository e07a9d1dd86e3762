//! MapEdit Application
//!
//! Headless driver that replays recorded map input through the editing
//! controls and reports the committed features.

mod config;
mod replay;

pub use config::{SessionConfig, ViewConfig};
pub use replay::{ReplayError, Script, Session, Step, replay};

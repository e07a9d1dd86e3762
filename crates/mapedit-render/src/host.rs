//! Host map renderer contract.

use crate::layer::LayerDescriptor;
use mapedit_core::input::Projection;
use mapedit_core::sink::{Cursor, InputMask};
use serde_json::Value;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RendererError {
    #[error("Source already exists: {0}")]
    SourceExists(String),
    #[error("Unknown source: {0}")]
    UnknownSource(String),
    #[error("Layer already exists: {0}")]
    LayerExists(String),
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),
    #[error("Host failure: {0}")]
    Host(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// What the editing controls need from the map they draw on.
///
/// Sources hold GeoJSON; layers paint a source. Input subscription and the
/// cursor are host concerns too, so the editor never touches DOM-style
/// event listeners directly.
pub trait HostRenderer: Projection {
    fn add_source(&mut self, id: &str, data: Value) -> RenderResult<()>;

    /// Replace the GeoJSON of an existing source.
    fn set_source_data(&mut self, id: &str, data: Value) -> RenderResult<()>;

    fn remove_source(&mut self, id: &str) -> RenderResult<()>;

    /// Add a layer; its source must exist.
    fn add_layer(&mut self, layer: &LayerDescriptor) -> RenderResult<()>;

    fn remove_layer(&mut self, id: &str) -> RenderResult<()>;

    /// Route (or stop routing) map input events to the editing controls.
    fn set_input(&mut self, mask: InputMask);

    fn set_cursor(&mut self, cursor: Cursor);
}

//! In-memory host for tests and headless replay.

use crate::host::{HostRenderer, RenderResult, RendererError};
use crate::layer::LayerDescriptor;
use kurbo::{Affine, Point};
use mapedit_core::geometry::Vertex;
use mapedit_core::input::Projection;
use mapedit_core::sink::{Cursor, InputMask};
use serde_json::Value;
use std::collections::HashMap;

/// Host that keeps sources and layers in memory.
///
/// `view` maps map coordinates to screen pixels.
#[derive(Debug, Clone)]
pub struct RecordingHost {
    view: Affine,
    sources: HashMap<String, Value>,
    /// Layers bottom to top.
    layers: Vec<LayerDescriptor>,
    input: InputMask,
    cursor: Cursor,
    ops: usize,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::with_view(Affine::IDENTITY)
    }

    /// Create a host with a map-to-screen transform.
    pub fn with_view(view: Affine) -> Self {
        Self {
            view,
            sources: HashMap::new(),
            layers: Vec::new(),
            input: InputMask::NONE,
            cursor: Cursor::Default,
            ops: 0,
        }
    }

    /// Current GeoJSON of a source.
    pub fn source(&self, id: &str) -> Option<&Value> {
        self.sources.get(id)
    }

    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    pub fn layer(&self, id: &str) -> Option<&LayerDescriptor> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn input(&self) -> InputMask {
        self.input
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Number of calls received through [`HostRenderer`].
    pub fn op_count(&self) -> usize {
        self.ops
    }
}

impl Projection for RecordingHost {
    fn project(&self, vertex: Vertex) -> Point {
        self.view * vertex
    }

    fn unproject(&self, screen: Point) -> Vertex {
        self.view.inverse() * screen
    }
}

impl HostRenderer for RecordingHost {
    fn add_source(&mut self, id: &str, data: Value) -> RenderResult<()> {
        self.ops += 1;
        if self.sources.contains_key(id) {
            return Err(RendererError::SourceExists(id.to_string()));
        }
        self.sources.insert(id.to_string(), data);
        Ok(())
    }

    fn set_source_data(&mut self, id: &str, data: Value) -> RenderResult<()> {
        self.ops += 1;
        let source = self
            .sources
            .get_mut(id)
            .ok_or_else(|| RendererError::UnknownSource(id.to_string()))?;
        *source = data;
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> RenderResult<()> {
        self.ops += 1;
        if self.layers.iter().any(|l| l.source == id) {
            return Err(RendererError::Host(format!("source {} is still in use", id)));
        }
        self.sources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RendererError::UnknownSource(id.to_string()))
    }

    fn add_layer(&mut self, layer: &LayerDescriptor) -> RenderResult<()> {
        self.ops += 1;
        if !self.sources.contains_key(&layer.source) {
            return Err(RendererError::UnknownSource(layer.source.clone()));
        }
        if self.layer(&layer.id).is_some() {
            return Err(RendererError::LayerExists(layer.id.clone()));
        }
        self.layers.push(layer.clone());
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> RenderResult<()> {
        self.ops += 1;
        let index = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| RendererError::UnknownLayer(id.to_string()))?;
        self.layers.remove(index);
        Ok(())
    }

    fn set_input(&mut self, mask: InputMask) {
        self.ops += 1;
        self.input = mask;
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.ops += 1;
        self.cursor = cursor;
    }
}

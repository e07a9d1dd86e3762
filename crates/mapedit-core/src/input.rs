//! Translation of raw pointer/keyboard events into editor input.

use crate::geometry::Vertex;
use kurbo::Point;
use serde::{Deserialize, Serialize};

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Editing input in map coordinates, as consumed by an editor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EditorInput {
    Click(Vertex),
    Move(Vertex),
    RightClick,
    DoubleClick(Vertex),
    Finish,
    Cancel,
    Undo,
}

/// Conversion between screen pixels and map coordinates.
pub trait Projection {
    /// Map coordinate to screen position.
    fn project(&self, vertex: Vertex) -> Point;

    /// Screen position to map coordinate.
    fn unproject(&self, screen: Point) -> Vertex;
}

/// Projection where screen and map coordinates coincide.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityProjection;

impl Projection for IdentityProjection {
    fn project(&self, vertex: Vertex) -> Point {
        vertex
    }

    fn unproject(&self, screen: Point) -> Vertex {
        screen
    }
}

const DOUBLE_CLICK_TIME_MS: u128 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;
/// A press that drifts further than this is a pan, not a click.
const CLICK_DRAG_TOLERANCE: f64 = 5.0;

/// Turns host events into [`EditorInput`]s.
#[derive(Debug, Clone, Default)]
pub struct InputTranslator {
    pub modifiers: Modifiers,
    /// Screen position of the pending left press.
    press_position: Option<Point>,
    dragged: bool,
    last_click_time: Option<Instant>,
    last_click_position: Option<Point>,
    /// Map coordinate the last single click placed.
    last_click_vertex: Option<Vertex>,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update modifier keys state.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Whether the pending left press has turned into a drag.
    pub fn is_dragging(&self) -> bool {
        self.press_position.is_some() && self.dragged
    }

    /// Translate a pointer event.
    ///
    /// The second click of a double-click yields only `DoubleClick`, at the
    /// map position of the first click, so it never places a vertex of its own.
    pub fn handle_pointer_event<P: Projection + ?Sized>(
        &mut self,
        event: PointerEvent,
        projection: &P,
    ) -> impl Iterator<Item = EditorInput> + use<P> {
        let mut out = None;
        match event {
            PointerEvent::Down { position, button } => {
                if button == MouseButton::Left {
                    self.press_position = Some(position);
                    self.dragged = false;
                }
            }
            PointerEvent::Move { position } => {
                if self
                    .press_position
                    .is_some_and(|start| start.distance(position) > CLICK_DRAG_TOLERANCE)
                {
                    self.dragged = true;
                }
                out = Some(EditorInput::Move(projection.unproject(position)));
            }
            PointerEvent::Up { position, button } => {
                match button {
                    MouseButton::Left => {
                        let pressed = self.press_position.take();
                        let dragged = std::mem::take(&mut self.dragged)
                            || pressed.is_some_and(|start| start.distance(position) > CLICK_DRAG_TOLERANCE);
                        if pressed.is_some() && !dragged {
                            let vertex = projection.unproject(position);
                            out = Some(match self.register_click(position, vertex) {
                                Some(first) => EditorInput::DoubleClick(first),
                                None => EditorInput::Click(vertex),
                            });
                        }
                    }
                    MouseButton::Right => out = Some(EditorInput::RightClick),
                    MouseButton::Middle => {}
                }
            }
        }
        out.into_iter()
    }

    /// Record a completed click. Returns the first click's vertex if this one
    /// completes a double-click.
    fn register_click(&mut self, position: Point, vertex: Vertex) -> Option<Vertex> {
        let now = Instant::now();
        if let (Some(last_time), Some(last_pos)) = (self.last_click_time, self.last_click_position) {
            let elapsed = now.duration_since(last_time).as_millis();
            if elapsed < DOUBLE_CLICK_TIME_MS && last_pos.distance(position) < DOUBLE_CLICK_DISTANCE {
                // Reset so a third click starts a new pair
                self.last_click_time = None;
                self.last_click_position = None;
                return self.last_click_vertex.take();
            }
        }
        self.last_click_time = Some(now);
        self.last_click_position = Some(position);
        self.last_click_vertex = Some(vertex);
        None
    }

    /// Translate a key event.
    pub fn handle_key_event(&self, event: &KeyEvent) -> Option<EditorInput> {
        let KeyEvent::Pressed(key) = event else {
            return None;
        };
        match key.as_str() {
            "Escape" => Some(EditorInput::Cancel),
            "Enter" => Some(EditorInput::Finish),
            "Backspace" | "Delete" => Some(EditorInput::Undo),
            "z" | "Z" if self.modifiers.ctrl || self.modifiers.meta => Some(EditorInput::Undo),
            _ => None,
        }
    }

    /// Place a vertex under a fixed crosshair, for touch hosts.
    pub fn crosshair_tap(&self, center: Point, projection: &impl Projection) -> EditorInput {
        EditorInput::Click(projection.unproject(center))
    }
}

//! MapEdit Core Library
//!
//! Platform-agnostic incremental geometry editing: vertex accumulation with a
//! pointer-following ghost, live measurement labels, and a session controller
//! that keeps one editor listening at a time.

pub mod accumulator;
pub mod config;
pub mod editor;
pub mod events;
pub mod feature;
pub mod geometry;
pub mod input;
pub mod measure;
pub mod session;
pub mod sink;
pub mod store;
pub mod throttle;

pub use accumulator::GeometryBuffer;
pub use config::{ConfigError, EditorConfig, DEFAULT_DEBOUNCE_MS};
pub use editor::{EditOutcome, EditorState, GeometryEditor};
pub use events::{EventBus, SessionEvent};
pub use feature::{CommittedFeature, FeatureId, FeatureStyle, SerializableColor};
pub use geometry::{GeometryKind, Vertex};
pub use input::{EditorInput, InputTranslator, KeyEvent, Modifiers, MouseButton, PointerEvent, Projection};
pub use measure::{Label, LabelKind, Measurer, Metric};
pub use session::{SessionController, SessionError, SwitchPolicy};
pub use sink::{Cursor, GeometryUpdate, InputMask, NullSink, RenderSink};
pub use store::FeatureStore;
pub use throttle::Throttle;

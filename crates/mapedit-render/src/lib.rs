//! MapEdit Render Library
//!
//! Host map contract and the render sink that draws editor output through it.

pub mod geojson;
mod host;
pub mod layer;
mod memory;
mod ready;
mod sink;

pub use host::{HostRenderer, RenderResult, RendererError};
pub use layer::{LayerDescriptor, LayerFilter, LayerType, SourceRole};
pub use memory::RecordingHost;
pub use ready::{ReadyNotifier, ReadySignal, WaitReady, ready_pair};
pub use sink::HostSink;

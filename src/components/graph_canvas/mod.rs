//! Canvas renderer for investigation graphs: typed nodes with icons, images
//! and flags, bundled curved edges, hover and selection highlighting, and a
//! force layout, all drawn into one 2D canvas.

mod background;
mod canvas;
mod color;
mod component;
mod edge_render;
mod error;
mod events;
mod highlight;
mod icons;
mod image_cache;
mod layout;
mod lod;
mod node_render;
mod render;
mod scheduler;
mod settings;
mod state;
mod transform;
mod types;
mod viewport;

pub use component::GraphCanvas;
pub use error::{CanvasError, ConfigError, DrawError, ImageLoadError};
pub use events::GraphEvents;
pub use lod::LodThresholds;
pub use settings::{GraphSettings, Theme};
pub use transform::{RenderEdge, RenderNode};
pub use types::{GraphData, GraphLink, GraphNode, NodeShape, TypeColors};

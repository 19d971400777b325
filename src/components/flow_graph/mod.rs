//! Interactive viewer for flowchart event graphs: the graph model and the
//! state engine driving it, plus the canvas component that draws it.

mod component;
pub mod fetch;
pub mod filter;
pub mod keyboard;
pub mod label;
pub mod layout;
pub mod messages;
pub mod model;
mod render;
pub mod selection;
pub mod state;
pub mod types;
pub mod viewport;

pub use component::FlowGraphCanvas;
pub use filter::{VisibleGraph, Whitelist};
pub use label::LabelOptions;
pub use layout::{ForceLayout, LayoutEngine};
pub use messages::MessageCache;
pub use model::{EdgeKey, FlowGraph};
pub use selection::Highlight;
pub use state::ViewerState;
pub use types::{NodeId, Record};

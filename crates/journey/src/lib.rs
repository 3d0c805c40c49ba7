//! Journey editing core — step catalog, journey graph, canvas interaction,
//! property binding, generation and persistence for the journey studio.

pub mod canvas;
pub mod catalog;
pub mod generator;
pub mod graph;
pub mod properties;
pub mod session;
pub mod state_machine;
pub mod store;
pub mod types;

pub use canvas::CanvasEngine;
pub use graph::JourneyGraph;
pub use session::EditorSession;

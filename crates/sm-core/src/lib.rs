pub mod config;
pub mod facade;
pub mod id;
pub mod memory;
pub mod model;
pub mod ops;
pub mod props;
pub mod snapshot;
pub mod state;
pub mod subcomponent;

pub use config::SessionConfig;
pub use facade::{EventKind, GraphError, GraphEvent, GraphFacade, Propagation, RenderFacade};
pub use id::NodeId;
pub use memory::{ImagePlacement, MemoryGraph};
pub use model::*;
pub use snapshot::SessionSnapshot;
pub use subcomponent::{SubComponent, SubComponentTree};

// Re-export kurbo geometry so downstream crates share one version
pub use kurbo::{Point, Vec2};

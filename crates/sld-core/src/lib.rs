pub mod drawing;
pub mod graph;
pub mod id;
pub mod model;
pub mod symbol;
pub mod viewport;

pub use drawing::{Drawing, Fill, Primitive};
pub use graph::{Diagram, GraphError};
pub use id::{EdgeId, IdAllocator, NodeId};
pub use model::*;
pub use symbol::{
    Category, HandleRole, HandleSide, SwitchState, SymbolKind, SymbolSpec, UnknownSymbol,
};
pub use viewport::{Bounds, GRID_SIZE, SurfaceSize, ViewTransform, snap_to_grid};

//! Re-export public algorithms.

pub mod apply;
pub mod communicator;
pub mod ghost;
pub mod metadata;
pub mod wire;

pub use apply::{Status, apply, apply_composite, apply_indexed, apply_pair};
pub use ghost::{GhostLayers, get_ghost_layer_metadata, set_ghost_layer_metadata};
pub use metadata::{get_composite_metadata, get_dataset_metadata, get_metadata};

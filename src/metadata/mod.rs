//! Mesh metadata records, request flags and kind predicates.

pub mod flags;
pub mod predicates;
pub mod record;

pub use flags::MetadataFlags;
pub use record::{ArrayMetadata, ArrayRange, BlockMetadata, MeshMetadata, MeshMetadataPtr};

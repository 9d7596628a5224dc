//! Which optional per-block fields the extractor fills in.

use serde::{Deserialize, Serialize};

/// Request flags for optional block metadata.
///
/// Global fields are always produced. Per-block sizes are on by default;
/// extents and array ranges cost an extra pass and are off.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MetadataFlags {
    pub block_size: bool,
    pub block_extents: bool,
    pub block_array_range: bool,
}

impl Default for MetadataFlags {
    fn default() -> Self {
        Self {
            block_size: true,
            block_extents: false,
            block_array_range: false,
        }
    }
}

impl MetadataFlags {
    /// Nothing optional.
    pub fn none() -> Self {
        Self {
            block_size: false,
            block_extents: false,
            block_array_range: false,
        }
    }

    /// Everything optional.
    pub fn all() -> Self {
        Self {
            block_size: true,
            block_extents: true,
            block_array_range: true,
        }
    }

    pub fn with_block_size(mut self, on: bool) -> Self {
        self.block_size = on;
        self
    }

    pub fn with_block_extents(mut self, on: bool) -> Self {
        self.block_extents = on;
        self
    }

    pub fn with_block_array_range(mut self, on: bool) -> Self {
        self.block_array_range = on;
        self
    }
}

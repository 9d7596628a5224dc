//! The mesh metadata record.
//!
//! A record describes the structure of a mesh or hierarchy without copying it.
//! It is built fresh by each extraction and shared read-only afterwards
//! through [`MeshMetadataPtr`].

use crate::data::array::ScalarType;
use crate::data::attributes::Association;
use crate::mesh_error::MeshError;
use crate::metadata::flags::MetadataFlags;
use crate::topology::geometry::{Bounds, Extent};
use crate::topology::mesh_kind::MeshKind;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared handle to a finished record.
pub type MeshMetadataPtr = Arc<MeshMetadata>;

/// One entry of the array inventory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrayMetadata {
    pub name: String,
    pub association: Association,
    pub n_components: usize,
    pub scalar_type: ScalarType,
    /// The array marks ghost cells or nodes.
    pub ghost: bool,
    /// Global `[min, max]`, when ranges were requested.
    pub range: Option<[f64; 2]>,
}

/// Value range of one array on one block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrayRange {
    pub name: String,
    pub association: Association,
    pub range: Option<[f64; 2]>,
}

/// Description of one block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockMetadata {
    /// Flat index of the block's slot.
    pub id: usize,
    /// Rank holding the block.
    pub owner: usize,
    pub kind: MeshKind,
    pub bounds: Bounds,
    pub num_points: Option<usize>,
    pub num_cells: Option<usize>,
    pub cell_array_size: Option<usize>,
    pub extent: Option<Extent>,
    pub array_ranges: Option<Vec<ArrayRange>>,
    /// Refinement level, for AMR blocks.
    pub level: Option<usize>,
}

/// Structural description of a mesh or hierarchy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshMetadata {
    pub mesh_name: String,
    pub mesh_type: Option<MeshKind>,
    pub block_type: Option<MeshKind>,
    /// True once the record has been merged across every rank.
    pub global_view: bool,

    /// Block slots in the whole hierarchy, present anywhere or not.
    pub num_blocks: usize,
    /// Blocks resident on each rank, indexed by rank.
    pub num_blocks_local: Vec<usize>,
    pub num_points: usize,
    pub num_cells: usize,
    pub cell_array_size: usize,

    pub bounds: Bounds,
    pub extent: Option<Extent>,

    pub arrays: Vec<ArrayMetadata>,
    pub num_ghost_cells: u32,
    pub num_ghost_nodes: u32,

    pub blocks: Vec<BlockMetadata>,

    pub num_levels: usize,
    pub ref_ratio: Vec<[i32; 3]>,
    pub blocks_per_level: Vec<usize>,

    pub flags: MetadataFlags,
}

impl MeshMetadata {
    pub fn new(mesh_name: impl Into<String>) -> Self {
        Self {
            mesh_name: mesh_name.into(),
            ..Self::default()
        }
    }

    pub fn with_flags(mut self, flags: MetadataFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Freeze the record for sharing.
    pub fn into_shared(self) -> MeshMetadataPtr {
        Arc::new(self)
    }

    /// Block with flat index `id`.
    pub fn block(&self, id: usize) -> Option<&BlockMetadata> {
        self.blocks
            .binary_search_by_key(&id, |b| b.id)
            .ok()
            .map(|i| &self.blocks[i])
    }

    pub fn array(&self, name: &str, association: Association) -> Option<&ArrayMetadata> {
        self.arrays
            .iter()
            .find(|a| a.name == name && a.association == association)
    }

    /// Blocks owned by `rank`, in id order.
    pub fn blocks_owned_by(&self, rank: usize) -> impl Iterator<Item = &BlockMetadata> {
        self.blocks.iter().filter(move |b| b.owner == rank)
    }

    /// Check the internal consistency of a global view.
    pub fn validate(&self) -> Result<(), MeshError> {
        if !self.global_view {
            return Err(MeshError::NotGlobalView);
        }
        let bad = |msg: String| Err(MeshError::InconsistentMetadata(msg));

        if let Some((a, b)) = self.blocks.iter().tuple_windows().find(|(a, b)| a.id >= b.id) {
            return bad(format!("block ids {} and {} out of order", a.id, b.id));
        }
        if let Some(b) = self.blocks.iter().find(|b| b.id >= self.num_blocks) {
            return bad(format!("block id {} >= num_blocks {}", b.id, self.num_blocks));
        }

        let counts = self.blocks.iter().counts_by(|b| b.owner);
        if let Some(b) = self.blocks.iter().find(|b| b.owner >= self.num_blocks_local.len()) {
            return bad(format!("block {} owned by unknown rank {}", b.id, b.owner));
        }
        for (rank, &n) in self.num_blocks_local.iter().enumerate() {
            let found = counts.get(&rank).copied().unwrap_or(0);
            if found != n {
                return bad(format!("rank {rank} reports {n} blocks, {found} listed"));
            }
        }

        if self.flags.block_size {
            let sum = |f: fn(&BlockMetadata) -> Option<usize>| -> Option<usize> {
                self.blocks.iter().map(f).sum()
            };
            let totals = [
                ("points", sum(|b| b.num_points), self.num_points),
                ("cells", sum(|b| b.num_cells), self.num_cells),
                ("cell array", sum(|b| b.cell_array_size), self.cell_array_size),
            ];
            for (what, per_block, total) in totals {
                if per_block != Some(total) {
                    return bad(format!("block {what} sizes {per_block:?} disagree with total {total}"));
                }
            }
        }

        if let Some((a, _)) = self
            .arrays
            .iter()
            .map(|a| (a.name.as_str(), a.association))
            .duplicates()
            .next()
        {
            return bad(format!("array `{a}` listed twice"));
        }

        if self.mesh_type.is_some_and(MeshKind::is_amr) {
            if self.ref_ratio.len() != self.num_levels || self.blocks_per_level.len() != self.num_levels {
                return bad(format!(
                    "{} levels but {} ratios and {} level sizes",
                    self.num_levels,
                    self.ref_ratio.len(),
                    self.blocks_per_level.len()
                ));
            }
            let total: usize = self.blocks_per_level.iter().sum();
            if total != self.num_blocks {
                return bad(format!("levels hold {total} blocks, num_blocks is {}", self.num_blocks));
            }
            if let Some(b) = self
                .blocks
                .iter()
                .find(|b| b.level.is_none_or(|l| l >= self.num_levels))
            {
                return bad(format!("block {} has level {:?}", b.id, b.level));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: usize, owner: usize) -> BlockMetadata {
        BlockMetadata {
            id,
            owner,
            kind: MeshKind::ImageData,
            bounds: Bounds([0.0, 1.0, 0.0, 1.0, 0.0, 1.0]),
            num_points: Some(8),
            num_cells: Some(1),
            cell_array_size: Some(0),
            extent: None,
            array_ranges: None,
            level: None,
        }
    }

    fn global(blocks: Vec<BlockMetadata>, per_rank: Vec<usize>) -> MeshMetadata {
        MeshMetadata {
            global_view: true,
            num_blocks: blocks.len(),
            num_points: 8 * blocks.len(),
            num_cells: blocks.len(),
            blocks,
            num_blocks_local: per_rank,
            ..MeshMetadata::new("mesh")
        }
    }

    #[test]
    fn local_record_is_not_valid() {
        assert_eq!(MeshMetadata::new("m").validate(), Err(MeshError::NotGlobalView));
    }

    #[test]
    fn consistent_record_validates() {
        let md = global(vec![block(0, 0), block(1, 1)], vec![1, 1]);
        assert_eq!(md.validate(), Ok(()));
        assert_eq!(md.block(1).map(|b| b.owner), Some(1));
        assert_eq!(md.blocks_owned_by(0).count(), 1);
    }

    #[test]
    fn detects_unsorted_blocks_and_wrong_counts() {
        let md = global(vec![block(1, 0), block(0, 1)], vec![1, 1]);
        assert!(matches!(md.validate(), Err(MeshError::InconsistentMetadata(_))));
        let md = global(vec![block(0, 0), block(1, 0)], vec![1, 1]);
        assert!(matches!(md.validate(), Err(MeshError::InconsistentMetadata(_))));
    }
}

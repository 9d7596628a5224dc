//! Block-structured adaptive mesh refinement hierarchies.
//!
//! Blocks are addressed either by `(level, index)` or by a flat index that
//! runs level by level. Flat indices are what the traversal engine and the
//! metadata extractor see.

use crate::data::attributes::FieldData;
use crate::data::info::{HasInfo, InfoMap};
use crate::mesh_error::MeshError;
use crate::topology::dataset::DataSet;
use crate::topology::geometry::Geometry;
use crate::topology::mesh_kind::MeshKind;
use crate::topology::object::DataObject;

/// One refinement level.
#[derive(Clone, Debug, PartialEq)]
pub struct AmrLevel {
    refinement_ratio: [i32; 3],
    blocks: Vec<Option<DataObject>>,
}

impl AmrLevel {
    /// Ratio between this level's spacing and the next coarser one.
    pub fn refinement_ratio(&self) -> [i32; 3] {
        self.refinement_ratio
    }

    pub fn blocks(&self) -> &[Option<DataObject>] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// An overlapping or non-overlapping AMR hierarchy of image blocks.
#[derive(Clone, Debug, PartialEq)]
pub struct AmrDataSet {
    overlapping: bool,
    levels: Vec<AmrLevel>,
    field_data: FieldData,
    info: InfoMap,
}

impl AmrDataSet {
    pub fn new(overlapping: bool) -> Self {
        Self {
            overlapping,
            levels: Vec::new(),
            field_data: FieldData::new(),
            info: InfoMap::new(),
        }
    }

    pub fn kind(&self) -> MeshKind {
        if self.overlapping {
            MeshKind::OverlappingAmr
        } else {
            MeshKind::NonOverlappingAmr
        }
    }

    pub fn is_overlapping(&self) -> bool {
        self.overlapping
    }

    /// Append a refinement level and return its number.
    pub fn add_level(&mut self, refinement_ratio: [i32; 3]) -> usize {
        self.levels.push(AmrLevel {
            refinement_ratio,
            blocks: Vec::new(),
        });
        self.levels.len() - 1
    }

    /// Append a block slot to `level`. Present blocks must be image leaves.
    pub fn push_block(&mut self, level: usize, block: Option<DataSet>) -> Result<usize, MeshError> {
        let n_levels = self.levels.len();
        let lvl = self
            .levels
            .get_mut(level)
            .ok_or_else(|| MeshError::InvalidAmrBlock {
                level,
                index: 0,
                reason: format!("hierarchy has {n_levels} levels"),
            })?;
        let index = lvl.blocks.len();
        if let Some(ds) = &block {
            if !matches!(ds.geometry(), Geometry::Image(_)) {
                let err = MeshError::InvalidAmrBlock {
                    level,
                    index,
                    reason: format!("{} is not an image block", ds.kind()),
                };
                log::error!("{err}");
                return Err(err);
            }
        }
        lvl.blocks.push(block.map(DataObject::DataSet));
        Ok(index)
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, level: usize) -> Option<&AmrLevel> {
        self.levels.get(level)
    }

    pub fn levels(&self) -> &[AmrLevel] {
        &self.levels
    }

    /// Slot count per level.
    pub fn blocks_per_level(&self) -> Vec<usize> {
        self.levels.iter().map(AmrLevel::len).collect()
    }

    /// Total slot count over all levels.
    pub fn total_blocks(&self) -> usize {
        self.levels.iter().map(AmrLevel::len).sum()
    }

    /// `(level, index)` of flat slot `flat`.
    pub fn level_of(&self, flat: usize) -> Option<(usize, usize)> {
        let mut rest = flat;
        for (l, lvl) in self.levels.iter().enumerate() {
            if rest < lvl.len() {
                return Some((l, rest));
            }
            rest -= lvl.len();
        }
        None
    }

    pub(crate) fn slot(&self, flat: usize) -> Option<&DataObject> {
        let (l, i) = self.level_of(flat)?;
        self.levels[l].blocks[i].as_ref()
    }

    pub(crate) fn slot_mut(&mut self, flat: usize) -> Option<&mut DataObject> {
        let (l, i) = self.level_of(flat)?;
        self.levels[l].blocks[i].as_mut()
    }

    pub fn field_data(&self) -> &FieldData {
        &self.field_data
    }

    pub fn field_data_mut(&mut self) -> &mut FieldData {
        &mut self.field_data
    }
}

impl HasInfo for AmrDataSet {
    fn info(&self) -> &InfoMap {
        &self.info
    }
    fn info_mut(&mut self) -> &mut InfoMap {
        &mut self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_indices_run_level_by_level() {
        let mut amr = AmrDataSet::new(true);
        let l0 = amr.add_level([1, 1, 1]);
        let l1 = amr.add_level([2, 2, 1]);
        amr.push_block(l0, Some(DataSet::uniform_grid([0.0; 3], [1.0; 3], [0, 4, 0, 4, 0, 0])))
            .unwrap();
        amr.push_block(l1, None).unwrap();
        amr.push_block(l1, Some(DataSet::uniform_grid([0.0; 3], [0.5; 3], [0, 4, 0, 4, 0, 0])))
            .unwrap();
        assert_eq!(amr.blocks_per_level(), vec![1, 2]);
        assert_eq!(amr.level_of(0), Some((0, 0)));
        assert_eq!(amr.level_of(2), Some((1, 1)));
        assert_eq!(amr.level_of(3), None);
        assert!(amr.slot(1).is_none());
        assert!(amr.slot(2).is_some());
    }

    #[test]
    fn rejects_non_image_blocks() {
        let mut amr = AmrDataSet::new(false);
        amr.add_level([1, 1, 1]);
        let ug = DataSet::empty(MeshKind::UnstructuredGrid).unwrap();
        assert!(matches!(
            amr.push_block(0, Some(ug)),
            Err(MeshError::InvalidAmrBlock { level: 0, index: 0, .. })
        ));
        assert!(amr.push_block(3, None).is_err());
    }
}

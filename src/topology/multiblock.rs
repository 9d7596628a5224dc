//! Ordered, possibly nested collection of blocks.

use crate::data::attributes::FieldData;
use crate::data::info::{HasInfo, InfoMap};
use crate::topology::object::DataObject;

/// A multi-block hierarchy. `None` slots are blocks that are not resident on
/// this rank.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiBlock {
    blocks: Vec<Option<DataObject>>,
    field_data: FieldData,
    info: InfoMap,
}

impl MultiBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocks(blocks: Vec<Option<DataObject>>) -> Self {
        Self {
            blocks,
            ..Self::default()
        }
    }

    /// Append a slot and return its index.
    pub fn push(&mut self, block: Option<DataObject>) -> usize {
        self.blocks.push(block);
        self.blocks.len() - 1
    }

    /// Replace slot `index`, growing the slot list with absent blocks if needed.
    pub fn set_block(&mut self, index: usize, block: Option<DataObject>) {
        if index >= self.blocks.len() {
            self.blocks.resize_with(index + 1, || None);
        }
        self.blocks[index] = block;
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Option<DataObject>] {
        &self.blocks
    }

    pub(crate) fn slot(&self, index: usize) -> Option<&DataObject> {
        self.blocks.get(index).and_then(Option::as_ref)
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut DataObject> {
        self.blocks.get_mut(index).and_then(Option::as_mut)
    }

    pub fn field_data(&self) -> &FieldData {
        &self.field_data
    }

    pub fn field_data_mut(&mut self) -> &mut FieldData {
        &mut self.field_data
    }
}

impl HasInfo for MultiBlock {
    fn info(&self) -> &InfoMap {
        &self.info
    }
    fn info_mut(&mut self) -> &mut InfoMap {
        &mut self.info
    }
}

//! Hierarchy views and the composite normalizer.
//!
//! [`CompositeDataSet`] is the slot-indexed view the traversal engine walks.
//! [`as_composite_data`] presents any [`DataObject`] through that view: a
//! hierarchy is referenced as is, a leaf becomes a one-slot hierarchy. Neither
//! case copies mesh data.

use crate::data::info::{HasInfo, InfoMap};
use crate::topology::amr::AmrDataSet;
use crate::topology::mesh_kind::MeshKind;
use crate::topology::multiblock::MultiBlock;
use crate::topology::object::DataObject;
use std::borrow::Cow;

/// Slot-indexed access to the top level of a hierarchy.
pub trait CompositeDataSet {
    /// Kind reported for the hierarchy as a whole.
    fn kind(&self) -> MeshKind;
    /// Number of slots, present or not.
    fn number_of_blocks(&self) -> usize;
    /// Block in slot `index`; `None` when absent or out of range.
    fn block(&self, index: usize) -> Option<&DataObject>;
    /// Info map of the hierarchy's root object.
    fn root_info(&self) -> Option<&InfoMap> {
        None
    }
    /// The AMR hierarchy behind this view, if it is one.
    fn as_amr(&self) -> Option<&AmrDataSet> {
        None
    }
}

/// Mutable slot access, needed for the output side of the binary traversal.
pub trait CompositeDataSetMut: CompositeDataSet {
    fn block_mut(&mut self, index: usize) -> Option<&mut DataObject>;
}

impl CompositeDataSet for MultiBlock {
    fn kind(&self) -> MeshKind {
        MeshKind::MultiBlock
    }
    fn number_of_blocks(&self) -> usize {
        self.len()
    }
    fn block(&self, index: usize) -> Option<&DataObject> {
        self.slot(index)
    }
    fn root_info(&self) -> Option<&InfoMap> {
        Some(self.info())
    }
}

impl CompositeDataSetMut for MultiBlock {
    fn block_mut(&mut self, index: usize) -> Option<&mut DataObject> {
        self.slot_mut(index)
    }
}

impl CompositeDataSet for AmrDataSet {
    fn kind(&self) -> MeshKind {
        AmrDataSet::kind(self)
    }
    fn number_of_blocks(&self) -> usize {
        self.total_blocks()
    }
    fn block(&self, index: usize) -> Option<&DataObject> {
        self.slot(index)
    }
    fn root_info(&self) -> Option<&InfoMap> {
        Some(self.info())
    }
    fn as_amr(&self) -> Option<&AmrDataSet> {
        Some(self)
    }
}

impl CompositeDataSetMut for AmrDataSet {
    fn block_mut(&mut self, index: usize) -> Option<&mut DataObject> {
        self.slot_mut(index)
    }
}

/// Whether a [`CompositeHandle`] owns the object it presents.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Ownership {
    /// The handle took the object; dropping the handle drops it.
    Owned,
    /// The handle references an object whose lifetime the caller manages.
    Borrowed,
}

/// A hierarchy view over any mesh object.
#[derive(Clone, Debug)]
pub struct CompositeHandle<'a> {
    root: Cow<'a, DataObject>,
}

impl<'a> CompositeHandle<'a> {
    pub fn ownership(&self) -> Ownership {
        match self.root {
            Cow::Owned(_) => Ownership::Owned,
            Cow::Borrowed(_) => Ownership::Borrowed,
        }
    }

    /// True when the handle presents a leaf as a one-slot hierarchy.
    pub fn is_wrapped(&self) -> bool {
        !self.root.is_composite()
    }

    /// The object the handle presents.
    pub fn root(&self) -> &DataObject {
        &self.root
    }

    /// Give the object back, owned or borrowed as it was handed in.
    pub fn into_inner(self) -> Cow<'a, DataObject> {
        self.root
    }
}

impl CompositeDataSet for CompositeHandle<'_> {
    fn kind(&self) -> MeshKind {
        match &*self.root {
            DataObject::DataSet(_) => MeshKind::MultiBlock,
            DataObject::MultiBlock(mb) => CompositeDataSet::kind(mb),
            DataObject::Amr(amr) => amr.kind(),
        }
    }

    fn number_of_blocks(&self) -> usize {
        match &*self.root {
            DataObject::DataSet(_) => 1,
            DataObject::MultiBlock(mb) => mb.number_of_blocks(),
            DataObject::Amr(amr) => amr.number_of_blocks(),
        }
    }

    fn block(&self, index: usize) -> Option<&DataObject> {
        match &*self.root {
            leaf @ DataObject::DataSet(_) => (index == 0).then_some(leaf),
            DataObject::MultiBlock(mb) => mb.block(index),
            DataObject::Amr(amr) => CompositeDataSet::block(amr, index),
        }
    }

    fn root_info(&self) -> Option<&InfoMap> {
        Some(self.root.info())
    }

    fn as_amr(&self) -> Option<&AmrDataSet> {
        match &*self.root {
            DataObject::Amr(amr) => Some(amr),
            _ => None,
        }
    }
}

/// Present `dobj` as a hierarchy. `Cow::Owned` transfers ownership to the
/// handle, `Cow::Borrowed` leaves it with the caller.
pub fn as_composite_data(dobj: Cow<'_, DataObject>) -> CompositeHandle<'_> {
    CompositeHandle { root: dobj }
}

/// Borrowing normalization.
pub trait AsCompositeData {
    fn as_composite_data(&self) -> CompositeHandle<'_>;
}

impl AsCompositeData for DataObject {
    fn as_composite_data(&self) -> CompositeHandle<'_> {
        as_composite_data(Cow::Borrowed(self))
    }
}

impl AsCompositeData for CompositeHandle<'_> {
    /// Already a hierarchy view: reference the same root.
    fn as_composite_data(&self) -> CompositeHandle<'_> {
        as_composite_data(Cow::Borrowed(self.root()))
    }
}

impl DataObject {
    /// Owning normalization.
    pub fn into_composite_data(self) -> CompositeHandle<'static> {
        as_composite_data(Cow::Owned(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::dataset::DataSet;

    #[test]
    fn leaf_is_wrapped_without_copy() {
        let leaf = DataObject::from(DataSet::image([0.0; 3], [1.0; 3], [0, 1, 0, 1, 0, 1]));
        let h = leaf.as_composite_data();
        assert!(h.is_wrapped());
        assert_eq!(h.ownership(), Ownership::Borrowed);
        assert_eq!(h.number_of_blocks(), 1);
        assert!(std::ptr::eq(h.block(0).unwrap(), &leaf));
        assert!(h.block(1).is_none());
    }

    #[test]
    fn hierarchy_is_referenced() {
        let mb = DataObject::from(MultiBlock::with_blocks(vec![None, None]));
        let h = mb.as_composite_data();
        assert!(!h.is_wrapped());
        assert!(std::ptr::eq(h.root(), &mb));
        assert_eq!(h.kind(), MeshKind::MultiBlock);
        let owned = mb.clone().into_composite_data();
        assert_eq!(owned.ownership(), Ownership::Owned);
        assert_eq!(owned.number_of_blocks(), 2);
    }
}

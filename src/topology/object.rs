//! The closed set of mesh objects: a leaf or a hierarchy of leaves.

use crate::data::attributes::FieldData;
use crate::data::info::{HasInfo, InfoMap};
use crate::mesh_error::MeshError;
use crate::topology::amr::AmrDataSet;
use crate::topology::dataset::DataSet;
use crate::topology::mesh_kind::MeshKind;
use crate::topology::multiblock::MultiBlock;

/// A mesh object handed to this layer by the simulation or analysis code.
#[derive(Clone, Debug, PartialEq)]
pub enum DataObject {
    DataSet(DataSet),
    MultiBlock(MultiBlock),
    Amr(AmrDataSet),
}

impl DataObject {
    /// An empty object of the given kind.
    pub fn new_empty(kind: MeshKind) -> Self {
        match kind {
            MeshKind::MultiBlock => DataObject::MultiBlock(MultiBlock::new()),
            MeshKind::OverlappingAmr => DataObject::Amr(AmrDataSet::new(true)),
            MeshKind::NonOverlappingAmr => DataObject::Amr(AmrDataSet::new(false)),
            // composite kinds are matched above
            leaf => DataSet::empty(leaf)
                .map_or_else(|| DataObject::MultiBlock(MultiBlock::new()), DataObject::DataSet),
        }
    }

    /// [`DataObject::new_empty`] from an integer kind code.
    pub fn from_code(code: i32) -> Result<Self, MeshError> {
        MeshKind::from_code(code).map(Self::new_empty)
    }

    pub fn kind(&self) -> MeshKind {
        match self {
            DataObject::DataSet(ds) => ds.kind(),
            DataObject::MultiBlock(_) => MeshKind::MultiBlock,
            DataObject::Amr(amr) => amr.kind(),
        }
    }

    pub fn is_composite(&self) -> bool {
        !matches!(self, DataObject::DataSet(_))
    }

    pub fn as_dataset(&self) -> Option<&DataSet> {
        match self {
            DataObject::DataSet(ds) => Some(ds),
            _ => None,
        }
    }

    pub fn as_dataset_mut(&mut self) -> Option<&mut DataSet> {
        match self {
            DataObject::DataSet(ds) => Some(ds),
            _ => None,
        }
    }

    /// Mesh-level arrays of the object.
    pub fn field_data(&self) -> &FieldData {
        match self {
            DataObject::DataSet(ds) => ds.field_data(),
            DataObject::MultiBlock(mb) => mb.field_data(),
            DataObject::Amr(amr) => amr.field_data(),
        }
    }

    pub fn field_data_mut(&mut self) -> &mut FieldData {
        match self {
            DataObject::DataSet(ds) => ds.field_data_mut(),
            DataObject::MultiBlock(mb) => mb.field_data_mut(),
            DataObject::Amr(amr) => amr.field_data_mut(),
        }
    }
}

impl HasInfo for DataObject {
    fn info(&self) -> &InfoMap {
        match self {
            DataObject::DataSet(ds) => ds.info(),
            DataObject::MultiBlock(mb) => mb.info(),
            DataObject::Amr(amr) => amr.info(),
        }
    }

    fn info_mut(&mut self) -> &mut InfoMap {
        match self {
            DataObject::DataSet(ds) => ds.info_mut(),
            DataObject::MultiBlock(mb) => mb.info_mut(),
            DataObject::Amr(amr) => amr.info_mut(),
        }
    }
}

impl From<DataSet> for DataObject {
    fn from(ds: DataSet) -> Self {
        DataObject::DataSet(ds)
    }
}

impl From<MultiBlock> for DataObject {
    fn from(mb: MultiBlock) -> Self {
        DataObject::MultiBlock(mb)
    }
}

impl From<AmrDataSet> for DataObject {
    fn from(amr: AmrDataSet) -> Self {
        DataObject::Amr(amr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_empty_matches_kind() {
        for code in [0, 2, 3, 4, 6, 10, 13, 29, 30] {
            let obj = DataObject::from_code(code).unwrap();
            assert_eq!(obj.kind().code(), code);
            assert_eq!(obj.is_composite(), obj.kind().is_composite());
        }
        assert_eq!(
            DataObject::from_code(99),
            Err(MeshError::UnknownMeshKind(99))
        );
    }
}

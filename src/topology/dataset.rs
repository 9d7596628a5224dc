//! Leaf meshes.

use crate::data::array::DataArray;
use crate::data::attributes::{Association, FieldData, get_attributes_mut};
use crate::data::info::{HasInfo, InfoMap};
use crate::mesh_error::MeshError;
use crate::topology::geometry::{Bounds, Extent, Geometry, ImageGeometry};
use crate::topology::mesh_kind::MeshKind;

/// A single, non-hierarchical mesh block.
#[derive(Clone, Debug, PartialEq)]
pub struct DataSet {
    geometry: Geometry,
    point_data: FieldData,
    cell_data: FieldData,
    field_data: FieldData,
    info: InfoMap,
}

impl DataSet {
    /// Wrap validated geometry with empty attribute containers.
    pub fn new(geometry: Geometry) -> Result<Self, MeshError> {
        geometry.validate()?;
        Ok(Self::from_parts(geometry))
    }

    /// Empty leaf of a non-composite kind.
    pub fn empty(kind: MeshKind) -> Option<Self> {
        Geometry::empty(kind).map(Self::from_parts)
    }

    fn from_parts(geometry: Geometry) -> Self {
        Self {
            geometry,
            point_data: FieldData::new(),
            cell_data: FieldData::new(),
            field_data: FieldData::new(),
            info: InfoMap::new(),
        }
    }

    /// Image data over `extent`.
    pub fn image(origin: [f64; 3], spacing: [f64; 3], extent: Extent) -> Self {
        Self::from_image(ImageGeometry {
            origin,
            spacing,
            extent,
            uniform_grid: false,
        })
    }

    /// Image data flagged as an AMR block.
    pub fn uniform_grid(origin: [f64; 3], spacing: [f64; 3], extent: Extent) -> Self {
        Self::from_image(ImageGeometry {
            origin,
            spacing,
            extent,
            uniform_grid: true,
        })
    }

    fn from_image(g: ImageGeometry) -> Self {
        Self::from_parts(Geometry::Image(g))
    }

    /// Builder-style insert of an attribute array.
    pub fn with_array(mut self, association: Association, array: DataArray) -> Self {
        get_attributes_mut(&mut self, association).add_array(array);
        self
    }

    pub fn kind(&self) -> MeshKind {
        self.geometry.kind()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn num_points(&self) -> usize {
        self.geometry.num_points()
    }

    pub fn num_cells(&self) -> usize {
        self.geometry.num_cells()
    }

    pub fn cell_array_size(&self) -> usize {
        self.geometry.cell_array_size()
    }

    pub fn bounds(&self) -> Bounds {
        self.geometry.bounds()
    }

    pub fn extent(&self) -> Option<Extent> {
        self.geometry.extent()
    }

    pub fn point_data(&self) -> &FieldData {
        &self.point_data
    }

    pub fn point_data_mut(&mut self) -> &mut FieldData {
        &mut self.point_data
    }

    pub fn cell_data(&self) -> &FieldData {
        &self.cell_data
    }

    pub fn cell_data_mut(&mut self) -> &mut FieldData {
        &mut self.cell_data
    }

    pub fn field_data(&self) -> &FieldData {
        &self.field_data
    }

    pub fn field_data_mut(&mut self) -> &mut FieldData {
        &mut self.field_data
    }
}

impl HasInfo for DataSet {
    fn info(&self) -> &InfoMap {
        &self.info
    }
    fn info_mut(&mut self) -> &mut InfoMap {
        &mut self.info
    }
}

//! Attribute containers and the association resolver.
//!
//! Every leaf carries three [`FieldData`] containers, one per [`Association`].
//! Tokens and integer codes map to associations exactly; anything else is an
//! error.

use crate::data::array::DataArray;
use crate::mesh_error::MeshError;
use crate::topology::dataset::DataSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What an attribute array is attached to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Association {
    Point,
    Cell,
    Field,
}

impl Association {
    pub const ALL: [Association; 3] = [Association::Point, Association::Cell, Association::Field];

    /// Stable integer code: point = 0, cell = 1, field = 2.
    pub fn code(self) -> i32 {
        match self {
            Association::Point => 0,
            Association::Cell => 1,
            Association::Field => 2,
        }
    }

    pub fn from_code(code: i32) -> Result<Self, MeshError> {
        match code {
            0 => Ok(Association::Point),
            1 => Ok(Association::Cell),
            2 => Ok(Association::Field),
            _ => Err(MeshError::UnknownAssociationCode(code)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Association::Point => "point",
            Association::Cell => "cell",
            Association::Field => "field",
        }
    }
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Association {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Association::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| MeshError::UnknownAssociation(s.to_string()))
    }
}

/// Resolve an association token (`point`, `cell` or `field`).
pub fn get_association(token: &str) -> Result<Association, MeshError> {
    token.parse().inspect_err(|e| log::error!("{e}"))
}

/// Name of the association, the inverse of [`get_association`].
pub fn attributes_name(association: Association) -> &'static str {
    association.as_str()
}

/// The container holding `association` arrays of `ds`.
pub fn get_attributes(ds: &DataSet, association: Association) -> &FieldData {
    match association {
        Association::Point => ds.point_data(),
        Association::Cell => ds.cell_data(),
        Association::Field => ds.field_data(),
    }
}

/// Mutable counterpart of [`get_attributes`].
pub fn get_attributes_mut(ds: &mut DataSet, association: Association) -> &mut FieldData {
    match association {
        Association::Point => ds.point_data_mut(),
        Association::Cell => ds.cell_data_mut(),
        Association::Field => ds.field_data_mut(),
    }
}

/// [`get_attributes`] keyed by integer code; unknown codes are an error.
pub fn get_attributes_by_code(ds: &DataSet, code: i32) -> Result<&FieldData, MeshError> {
    let association = Association::from_code(code).inspect_err(|e| log::error!("{e}"))?;
    Ok(get_attributes(ds, association))
}

/// Name-unique, insertion-ordered collection of arrays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldData {
    arrays: Vec<DataArray>,
}

impl FieldData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `array`, replacing any array with the same name in place.
    ///
    /// Returns the replaced array, if any.
    pub fn add_array(&mut self, array: DataArray) -> Option<DataArray> {
        match self.arrays.iter_mut().find(|a| a.name() == array.name()) {
            Some(slot) => Some(std::mem::replace(slot, array)),
            None => {
                self.arrays.push(array);
                None
            }
        }
    }

    pub fn array(&self, name: &str) -> Option<&DataArray> {
        self.arrays.iter().find(|a| a.name() == name)
    }

    pub fn array_mut(&mut self, name: &str) -> Option<&mut DataArray> {
        self.arrays.iter_mut().find(|a| a.name() == name)
    }

    pub fn remove_array(&mut self, name: &str) -> Option<DataArray> {
        let idx = self.arrays.iter().position(|a| a.name() == name)?;
        Some(self.arrays.remove(idx))
    }

    pub fn arrays(&self) -> impl Iterator<Item = &DataArray> {
        self.arrays.iter()
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }
}

//! Mesh objects: leaf datasets, hierarchies, and the views over them.
//!
//! This module provides:
//! - [`MeshKind`] codes and leaf [`Geometry`]
//! - [`DataSet`] leaves, [`MultiBlock`] and [`AmrDataSet`] hierarchies, and the
//!   closed [`DataObject`] enumeration over them
//! - the [`CompositeDataSet`] view and the normalizer that presents any
//!   object through it

pub mod amr;
pub mod cell_type;
pub mod composite;
pub mod dataset;
pub mod geometry;
pub mod mesh_kind;
pub mod multiblock;
pub mod object;

pub use amr::AmrDataSet;
pub use cell_type::CellType;
pub use composite::{
    AsCompositeData, CompositeDataSet, CompositeDataSetMut, CompositeHandle, Ownership,
    as_composite_data,
};
pub use dataset::DataSet;
pub use geometry::{Bounds, Extent, Geometry};
pub use mesh_kind::MeshKind;
pub use multiblock::MultiBlock;
pub use object::DataObject;

#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-insitu
//!
//! mesh-insitu is a utility layer for in-situ analysis of distributed,
//! hierarchical scientific meshes. Analysis code sees any mesh, from a single
//! image block to a nested multi-block or AMR hierarchy spread over many
//! ranks, through the same few operations.
//!
//! ## Features
//! - A small in-memory mesh model: image, rectilinear, structured,
//!   unstructured and polygonal leaves; multi-block and AMR hierarchies
//! - Depth-first traversal of hierarchies, unary and paired, with a signed
//!   status contract for early stop and failure
//! - Typed access into packed array storage (AOS and SOA layouts)
//! - Collective metadata extraction that leaves every rank with the same
//!   global description of the mesh
//! - Pluggable communication backends (serial, threads, MPI)
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! mesh-insitu = "0.3"
//! # Optional features:
//! # features = ["mpi-support"]
//! ```
//!
//! ```
//! use mesh_insitu::prelude::*;
//!
//! let mb = MultiBlock::with_blocks(vec![
//!     Some(DataSet::image([0.0; 3], [1.0; 3], [0, 4, 0, 4, 0, 4]).into()),
//!     None,
//! ]);
//! let mesh = DataObject::from(mb);
//!
//! let mut cells = 0;
//! let status = apply(&mesh, &mut |ds: &DataSet| {
//!     cells += ds.num_cells();
//!     0
//! });
//! assert_eq!((status, cells), (0, 64));
//!
//! let mut md = MeshMetadata::new("mesh");
//! get_metadata(&NoComm, &mesh, &mut md).unwrap();
//! assert!(predicates::uniform_cartesian(&md));
//! ```

pub mod algs;
pub mod data;
pub mod io;
pub mod mesh_error;
pub mod metadata;
pub mod topology;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::apply::{
        CONTINUE, Status, apply, apply_composite, apply_indexed, apply_pair,
    };
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::communicator::{Communicator, NoComm, ThreadComm};
    pub use crate::algs::ghost::{GhostLayers, get_ghost_layer_metadata, set_ghost_layer_metadata};
    pub use crate::algs::metadata::{get_composite_metadata, get_dataset_metadata, get_metadata};
    pub use crate::data::{
        Association, DataArray, FieldData, HasInfo, ScalarType, get_pointer, get_pointer_mut,
    };
    pub use crate::data::attributes::{get_association, get_attributes};
    pub use crate::io::write_domain_decomp;
    pub use crate::mesh_error::MeshError;
    pub use crate::metadata::{MeshMetadata, MeshMetadataPtr, MetadataFlags, predicates};
    pub use crate::topology::{
        AmrDataSet, AsCompositeData, CompositeDataSet, DataObject, DataSet, MeshKind, MultiBlock,
        Ownership,
    };
}

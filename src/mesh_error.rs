//! MeshError: Unified error type for mesh-insitu public APIs
//!
//! Every fallible operation outside the traversal engine reports through this
//! type. The traversal engine keeps its signed [`Status`](crate::algs::apply::Status)
//! contract and only uses `MeshError` for structural mismatches.

use crate::data::array::ScalarType;
use crate::data::attributes::Association;
use thiserror::Error;

/// Unified error type for mesh-insitu operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// An association token other than `point`, `cell` or `field`.
    #[error("unknown association `{0}` (expected point, cell or field)")]
    UnknownAssociation(String),
    /// An association code outside the known set.
    #[error("unknown association code {0}")]
    UnknownAssociationCode(i32),
    /// A mesh kind code outside the known set.
    #[error("unknown mesh kind code {0}")]
    UnknownMeshKind(i32),
    /// The array has no packed buffer the accessor understands.
    #[error("unsupported array layout for `{name}`: {layout}")]
    UnsupportedLayout { name: String, layout: &'static str },
    /// A null array handle was passed where an array was required.
    #[error("unsupported array layout: no array")]
    NullArray,
    /// The array's element type differs from the one requested.
    #[error("array `{name}` holds {found:?}, requested {expected:?}")]
    ElementTypeMismatch {
        name: String,
        expected: ScalarType,
        found: ScalarType,
    },
    /// Buffer length disagrees with components * tuples.
    #[error("array `{name}`: expected {expected} values, found {found}")]
    ArrayLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    /// Two hierarchies handed to the binary traversal differ in shape.
    #[error("structure mismatch at slot {path:?}: {reason}")]
    StructureMismatch { path: Vec<usize>, reason: String },
    /// The single-mesh metadata overload was called on a hierarchy.
    #[error("{0} is a composite; use the composite metadata overload")]
    CompositeNotAllowed(&'static str),
    /// Geometry whose parts disagree (coordinate counts, offsets, cell types).
    #[error("invalid {kind} geometry: {reason}")]
    InvalidGeometry { kind: &'static str, reason: String },
    /// An AMR block that is not an image/uniform-grid leaf.
    #[error("AMR level {level} block {index}: {reason}")]
    InvalidAmrBlock {
        level: usize,
        index: usize,
        reason: String,
    },
    /// Two ranks claimed the same block.
    #[error("block {id} claimed by ranks {first} and {second}")]
    DuplicateBlock {
        id: usize,
        first: usize,
        second: usize,
    },
    /// The same array name and association carry different shapes across blocks or ranks.
    #[error("array `{name}` ({association}) disagrees: {reason}")]
    ArrayMismatch {
        name: String,
        association: Association,
        reason: String,
    },
    /// At least one rank failed its local part of a collective operation.
    #[error("collective {operation} failed on at least one rank (min status {status})")]
    CollectiveFailure {
        operation: &'static str,
        status: i32,
    },
    /// Point-to-point transport failure.
    #[error("communication with rank {neighbor} failed: {reason}")]
    CommError { neighbor: usize, reason: String },
    /// Malformed bytes on the wire.
    #[error("wire decode error: {0}")]
    Wire(String),
    /// The record has not been merged across ranks.
    #[error("metadata record is not a global view")]
    NotGlobalView,
    /// The record failed an internal consistency check.
    #[error("inconsistent metadata: {0}")]
    InconsistentMetadata(String),
    /// Filesystem failure while writing diagnostics.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for MeshError {
    fn from(e: std::io::Error) -> Self {
        MeshError::Io(e.to_string())
    }
}

impl From<bincode::Error> for MeshError {
    fn from(e: bincode::Error) -> Self {
        MeshError::Wire(e.to_string())
    }
}

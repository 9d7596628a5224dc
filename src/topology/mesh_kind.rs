//! Mesh and block kind codes.

use crate::mesh_error::MeshError;
use serde::{Deserialize, Serialize};

/// Concrete representation of a mesh object.
///
/// Discriminants are the stable integer codes exchanged between ranks and
/// written to diagnostics.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum MeshKind {
    PolyData = 0,
    StructuredGrid = 2,
    RectilinearGrid = 3,
    UnstructuredGrid = 4,
    ImageData = 6,
    /// Image data used as an AMR block.
    UniformGrid = 10,
    MultiBlock = 13,
    NonOverlappingAmr = 29,
    OverlappingAmr = 30,
}

impl MeshKind {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Result<Self, MeshError> {
        Ok(match code {
            0 => MeshKind::PolyData,
            2 => MeshKind::StructuredGrid,
            3 => MeshKind::RectilinearGrid,
            4 => MeshKind::UnstructuredGrid,
            6 => MeshKind::ImageData,
            10 => MeshKind::UniformGrid,
            13 => MeshKind::MultiBlock,
            29 => MeshKind::NonOverlappingAmr,
            30 => MeshKind::OverlappingAmr,
            _ => return Err(MeshError::UnknownMeshKind(code)),
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            MeshKind::PolyData => "poly_data",
            MeshKind::StructuredGrid => "structured_grid",
            MeshKind::RectilinearGrid => "rectilinear_grid",
            MeshKind::UnstructuredGrid => "unstructured_grid",
            MeshKind::ImageData => "image_data",
            MeshKind::UniformGrid => "uniform_grid",
            MeshKind::MultiBlock => "multi_block",
            MeshKind::NonOverlappingAmr => "non_overlapping_amr",
            MeshKind::OverlappingAmr => "overlapping_amr",
        }
    }

    /// True for hierarchy kinds.
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            MeshKind::MultiBlock | MeshKind::NonOverlappingAmr | MeshKind::OverlappingAmr
        )
    }

    /// True for single-dataset kinds, where each rank holds one mesh.
    pub fn is_legacy(self) -> bool {
        !self.is_composite()
    }

    pub fn is_amr(self) -> bool {
        matches!(self, MeshKind::NonOverlappingAmr | MeshKind::OverlappingAmr)
    }
}

impl std::fmt::Display for MeshKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for kind in [
            MeshKind::PolyData,
            MeshKind::StructuredGrid,
            MeshKind::RectilinearGrid,
            MeshKind::UnstructuredGrid,
            MeshKind::ImageData,
            MeshKind::UniformGrid,
            MeshKind::MultiBlock,
            MeshKind::NonOverlappingAmr,
            MeshKind::OverlappingAmr,
        ] {
            assert_eq!(MeshKind::from_code(kind.code()), Ok(kind));
            assert_eq!(kind.is_legacy(), !kind.is_composite());
        }
        assert_eq!(MeshKind::from_code(1), Err(MeshError::UnknownMeshKind(1)));
    }
}

//! Mesh-kind classification of a metadata record.
//!
//! Each predicate matches the block kind or the mesh kind, so a hierarchy of
//! image blocks classifies the same way as a single image. Prefer the most
//! specific predicate that answers the question: [`uniform_cartesian`] before
//! [`logically_cartesian`].

use crate::metadata::record::MeshMetadata;
use crate::topology::mesh_kind::MeshKind;

fn either(md: &MeshMetadata, pred: impl Fn(MeshKind) -> bool) -> bool {
    md.block_type.is_some_and(&pred) || md.mesh_type.is_some_and(&pred)
}

/// The mesh itself is an AMR hierarchy. Block kinds are not consulted.
pub fn amr(md: &MeshMetadata) -> bool {
    md.mesh_type.is_some_and(MeshKind::is_amr)
}

pub fn structured(md: &MeshMetadata) -> bool {
    either(md, |k| k == MeshKind::StructuredGrid)
}

pub fn polydata(md: &MeshMetadata) -> bool {
    either(md, |k| k == MeshKind::PolyData)
}

pub fn unstructured(md: &MeshMetadata) -> bool {
    either(md, |k| k == MeshKind::UnstructuredGrid)
}

/// Rectilinear: axis-aligned with per-axis coordinate arrays.
pub fn stretched_cartesian(md: &MeshMetadata) -> bool {
    either(md, |k| k == MeshKind::RectilinearGrid)
}

/// Image data, including AMR uniform-grid blocks.
pub fn uniform_cartesian(md: &MeshMetadata) -> bool {
    either(md, |k| matches!(k, MeshKind::ImageData | MeshKind::UniformGrid))
}

pub fn logically_cartesian(md: &MeshMetadata) -> bool {
    structured(md) || uniform_cartesian(md) || stretched_cartesian(md)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amr_ignores_block_type() {
        let md = MeshMetadata {
            block_type: Some(MeshKind::OverlappingAmr),
            ..MeshMetadata::default()
        };
        assert!(!amr(&md));
        let md = MeshMetadata {
            mesh_type: Some(MeshKind::NonOverlappingAmr),
            block_type: Some(MeshKind::UniformGrid),
            ..MeshMetadata::default()
        };
        assert!(amr(&md));
        assert!(uniform_cartesian(&md));
    }
}

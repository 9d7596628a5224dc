//! Domain-decomposition dump.
//!
//! Writes the block layout of a global metadata record as a legacy ASCII VTK
//! unstructured grid: one hexahedron per block spanning the block's bounds,
//! with the block id, owning rank and (for AMR) level as cell data.

use crate::algs::communicator::{CommTag, Communicator};
use crate::mesh_error::MeshError;
use crate::metadata::predicates;
use crate::metadata::record::{BlockMetadata, MeshMetadata};
use crate::topology::cell_type::CellType;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const STATUS_TAG: CommTag = CommTag(0x4d20);

/// Collective. Rank 0 writes `path`; every rank returns the same outcome.
///
/// A failed write on rank 0 surfaces there as the I/O error and on every
/// other rank as [`MeshError::CollectiveFailure`].
pub fn write_domain_decomp<C: Communicator>(
    comm: &C,
    md: &MeshMetadata,
    path: impl AsRef<Path>,
) -> Result<(), MeshError> {
    let local = if !md.global_view {
        log::error!("write_domain_decomp: {}", MeshError::NotGlobalView);
        Err(MeshError::NotGlobalView)
    } else if comm.rank() == 0 {
        write_to_path(md, path.as_ref())
    } else {
        Ok(())
    };
    let status = if local.is_ok() { 0 } else { -1 };
    let agreed = comm.all_reduce_min_i32(STATUS_TAG, status)?;
    local?;
    if agreed < 0 {
        return Err(MeshError::CollectiveFailure {
            operation: "write_domain_decomp",
            status: agreed,
        });
    }
    Ok(())
}

fn write_to_path(md: &MeshMetadata, path: &Path) -> Result<(), MeshError> {
    let file = File::create(path).map_err(|e| {
        log::error!("cannot create {}: {e}", path.display());
        MeshError::from(e)
    })?;
    let mut writer = BufWriter::new(file);
    write_domain_decomp_to(&mut writer, md)?;
    writer.flush()?;
    log::debug!(
        "wrote {} blocks of `{}` to {}",
        md.blocks.len(),
        md.mesh_name,
        path.display()
    );
    Ok(())
}

/// Serial writer behind [`write_domain_decomp`]. Blocks with empty bounds
/// are left out.
pub fn write_domain_decomp_to<W: Write>(writer: &mut W, md: &MeshMetadata) -> Result<(), MeshError> {
    let blocks: Vec<&BlockMetadata> = md.blocks.iter().filter(|b| !b.bounds.is_empty()).collect();
    if blocks.len() < md.blocks.len() {
        log::debug!(
            "{} blocks without points left out of the decomposition",
            md.blocks.len() - blocks.len()
        );
    }
    let n = blocks.len();

    writeln!(writer, "# vtk DataFile Version 3.0")?;
    writeln!(writer, "mesh-insitu domain decomposition: {}", md.mesh_name)?;
    writeln!(writer, "ASCII")?;
    writeln!(writer, "DATASET UNSTRUCTURED_GRID")?;

    writeln!(writer, "POINTS {} double", 8 * n)?;
    for b in &blocks {
        let [x0, x1, y0, y1, z0, z1] = b.bounds.0;
        for [x, y, z] in [
            [x0, y0, z0],
            [x1, y0, z0],
            [x1, y1, z0],
            [x0, y1, z0],
            [x0, y0, z1],
            [x1, y0, z1],
            [x1, y1, z1],
            [x0, y1, z1],
        ] {
            writeln!(writer, "{x} {y} {z}")?;
        }
    }

    writeln!(writer, "CELLS {} {}", n, 9 * n)?;
    for i in 0..n {
        write!(writer, "8")?;
        for p in 8 * i..8 * i + 8 {
            write!(writer, " {p}")?;
        }
        writeln!(writer)?;
    }
    writeln!(writer, "CELL_TYPES {n}")?;
    let hex = CellType::Hexahedron.vtk_code();
    for _ in 0..n {
        writeln!(writer, "{hex}")?;
    }

    let mut fields: Vec<(&str, Vec<String>)> = vec![
        ("BlockOwner", blocks.iter().map(|b| b.owner.to_string()).collect()),
        ("BlockId", blocks.iter().map(|b| b.id.to_string()).collect()),
    ];
    if predicates::amr(md) {
        fields.push((
            "BlockLevel",
            blocks
                .iter()
                .map(|b| b.level.map_or(-1, |l| l as i64).to_string())
                .collect(),
        ));
    }
    writeln!(writer, "CELL_DATA {n}")?;
    writeln!(writer, "FIELD FieldData {}", fields.len())?;
    for (name, values) in &fields {
        write_field_array(writer, name, n, "int", values)?;
    }
    Ok(())
}

fn write_field_array<W: Write>(
    writer: &mut W,
    name: &str,
    num_tuples: usize,
    data_type: &str,
    values: &[String],
) -> Result<(), MeshError> {
    writeln!(writer, "{name} 1 {num_tuples} {data_type}")?;
    let mut line_len = 0usize;
    for value in values {
        if line_len + value.len() + 1 > 70 {
            writeln!(writer)?;
            line_len = 0;
        }
        if line_len > 0 {
            write!(writer, " ")?;
            line_len += 1;
        }
        write!(writer, "{value}")?;
        line_len += value.len();
    }
    writeln!(writer)?;
    Ok(())
}

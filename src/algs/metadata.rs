//! Collective metadata extraction.
//!
//! Each rank describes its resident blocks, then the ranks agree on success
//! and exchange their descriptions so that every rank ends up with the same
//! global record.
//!
//! All entry points are collective over `comm`: every rank must call the same
//! entry point, in the same order relative to other collectives, with a
//! hierarchy of the same shape. A rank that fails locally still takes part in
//! the status agreement, so the group never hangs on a local error: the
//! failing rank returns its own error and every other rank returns
//! [`MeshError::CollectiveFailure`].

use crate::algs::apply::{CONTINUE, Status, apply_composite_indexed, composite_leaf_slot_count};
use crate::algs::communicator::{CommTag, Communicator};
use crate::algs::ghost::get_ghost_layer_metadata;
use crate::algs::wire::{decode_payload, encode_payload, kind};
use crate::data::array::GHOST_ARRAY_NAME;
use crate::data::attributes::{Association, get_attributes};
use crate::data::info::{HasInfo, InfoMap};
use crate::mesh_error::MeshError;
use crate::metadata::flags::MetadataFlags;
use crate::metadata::record::{ArrayMetadata, ArrayRange, BlockMetadata, MeshMetadata};
use crate::topology::amr::AmrDataSet;
use crate::topology::composite::{AsCompositeData, CompositeDataSet};
use crate::topology::dataset::DataSet;
use crate::topology::geometry::{Bounds, Extent, union_extent};
use crate::topology::mesh_kind::MeshKind;
use crate::topology::object::DataObject;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

const STATUS_TAG: CommTag = CommTag(0x4d00);
const GATHER_TAG: CommTag = CommTag(0x4d10);

/// Describe `dobj`, leaf or hierarchy, into `md`.
///
/// `md.mesh_name` and `md.flags` are kept; every other field is replaced.
pub fn get_metadata<C: Communicator>(
    comm: &C,
    dobj: &DataObject,
    md: &mut MeshMetadata,
) -> Result<(), MeshError> {
    match dobj {
        DataObject::DataSet(_) => get_dataset_metadata(comm, dobj, md),
        _ => get_composite_metadata(comm, &dobj.as_composite_data(), md),
    }
}

/// Describe one leaf per rank. Rank `r`'s leaf becomes block `r`.
///
/// Hierarchies are refused with [`MeshError::CompositeNotAllowed`].
pub fn get_dataset_metadata<C: Communicator>(
    comm: &C,
    dobj: &DataObject,
    md: &mut MeshMetadata,
) -> Result<(), MeshError> {
    let rank = comm.rank();
    let local = match dobj {
        DataObject::DataSet(ds) => {
            let mut local = LocalContribution::new(rank, comm.size(), ds.kind());
            local.read_ghost_layers(Some(ds.info()));
            local.add_block(rank, ds, None, &md.flags).map(|()| local)
        }
        _ => {
            let err = MeshError::CompositeNotAllowed(dobj.kind().name());
            log::error!("{err}");
            Err(err)
        }
    };
    let contributions = exchange(comm, local)?;
    merge(contributions, md)
}

/// Describe a hierarchy distributed over the ranks of `comm`.
///
/// Slots absent on a rank are expected to be present on exactly one other
/// rank. AMR input also fills the level description.
pub fn get_composite_metadata<C, D>(
    comm: &C,
    cd: &D,
    md: &mut MeshMetadata,
) -> Result<(), MeshError>
where
    C: Communicator,
    D: CompositeDataSet + ?Sized,
{
    let local = describe_composite(comm.rank(), cd, &md.flags);
    let contributions = exchange(comm, local)?;
    merge(contributions, md)
}

/// Refinement layout of an AMR hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct AmrLayout {
    ref_ratio: Vec<[i32; 3]>,
    blocks_per_level: Vec<usize>,
}

impl AmrLayout {
    fn of(amr: &AmrDataSet) -> Self {
        Self {
            ref_ratio: amr.levels().iter().map(|l| l.refinement_ratio()).collect(),
            blocks_per_level: amr.blocks_per_level(),
        }
    }
}

/// What one rank knows before the exchange.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct LocalContribution {
    rank: usize,
    mesh_type: MeshKind,
    num_slots: usize,
    blocks: Vec<BlockMetadata>,
    arrays: Vec<ArrayMetadata>,
    num_points: usize,
    num_cells: usize,
    cell_array_size: usize,
    bounds: Bounds,
    extent: Option<Extent>,
    /// Some block had no extent, so the union is undefined.
    extent_missing: bool,
    /// Recorded ghost layers, cells then nodes.
    ghost_layers: Option<(u32, u32)>,
    amr: Option<AmrLayout>,
}

impl LocalContribution {
    fn new(rank: usize, num_slots: usize, mesh_type: MeshKind) -> Self {
        Self {
            rank,
            mesh_type,
            num_slots,
            blocks: Vec::new(),
            arrays: Vec::new(),
            num_points: 0,
            num_cells: 0,
            cell_array_size: 0,
            bounds: Bounds::empty(),
            extent: None,
            extent_missing: false,
            ghost_layers: None,
            amr: None,
        }
    }

    fn add_block(
        &mut self,
        id: usize,
        ds: &DataSet,
        level: Option<usize>,
        flags: &MetadataFlags,
    ) -> Result<(), MeshError> {
        let mut ranges = Vec::new();
        for association in Association::ALL {
            for array in get_attributes(ds, association).arrays() {
                let range = flags.block_array_range.then(|| array.range()).flatten();
                merge_array(
                    &mut self.arrays,
                    ArrayMetadata {
                        name: array.name().to_string(),
                        association,
                        n_components: array.n_components(),
                        scalar_type: array.scalar_type(),
                        ghost: array.is_ghost(),
                        range,
                    },
                )?;
                ranges.push(ArrayRange {
                    name: array.name().to_string(),
                    association,
                    range,
                });
            }
        }

        let bounds = ds.bounds();
        let extent = ds.extent();
        self.num_points = self.num_points.saturating_add(ds.num_points());
        self.num_cells = self.num_cells.saturating_add(ds.num_cells());
        self.cell_array_size = self.cell_array_size.saturating_add(ds.cell_array_size());
        self.bounds = self.bounds.union(&bounds);
        match extent {
            Some(e) => self.extent = Some(self.extent.map_or(e, |acc| union_extent(&acc, &e))),
            None => self.extent_missing = true,
        }

        self.blocks.push(BlockMetadata {
            id,
            owner: self.rank,
            kind: ds.kind(),
            bounds,
            num_points: flags.block_size.then(|| ds.num_points()),
            num_cells: flags.block_size.then(|| ds.num_cells()),
            cell_array_size: flags.block_size.then(|| ds.cell_array_size()),
            extent: if flags.block_extents { extent } else { None },
            array_ranges: flags.block_array_range.then_some(ranges),
            level,
        });
        Ok(())
    }

    fn read_ghost_layers(&mut self, info: Option<&InfoMap>) {
        self.ghost_layers = info
            .and_then(get_ghost_layer_metadata)
            .map(|g| (g.cells, g.nodes));
    }

    /// Ghost depths: recorded layers, else one layer where a ghost array exists.
    fn ghost_counts(&self) -> (u32, u32) {
        self.ghost_layers.unwrap_or_else(|| {
            let has = |assoc| {
                self.arrays
                    .iter()
                    .any(|a| a.association == assoc && a.name == GHOST_ARRAY_NAME)
            };
            (
                u32::from(has(Association::Cell)),
                u32::from(has(Association::Point)),
            )
        })
    }
}

fn describe_composite<D: CompositeDataSet + ?Sized>(
    rank: usize,
    cd: &D,
    flags: &MetadataFlags,
) -> Result<LocalContribution, MeshError> {
    let amr = cd.as_amr();
    let mut local = LocalContribution::new(rank, composite_leaf_slot_count(cd), cd.kind());
    local.amr = amr.map(AmrLayout::of);
    local.read_ghost_layers(cd.root_info());

    let mut failure = None;
    let status: Status = apply_composite_indexed(cd, &mut |id: usize, ds: &DataSet| {
        let level = amr.and_then(|a| a.level_of(id)).map(|(l, _)| l);
        match local.add_block(id, ds, level, flags) {
            Ok(()) => CONTINUE,
            Err(e) => {
                failure = Some(e);
                -1
            }
        }
    });
    match failure {
        Some(err) => {
            log::error!("rank {rank}: block description failed: {err}");
            Err(err)
        }
        None if status != CONTINUE => Err(MeshError::CollectiveFailure {
            operation: "get_metadata",
            status,
        }),
        None => Ok(local),
    }
}

/// Insert `entry` into the inventory, or fold it into the entry of the same
/// name and association.
fn merge_array(inventory: &mut Vec<ArrayMetadata>, entry: ArrayMetadata) -> Result<(), MeshError> {
    let Some(known) = inventory
        .iter_mut()
        .find(|a| a.name == entry.name && a.association == entry.association)
    else {
        inventory.push(entry);
        return Ok(());
    };
    if known.scalar_type != entry.scalar_type || known.n_components != entry.n_components {
        let err = MeshError::ArrayMismatch {
            name: entry.name,
            association: entry.association,
            reason: format!(
                "{} x {} vs {} x {}",
                known.scalar_type.as_str(),
                known.n_components,
                entry.scalar_type.as_str(),
                entry.n_components
            ),
        };
        log::error!("{err}");
        return Err(err);
    }
    known.range = match (known.range, entry.range) {
        (Some([a, b]), Some([c, d])) => Some([a.min(c), b.max(d)]),
        (r, None) | (None, r) => r,
    };
    Ok(())
}

/// Agree on local success, then gather every rank's contribution.
fn exchange<C: Communicator>(
    comm: &C,
    local: Result<LocalContribution, MeshError>,
) -> Result<Vec<LocalContribution>, MeshError> {
    let payload = local.and_then(|l| encode_payload(kind::METADATA, &l));
    let status = if payload.is_ok() { 0 } else { -1 };
    let agreed = comm.all_reduce_min_i32(STATUS_TAG, status)?;
    let payload = payload?;
    if agreed < 0 {
        let err = MeshError::CollectiveFailure {
            operation: "get_metadata",
            status: agreed,
        };
        log::error!("rank {}: {err}", comm.rank());
        return Err(err);
    }
    comm.all_gather_bytes(GATHER_TAG, &payload)?
        .iter()
        .map(|bytes| decode_payload(kind::METADATA, bytes))
        .collect()
}

/// Fold contributions, in rank order, into a fresh global record. `md` is
/// only written on success.
fn merge(contributions: Vec<LocalContribution>, md: &mut MeshMetadata) -> Result<(), MeshError> {
    let mut out = MeshMetadata::new(md.mesh_name.clone()).with_flags(md.flags);
    out.global_view = true;
    out.mesh_type = contributions.first().map(|c| c.mesh_type);
    out.num_blocks = contributions.iter().map(|c| c.num_slots).max().unwrap_or(0);
    out.num_blocks_local = contributions.iter().map(|c| c.blocks.len()).collect();

    let mut extent_missing = false;
    let mut amr: Option<&AmrLayout> = None;
    for c in &contributions {
        out.num_points = out.num_points.saturating_add(c.num_points);
        out.num_cells = out.num_cells.saturating_add(c.num_cells);
        out.cell_array_size = out.cell_array_size.saturating_add(c.cell_array_size);
        out.bounds = out.bounds.union(&c.bounds);
        extent_missing |= c.extent_missing;
        if let Some(e) = c.extent {
            out.extent = Some(out.extent.map_or(e, |acc| union_extent(&acc, &e)));
        }
        let (cells, nodes) = c.ghost_counts();
        out.num_ghost_cells = out.num_ghost_cells.max(cells);
        out.num_ghost_nodes = out.num_ghost_nodes.max(nodes);
        for entry in &c.arrays {
            merge_array(&mut out.arrays, entry.clone())?;
        }
        match (amr, &c.amr) {
            (None, Some(layout)) => amr = Some(layout),
            (Some(first), Some(layout)) if first != layout => {
                let err = MeshError::InconsistentMetadata(format!(
                    "rank {} has a different refinement layout",
                    c.rank
                ));
                log::error!("{err}");
                return Err(err);
            }
            _ => {}
        }
    }
    if extent_missing {
        out.extent = None;
    }
    if let Some(layout) = amr {
        out.num_levels = layout.ref_ratio.len();
        out.ref_ratio = layout.ref_ratio.clone();
        out.blocks_per_level = layout.blocks_per_level.clone();
    }

    out.blocks = contributions.into_iter().flat_map(|c| c.blocks).collect();
    out.blocks.sort_by_key(|b| b.id);
    if let Some((a, b)) = out.blocks.iter().tuple_windows().find(|(a, b)| a.id == b.id) {
        let err = MeshError::DuplicateBlock {
            id: a.id,
            first: a.owner,
            second: b.owner,
        };
        log::error!("{err}");
        return Err(err);
    }

    let kinds: Vec<MeshKind> = out.blocks.iter().map(|b| b.kind).unique().collect();
    out.block_type = kinds.first().copied();
    if kinds.len() > 1 {
        log::debug!(
            "mesh `{}` mixes block kinds {:?}; reporting {:?}",
            out.mesh_name,
            kinds,
            out.block_type
        );
    }

    *md = out;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::NoComm;
    use crate::data::array::DataArray;
    use crate::topology::multiblock::MultiBlock;

    fn image(x: f64) -> DataSet {
        DataSet::image([x, 0.0, 0.0], [1.0; 3], [0, 1, 0, 1, 0, 1])
    }

    #[test]
    fn serial_multiblock() {
        let mb = MultiBlock::with_blocks(vec![Some(image(0.0).into()), None, Some(image(2.0).into())]);
        let mut md = MeshMetadata::new("grid");
        get_metadata(&NoComm, &mb.into(), &mut md).unwrap();
        assert!(md.global_view);
        assert_eq!(md.mesh_name, "grid");
        assert_eq!(md.mesh_type, Some(MeshKind::MultiBlock));
        assert_eq!(md.block_type, Some(MeshKind::ImageData));
        assert_eq!(md.num_blocks, 3);
        assert_eq!(md.num_blocks_local, vec![2]);
        assert_eq!(md.blocks.iter().map(|b| b.id).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(md.num_points, 16);
        assert_eq!(md.bounds, Bounds([0.0, 3.0, 0.0, 1.0, 0.0, 1.0]));
        assert_eq!(md.validate(), Ok(()));
    }

    #[test]
    fn conflicting_arrays_fail_locally() {
        let a = image(0.0).with_array(
            Association::Point,
            DataArray::aos("p", 1, vec![0.0f64; 8]).unwrap(),
        );
        let b = image(1.0).with_array(
            Association::Point,
            DataArray::aos("p", 1, vec![0i32; 8]).unwrap(),
        );
        let mb = MultiBlock::with_blocks(vec![Some(a.into()), Some(b.into())]);
        let mut md = MeshMetadata::new("m");
        let err = get_metadata(&NoComm, &mb.into(), &mut md).unwrap_err();
        assert!(matches!(err, MeshError::ArrayMismatch { .. }));
        assert!(!md.global_view);
        assert_eq!(md.mesh_name, "m");
    }

    #[test]
    fn dataset_overload_refuses_hierarchies() {
        let mut md = MeshMetadata::new("m");
        let err = get_dataset_metadata(&NoComm, &MultiBlock::new().into(), &mut md).unwrap_err();
        assert_eq!(err, MeshError::CompositeNotAllowed("multi_block"));
    }
}

//! Leaf geometry: points, cells, bounds and index extents.

use crate::mesh_error::MeshError;
use crate::topology::cell_type::CellType;
use crate::topology::mesh_kind::MeshKind;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Inclusive point index ranges `[i0, i1, j0, j1, k0, k1]`.
pub type Extent = [i64; 6];

/// The extent of an empty structured mesh.
pub const EMPTY_EXTENT: Extent = [0, -1, 0, -1, 0, -1];

/// Point counts along each axis; zero when the range is inverted, saturated
/// at `usize::MAX` when it does not fit.
pub fn extent_dims(extent: &Extent) -> [usize; 3] {
    std::array::from_fn(|axis| {
        let (lo, hi) = (i128::from(extent[2 * axis]), i128::from(extent[2 * axis + 1]));
        usize::try_from((hi - lo + 1).max(0)).unwrap_or(usize::MAX)
    })
}

fn saturating_product(factors: impl IntoIterator<Item = usize>) -> usize {
    factors.into_iter().fold(1, usize::saturating_mul)
}

fn dims_num_points(dims: [usize; 3]) -> usize {
    saturating_product(dims)
}

fn dims_num_cells(dims: [usize; 3]) -> usize {
    if dims.iter().any(|&d| d == 0) {
        return 0;
    }
    saturating_product(dims.iter().map(|&d| if d > 1 { d - 1 } else { 1 }))
}

/// Smallest extent containing both.
pub fn union_extent(a: &Extent, b: &Extent) -> Extent {
    let empty = |e: &Extent| extent_dims(e).contains(&0);
    match (empty(a), empty(b)) {
        (true, _) => *b,
        (_, true) => *a,
        _ => std::array::from_fn(|i| if i % 2 == 0 { a[i].min(b[i]) } else { a[i].max(b[i]) }),
    }
}

/// Axis-aligned box `[xmin, xmax, ymin, ymax, zmin, zmax]`.
///
/// Serialized as `None` when empty, since the infinite sentinel has no
/// portable text form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds(pub [f64; 6]);

impl Serialize for Bounds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (!self.is_empty()).then_some(self.0).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<[f64; 6]>::deserialize(deserializer)?.map_or_else(Bounds::empty, Bounds))
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds {
    /// The identity for [`Bounds::union`].
    pub fn empty() -> Self {
        Self([
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
        ])
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.0[2 * axis] > self.0[2 * axis + 1])
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f64; 3]>) -> Self {
        points.into_iter().fold(Self::empty(), |b, p| b.include(p))
    }

    /// Grow to contain `p`.
    pub fn include(mut self, p: &[f64; 3]) -> Self {
        for axis in 0..3 {
            self.0[2 * axis] = self.0[2 * axis].min(p[axis]);
            self.0[2 * axis + 1] = self.0[2 * axis + 1].max(p[axis]);
        }
        self
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        Bounds(std::array::from_fn(|i| {
            if i % 2 == 0 {
                self.0[i].min(other.0[i])
            } else {
                self.0[i].max(other.0[i])
            }
        }))
    }

    pub fn min(&self) -> [f64; 3] {
        [self.0[0], self.0[2], self.0[4]]
    }

    pub fn max(&self) -> [f64; 3] {
        [self.0[1], self.0[3], self.0[5]]
    }
}

/// Cells as offsets into a flat connectivity list.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CellArray {
    /// `offsets[i]..offsets[i + 1]` are the point ids of cell `i`.
    pub offsets: Vec<usize>,
    pub connectivity: Vec<usize>,
}

impl CellArray {
    /// Build from per-cell point id lists.
    pub fn from_cells<I, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[usize]>,
    {
        let mut out = CellArray {
            offsets: vec![0],
            connectivity: Vec::new(),
        };
        for cell in cells {
            out.connectivity.extend_from_slice(cell.as_ref());
            out.offsets.push(out.connectivity.len());
        }
        out
    }

    pub fn num_cells(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn cell(&self, i: usize) -> Option<&[usize]> {
        let start = *self.offsets.get(i)?;
        let end = *self.offsets.get(i + 1)?;
        self.connectivity.get(start..end)
    }

    /// Length of the connectivity list.
    pub fn size(&self) -> usize {
        self.connectivity.len()
    }

    fn validate(&self, kind: &'static str, num_points: usize) -> Result<(), MeshError> {
        let bad = |reason: String| MeshError::InvalidGeometry { kind, reason };
        if !self.offsets.is_empty() && self.offsets[0] != 0 {
            return Err(bad(format!("first offset is {}, expected 0", self.offsets[0])));
        }
        if self.offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(bad("offsets are not monotone".into()));
        }
        if self.offsets.last().copied().unwrap_or(0) != self.connectivity.len() {
            return Err(bad("last offset does not match connectivity length".into()));
        }
        if let Some(&id) = self.connectivity.iter().find(|&&id| id >= num_points) {
            return Err(bad(format!("point id {id} out of range ({num_points} points)")));
        }
        Ok(())
    }
}

/// Uniformly spaced points on a regular lattice.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageGeometry {
    pub origin: [f64; 3],
    pub spacing: [f64; 3],
    pub extent: Extent,
    /// Marks the image as an AMR block.
    pub uniform_grid: bool,
}

/// Lattice with independent, monotone coordinates per axis.
#[derive(Clone, Debug, PartialEq)]
pub struct RectilinearGeometry {
    pub extent: Extent,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

/// Lattice topology with explicit point positions.
#[derive(Clone, Debug, PartialEq)]
pub struct StructuredGeometry {
    pub extent: Extent,
    pub points: Vec<[f64; 3]>,
}

/// Explicit points and typed cells.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct UnstructuredGeometry {
    pub points: Vec<[f64; 3]>,
    pub cells: CellArray,
    pub cell_types: Vec<CellType>,
}

/// Explicit points with vertex, line and polygon cells.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct PolyGeometry {
    pub points: Vec<[f64; 3]>,
    pub cells: CellArray,
}

/// Geometry of a leaf mesh.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Image(ImageGeometry),
    Rectilinear(RectilinearGeometry),
    Structured(StructuredGeometry),
    Unstructured(UnstructuredGeometry),
    PolyData(PolyGeometry),
}

impl Geometry {
    /// Empty geometry for a leaf kind; `None` for hierarchy kinds.
    pub fn empty(kind: MeshKind) -> Option<Self> {
        Some(match kind {
            MeshKind::ImageData | MeshKind::UniformGrid => Geometry::Image(ImageGeometry {
                origin: [0.0; 3],
                spacing: [1.0; 3],
                extent: EMPTY_EXTENT,
                uniform_grid: kind == MeshKind::UniformGrid,
            }),
            MeshKind::RectilinearGrid => Geometry::Rectilinear(RectilinearGeometry {
                extent: EMPTY_EXTENT,
                x: Vec::new(),
                y: Vec::new(),
                z: Vec::new(),
            }),
            MeshKind::StructuredGrid => Geometry::Structured(StructuredGeometry {
                extent: EMPTY_EXTENT,
                points: Vec::new(),
            }),
            MeshKind::UnstructuredGrid => Geometry::Unstructured(UnstructuredGeometry::default()),
            MeshKind::PolyData => Geometry::PolyData(PolyGeometry::default()),
            _ => return None,
        })
    }

    pub fn kind(&self) -> MeshKind {
        match self {
            Geometry::Image(g) if g.uniform_grid => MeshKind::UniformGrid,
            Geometry::Image(_) => MeshKind::ImageData,
            Geometry::Rectilinear(_) => MeshKind::RectilinearGrid,
            Geometry::Structured(_) => MeshKind::StructuredGrid,
            Geometry::Unstructured(_) => MeshKind::UnstructuredGrid,
            Geometry::PolyData(_) => MeshKind::PolyData,
        }
    }

    /// Check that counts and indices agree.
    pub fn validate(&self) -> Result<(), MeshError> {
        match self {
            Geometry::Image(_) => Ok(()),
            Geometry::Rectilinear(g) => {
                let dims = extent_dims(&g.extent);
                for (axis, coords) in [&g.x, &g.y, &g.z].into_iter().enumerate() {
                    if coords.len() != dims[axis] {
                        return Err(MeshError::InvalidGeometry {
                            kind: "rectilinear",
                            reason: format!(
                                "axis {axis} has {} coordinates, extent needs {}",
                                coords.len(),
                                dims[axis]
                            ),
                        });
                    }
                }
                Ok(())
            }
            Geometry::Structured(g) => {
                let expected = dims_num_points(extent_dims(&g.extent));
                if g.points.len() != expected {
                    return Err(MeshError::InvalidGeometry {
                        kind: "structured",
                        reason: format!("{} points, extent needs {expected}", g.points.len()),
                    });
                }
                Ok(())
            }
            Geometry::Unstructured(g) => {
                g.cells.validate("unstructured", g.points.len())?;
                if g.cell_types.len() != g.cells.num_cells() {
                    return Err(MeshError::InvalidGeometry {
                        kind: "unstructured",
                        reason: format!(
                            "{} cell types for {} cells",
                            g.cell_types.len(),
                            g.cells.num_cells()
                        ),
                    });
                }
                for (i, ct) in g.cell_types.iter().enumerate() {
                    let n = g.cells.cell(i).map_or(0, <[usize]>::len);
                    if ct.node_count().is_some_and(|want| want != n) {
                        return Err(MeshError::InvalidGeometry {
                            kind: "unstructured",
                            reason: format!("cell {i} is {ct:?} with {n} points"),
                        });
                    }
                }
                Ok(())
            }
            Geometry::PolyData(g) => g.cells.validate("poly data", g.points.len()),
        }
    }

    pub fn num_points(&self) -> usize {
        match self {
            Geometry::Image(g) => dims_num_points(extent_dims(&g.extent)),
            Geometry::Rectilinear(g) => dims_num_points(extent_dims(&g.extent)),
            Geometry::Structured(g) => g.points.len(),
            Geometry::Unstructured(g) => g.points.len(),
            Geometry::PolyData(g) => g.points.len(),
        }
    }

    pub fn num_cells(&self) -> usize {
        match self {
            Geometry::Image(g) => dims_num_cells(extent_dims(&g.extent)),
            Geometry::Rectilinear(g) => dims_num_cells(extent_dims(&g.extent)),
            Geometry::Structured(g) => dims_num_cells(extent_dims(&g.extent)),
            Geometry::Unstructured(g) => g.cells.num_cells(),
            Geometry::PolyData(g) => g.cells.num_cells(),
        }
    }

    /// Connectivity length for explicit cells, zero for lattices.
    pub fn cell_array_size(&self) -> usize {
        match self {
            Geometry::Unstructured(g) => g.cells.size(),
            Geometry::PolyData(g) => g.cells.size(),
            _ => 0,
        }
    }

    /// Point index extent for lattice kinds.
    pub fn extent(&self) -> Option<Extent> {
        match self {
            Geometry::Image(g) => Some(g.extent),
            Geometry::Rectilinear(g) => Some(g.extent),
            Geometry::Structured(g) => Some(g.extent),
            Geometry::Unstructured(_) | Geometry::PolyData(_) => None,
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            Geometry::Image(g) => {
                if extent_dims(&g.extent).contains(&0) {
                    return Bounds::empty();
                }
                let lo: [f64; 3] =
                    std::array::from_fn(|a| g.origin[a] + g.spacing[a] * g.extent[2 * a] as f64);
                let hi: [f64; 3] = std::array::from_fn(|a| {
                    g.origin[a] + g.spacing[a] * g.extent[2 * a + 1] as f64
                });
                Bounds::empty().include(&lo).include(&hi)
            }
            Geometry::Rectilinear(g) => {
                let range = |c: &[f64]| {
                    c.iter()
                        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
                            None => Some((v, v)),
                            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                        })
                };
                match (range(&g.x), range(&g.y), range(&g.z)) {
                    (Some(x), Some(y), Some(z)) => Bounds([x.0, x.1, y.0, y.1, z.0, z.1]),
                    _ => Bounds::empty(),
                }
            }
            Geometry::Structured(g) => Bounds::from_points(&g.points),
            Geometry::Unstructured(g) => Bounds::from_points(&g.points),
            Geometry::PolyData(g) => Bounds::from_points(&g.points),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_counts_and_bounds() {
        let g = Geometry::Image(ImageGeometry {
            origin: [1.0, 0.0, 0.0],
            spacing: [0.5, 1.0, 1.0],
            extent: [0, 4, 0, 2, 0, 0],
            uniform_grid: false,
        });
        assert_eq!(g.num_points(), 15);
        assert_eq!(g.num_cells(), 8);
        assert_eq!(g.bounds(), Bounds([1.0, 3.0, 0.0, 2.0, 0.0, 0.0]));
        assert_eq!(g.kind(), MeshKind::ImageData);
    }

    #[test]
    fn empty_geometries_have_empty_bounds() {
        for kind in [
            MeshKind::ImageData,
            MeshKind::RectilinearGrid,
            MeshKind::StructuredGrid,
            MeshKind::UnstructuredGrid,
            MeshKind::PolyData,
        ] {
            let g = Geometry::empty(kind).unwrap();
            assert_eq!(g.kind(), kind);
            assert!(g.bounds().is_empty());
            assert_eq!(g.num_cells(), 0);
            assert!(g.validate().is_ok());
        }
        assert!(Geometry::empty(MeshKind::MultiBlock).is_none());
    }

    #[test]
    fn unstructured_validation() {
        let mut g = UnstructuredGeometry {
            points: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            cells: CellArray::from_cells([[0usize, 1, 2]]),
            cell_types: vec![CellType::Triangle],
        };
        assert!(Geometry::Unstructured(g.clone()).validate().is_ok());
        g.cell_types[0] = CellType::Quadrilateral;
        assert!(Geometry::Unstructured(g.clone()).validate().is_err());
        g.cell_types[0] = CellType::Triangle;
        g.cells.connectivity[2] = 9;
        assert!(Geometry::Unstructured(g).validate().is_err());
    }

    #[test]
    fn huge_extents_saturate() {
        let g = Geometry::Image(ImageGeometry {
            origin: [0.0; 3],
            spacing: [1.0; 3],
            extent: [i64::MIN, i64::MAX, 0, 0, i64::MIN, i64::MAX],
            uniform_grid: false,
        });
        assert_eq!(extent_dims(&[i64::MIN, i64::MAX, 0, 0, 5, 4]), [usize::MAX, 1, 0]);
        assert_eq!(g.num_points(), usize::MAX);
        assert_eq!(g.num_cells(), usize::MAX);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn union_ignores_empty() {
        let a = Bounds([0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
        assert_eq!(a.union(&Bounds::empty()), a);
        assert_eq!(Bounds::empty().union(&a), a);
        let b = Bounds([-1.0, 0.5, 0.0, 2.0, 0.0, 1.0]);
        assert_eq!(a.union(&b), Bounds([-1.0, 1.0, 0.0, 2.0, 0.0, 1.0]));
        assert_eq!(
            union_extent(&EMPTY_EXTENT, &[0, 3, 0, 3, 0, 0]),
            [0, 3, 0, 3, 0, 0]
        );
        assert_eq!(
            union_extent(&[0, 3, 0, 3, 0, 0], &[3, 6, 0, 3, 0, 0]),
            [0, 6, 0, 3, 0, 0]
        );
    }
}

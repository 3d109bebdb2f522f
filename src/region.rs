use crate::{
    error::{MarchingCubesError, Result},
    tables::CORNER_OFFSETS,
    types::{Point, Value, Vector},
};

/// Half-extent of the default cubic region.
pub const DEFAULT_EXTENT: Value = 4.0;

/// Edge length of the default cells.
pub const DEFAULT_CELL_SIZE: Value = 0.28;

/// Largest number of cells along one axis.
const MAX_CELLS_PER_AXIS: Value = u32::MAX as Value;

/// An axis-aligned box covered by a lattice of cubic cells.
///
/// The lattice has `cells + 1` points per axis. Point `(i, j, k)` sits at
/// `min + (i, j, k) * cell_size`; the last cell on an axis may reach past `max`
/// when the box is not an exact multiple of the cell size.
///
/// Fields are private so a `GridRegion` is always valid once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRegion {
    min: Point,
    max: Point,
    cell_size: Value,
}

impl Default for GridRegion {
    /// The cube `[-4, 4]` with cells of edge `0.28`.
    fn default() -> Self {
        Self {
            min: Point::new(-DEFAULT_EXTENT, -DEFAULT_EXTENT, -DEFAULT_EXTENT),
            max: Point::new(DEFAULT_EXTENT, DEFAULT_EXTENT, DEFAULT_EXTENT),
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

impl GridRegion {
    /// Creates a region spanning `min..max` with cubic cells of edge `cell_size`.
    ///
    /// Returns [`MarchingCubesError::InvalidCellSize`] if `cell_size` is not a positive
    /// finite number, and [`MarchingCubesError::InvalidBounds`] if a coordinate is not
    /// finite or `max <= min` on any axis. A region whose lattice would not fit in
    /// memory addressing is [`MarchingCubesError::GridTooLarge`].
    pub fn new(min: Point, max: Point, cell_size: Value) -> Result<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(MarchingCubesError::InvalidCellSize(cell_size));
        }
        let finite = min.iter().chain(max.iter()).all(|c| c.is_finite());
        if !finite || min.iter().zip(max.iter()).any(|(lo, hi)| hi <= lo) {
            return Err(MarchingCubesError::InvalidBounds { min, max });
        }
        if checked_lattice_size(min, max, cell_size).is_none() {
            return Err(MarchingCubesError::GridTooLarge {
                min,
                max,
                cell_size,
            });
        }
        Ok(Self {
            min,
            max,
            cell_size,
        })
    }

    /// Creates the cube `[-extent, extent]` on every axis.
    pub fn cube(extent: Value, cell_size: Value) -> Result<Self> {
        if !(extent.is_finite() && extent > 0.0) {
            return Err(MarchingCubesError::InvalidExtent(extent));
        }
        let half = Vector::repeat(extent);
        Self::new(Point::from(-half), Point::from(half), cell_size)
    }

    pub fn min(&self) -> Point {
        self.min
    }

    pub fn max(&self) -> Point {
        self.max
    }

    /// World-space edge length of every cell.
    pub fn cell_size(&self) -> Value {
        self.cell_size
    }

    /// Number of cells along X, Y and Z.
    ///
    /// Bounded at construction, so the counts and their products never overflow.
    pub fn cell_counts(&self) -> [usize; 3] {
        let span = self.max - self.min;
        [span.x, span.y, span.z].map(|s| ((s / self.cell_size).ceil() as usize).max(1))
    }

    /// Total number of cells in the region.
    pub fn cell_count(&self) -> usize {
        self.cell_counts().iter().product()
    }

    /// Number of lattice points along X, Y and Z (one more than the cell count).
    pub fn lattice_counts(&self) -> [usize; 3] {
        self.cell_counts().map(|n| n + 1)
    }

    /// World-space position of lattice point `(x, y, z)`.
    ///
    /// Always computed from the integer indices, so a corner shared by several cells
    /// has the exact same coordinates in each of them.
    #[inline]
    pub fn lattice_point(&self, x: usize, y: usize, z: usize) -> Point {
        Point::new(
            self.min.x + x as Value * self.cell_size,
            self.min.y + y as Value * self.cell_size,
            self.min.z + z as Value * self.cell_size,
        )
    }

    /// Every cell index `[x, y, z]`, X outermost and Z innermost.
    pub fn cells(&self) -> impl Iterator<Item = [usize; 3]> + use<> {
        let [nx, ny, nz] = self.cell_counts();
        (0..nx).flat_map(move |x| (0..ny).flat_map(move |y| (0..nz).map(move |z| [x, y, z])))
    }
}

/// Total lattice points of the region, or `None` if a count overflows.
fn checked_lattice_size(min: Point, max: Point, cell_size: Value) -> Option<usize> {
    (0..3).try_fold(1usize, |points, axis| {
        let cells = ((max[axis] - min[axis]) / cell_size).ceil();
        if !cells.is_finite() || cells >= MAX_CELLS_PER_AXIS {
            return None;
        }
        let lattice = (cells as usize).max(1).checked_add(1)?;
        points
            .checked_mul(lattice)
            .filter(|&total| total <= isize::MAX as usize)
    })
}

/// Returns the 8 lattice indices `[x, y, z]` of the corners of cell `(x, y, z)`.
///
/// Matches the corner ordering used by [`EDGE_TABLE`](crate::tables::EDGE_TABLE)
/// and [`TRI_TABLE`](crate::tables::TRI_TABLE).
#[inline]
pub fn cell_corner_indices([x, y, z]: [usize; 3]) -> [[usize; 3]; 8] {
    CORNER_OFFSETS.map(|[dx, dy, dz]| [x + dx, y + dy, z + dz])
}

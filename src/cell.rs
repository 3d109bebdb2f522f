use crate::{
    error::{MarchingCubesError, Result},
    lattice::Lattice,
    region::{GridRegion, cell_corner_indices},
    tables::{EDGE_TABLE, case_triangles},
    types::{Point, ScalarField, Value},
};

/// The field sampled at the 8 corners of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSample {
    /// World-space corner positions, in [`CORNER_OFFSETS`](crate::tables::CORNER_OFFSETS) order.
    pub positions: [Point; 8],
    /// Field value at each corner.
    pub values: [Value; 8],
    /// Marching cubes case index, one bit per strictly positive corner.
    pub case: u8,
}

impl CellSample {
    /// Builds a sample from already evaluated corners.
    pub fn new(positions: [Point; 8], values: [Value; 8]) -> Self {
        Self {
            positions,
            values,
            case: get_state(&values),
        }
    }

    /// Evaluates `field` at the 8 corners of cell `cell` in `region`.
    ///
    /// Returns [`MarchingCubesError::NonFiniteField`] if any corner value is NaN or infinite.
    pub fn sample<F>(field: &F, region: &GridRegion, cell: [usize; 3]) -> Result<Self>
    where
        F: ScalarField + ?Sized,
    {
        let positions = cell_corner_indices(cell).map(|[x, y, z]| region.lattice_point(x, y, z));
        let mut values = [0.0; 8];
        for (value, &point) in values.iter_mut().zip(positions.iter()) {
            *value = evaluate_finite(field, point)?;
        }
        Ok(Self::new(positions, values))
    }

    /// Reads the corners of cell `cell` from a pre-sampled lattice.
    pub fn from_lattice(lattice: &Lattice, region: &GridRegion, cell: [usize; 3]) -> Self {
        let corners = cell_corner_indices(cell);
        let positions = corners.map(|[x, y, z]| region.lattice_point(x, y, z));
        let values = corners.map(|[x, y, z]| lattice.get(x, y, z));
        Self::new(positions, values)
    }

    /// Bitmask of the 12 edges crossed by the surface.
    #[inline]
    pub fn crossed_edges(&self) -> u16 {
        EDGE_TABLE[self.case as usize]
    }

    /// `true` when every corner is on the same side and no surface passes through.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.case == 0 || self.case == u8::MAX
    }

    /// Edge triples of the triangles inside this cell, in winding order.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + use<> {
        case_triangles(self.case)
    }
}

/// Computes the marching cubes case index for a cell.
///
/// Each of the 8 corners maps to one bit. A bit is set when the corner's value
/// is **strictly above** zero (i.e. "inside" the surface):
///
/// ```text
/// corner index:  7  6  5  4  3  2  1  0
/// state bits:   [_][_][_][_][_][_][_][_]
///                                      ^-- corner 0 inside?
/// ```
#[inline]
pub fn get_state(values: &[Value; 8]) -> u8 {
    values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v > 0.0)
        .fold(0, |state, (i, _)| state | 1 << i)
}

/// Evaluates `field` at `point`, rejecting NaN and infinities.
#[inline]
pub(crate) fn evaluate_finite<F>(field: &F, point: Point) -> Result<Value>
where
    F: ScalarField + ?Sized,
{
    let value = field.evaluate(point);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MarchingCubesError::NonFiniteField { point, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_sets_bits_for_positive_corners_only() {
        assert_eq!(get_state(&[0.0; 8]), 0);
        assert_eq!(get_state(&[-1.0; 8]), 0);
        assert_eq!(get_state(&[0.5; 8]), 255);
        assert_eq!(get_state(&[1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 2.0]), 0b1000_0001);
    }

    #[test]
    fn samples_world_space_corners() {
        let region = GridRegion::cube(2.0, 1.0).unwrap();
        let field = |p: Point| p.x;
        let sample = CellSample::sample(&field, &region, [2, 0, 0]).unwrap();

        assert_eq!(sample.positions[0], Point::new(0.0, -2.0, -2.0));
        assert_eq!(sample.positions[6], Point::new(1.0, -1.0, -1.0));
        // x > 0 only on the +X face: corners 1, 2, 5, 6.
        assert_eq!(sample.case, 0b0110_0110);
        assert_eq!(sample.triangles().count(), 2);
        assert!(!sample.is_empty());
    }

    #[test]
    fn uniform_cells_are_empty() {
        let region = GridRegion::cube(1.0, 0.5).unwrap();
        let inside = CellSample::sample(&|_: Point| 1.0_f32, &region, [1, 1, 1]).unwrap();
        let outside = CellSample::sample(&|_: Point| -1.0_f32, &region, [1, 1, 1]).unwrap();

        assert_eq!(inside.case, 255);
        assert_eq!(outside.case, 0);
        assert!(inside.is_empty() && outside.is_empty());
        assert_eq!(inside.crossed_edges(), 0);
        assert_eq!(inside.triangles().count(), 0);
    }

    #[test]
    fn non_finite_corner_is_an_error() {
        let region = GridRegion::cube(1.0, 0.5).unwrap();
        let field = |p: Point| if p.x > 0.0 { Value::NAN } else { 1.0 };
        let err = CellSample::sample(&field, &region, [2, 0, 0]).unwrap_err();
        assert!(matches!(err, MarchingCubesError::NonFiniteField { .. }));
    }
}

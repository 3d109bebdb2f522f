use ndarray::Array3;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    cell::evaluate_finite,
    error::Result,
    region::GridRegion,
    types::{ScalarField, Value},
};

/// Field values at every lattice point of a [`GridRegion`], indexed `[x][y][z]`.
///
/// Sampling the lattice once evaluates each shared corner a single time instead of
/// once per adjacent cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    values: Array3<Value>,
}

impl Lattice {
    /// Evaluates `field` at every lattice point of `region`.
    ///
    /// Work is parallelised over X slices using Rayon.
    pub fn sample<F>(field: &F, region: &GridRegion) -> Result<Self>
    where
        F: ScalarField + Sync + ?Sized,
    {
        let [nx, ny, nz] = region.lattice_counts();

        let slices: Vec<Vec<Value>> = (0..nx)
            .into_par_iter()
            .map(|x| -> Result<Vec<Value>> {
                let mut slice = Vec::with_capacity(ny * nz);
                for y in 0..ny {
                    for z in 0..nz {
                        slice.push(evaluate_finite(field, region.lattice_point(x, y, z))?);
                    }
                }
                Ok(slice)
            })
            .collect::<Result<_>>()?;

        let values = Array3::from_shape_vec((nx, ny, nz), slices.concat())?;
        Ok(Self { values })
    }

    /// Returns the field value at lattice point `(x, y, z)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Value {
        self.values[[x, y, z]]
    }

    /// Lattice dimensions `(x, y, z)`.
    pub fn dim(&self) -> (usize, usize, usize) {
        self.values.dim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::MarchingCubesError, types::Point};

    #[test]
    fn stores_values_at_lattice_points() {
        let region =
            GridRegion::new(Point::new(0.0, 0.0, 0.0), Point::new(2.0, 1.0, 3.0), 1.0).unwrap();
        let field = |p: Point| p.x + 10.0 * p.y + 100.0 * p.z;
        let lattice = Lattice::sample(&field, &region).unwrap();

        assert_eq!(lattice.dim(), (3, 2, 4));
        assert_eq!(lattice.get(0, 0, 0), 0.0);
        assert_eq!(lattice.get(2, 1, 3), 312.0);
        assert_eq!(lattice.get(1, 0, 2), 201.0);
    }

    #[test]
    fn non_finite_value_is_an_error() {
        let region = GridRegion::cube(1.0, 0.5).unwrap();
        let field = |p: Point| if p.y > 0.5 { Value::NAN } else { p.y };
        let err = Lattice::sample(&field, &region).unwrap_err();
        assert!(matches!(err, MarchingCubesError::NonFiniteField { .. }));
    }
}

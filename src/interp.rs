use crate::{
    cell::{CellSample, evaluate_finite},
    error::Result,
    tables::{CORNER_OFFSETS, CORNER_POINT_INDICES},
    types::{Point, ScalarField, Value, Vector},
};

/// Default finite-difference step used to estimate normals, in world units.
pub const DEFAULT_NORMAL_STEP: Value = 1e-3;

/// Gradients shorter than this are treated as vanishing.
const GRADIENT_EPSILON: Value = 1e-12;

/// A surface vertex on a cell edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeVertex {
    pub position: Point,
    /// Unit outward normal, or zero where the field gradient vanishes.
    pub normal: Vector,
}

// Return the weight of `p0` for the zero crossing between values `v0` and `v1`,
// i.e. the surface point is `p0 * t + p1 * (1 - t)`.
pub fn find_t(v0: Value, v1: Value) -> Value {
    if (v1 - v0).abs() <= Value::EPSILON * v0.abs().max(v1.abs()) {
        return 0.5;
    }
    // v1 / (v1 - v0), divided through by the larger value so the difference cannot overflow.
    let t = if v1.abs() >= v0.abs() {
        1.0 / (1.0 - v0 / v1)
    } else {
        let ratio = v1 / v0;
        ratio / (ratio - 1.0)
    };
    t.clamp(0.0, 1.0)
}

/// Returns the two corners of `edge`, lower lattice corner first.
///
/// Neighbouring cells list a shared edge in opposite directions, so fixing the order
/// makes both cells produce the exact same vertex.
#[inline]
fn ordered_corners(edge: usize) -> (usize, usize) {
    let [a, b] = CORNER_POINT_INDICES[edge];
    let weight = |c: usize| CORNER_OFFSETS[c].iter().sum::<usize>();
    if weight(a) <= weight(b) { (a, b) } else { (b, a) }
}

/// Position of the zero crossing along `edge` of a sampled cell.
///
/// The result always lies on the segment between the two corners.
pub fn interpolate_edge(sample: &CellSample, edge: usize) -> Point {
    let (c0, c1) = ordered_corners(edge);
    let t = find_t(sample.values[c0], sample.values[c1]);
    let (p0, p1) = (sample.positions[c0], sample.positions[c1]);
    Point::from(p0.coords * t + p1.coords * (1.0 - t))
}

/// Estimates the outward surface normal at `point` by central differences.
///
/// The field is positive inside, so its gradient points inwards and the normal is
/// the negated, normalised gradient. Returns the zero vector when the gradient is
/// too small to normalise.
pub fn estimate_normal<F>(field: &F, point: Point, step: Value) -> Result<Vector>
where
    F: ScalarField + ?Sized,
{
    let mut gradient = Vector::zeros();
    for axis in 0..3 {
        let offset = Vector::ith(axis, step);
        gradient[axis] =
            evaluate_finite(field, point + offset)? - evaluate_finite(field, point - offset)?;
    }

    match (-gradient).try_normalize(GRADIENT_EPSILON) {
        Some(normal) => Ok(normal),
        None => {
            tracing::trace!(?point, "vanishing field gradient, using zero normal");
            Ok(Vector::zeros())
        }
    }
}

/// Interpolates the vertex on `edge` and estimates its normal.
pub fn interpolate_vertex<F>(
    field: &F,
    sample: &CellSample,
    edge: usize,
    normal_step: Value,
) -> Result<EdgeVertex>
where
    F: ScalarField + ?Sized,
{
    let position = interpolate_edge(sample, edge);
    let normal = estimate_normal(field, position, normal_step)?;
    Ok(EdgeVertex { position, normal })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{error::MarchingCubesError, region::GridRegion};

    #[test]
    fn t_weights_the_first_corner() {
        assert_eq!(find_t(1.0, -1.0), 0.5);
        // Zero at v1 puts the vertex on p1.
        assert_eq!(find_t(1.0, 0.0), 0.0);
        assert_eq!(find_t(0.0, 1.0), 1.0);
        assert_abs_diff_eq!(find_t(3.0, -1.0), 0.25);
    }

    #[test]
    fn t_survives_huge_values() {
        assert_eq!(find_t(3e38, -3e38), 0.5);
        assert_abs_diff_eq!(find_t(3e38, -1e38), 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(find_t(-1e38, 3e38), 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(find_t(-Value::MAX, Value::MAX / 3.0), 0.25, epsilon = 1e-6);
    }

    #[test]
    fn degenerate_t_is_clamped() {
        assert_eq!(find_t(0.0, 0.0), 0.5);
        assert_eq!(find_t(1.0, 1.0), 0.5);
        // Same sign on both ends would leave the segment.
        assert_eq!(find_t(1.0, 2.0), 1.0);
        assert_eq!(find_t(2.0, 1.0), 0.0);
    }

    #[test]
    fn vertex_lands_on_the_zero_crossing() {
        let region = GridRegion::cube(1.0, 1.0).unwrap();
        let field = |p: Point| 0.3 - p.x;
        let sample = CellSample::sample(&field, &region, [1, 0, 0]).unwrap();

        // Edge 0 runs along +X from corner 0.
        let p = interpolate_edge(&sample, 0);
        assert_abs_diff_eq!(p.x, 0.3, epsilon = 1e-6);
        assert_eq!((p.y, p.z), (-1.0, -1.0));
        assert_abs_diff_eq!(field(p), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn shared_edge_vertex_is_bit_identical() {
        let region = GridRegion::cube(1.0, 0.5).unwrap();
        let field = |p: Point| 0.37 - p.x + 0.1 * p.y;
        let below = CellSample::sample(&field, &region, [2, 1, 1]).unwrap();
        let above = CellSample::sample(&field, &region, [2, 2, 1]).unwrap();

        // Edge 2 of the lower cell (corner 2 -> 3) is edge 0 of the upper cell (corner 0 -> 1).
        assert_eq!(interpolate_edge(&below, 2), interpolate_edge(&above, 0));
    }

    #[test]
    fn normal_points_away_from_inside() {
        let sphere = |p: Point| 1.0 - p.coords.norm();
        let n = estimate_normal(&sphere, Point::new(1.0, 0.0, 0.0), DEFAULT_NORMAL_STEP).unwrap();
        assert_abs_diff_eq!(n.x, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(n.norm(), 1.0, epsilon = 1e-5);

        let n = estimate_normal(&sphere, Point::new(0.0, -0.6, 0.8), DEFAULT_NORMAL_STEP).unwrap();
        assert_abs_diff_eq!(n.y, -0.6, epsilon = 1e-3);
        assert_abs_diff_eq!(n.z, 0.8, epsilon = 1e-3);
    }

    #[test]
    fn flat_field_gives_zero_normal() {
        let flat = |_: Point| -> Value { 0.0 };
        let n = estimate_normal(&flat, Point::origin(), DEFAULT_NORMAL_STEP).unwrap();
        assert_eq!(n, Vector::zeros());
    }

    #[test]
    fn non_finite_normal_sample_is_an_error() {
        let field = |p: Point| if p.z > 0.0 { Value::INFINITY } else { -p.x };
        let err = estimate_normal(&field, Point::origin(), DEFAULT_NORMAL_STEP).unwrap_err();
        assert!(matches!(err, MarchingCubesError::NonFiniteField { .. }));
    }
}

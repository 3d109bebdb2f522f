use nalgebra::{Point3, Vector3};

/// Scalar field value at a point in space.
pub type Value = f32;

/// A 3D point with [`Value`] components.
pub type Point = Point3<Value>;

/// A 3D vector with [`Value`] components.
pub type Vector = Vector3<Value>;

/// A scalar field: maps a [`Point`] to a signed [`Value`].
///
/// Values **strictly above** zero are "inside" the surface, zero and below are outside.
/// The field must be finite everywhere it is queried, which includes a small margin
/// around the grid region for normal estimation.
///
/// Any `Fn(Point) -> Value` closure is a scalar field:
///
/// ```rust
/// use metaball_mesher::types::{Point, ScalarField};
///
/// let sphere = |p: Point| 1.0 - p.coords.norm();
/// assert_eq!(sphere.evaluate(Point::origin()), 1.0);
/// ```
pub trait ScalarField {
    fn evaluate(&self, point: Point) -> Value;
}

impl<F> ScalarField for F
where
    F: Fn(Point) -> Value,
{
    #[inline]
    fn evaluate(&self, point: Point) -> Value {
        self(point)
    }
}

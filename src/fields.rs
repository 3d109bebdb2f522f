//! Ready-made scalar fields, positive inside.

use crate::types::{Point, ScalarField, Value, Vector};

/// A ball: `radius - |p - center|`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Point,
    pub radius: Value,
}

impl Sphere {
    pub fn new(center: Point, radius: Value) -> Self {
        Self { center, radius }
    }
}

impl ScalarField for Sphere {
    fn evaluate(&self, point: Point) -> Value {
        self.radius - (point - self.center).norm()
    }
}

/// A half-space: `offset - normal . p`, positive on the side opposite `normal`.
///
/// Linear along every cell edge, so interpolated vertices land exactly on the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector,
    pub offset: Value,
}

impl Plane {
    pub fn new(normal: Vector, offset: Value) -> Self {
        Self { normal, offset }
    }
}

impl ScalarField for Plane {
    fn evaluate(&self, point: Point) -> Value {
        self.offset - self.normal.dot(&point.coords)
    }
}

/// One charge of a [`MetaBalls`] field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetaBall {
    pub center: Point,
    pub radius: Value,
}

impl MetaBall {
    pub fn new(center: Point, radius: Value) -> Self {
        Self { center, radius }
    }
}

/// Metaball blobs: `sum(r_i^2 / |p - c_i|^2) - threshold`.
///
/// A lone ball with the default threshold of `1.0` is exactly a sphere of radius `r`.
/// The squared distance is floored at [`Value::EPSILON`] so the field stays finite
/// at a ball's centre. Move the balls between extraction passes to animate them.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaBalls {
    pub balls: Vec<MetaBall>,
    pub threshold: Value,
}

impl Default for MetaBalls {
    fn default() -> Self {
        Self {
            balls: Vec::new(),
            threshold: 1.0,
        }
    }
}

impl MetaBalls {
    pub fn new(balls: Vec<MetaBall>) -> Self {
        Self {
            balls,
            ..Default::default()
        }
    }

    /// Sets the level at which the blobs' surface is drawn.
    pub fn with_threshold(mut self, threshold: Value) -> Self {
        self.threshold = threshold;
        self
    }
}

impl ScalarField for MetaBalls {
    fn evaluate(&self, point: Point) -> Value {
        let charge: Value = self
            .balls
            .iter()
            .map(|ball| {
                let distance_sq = (point - ball.center).norm_squared().max(Value::EPSILON);
                ball.radius * ball.radius / distance_sq
            })
            .sum();
        charge - self.threshold
    }
}

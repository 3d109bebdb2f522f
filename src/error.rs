use derive_more::{Display, From};
use ndarray::ShapeError;

use crate::types::{Point, Value};

pub type Result<T> = core::result::Result<T, MarchingCubesError>;

#[derive(Debug, Display, From)]
pub enum MarchingCubesError {
    /// Cell edge length is zero, negative or not finite.
    #[display("cell size must be positive and finite, got {_0}")]
    InvalidCellSize(Value),

    /// Half-extent of a cubic region is zero, negative or not finite.
    #[display("grid extent must be positive and finite, got {_0}")]
    InvalidExtent(Value),

    /// Region corners are not finite, or `max <= min` on some axis.
    #[display("invalid grid bounds: min {min:?}, max {max:?}")]
    InvalidBounds { min: Point, max: Point },

    /// The region holds more cells than can be indexed or stored.
    #[display("grid {min:?}..{max:?} with cell size {cell_size} has too many cells")]
    GridTooLarge {
        min: Point,
        max: Point,
        cell_size: Value,
    },

    /// Finite-difference step for normals is zero, negative or not finite.
    #[display("normal step must be positive and finite, got {_0}")]
    InvalidNormalStep(Value),

    /// The scalar field returned NaN or an infinity.
    #[display("scalar field returned {value} at {point:?}")]
    NonFiniteField { point: Point, value: Value },

    /// More vertices than a `u32` index can address.
    #[display("vertex count exceeds the u32 index range")]
    IndexOverflow,

    #[from]
    #[display("lattice shape mismatch: {_0}")]
    LatticeShape(ShapeError),
}

impl std::error::Error for MarchingCubesError {}

use thiserror::Error;

/// Custom error type for the linarust framework.
///
/// Only precondition violations are reported through this type. Numerical
/// failures of individual batch elements (singular pivots, matrices that are
/// not positive definite, Jacobi sweeps that do not converge) are reported per
/// element through [`Status`](crate::status::Status) values instead.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum LinaRustError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Operation {operation} requires square matrices, got shape {shape:?}")]
    NotSquare { shape: Vec<usize>, operation: String },

    #[error("Operation {operation} requires at least {min_rank} dimensions, got shape {shape:?}")]
    RankTooLow {
        shape: Vec<usize>,
        min_rank: usize,
        operation: String,
    },

    #[error("Incompatible shapes for operation {operation}: {shape1:?} and {shape2:?}")]
    IncompatibleShapes {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
        operation: String,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Axis {axis} is out of bounds for a tensor of rank {rank}")]
    AxisOutOfBounds { axis: isize, rank: usize },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

//! Batched dense linear algebra over real and complex tensors.
//!
//! Every operation treats the trailing two axes of its operands as a matrix
//! and maps over all leading axes. Numerical failures (singular or
//! non-positive-definite elements, non-convergence) are reported per batch
//! element through an `info` tensor of [`Status`] values, while shape errors
//! are returned as [`LinaRustError`].

pub mod autograd;
pub mod batch;
pub mod error;
pub mod ops;
pub mod scalar;
pub mod status;
pub mod tensor;
pub mod types;
pub mod utils;

pub use batch::BatchConfig;
pub use error::LinaRustError;
pub use ops::linalg::{
    cho_factor, cho_solve, cholesky, det, eigh, inv, lu, lu_factor, lu_factor_unpivoted, lu_solve, qr, solve,
    solve_triangular, svd, tril, triu, ChoFactor, CholeskyResult, EighResult, LuFactorResult, LuResult, QrMode,
    QrResult, Solution, SvdResult, Trans,
};
pub use scalar::{RealScalar, Scalar};
pub use status::Status;
pub use tensor::Tensor;
pub use types::DType;

// Re-export the element crates used in public signatures.
pub use num_complex;
pub use num_traits;

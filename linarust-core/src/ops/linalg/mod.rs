// src/ops/linalg/mod.rs

pub mod cholesky;
pub mod eigh;
pub mod lu;
pub mod matmul;
pub mod matrix;
pub mod qr;
pub mod solve;
pub mod svd;
pub mod transpose;
pub mod triangular;

pub use cholesky::{cho_factor, cho_solve, cholesky, ChoFactor, CholeskyResult};
pub use eigh::{eigh, EighResult};
pub use lu::{lu, lu_factor, lu_factor_unpivoted, lu_solve, LuFactorResult, LuResult};
pub use matmul::matmul_op;
pub use qr::{qr, QrMode, QrResult};
pub use solve::{det, inv, solve, Solution};
pub use svd::{svd, SvdResult};
pub use transpose::{adjoint_op, transpose_op};
pub use triangular::{solve_triangular, tril, triu, Trans};

use crate::batch::{stack_matrices, stack_vectors, BatchView};
use crate::error::LinaRustError;
use crate::scalar::Scalar;
use crate::status::Status;
use crate::tensor::Tensor;
use matrix::Mat;

/// Right-hand side of a batched solve: either a vector or a matrix per element.
///
/// `b` is treated as a batch of vectors when it has exactly one axis fewer
/// than the coefficient matrices, and as a batch of matrices otherwise.
pub(crate) struct RhsLayout<'a, T> {
    view: BatchView<'a, T>,
    is_vector: bool,
    rows: usize,
    nrhs: usize,
}

impl<'a, T: Scalar> RhsLayout<'a, T> {
    pub(crate) fn new(
        a: &BatchView<'_, T>,
        b: &'a Tensor<T>,
        operation: &str,
    ) -> Result<Self, LinaRustError> {
        let a_rank = a.batch_shape().len() + 2;
        let is_vector = b.rank() + 1 == a_rank;
        let view = if is_vector {
            BatchView::vectors(b, operation)?
        } else {
            BatchView::matrices(b, operation)?
        };
        a.ensure_same_batch(&view, operation)?;
        let rows = view.rows();
        if rows != a.rows() {
            return Err(LinaRustError::ShapeMismatch {
                expected: vec![a.rows()],
                actual: vec![rows],
                operation: format!("{} (rhs rows)", operation),
            });
        }
        let nrhs = if is_vector { 1 } else { view.cols() };
        Ok(RhsLayout {
            view,
            is_vector,
            rows,
            nrhs,
        })
    }

    pub(crate) fn element_bytes(&self) -> usize {
        self.view.element_bytes()
    }

    /// Element `i` as a `rows × nrhs` matrix.
    pub(crate) fn get(&self, i: usize) -> Mat<T> {
        Mat::from_vec(self.rows, self.nrhs, self.view.get(i).to_vec())
    }

    /// Stacks solutions back into the layout of `b`.
    pub(crate) fn assemble(&self, solutions: Vec<Mat<T>>) -> Result<Tensor<T>, LinaRustError> {
        if self.is_vector {
            stack_vectors(
                self.view.batch_shape(),
                self.rows,
                solutions.into_iter().map(Mat::into_vec).collect(),
            )
        } else {
            stack_matrices(self.view.batch_shape(), self.rows, self.nrhs, solutions)
        }
    }

    pub(crate) fn nan(&self) -> Mat<T> {
        Mat::nan(self.rows, self.nrhs)
    }
}

/// Splits per-element kernel outcomes into values and statuses, substituting
/// `fallback` for failed elements.
pub(crate) fn split_outcomes<O>(
    outcomes: Vec<Result<O, Status>>,
    fallback: impl Fn() -> O,
) -> (Vec<O>, Vec<Status>) {
    let mut values = Vec::with_capacity(outcomes.len());
    let mut statuses = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(v) => {
                values.push(v);
                statuses.push(Status::Success);
            }
            Err(status) => {
                values.push(fallback());
                statuses.push(status);
            }
        }
    }
    (values, statuses)
}

/// Logs a warning when some batch elements failed.
pub(crate) fn report_failures(operation: &str, statuses: &[Status]) {
    let failed = statuses.iter().filter(|s| !s.is_success()).count();
    if failed > 0 {
        if let Some(first) = statuses.iter().find(|s| !s.is_success()) {
            log::warn!(
                "{}: {} of {} batch elements failed (first: {})",
                operation,
                failed,
                statuses.len(),
                first
            );
        }
    }
}

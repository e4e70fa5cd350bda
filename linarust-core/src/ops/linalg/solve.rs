use super::cholesky::{cho_solve_kernel, cholesky_kernel};
use super::lu::{lu_kernel, lu_solve_kernel};
use super::matrix::{Mat, MatRef};
use super::triangular::Trans;
use super::{report_failures, split_outcomes, RhsLayout};
use crate::batch::{map_batch, stack_matrices, stack_values, try_map_batch, BatchConfig, BatchView};
use crate::error::LinaRustError;
use crate::scalar::Scalar;
use crate::status::Status;
use crate::tensor::Tensor;
use log::debug;

/// Result of [`solve`] and [`inv`].
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<T> {
    /// Same layout as the right-hand side; NaN for failed elements.
    pub x: Tensor<T>,
    pub info: Tensor<Status>,
}

/// Solves `A·X = B` for one element, through Cholesky when `sym_pos` is set
/// and through pivoted LU otherwise.
pub(crate) fn solve_kernel<T: Scalar>(a: MatRef<'_, T>, b: &Mat<T>, sym_pos: bool, lower: bool) -> Result<Mat<T>, Status> {
    if sym_pos {
        let l = cholesky_kernel(a, lower)?;
        let mut x = b.clone();
        cho_solve_kernel(l.as_ref(), true, &mut x);
        return Ok(x);
    }
    let parts = lu_kernel(a, true);
    if !parts.status.is_success() {
        return Err(parts.status);
    }
    Ok(lu_solve_kernel(parts.lu.as_ref(), &parts.perm, b, Trans::N))
}

/// Determinant of one square matrix from its LU factorization.
pub(crate) fn det_kernel<T: Scalar>(a: MatRef<'_, T>) -> T {
    let parts = lu_kernel(a, true);
    parts
        .lu
        .diag()
        .into_iter()
        .fold(parts.parity(), |acc, d| acc * d)
}

/// Solves `A·x = b` for a batch of square matrices.
///
/// `b` is a batch of vectors when it has one axis fewer than `a`, and a batch
/// of matrices otherwise; batch dimensions must match exactly. With `sym_pos`
/// the `lower` (or upper) triangle of `a` is treated as Hermitian positive
/// definite and a Cholesky solve is used. Singular or non-positive-definite
/// elements get a NaN solution and a non-success status.
pub fn solve<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>, sym_pos: bool, lower: bool) -> Result<Solution<T>, LinaRustError> {
    let view = BatchView::square_matrices(a, "solve")?;
    let rhs = RhsLayout::new(&view, b, "solve")?;
    debug!(
        "solve: batch={} n={} dtype={:?} sym_pos={} lower={}",
        view.len(),
        view.rows(),
        T::DTYPE,
        sym_pos,
        lower
    );
    let outcomes = try_map_batch(
        view.len(),
        view.element_bytes() + rhs.element_bytes(),
        BatchConfig::global(),
        |i| solve_kernel(view.matrix(i), &rhs.get(i), sym_pos, lower),
    );
    let (solutions, statuses) = split_outcomes(outcomes, || rhs.nan());
    report_failures("solve", &statuses);
    Ok(Solution {
        x: rhs.assemble(solutions)?,
        info: stack_values(view.batch_shape(), statuses)?,
    })
}

/// Determinant of a batch of square matrices, shape `[..batch]`.
///
/// Computed as the signed product of the LU pivots, so singular matrices give
/// zero (or the rounded product). A `0 × 0` matrix has determinant one.
pub fn det<T: Scalar>(a: &Tensor<T>) -> Result<Tensor<T>, LinaRustError> {
    let view = BatchView::square_matrices(a, "det")?;
    debug!("det: batch={} n={} dtype={:?}", view.len(), view.rows(), T::DTYPE);
    let values = map_batch(view.len(), view.element_bytes(), BatchConfig::global(), |i| {
        det_kernel(view.matrix(i))
    });
    stack_values(view.batch_shape(), values)
}

/// Inverse of a batch of square matrices, by solving against the identity.
pub fn inv<T: Scalar>(a: &Tensor<T>) -> Result<Solution<T>, LinaRustError> {
    let view = BatchView::square_matrices(a, "inv")?;
    let n = view.rows();
    debug!("inv: batch={} n={} dtype={:?}", view.len(), n, T::DTYPE);
    let identity = Mat::identity(n);
    let outcomes = try_map_batch(view.len(), 2 * view.element_bytes(), BatchConfig::global(), |i| {
        solve_kernel(view.matrix(i), &identity, false, false)
    });
    let (inverses, statuses) = split_outcomes(outcomes, || Mat::nan(n, n));
    report_failures("inv", &statuses);
    Ok(Solution {
        x: stack_matrices(view.batch_shape(), n, n, inverses)?,
        info: stack_values(view.batch_shape(), statuses)?,
    })
}

#[cfg(test)]
#[path = "solve_test.rs"]
mod tests;

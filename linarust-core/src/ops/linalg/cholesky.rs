use super::matrix::{Mat, MatRef};
use super::triangular::{solve_triangular_in_place, Trans};
use super::{report_failures, split_outcomes, RhsLayout};
use crate::batch::{map_batch, stack_matrices, stack_values, try_map_batch, BatchConfig, BatchView};
use crate::error::LinaRustError;
use crate::scalar::Scalar;
use crate::status::Status;
use crate::tensor::Tensor;
use log::debug;
use num_traits::{Float, Zero};

/// Output of [`cholesky`].
#[derive(Debug, Clone, PartialEq)]
pub struct CholeskyResult<T> {
    /// `L` with `L·Lᴴ = A` (or `U` with `Uᴴ·U = A`); the other triangle is zero.
    pub factor: Tensor<T>,
    /// One status per batch element.
    pub info: Tensor<Status>,
}

/// A Cholesky factor tagged with the triangle that holds it.
///
/// Only the flagged triangle of `c` is meaningful; the other one keeps
/// whatever the input had there and is never read by [`cho_solve`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChoFactor<T> {
    pub c: Tensor<T>,
    pub lower: bool,
}

/// Lower Cholesky factor of the Hermitian matrix whose `lower` (or upper)
/// triangle is stored in `a`.
pub(crate) fn cholesky_kernel<T: Scalar>(a: MatRef<'_, T>, lower: bool) -> Result<Mat<T>, Status> {
    let n = a.rows();
    let entry = |i: usize, j: usize| if lower { a[(i, j)] } else { a[(j, i)].conj() };
    let mut l: Mat<T> = Mat::zeros(n, n);
    for j in 0..n {
        let mut d = entry(j, j).re();
        for k in 0..j {
            d = d - l[(j, k)].modulus_sq();
        }
        if !(d > T::Real::zero()) {
            return Err(Status::NotPositiveDefinite { order: j + 1 });
        }
        let ljj = d.sqrt();
        l[(j, j)] = T::from_re(ljj);
        let inv = ljj.recip();
        for i in j + 1..n {
            let mut acc = entry(i, j);
            for k in 0..j {
                acc -= l[(i, k)] * l[(j, k)].conj();
            }
            l[(i, j)] = acc.scale(inv);
        }
    }
    Ok(l)
}

/// Cholesky factorization of a batch of Hermitian positive-definite matrices.
///
/// With `lower` the lower triangle of `a` is read and `L` is returned,
/// otherwise the upper triangle is read and `U = Lᴴ` is returned. Elements
/// that are not positive definite get `Status::NotPositiveDefinite` and a
/// NaN factor; the rest of the batch is unaffected.
pub fn cholesky<T: Scalar>(a: &Tensor<T>, lower: bool) -> Result<CholeskyResult<T>, LinaRustError> {
    let view = BatchView::square_matrices(a, "cholesky")?;
    let n = view.rows();
    debug!(
        "cholesky: batch={} n={} dtype={:?} lower={}",
        view.len(),
        n,
        T::DTYPE,
        lower
    );
    let outcomes = try_map_batch(view.len(), view.element_bytes(), BatchConfig::global(), |i| {
        cholesky_kernel(view.matrix(i), lower).map(|l| if lower { l } else { l.adjoint() })
    });
    let (factors, statuses) = split_outcomes(outcomes, || Mat::nan(n, n));
    report_failures("cholesky", &statuses);
    Ok(CholeskyResult {
        factor: stack_matrices(view.batch_shape(), n, n, factors)?,
        info: stack_values(view.batch_shape(), statuses)?,
    })
}

/// Cholesky factorization in the packed form consumed by [`cho_solve`].
///
/// The factor is written over the `lower` (or upper) triangle of a copy of
/// `a`; the opposite triangle keeps the input entries.
pub fn cho_factor<T: Scalar>(a: &Tensor<T>, lower: bool) -> Result<(ChoFactor<T>, Tensor<Status>), LinaRustError> {
    let view = BatchView::square_matrices(a, "cho_factor")?;
    let n = view.rows();
    debug!("cho_factor: batch={} n={} lower={}", view.len(), n, lower);
    let outcomes = try_map_batch(view.len(), view.element_bytes(), BatchConfig::global(), |i| {
        let input = view.matrix(i);
        cholesky_kernel(input, lower).map(|l| {
            let mut packed = input.to_owned();
            for r in 0..n {
                for c in 0..=r {
                    if lower {
                        packed[(r, c)] = l[(r, c)];
                    } else {
                        packed[(c, r)] = l[(r, c)].conj();
                    }
                }
            }
            packed
        })
    });
    let (packed, statuses) = split_outcomes(outcomes, || Mat::nan(n, n));
    report_failures("cho_factor", &statuses);
    Ok((
        ChoFactor {
            c: stack_matrices(view.batch_shape(), n, n, packed)?,
            lower,
        },
        stack_values(view.batch_shape(), statuses)?,
    ))
}

/// Solves `A·X = B` with two triangular substitutions against a factor from
/// [`cho_factor`].
pub(crate) fn cho_solve_kernel<T: Scalar>(c: MatRef<'_, T>, lower: bool, b: &mut Mat<T>) {
    if lower {
        solve_triangular_in_place(c, b, Trans::N, true, false);
        solve_triangular_in_place(c, b, Trans::C, true, false);
    } else {
        solve_triangular_in_place(c, b, Trans::C, false, false);
        solve_triangular_in_place(c, b, Trans::N, false, false);
    }
}

/// Solves `A·x = b` given the Cholesky factor of `A`.
///
/// `b` may be a vector batch (one axis fewer than the factor) or a matrix
/// batch; its batch dimensions must match the factor's.
pub fn cho_solve<T: Scalar>(factor: &ChoFactor<T>, b: &Tensor<T>) -> Result<Tensor<T>, LinaRustError> {
    let view = BatchView::square_matrices(&factor.c, "cho_solve")?;
    let rhs = RhsLayout::new(&view, b, "cho_solve")?;
    debug!("cho_solve: batch={} n={}", view.len(), view.rows());
    let lower = factor.lower;
    let solutions = map_batch(
        view.len(),
        view.element_bytes() + rhs.element_bytes(),
        BatchConfig::global(),
        |i| {
            let mut x = rhs.get(i);
            cho_solve_kernel(view.matrix(i), lower, &mut x);
            x
        },
    );
    rhs.assemble(solutions)
}

#[cfg(test)]
#[path = "cholesky_test.rs"]
mod tests;

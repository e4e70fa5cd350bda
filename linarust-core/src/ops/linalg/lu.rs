use super::matrix::{Mat, MatRef};
use super::triangular::{solve_triangular_in_place, Trans};
use super::RhsLayout;
use crate::batch::{map_batch, stack_matrices, stack_values, stack_vectors, BatchConfig, BatchView};
use crate::error::LinaRustError;
use crate::scalar::{argmax_modulus, Scalar};
use crate::status::Status;
use crate::tensor::Tensor;
use log::debug;

/// Output of [`lu_factor`].
#[derive(Debug, Clone, PartialEq)]
pub struct LuFactorResult<T> {
    /// `L` (unit diagonal implied) below the diagonal and `U` on and above it.
    pub lu: Tensor<T>,
    /// Row `i` was swapped with row `pivots[i]` at step `i` (0-based), shape `[..batch, min(m, n)]`.
    pub pivots: Tensor<usize>,
    /// The composed permutation, `(P·A)[i] = A[permutation[i]]`, shape `[..batch, m]`.
    pub permutation: Tensor<usize>,
    pub info: Tensor<Status>,
}

/// Output of [`lu`]: `A = p·l·u`.
#[derive(Debug, Clone, PartialEq)]
pub struct LuResult<T> {
    /// Permutation matrix, absent when it was folded into `l`.
    pub p: Option<Tensor<T>>,
    pub l: Tensor<T>,
    pub u: Tensor<T>,
    pub info: Tensor<Status>,
}

/// Per-element packed LU with its row interchanges.
#[derive(Debug, Clone)]
pub(crate) struct LuParts<T> {
    pub(crate) lu: Mat<T>,
    pub(crate) pivots: Vec<usize>,
    pub(crate) perm: Vec<usize>,
    pub(crate) status: Status,
}

impl<T: Scalar> LuParts<T> {
    /// Sign of the row permutation.
    pub(crate) fn parity(&self) -> T {
        let swaps = self.pivots.iter().enumerate().filter(|&(i, &p)| i != p).count();
        if swaps % 2 == 0 {
            T::one()
        } else {
            -T::one()
        }
    }
}

/// Gaussian elimination on a copy of `a`.
///
/// With `pivoting` the pivot is the first row of maximal modulus in the active
/// column; without it the diagonal is used as is and the permutation stays
/// the identity. An exactly zero pivot is recorded as `ZeroPivot` (first
/// occurrence only) and elimination continues with the next column.
pub(crate) fn lu_kernel<T: Scalar>(a: MatRef<'_, T>, pivoting: bool) -> LuParts<T> {
    let (m, n) = (a.rows(), a.cols());
    let k = m.min(n);
    let mut lu = a.to_owned();
    let mut pivots = Vec::with_capacity(k);
    let mut perm: Vec<usize> = (0..m).collect();
    let mut status = Status::Success;
    for j in 0..k {
        let p = if pivoting {
            j + argmax_modulus((j..m).map(|i| lu[(i, j)])).unwrap_or(0)
        } else {
            j
        };
        pivots.push(p);
        if p != j {
            lu.swap_rows(j, p);
            perm.swap(j, p);
        }
        let pivot = lu[(j, j)];
        if pivot == T::zero() {
            if status.is_success() {
                status = Status::ZeroPivot { index: j };
            }
            continue;
        }
        for i in j + 1..m {
            let factor = lu[(i, j)] / pivot;
            lu[(i, j)] = factor;
            if factor == T::zero() {
                continue;
            }
            for c in j + 1..n {
                let u = lu[(j, c)];
                lu[(i, c)] -= factor * u;
            }
        }
    }
    LuParts {
        lu,
        pivots,
        perm,
        status,
    }
}

/// Solves `op(A)·X = B` for square `A` from its packed LU and permutation.
pub(crate) fn lu_solve_kernel<T: Scalar>(lu: MatRef<'_, T>, perm: &[usize], b: &Mat<T>, trans: Trans) -> Mat<T> {
    match trans {
        Trans::N => {
            // P·A = L·U  =>  A·x = b  <=>  L·U·x = P·b
            let mut x = b.permute_rows(perm);
            solve_triangular_in_place(lu, &mut x, Trans::N, true, true);
            solve_triangular_in_place(lu, &mut x, Trans::N, false, false);
            x
        }
        Trans::T | Trans::C => {
            // op(A) = op(U)·op(L)·P
            let mut x = b.clone();
            solve_triangular_in_place(lu, &mut x, trans, false, false);
            solve_triangular_in_place(lu, &mut x, trans, true, true);
            x.unpermute_rows(perm)
        }
    }
}

/// LU factorization with partial pivoting, LAPACK `getrf` layout.
///
/// Rectangular inputs are accepted; pivoting runs over `min(m, n)` columns.
/// An exactly zero pivot does not stop the factorization but is reported as
/// `Status::ZeroPivot` for that element.
pub fn lu_factor<T: Scalar>(a: &Tensor<T>) -> Result<LuFactorResult<T>, LinaRustError> {
    factor_batch(a, true, "lu_factor")
}

/// LU factorization without row interchanges, `A = L·U`.
///
/// Same layout as [`lu_factor`] with `pivots[i] = i` and an identity
/// `permutation`, so the result feeds [`lu_solve`] and the LU rules
/// unchanged. Only stable for inputs that need no pivoting, e.g. diagonally
/// dominant or positive definite ones; a zero leading minor is reported as
/// `Status::ZeroPivot`.
pub fn lu_factor_unpivoted<T: Scalar>(a: &Tensor<T>) -> Result<LuFactorResult<T>, LinaRustError> {
    factor_batch(a, false, "lu_factor_unpivoted")
}

fn factor_batch<T: Scalar>(a: &Tensor<T>, pivoting: bool, operation: &str) -> Result<LuFactorResult<T>, LinaRustError> {
    let view = BatchView::matrices(a, operation)?;
    let (m, n) = (view.rows(), view.cols());
    debug!("{}: batch={} shape=[{}, {}] dtype={:?}", operation, view.len(), m, n, T::DTYPE);
    let parts = map_batch(view.len(), view.element_bytes(), BatchConfig::global(), |i| {
        lu_kernel(view.matrix(i), pivoting)
    });
    let statuses: Vec<Status> = parts.iter().map(|p| p.status).collect();
    super::report_failures(operation, &statuses);
    let mut lus = Vec::with_capacity(parts.len());
    let mut pivots = Vec::with_capacity(parts.len());
    let mut perms = Vec::with_capacity(parts.len());
    for p in parts {
        lus.push(p.lu);
        pivots.push(p.pivots);
        perms.push(p.perm);
    }
    let batch_shape = view.batch_shape();
    Ok(LuFactorResult {
        lu: stack_matrices(batch_shape, m, n, lus)?,
        pivots: stack_vectors(batch_shape, m.min(n), pivots)?,
        permutation: stack_vectors(batch_shape, m, perms)?,
        info: stack_values(batch_shape, statuses)?,
    })
}

/// LU decomposition `A = p·l·u` with `l` unit lower `m × k` and `u` upper
/// `k × n`, `k = min(m, n)`. With `permute_l` the permutation is applied to
/// `l` and `p` is omitted.
pub fn lu<T: Scalar>(a: &Tensor<T>, permute_l: bool) -> Result<LuResult<T>, LinaRustError> {
    let view = BatchView::matrices(a, "lu")?;
    let (m, n) = (view.rows(), view.cols());
    let k = m.min(n);
    debug!("lu: batch={} shape=[{}, {}] permute_l={}", view.len(), m, n, permute_l);
    let parts = map_batch(view.len(), view.element_bytes(), BatchConfig::global(), |i| {
        let parts = lu_kernel(view.matrix(i), true);
        let l = parts.lu.unit_lower();
        let u = parts.lu.upper();
        let (p, l) = if permute_l {
            (None, l.unpermute_rows(&parts.perm))
        } else {
            (Some(Mat::permutation(&parts.perm).transpose()), l)
        };
        (p, l, u, parts.status)
    });
    let mut ps = Vec::with_capacity(parts.len());
    let mut ls = Vec::with_capacity(parts.len());
    let mut us = Vec::with_capacity(parts.len());
    let mut statuses = Vec::with_capacity(parts.len());
    for (p, l, u, s) in parts {
        if let Some(p) = p {
            ps.push(p);
        }
        ls.push(l);
        us.push(u);
        statuses.push(s);
    }
    super::report_failures("lu", &statuses);
    let batch_shape = view.batch_shape();
    Ok(LuResult {
        p: if permute_l {
            None
        } else {
            Some(stack_matrices(batch_shape, m, m, ps)?)
        },
        l: stack_matrices(batch_shape, m, k, ls)?,
        u: stack_matrices(batch_shape, k, n, us)?,
        info: stack_values(batch_shape, statuses)?,
    })
}

/// Solves `op(A)·x = b` from a previous [`lu_factor`] of square `A`.
pub fn lu_solve<T: Scalar>(factor: &LuFactorResult<T>, b: &Tensor<T>, trans: Trans) -> Result<Tensor<T>, LinaRustError> {
    let view = BatchView::square_matrices(&factor.lu, "lu_solve")?;
    let perms = BatchView::vectors(&factor.permutation, "lu_solve")?;
    view.ensure_same_batch(&perms, "lu_solve")?;
    let rhs = RhsLayout::new(&view, b, "lu_solve")?;
    debug!("lu_solve: batch={} n={} trans={:?}", view.len(), view.rows(), trans);
    let solutions = map_batch(
        view.len(),
        view.element_bytes() + rhs.element_bytes(),
        BatchConfig::global(),
        |i| lu_solve_kernel(view.matrix(i), perms.get(i), &rhs.get(i), trans),
    );
    rhs.assemble(solutions)
}

#[cfg(test)]
#[path = "lu_test.rs"]
mod tests;

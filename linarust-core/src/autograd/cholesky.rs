use super::{expect_core, matrix_views};
use crate::batch::{map_batch, stack_matrices, BatchConfig};
use crate::error::LinaRustError;
use crate::ops::linalg::matrix::Mat;
use crate::ops::linalg::triangular::{tri_solve, tri_solve_right, Trans};
use crate::scalar::Scalar;
use crate::tensor::Tensor;
use log::debug;

/// `δL = L·Φ(L⁻¹·sym(δA)·L⁻ᴴ)` for a lower factor `L`.
pub(crate) fn cholesky_jvp_kernel<T: Scalar>(l: &Mat<T>, da: &Mat<T>) -> Mat<T> {
    let s = da.hermitian_part();
    let x = tri_solve_right(&tri_solve(l, &s, Trans::N, true, false), l, true, true, false);
    l.matmul(&x.tril_half_diag())
}

/// `Ā = sym(L⁻ᴴ·Φ(Lᴴ·tril(L̄))·L⁻¹)` for a lower factor `L`.
pub(crate) fn cholesky_vjp_kernel<T: Scalar>(l: &Mat<T>, l_bar: &Mat<T>) -> Mat<T> {
    let m = l.adjoint_matmul(&l_bar.tril(0)).tril_half_diag();
    let p = tri_solve_right(&tri_solve(l, &m, Trans::C, true, false), l, false, true, false);
    p.hermitian_part()
}

fn as_lower<T: Scalar>(factor: Mat<T>, lower: bool) -> Mat<T> {
    if lower {
        factor
    } else {
        factor.adjoint()
    }
}

/// Tangent of [`cholesky`](crate::ops::linalg::cholesky) output `factor`
/// (`L`, or `U` when `lower` is false) for an input tangent `da`.
pub fn cholesky_jvp<T: Scalar>(factor: &Tensor<T>, da: &Tensor<T>, lower: bool) -> Result<Tensor<T>, LinaRustError> {
    let views = matrix_views(&[factor, da], "cholesky_jvp")?;
    let (fv, dv) = (&views[0], &views[1]);
    let n = fv.rows();
    expect_core(fv, n, n, "cholesky_jvp")?;
    expect_core(dv, n, n, "cholesky_jvp")?;
    debug!("cholesky_jvp: batch={} n={} lower={}", fv.len(), n, lower);
    let tangents = map_batch(fv.len(), 2 * fv.element_bytes(), BatchConfig::global(), |i| {
        let l = as_lower(fv.matrix(i).to_owned(), lower);
        let dl = cholesky_jvp_kernel(&l, &dv.matrix(i).to_owned());
        as_lower(dl, lower)
    });
    stack_matrices(fv.batch_shape(), n, n, tangents)
}

/// Input cotangent for a cotangent `factor_bar` of the Cholesky factor.
///
/// Only the triangle holding the factor is read from `factor_bar`. The
/// result is Hermitian.
pub fn cholesky_vjp<T: Scalar>(factor: &Tensor<T>, factor_bar: &Tensor<T>, lower: bool) -> Result<Tensor<T>, LinaRustError> {
    let views = matrix_views(&[factor, factor_bar], "cholesky_vjp")?;
    let (fv, bv) = (&views[0], &views[1]);
    let n = fv.rows();
    expect_core(fv, n, n, "cholesky_vjp")?;
    expect_core(bv, n, n, "cholesky_vjp")?;
    debug!("cholesky_vjp: batch={} n={} lower={}", fv.len(), n, lower);
    let cotangents = map_batch(fv.len(), 2 * fv.element_bytes(), BatchConfig::global(), |i| {
        let l = as_lower(fv.matrix(i).to_owned(), lower);
        let l_bar = as_lower(bv.matrix(i).to_owned(), lower);
        cholesky_vjp_kernel(&l, &l_bar)
    });
    stack_matrices(fv.batch_shape(), n, n, cotangents)
}

#[cfg(test)]
#[path = "cholesky_test.rs"]
mod tests;

use super::{expect_core, matrix_views};
use crate::batch::{map_batch, stack_matrices, BatchConfig, BatchView};
use crate::error::LinaRustError;
use crate::ops::linalg::matrix::{Mat, MatRef};
use crate::ops::linalg::triangular::{tri_solve, tri_solve_right, Trans};
use crate::scalar::Scalar;
use crate::tensor::Tensor;
use log::debug;

/// Unit lower `L` padded to `m × m` and upper `U` padded to `n × n` with
/// identity blocks, from a packed `m × n` LU.
fn padded_factors<T: Scalar>(lu: MatRef<'_, T>) -> (Mat<T>, Mat<T>) {
    let (m, n) = (lu.rows(), lu.cols());
    let k = m.min(n);
    let l = Mat::from_fn(m, m, |i, j| {
        if i == j {
            T::one()
        } else if j < k && i > j {
            lu[(i, j)]
        } else {
            T::zero()
        }
    });
    let u = Mat::from_fn(n, n, |i, j| {
        if i < k && j >= i {
            lu[(i, j)]
        } else if i == j {
            T::one()
        } else {
            T::zero()
        }
    });
    (l, u)
}

/// `δLU = L·tril₋₁(X) + triu(X)·U` with `X = L⁻¹·P·δA·U⁻¹`.
pub(crate) fn lu_jvp_kernel<T: Scalar>(lu: MatRef<'_, T>, perm: &[usize], da: &Mat<T>) -> Mat<T> {
    let (l, u) = padded_factors(lu);
    let pda = da.permute_rows(perm);
    let x = tri_solve_right(&tri_solve(&l, &pda, Trans::N, true, true), &u, false, false, false);
    l.matmul(&x.tril(-1)).add(&x.triu(0).matmul(&u))
}

/// Adjoint of [`lu_jvp_kernel`]; the permutation is undone last.
pub(crate) fn lu_vjp_kernel<T: Scalar>(lu: MatRef<'_, T>, perm: &[usize], lu_bar: &Mat<T>) -> Mat<T> {
    let (l, u) = padded_factors(lu);
    let x_bar = l.adjoint_matmul(lu_bar).tril(-1).add(&lu_bar.matmul_adjoint(&u).triu(0));
    let y_bar = tri_solve_right(&tri_solve(&l, &x_bar, Trans::C, true, true), &u, true, false, false);
    y_bar.unpermute_rows(perm)
}

/// Tangent of the packed [`lu_factor`](crate::ops::linalg::lu_factor) output.
pub fn lu_jvp<T: Scalar>(lu: &Tensor<T>, permutation: &Tensor<usize>, da: &Tensor<T>) -> Result<Tensor<T>, LinaRustError> {
    let views = matrix_views(&[lu, da], "lu_jvp")?;
    let (lv, dv) = (&views[0], &views[1]);
    let (m, n) = (lv.rows(), lv.cols());
    expect_core(dv, m, n, "lu_jvp")?;
    let perms = BatchView::vectors(permutation, "lu_jvp")?;
    lv.ensure_same_batch(&perms, "lu_jvp")?;
    debug!("lu_jvp: batch={} shape=[{}, {}]", lv.len(), m, n);
    let tangents = map_batch(lv.len(), 2 * lv.element_bytes(), BatchConfig::global(), |i| {
        lu_jvp_kernel(lv.matrix(i), perms.get(i), &dv.matrix(i).to_owned())
    });
    stack_matrices(lv.batch_shape(), m, n, tangents)
}

/// Input cotangent for a cotangent `lu_bar` of the packed LU.
pub fn lu_vjp<T: Scalar>(lu: &Tensor<T>, permutation: &Tensor<usize>, lu_bar: &Tensor<T>) -> Result<Tensor<T>, LinaRustError> {
    let views = matrix_views(&[lu, lu_bar], "lu_vjp")?;
    let (lv, bv) = (&views[0], &views[1]);
    let (m, n) = (lv.rows(), lv.cols());
    expect_core(bv, m, n, "lu_vjp")?;
    let perms = BatchView::vectors(permutation, "lu_vjp")?;
    lv.ensure_same_batch(&perms, "lu_vjp")?;
    debug!("lu_vjp: batch={} shape=[{}, {}]", lv.len(), m, n);
    let cotangents = map_batch(lv.len(), 2 * lv.element_bytes(), BatchConfig::global(), |i| {
        lu_vjp_kernel(lv.matrix(i), perms.get(i), &bv.matrix(i).to_owned())
    });
    stack_matrices(lv.batch_shape(), m, n, cotangents)
}

#[cfg(test)]
#[path = "lu_test.rs"]
mod tests;

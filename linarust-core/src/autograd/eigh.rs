use super::{expect_core, matrix_views, real_vectors};
use crate::batch::{map_batch, stack_matrices, stack_vectors, BatchConfig};
use crate::error::LinaRustError;
use crate::ops::linalg::matrix::{reciprocal_gaps, Mat};
use crate::scalar::Scalar;
use crate::tensor::Tensor;
use log::debug;

/// `δw = Re diag(X)` and `δV = V·(F ∘ X)` with `X = Vᴴ·sym(δA)·V` and
/// `F_ij = 1 / (w_j - w_i)`.
pub(crate) fn eigh_jvp_kernel<T: Scalar>(w: &[T::Real], v: &Mat<T>, da: &Mat<T>) -> (Vec<T::Real>, Mat<T>) {
    let x = v.adjoint_matmul(&da.hermitian_part().matmul(v));
    let dw = x.diag().into_iter().map(|d| d.re()).collect();
    let dv = v.matmul(&x.hadamard_real(&reciprocal_gaps(w)));
    (dw, dv)
}

/// `Ā = sym(V·(diag(w̄) + F ∘ Vᴴ·V̄)·Vᴴ)`; a missing `V̄` counts as zero.
pub(crate) fn eigh_vjp_kernel<T: Scalar>(w: &[T::Real], v: &Mat<T>, w_bar: &[T::Real], v_bar: Option<&Mat<T>>) -> Mat<T> {
    let diag: Vec<T> = w_bar.iter().map(|&x| T::from_re(x)).collect();
    let mut inner = Mat::from_diag(&diag);
    if let Some(v_bar) = v_bar {
        inner = inner.add(&v.adjoint_matmul(v_bar).hadamard_real(&reciprocal_gaps(w)));
    }
    v.matmul(&inner).matmul_adjoint(v).hermitian_part()
}

/// Tangents `(δw, δV)` of [`eigh`](crate::ops::linalg::eigh) outputs.
///
/// Undefined (infinite) when two eigenvalues coincide.
pub fn eigh_jvp<T: Scalar>(
    w: &Tensor<T::Real>,
    v: &Tensor<T>,
    da: &Tensor<T>,
) -> Result<(Tensor<T::Real>, Tensor<T>), LinaRustError> {
    let views = matrix_views(&[v, da], "eigh_jvp")?;
    let (vv, dv) = (&views[0], &views[1]);
    let n = vv.rows();
    expect_core(vv, n, n, "eigh_jvp")?;
    expect_core(dv, n, n, "eigh_jvp")?;
    let wv = real_vectors(w, vv, n, "eigh_jvp")?;
    debug!("eigh_jvp: batch={} n={}", vv.len(), n);
    let pairs = map_batch(vv.len(), 2 * vv.element_bytes(), BatchConfig::global(), |i| {
        eigh_jvp_kernel(wv.get(i), &vv.matrix(i).to_owned(), &dv.matrix(i).to_owned())
    });
    let (dws, dvs): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
    Ok((
        stack_vectors(vv.batch_shape(), n, dws)?,
        stack_matrices(vv.batch_shape(), n, n, dvs)?,
    ))
}

/// Input cotangent from cotangents of the eigenvalues and, optionally, the
/// eigenvectors. The result is Hermitian.
///
/// The loss must not depend on the phase of the eigenvectors; the phase
/// component of `v_bar` is discarded.
pub fn eigh_vjp<T: Scalar>(
    w: &Tensor<T::Real>,
    v: &Tensor<T>,
    w_bar: &Tensor<T::Real>,
    v_bar: Option<&Tensor<T>>,
) -> Result<Tensor<T>, LinaRustError> {
    let mut operands = vec![v];
    operands.extend(v_bar);
    let views = matrix_views(&operands, "eigh_vjp")?;
    let vv = &views[0];
    let n = vv.rows();
    for view in &views {
        expect_core(view, n, n, "eigh_vjp")?;
    }
    let wv = real_vectors(w, vv, n, "eigh_vjp")?;
    let wbv = real_vectors(w_bar, vv, n, "eigh_vjp")?;
    debug!("eigh_vjp: batch={} n={} with_vectors={}", vv.len(), n, v_bar.is_some());
    let cotangents = map_batch(vv.len(), 2 * vv.element_bytes(), BatchConfig::global(), |i| {
        let v_bar = views.get(1).map(|view| view.matrix(i).to_owned());
        eigh_vjp_kernel(wv.get(i), &vv.matrix(i).to_owned(), wbv.get(i), v_bar.as_ref())
    });
    stack_matrices(vv.batch_shape(), n, n, cotangents)
}

#[cfg(test)]
#[path = "eigh_test.rs"]
mod tests;

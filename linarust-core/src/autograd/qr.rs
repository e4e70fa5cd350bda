use super::{expect_core, matrix_views};
use crate::batch::{map_batch, stack_matrices, BatchConfig};
use crate::error::LinaRustError;
use crate::ops::linalg::matrix::Mat;
use crate::ops::linalg::triangular::tri_solve_right;
use crate::scalar::{mul_i, Scalar};
use crate::tensor::Tensor;
use log::debug;

/// `tril(C, -1) - tril(C, -1)ᴴ + i·Im diag(C)`: the skew-Hermitian part of
/// `C` that makes `C - Ω` upper triangular with a real diagonal.
fn skew_projection<T: Scalar>(c: &Mat<T>) -> Mat<T> {
    let n = c.rows();
    Mat::from_fn(n, n, |i, j| match i.cmp(&j) {
        std::cmp::Ordering::Greater => c[(i, j)],
        std::cmp::Ordering::Less => -c[(j, i)].conj(),
        std::cmp::Ordering::Equal => mul_i(T::from_re(c[(i, i)].im())),
    })
}

/// Adjoint of [`skew_projection`] under `Re⟨·, ·⟩`.
fn skew_projection_adjoint<T: Scalar>(z: &Mat<T>) -> Mat<T> {
    let n = z.rows();
    Mat::from_fn(n, n, |i, j| match i.cmp(&j) {
        std::cmp::Ordering::Greater => z[(i, j)] - z[(j, i)].conj(),
        std::cmp::Ordering::Less => T::zero(),
        std::cmp::Ordering::Equal => mul_i(T::from_re(z[(i, i)].im())),
    })
}

/// Tangents of the reduced `Q (m × n)` and `R (n × n)`, `m ≥ n`.
///
/// With `D = δA·R⁻¹` and `C = Qᴴ·D`: `δQ = Q·Ω + D - Q·C` and
/// `δR = (C - Ω)·R`.
pub(crate) fn qr_jvp_kernel<T: Scalar>(q: &Mat<T>, r: &Mat<T>, da: &Mat<T>) -> (Mat<T>, Mat<T>) {
    let d = tri_solve_right(da, r, false, false, false);
    let c = q.adjoint_matmul(&d);
    let omega = skew_projection(&c);
    let dq = q.matmul(&omega).add(&d).sub(&q.matmul(&c));
    let dr = c.sub(&omega).matmul(r);
    (dq, dr)
}

/// `Ā = (Q̄ + Q·C̄)·R⁻ᴴ` with `C̄` pulled back through both tangents.
pub(crate) fn qr_vjp_kernel<T: Scalar>(q: &Mat<T>, r: &Mat<T>, q_bar: &Mat<T>, r_bar: &Mat<T>) -> Mat<T> {
    let w = q.adjoint_matmul(q_bar);
    let v = r_bar.triu(0).matmul_adjoint(r);
    let z = w.sub(&v);
    let c_bar = v.sub(&w).add(&skew_projection_adjoint(&z));
    tri_solve_right(&q_bar.add(&q.matmul(&c_bar)), r, true, false, false)
}

/// Tangents `(δQ, δR)` of the reduced QR of an `m × n` input with `m ≥ n`.
pub fn qr_jvp<T: Scalar>(q: &Tensor<T>, r: &Tensor<T>, da: &Tensor<T>) -> Result<(Tensor<T>, Tensor<T>), LinaRustError> {
    let views = matrix_views(&[q, r, da], "qr_jvp")?;
    let (qv, rv, dv) = (&views[0], &views[1], &views[2]);
    let (m, n) = (qv.rows(), qv.cols());
    expect_core(rv, n, n, "qr_jvp")?;
    expect_core(dv, m, n, "qr_jvp")?;
    debug!("qr_jvp: batch={} shape=[{}, {}]", qv.len(), m, n);
    let pairs = map_batch(qv.len(), 3 * qv.element_bytes(), BatchConfig::global(), |i| {
        qr_jvp_kernel(&qv.matrix(i).to_owned(), &rv.matrix(i).to_owned(), &dv.matrix(i).to_owned())
    });
    let (dqs, drs): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
    Ok((
        stack_matrices(qv.batch_shape(), m, n, dqs)?,
        stack_matrices(qv.batch_shape(), n, n, drs)?,
    ))
}

/// Input cotangent from cotangents of the reduced `Q` and `R`. Only the
/// upper triangle of `r_bar` is read.
pub fn qr_vjp<T: Scalar>(
    q: &Tensor<T>,
    r: &Tensor<T>,
    q_bar: &Tensor<T>,
    r_bar: &Tensor<T>,
) -> Result<Tensor<T>, LinaRustError> {
    let views = matrix_views(&[q, r, q_bar, r_bar], "qr_vjp")?;
    let (qv, rv, qbv, rbv) = (&views[0], &views[1], &views[2], &views[3]);
    let (m, n) = (qv.rows(), qv.cols());
    expect_core(rv, n, n, "qr_vjp")?;
    expect_core(qbv, m, n, "qr_vjp")?;
    expect_core(rbv, n, n, "qr_vjp")?;
    debug!("qr_vjp: batch={} shape=[{}, {}]", qv.len(), m, n);
    let cotangents = map_batch(qv.len(), 4 * qv.element_bytes(), BatchConfig::global(), |i| {
        qr_vjp_kernel(
            &qv.matrix(i).to_owned(),
            &rv.matrix(i).to_owned(),
            &qbv.matrix(i).to_owned(),
            &rbv.matrix(i).to_owned(),
        )
    });
    stack_matrices(qv.batch_shape(), m, n, cotangents)
}

#[cfg(test)]
#[path = "qr_test.rs"]
mod tests;

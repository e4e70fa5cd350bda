use super::{expect_core, matrix_views, real_vectors};
use crate::batch::{map_batch, stack_matrices, stack_vectors, BatchConfig};
use crate::error::LinaRustError;
use crate::ops::linalg::matrix::{reciprocal_gaps, Mat};
use crate::scalar::{mul_i, RealScalar, Scalar};
use crate::tensor::Tensor;
use log::debug;
use num_traits::Float;

/// `M·diag(d)`.
fn scale_columns<T: Scalar>(m: &Mat<T>, d: &[T::Real]) -> Mat<T> {
    Mat::from_fn(m.rows(), m.cols(), |i, j| m[(i, j)].scale(d[j]))
}

/// `diag(d)·M`.
fn scale_rows<T: Scalar>(m: &Mat<T>, d: &[T::Real]) -> Mat<T> {
    Mat::from_fn(m.rows(), m.cols(), |i, j| m[(i, j)].scale(d[i]))
}

/// `F_ij = 1 / (s_j² - s_i²)`, zero on the diagonal.
fn gap_weights<R: RealScalar>(s: &[R]) -> Mat<R> {
    let squares: Vec<R> = s.iter().map(|&x| x * x).collect();
    reciprocal_gaps(&squares)
}

/// `1 / s` with zero kept at zero.
fn guarded_reciprocal<R: RealScalar>(s: &[R]) -> Vec<R> {
    s.iter()
        .map(|&x| if x == R::zero() { R::zero() } else { x.recip() })
        .collect()
}

/// `i·Im(M_jj)·w_j` on the diagonal, zero elsewhere.
fn imaginary_diagonal<T: Scalar>(m: &Mat<T>, w: &[T::Real]) -> Mat<T> {
    let k = m.rows();
    Mat::from_fn(k, k, |i, j| {
        if i == j {
            mul_i(T::from_re(m[(i, i)].im() * w[i]))
        } else {
            T::zero()
        }
    })
}

pub(crate) type SvdTangent<T> = (Option<Mat<T>>, Vec<<T as Scalar>::Real>, Option<Mat<T>>);

/// Tangents of the reduced SVD `A = U·diag(s)·Vh` (`U` is `m × k`, `Vh` is
/// `k × n`). With `compute_uv = false` only `δs` is produced.
pub(crate) fn svd_jvp_kernel<T: Scalar>(
    u: &Mat<T>,
    s: &[T::Real],
    vh: &Mat<T>,
    da: &Mat<T>,
    compute_uv: bool,
) -> SvdTangent<T> {
    let (m, n, k) = (u.rows(), vh.cols(), s.len());
    let v = vh.adjoint();
    let ds_mat = u.adjoint_matmul(&da.matmul(&v));
    let ds: Vec<T::Real> = ds_mat.diag().into_iter().map(|x| x.re()).collect();
    if !compute_uv {
        return (None, ds, None);
    }
    let f = gap_weights(s);
    let dss = scale_columns(&ds_mat, s);
    let sds = scale_rows(&ds_mat, s);
    let phase = imaginary_diagonal(&ds_mat, &guarded_reciprocal(s));
    let mut du = u.matmul(&dss.add(&dss.adjoint()).hadamard_real(&f).add(&phase));
    let mut dv = v.matmul(&sds.add(&sds.adjoint()).hadamard_real(&f));
    let s_inv: Vec<T::Real> = s.iter().map(|&x| x.recip()).collect();
    if m > k {
        let dav = da.matmul(&v);
        let outside = dav.sub(&u.matmul(&u.adjoint_matmul(&dav)));
        du = du.add(&scale_columns(&outside, &s_inv));
    }
    if n > k {
        let dahu = da.adjoint_matmul(u);
        let outside = dahu.sub(&v.matmul(&v.adjoint_matmul(&dahu)));
        dv = dv.add(&scale_columns(&outside, &s_inv));
    }
    (Some(du), ds, Some(dv.adjoint()))
}

/// Adjoint of [`svd_jvp_kernel`]; missing `Ū` or `V̄h` count as zero.
pub(crate) fn svd_vjp_kernel<T: Scalar>(
    u: &Mat<T>,
    s: &[T::Real],
    vh: &Mat<T>,
    u_bar: Option<&Mat<T>>,
    s_bar: &[T::Real],
    vh_bar: Option<&Mat<T>>,
) -> Mat<T> {
    let (m, n, k) = (u.rows(), vh.cols(), s.len());
    let v = vh.adjoint();
    let s_bar_t: Vec<T> = s_bar.iter().map(|&x| T::from_re(x)).collect();
    let mut inner = Mat::from_diag(&s_bar_t);
    let f = gap_weights(s);
    let s_inv: Vec<T::Real> = s.iter().map(|&x| x.recip()).collect();
    let mut outer: Mat<T> = Mat::zeros(m, n);

    if let Some(u_bar) = u_bar {
        let j = u.adjoint_matmul(u_bar);
        let skew = j.sub(&j.adjoint()).hadamard_real(&f);
        inner = inner
            .add(&scale_columns(&skew, s))
            .add(&imaginary_diagonal(&j, &guarded_reciprocal(s)));
        if m > k {
            let outside = u_bar.sub(&u.matmul(&j));
            outer = outer.add(&scale_columns(&outside, &s_inv).matmul(vh));
        }
    }
    if let Some(vh_bar) = vh_bar {
        let v_bar = vh_bar.adjoint();
        let l = v.adjoint_matmul(&v_bar);
        let skew = l.sub(&l.adjoint()).hadamard_real(&f);
        inner = inner.add(&scale_rows(&skew, s));
        if n > k {
            let outside = v_bar.sub(&v.matmul(&l));
            outer = outer.add(&scale_columns(u, &s_inv).matmul_adjoint(&outside));
        }
    }
    u.matmul(&inner).matmul(vh).add(&outer)
}

/// Tangents `(δU, δs, δVh)` of the reduced SVD for an input tangent `da`.
///
/// `u` and `vh` must come from `svd(a, false, true)`. With `compute_uv =
/// false` the vector tangents are `None`. Undefined when two singular
/// values coincide (or one is zero and `m ≠ n`).
#[allow(clippy::type_complexity)]
pub fn svd_jvp<T: Scalar>(
    u: &Tensor<T>,
    s: &Tensor<T::Real>,
    vh: &Tensor<T>,
    da: &Tensor<T>,
    compute_uv: bool,
) -> Result<(Option<Tensor<T>>, Tensor<T::Real>, Option<Tensor<T>>), LinaRustError> {
    let views = matrix_views(&[u, vh, da], "svd_jvp")?;
    let (uv, vhv, dv) = (&views[0], &views[1], &views[2]);
    let (m, k, n) = (uv.rows(), uv.cols(), vhv.cols());
    expect_core(vhv, k, n, "svd_jvp")?;
    expect_core(dv, m, n, "svd_jvp")?;
    let sv = real_vectors(s, uv, k, "svd_jvp")?;
    debug!("svd_jvp: batch={} shape=[{}, {}] compute_uv={}", uv.len(), m, n, compute_uv);
    let parts = map_batch(uv.len(), 3 * dv.element_bytes(), BatchConfig::global(), |i| {
        svd_jvp_kernel(
            &uv.matrix(i).to_owned(),
            sv.get(i),
            &vhv.matrix(i).to_owned(),
            &dv.matrix(i).to_owned(),
            compute_uv,
        )
    });
    let mut dus = Vec::with_capacity(parts.len());
    let mut dss = Vec::with_capacity(parts.len());
    let mut dvhs = Vec::with_capacity(parts.len());
    for (du, ds, dvh) in parts {
        dus.extend(du);
        dss.push(ds);
        dvhs.extend(dvh);
    }
    let batch_shape = uv.batch_shape();
    let ds = stack_vectors(batch_shape, k, dss)?;
    if !compute_uv {
        return Ok((None, ds, None));
    }
    Ok((
        Some(stack_matrices(batch_shape, m, k, dus)?),
        ds,
        Some(stack_matrices(batch_shape, k, n, dvhs)?),
    ))
}

/// Input cotangent from cotangents of the reduced SVD outputs.
///
/// The loss must not depend on the joint phase of matching singular vector
/// pairs.
pub fn svd_vjp<T: Scalar>(
    u: &Tensor<T>,
    s: &Tensor<T::Real>,
    vh: &Tensor<T>,
    u_bar: Option<&Tensor<T>>,
    s_bar: &Tensor<T::Real>,
    vh_bar: Option<&Tensor<T>>,
) -> Result<Tensor<T>, LinaRustError> {
    let mut operands = vec![u, vh];
    operands.extend(u_bar);
    operands.extend(vh_bar);
    let views = matrix_views(&operands, "svd_vjp")?;
    let (uv, vhv) = (&views[0], &views[1]);
    let (m, k, n) = (uv.rows(), uv.cols(), vhv.cols());
    expect_core(vhv, k, n, "svd_vjp")?;
    let ubv = u_bar.map(|_| &views[2]);
    let vhbv = vh_bar.map(|_| &views[views.len() - 1]);
    if let Some(view) = ubv {
        expect_core(view, m, k, "svd_vjp")?;
    }
    if let Some(view) = vhbv {
        expect_core(view, k, n, "svd_vjp")?;
    }
    let sv = real_vectors(s, uv, k, "svd_vjp")?;
    let sbv = real_vectors(s_bar, uv, k, "svd_vjp")?;
    debug!(
        "svd_vjp: batch={} shape=[{}, {}] with_u={} with_vh={}",
        uv.len(),
        m,
        n,
        u_bar.is_some(),
        vh_bar.is_some()
    );
    let cotangents = map_batch(uv.len(), 4 * uv.element_bytes(), BatchConfig::global(), |i| {
        let u_bar = ubv.map(|view| view.matrix(i).to_owned());
        let vh_bar = vhbv.map(|view| view.matrix(i).to_owned());
        svd_vjp_kernel(
            &uv.matrix(i).to_owned(),
            sv.get(i),
            &vhv.matrix(i).to_owned(),
            u_bar.as_ref(),
            sbv.get(i),
            vh_bar.as_ref(),
        )
    });
    stack_matrices(uv.batch_shape(), m, n, cotangents)
}

#[cfg(test)]
#[path = "svd_test.rs"]
mod tests;

use super::matrix::{Mat, MatRef};
use super::{report_failures, split_outcomes};
use crate::batch::{stack_matrices, stack_vectors, stack_values, try_map_batch, BatchConfig, BatchView};
use crate::error::LinaRustError;
use crate::scalar::{phase, RealScalar, Scalar};
use crate::status::Status;
use crate::tensor::Tensor;
use log::{debug, trace};
use num_traits::{Float, Zero};

/// Output of [`eigh`].
#[derive(Debug, Clone, PartialEq)]
pub struct EighResult<T: Scalar> {
    /// Ascending eigenvalues, `[..batch, n]`.
    pub eigenvalues: Tensor<T::Real>,
    /// Orthonormal eigenvectors as columns, absent with `eigvals_only`.
    pub eigenvectors: Option<Tensor<T>>,
    pub info: Tensor<Status>,
}

/// Coefficients of the real plane rotation that diagonalizes
/// `[[app, r], [r, aqq]]` with `r > 0`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Rotation<R> {
    pub(crate) c: R,
    pub(crate) s: R,
    pub(crate) t: R,
}

impl<R: RealScalar> Rotation<R> {
    pub(crate) fn new(app: R, aqq: R, r: R) -> Rotation<R> {
        let two = R::one() + R::one();
        let tau = (aqq - app) / (two * r);
        let t = if tau >= R::zero() {
            R::one() / (tau + (R::one() + tau * tau).sqrt())
        } else {
            -R::one() / (-tau + (R::one() + tau * tau).sqrt())
        };
        let c = (R::one() + t * t).sqrt().recip();
        Rotation { c, s: t * c, t }
    }

    /// Replaces columns `p` and `q` of `m` by `c·p - s·q` and `s·p + c·q`.
    pub(crate) fn rotate_columns<T: Scalar<Real = R>>(&self, m: &mut Mat<T>, p: usize, q: usize) {
        for k in 0..m.rows() {
            let mp = m[(k, p)];
            let mq = m[(k, q)];
            m[(k, p)] = mp.scale(self.c) - mq.scale(self.s);
            m[(k, q)] = mp.scale(self.s) + mq.scale(self.c);
        }
    }

    /// Row counterpart of [`rotate_columns`](Self::rotate_columns).
    pub(crate) fn rotate_rows<T: Scalar<Real = R>>(&self, m: &mut Mat<T>, p: usize, q: usize) {
        for k in 0..m.cols() {
            let mp = m[(p, k)];
            let mq = m[(q, k)];
            m[(p, k)] = mp.scale(self.c) - mq.scale(self.s);
            m[(q, k)] = mp.scale(self.s) + mq.scale(self.c);
        }
    }
}

/// Full Hermitian matrix from the `lower` (or upper) triangle of `a`.
fn hermitian_from_triangle<T: Scalar>(a: MatRef<'_, T>, lower: bool) -> Mat<T> {
    let n = a.rows();
    let mut h: Mat<T> = Mat::zeros(n, n);
    for i in 0..n {
        h[(i, i)] = T::from_re(a[(i, i)].re());
        for j in 0..i {
            let v = if lower { a[(i, j)] } else { a[(j, i)].conj() };
            h[(i, j)] = v;
            h[(j, i)] = v.conj();
        }
    }
    h
}

fn off_diagonal_norm_sq<T: Scalar>(h: &Mat<T>) -> T::Real {
    let n = h.rows();
    let mut acc = T::Real::zero();
    for i in 0..n {
        for j in i + 1..n {
            acc = acc + h[(i, j)].modulus_sq();
        }
    }
    acc + acc
}

/// Stable ascending order of `values`, NaN last.
pub(crate) fn ascending_order<R: RealScalar>(values: &[R]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| {
        values[i]
            .partial_cmp(&values[j])
            .unwrap_or_else(|| values[i].is_nan().cmp(&values[j].is_nan()))
    });
    order
}

/// Cyclic Jacobi eigen-solver for one Hermitian matrix.
///
/// Each pivot `(p, q)` first rotates the phase of column `q` so that
/// `h[p][q]` becomes real and positive, then applies a real plane rotation.
/// Returns ascending eigenvalues and, if requested, the eigenvector matrix.
pub(crate) fn eigh_kernel<T: Scalar>(
    a: MatRef<'_, T>,
    lower: bool,
    want_vectors: bool,
    max_sweeps: usize,
) -> Result<(Vec<T::Real>, Option<Mat<T>>), Status> {
    let n = a.rows();
    let mut h = hermitian_from_triangle(a, lower);
    let mut v = if want_vectors { Some(Mat::identity(n)) } else { None };
    let frob_sq = h.norm_sq();
    let tol = T::Real::epsilon() * <T::Real as RealScalar>::of_usize(n.max(1));
    let threshold = tol * tol * frob_sq;

    let mut converged = false;
    for sweep in 0..=max_sweeps {
        let off = off_diagonal_norm_sq(&h);
        if off <= threshold {
            trace!("eigh converged after {} sweeps (n={})", sweep, n);
            converged = true;
            break;
        }
        if sweep == max_sweeps {
            break;
        }
        for p in 0..n {
            for q in p + 1..n {
                let hpq = h[(p, q)];
                let r = hpq.modulus();
                if r == T::Real::zero() {
                    continue;
                }
                // Make h[p][q] real: scale column q by conj(phase), row q by phase.
                let u = phase(hpq).conj();
                if u != T::one() {
                    for k in 0..n {
                        h[(k, q)] *= u;
                        h[(q, k)] *= u.conj();
                    }
                    if let Some(v) = v.as_mut() {
                        for k in 0..n {
                            v[(k, q)] *= u;
                        }
                    }
                }
                let app = h[(p, p)].re();
                let aqq = h[(q, q)].re();
                let rot = Rotation::new(app, aqq, r);
                rot.rotate_columns(&mut h, p, q);
                rot.rotate_rows(&mut h, p, q);
                h[(p, q)] = T::zero();
                h[(q, p)] = T::zero();
                h[(p, p)] = T::from_re(app - rot.t * r);
                h[(q, q)] = T::from_re(aqq + rot.t * r);
                if let Some(v) = v.as_mut() {
                    rot.rotate_columns(v, p, q);
                }
            }
        }
    }
    if !converged {
        return Err(Status::NotConverged { sweeps: max_sweeps });
    }

    let raw: Vec<T::Real> = (0..n).map(|i| h[(i, i)].re()).collect();
    let order = ascending_order(&raw);
    let values = order.iter().map(|&i| raw[i]).collect();
    Ok((values, v.map(|v| v.select_columns(&order))))
}

/// Eigen-decomposition of a batch of Hermitian matrices.
///
/// Only the `lower` (or upper) triangle is read; the imaginary part of the
/// diagonal is ignored. Eigenvalues are real and ascending, eigenvectors are
/// orthonormal columns with `A·V = V·diag(w)`. Elements that do not converge
/// within `BatchConfig::max_sweeps` get `Status::NotConverged` and NaN output.
pub fn eigh<T: Scalar>(a: &Tensor<T>, lower: bool, eigvals_only: bool) -> Result<EighResult<T>, LinaRustError> {
    let view = BatchView::square_matrices(a, "eigh")?;
    let n = view.rows();
    let config = BatchConfig::global();
    debug!(
        "eigh: batch={} n={} dtype={:?} lower={} eigvals_only={}",
        view.len(),
        n,
        T::DTYPE,
        lower,
        eigvals_only
    );
    let outcomes = try_map_batch(view.len(), view.element_bytes(), config, |i| {
        eigh_kernel(view.matrix(i), lower, !eigvals_only, config.max_sweeps)
    });
    let (parts, statuses) = split_outcomes(outcomes, || {
        let w = vec![<T::Real as Float>::nan(); n];
        let v = if eigvals_only { None } else { Some(Mat::nan(n, n)) };
        (w, v)
    });
    report_failures("eigh", &statuses);
    let mut ws = Vec::with_capacity(parts.len());
    let mut vs = Vec::with_capacity(parts.len());
    for (w, v) in parts {
        ws.push(w);
        if let Some(v) = v {
            vs.push(v);
        }
    }
    let batch_shape = view.batch_shape();
    Ok(EighResult {
        eigenvalues: stack_vectors(batch_shape, n, ws)?,
        eigenvectors: if eigvals_only {
            None
        } else {
            Some(stack_matrices(batch_shape, n, n, vs)?)
        },
        info: stack_values(batch_shape, statuses)?,
    })
}

#[cfg(test)]
#[path = "eigh_test.rs"]
mod tests;

use super::eigh::Rotation;
use super::matrix::{Mat, MatRef};
use super::{report_failures, split_outcomes};
use crate::batch::{stack_matrices, stack_values, stack_vectors, try_map_batch, BatchConfig, BatchView};
use crate::error::LinaRustError;
use crate::scalar::{phase, RealScalar, Scalar};
use crate::status::Status;
use crate::tensor::Tensor;
use log::{debug, trace};
use num_traits::{Float, Zero};

/// Output of [`svd`].
#[derive(Debug, Clone, PartialEq)]
pub struct SvdResult<T: Scalar> {
    /// Left singular vectors, absent when `compute_uv` is false.
    pub u: Option<Tensor<T>>,
    /// Non-negative singular values in descending order, `[..batch, min(m, n)]`.
    pub s: Tensor<T::Real>,
    /// Right singular vectors as rows, absent when `compute_uv` is false.
    pub vh: Option<Tensor<T>>,
    pub info: Tensor<Status>,
}

#[derive(Debug, Clone)]
pub(crate) struct SvdParts<T: Scalar> {
    pub(crate) u: Option<Mat<T>>,
    pub(crate) s: Vec<T::Real>,
    pub(crate) vh: Option<Mat<T>>,
}

fn column_norm_sq<T: Scalar>(w: &Mat<T>, j: usize) -> T::Real {
    (0..w.rows()).fold(T::Real::zero(), |acc, i| acc + w[(i, j)].modulus_sq())
}

fn column_inner<T: Scalar>(w: &Mat<T>, p: usize, q: usize) -> T {
    (0..w.rows()).map(|i| w[(i, p)].conj() * w[(i, q)]).sum()
}

/// Stable descending order of `values`, NaN last.
fn descending_order<R: RealScalar>(values: &[R]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| {
        values[j]
            .partial_cmp(&values[i])
            .unwrap_or_else(|| values[i].is_nan().cmp(&values[j].is_nan()))
    });
    order
}

/// One-sided (Hestenes) Jacobi: rotates pairs of columns of `w` until all
/// columns are mutually orthogonal, accumulating the rotations into `v`.
fn one_sided_jacobi<T: Scalar>(
    w: &mut Mat<T>,
    mut v: Option<&mut Mat<T>>,
    tol: T::Real,
    max_sweeps: usize,
) -> Result<(), Status> {
    let n = w.cols();
    for sweep in 0..=max_sweeps {
        let mut rotated = false;
        for p in 0..n {
            for q in p + 1..n {
                let alpha = column_norm_sq(w, p);
                let beta = column_norm_sq(w, q);
                let gamma = column_inner(w, p, q);
                let g = gamma.modulus();
                if g == T::Real::zero() || g <= tol * (alpha * beta).sqrt() {
                    continue;
                }
                if sweep == max_sweeps {
                    return Err(Status::NotConverged { sweeps: max_sweeps });
                }
                rotated = true;
                let u = phase(gamma).conj();
                if u != T::one() {
                    for k in 0..w.rows() {
                        w[(k, q)] *= u;
                    }
                    if let Some(v) = v.as_deref_mut() {
                        for k in 0..v.rows() {
                            v[(k, q)] *= u;
                        }
                    }
                }
                let rot = Rotation::new(alpha, beta, g);
                rot.rotate_columns(w, p, q);
                if let Some(v) = v.as_deref_mut() {
                    rot.rotate_columns(v, p, q);
                }
            }
        }
        if !rotated {
            trace!("svd converged after {} sweeps (n={})", sweep, n);
            return Ok(());
        }
    }
    Ok(())
}

/// Fills every `None` slot with a unit vector orthogonal to all other
/// columns, choosing the canonical basis vector with the largest residual
/// after modified Gram-Schmidt.
pub(crate) fn complete_basis<T: Scalar>(rows: usize, mut columns: Vec<Option<Vec<T>>>) -> Mat<T> {
    let orthogonalize = |x: &mut Vec<T>, basis: &[Option<Vec<T>>]| {
        for c in basis.iter().flatten() {
            let proj: T = c.iter().zip(x.iter()).map(|(&ci, &xi)| ci.conj() * xi).sum();
            for (xi, &ci) in x.iter_mut().zip(c) {
                *xi -= ci * proj;
            }
        }
    };
    let norm = |x: &[T]| {
        x.iter()
            .fold(T::Real::zero(), |acc, v| acc + v.modulus_sq())
            .sqrt()
    };
    for slot in 0..columns.len() {
        if columns[slot].is_some() {
            continue;
        }
        let mut best: Option<(T::Real, Vec<T>)> = None;
        for k in 0..rows {
            let mut e = vec![T::zero(); rows];
            e[k] = T::one();
            orthogonalize(&mut e, &columns);
            let r = norm(&e);
            if best.as_ref().map_or(true, |(b, _)| r > *b) {
                best = Some((r, e));
            }
        }
        if let Some((_, mut e)) = best {
            orthogonalize(&mut e, &columns);
            let r = norm(&e);
            if r > T::Real::zero() {
                let inv = r.recip();
                e.iter_mut().for_each(|x| *x = x.scale(inv));
            }
            columns[slot] = Some(e);
        }
    }
    let cols = columns.len();
    Mat::from_fn(rows, cols, |i, j| {
        columns[j].as_ref().map_or(T::zero(), |c| c[i])
    })
}

/// Singular value decomposition of one matrix.
///
/// Works on `A` or `Aᴴ`, whichever has at least as many rows as columns.
/// Columns whose norm is negligible against the largest singular value are
/// replaced by an orthonormal completion, as are the extra columns of a full
/// `U` or `V`.
pub(crate) fn svd_kernel<T: Scalar>(
    a: MatRef<'_, T>,
    full_matrices: bool,
    compute_uv: bool,
    max_sweeps: usize,
) -> Result<SvdParts<T>, Status> {
    let tall = a.rows() >= a.cols();
    let mut w = if tall { a.to_owned() } else { a.to_owned().adjoint() };
    let (rows, cols) = (w.rows(), w.cols());
    let tol = T::Real::epsilon() * <T::Real as RealScalar>::of_usize(rows.max(1));

    let mut v = if compute_uv { Some(Mat::identity(cols)) } else { None };
    one_sided_jacobi(&mut w, v.as_mut(), tol, max_sweeps)?;

    let norms: Vec<T::Real> = (0..cols).map(|j| column_norm_sq(&w, j).sqrt()).collect();
    let order = descending_order(&norms);
    let s: Vec<T::Real> = order.iter().map(|&j| norms[j]).collect();
    let v = match v {
        Some(v) => v.select_columns(&order),
        None => return Ok(SvdParts { u: None, s, vh: None }),
    };

    let cutoff = s.first().copied().unwrap_or_else(T::Real::zero) * tol;
    let target = if full_matrices { rows } else { cols };
    let mut u_cols: Vec<Option<Vec<T>>> = order
        .iter()
        .map(|&j| {
            let nj = norms[j];
            if nj > cutoff && nj > T::Real::zero() {
                let inv = nj.recip();
                Some(w.column(j).into_iter().map(|x| x.scale(inv)).collect())
            } else {
                None
            }
        })
        .collect();
    u_cols.resize(target, None);
    let u_work = complete_basis(rows, u_cols);

    let (u, vh) = if tall {
        (u_work, v.adjoint())
    } else {
        (v, u_work.adjoint())
    };
    Ok(SvdParts {
        u: Some(u),
        s,
        vh: Some(vh),
    })
}

/// Singular value decomposition `A = U·diag(s)·Vh` of a batch of matrices.
///
/// With `full_matrices`, `U` is `m × m` and `Vh` is `n × n`; otherwise they
/// are `m × k` and `k × n` with `k = min(m, n)`. With `compute_uv = false`
/// only `s` is computed. Elements that do not converge get
/// `Status::NotConverged` and NaN output.
pub fn svd<T: Scalar>(a: &Tensor<T>, full_matrices: bool, compute_uv: bool) -> Result<SvdResult<T>, LinaRustError> {
    let view = BatchView::matrices(a, "svd")?;
    let (m, n) = (view.rows(), view.cols());
    let k = m.min(n);
    let (u_cols, vh_rows) = if full_matrices { (m, n) } else { (k, k) };
    let config = BatchConfig::global();
    debug!(
        "svd: batch={} shape=[{}, {}] dtype={:?} full_matrices={} compute_uv={}",
        view.len(),
        m,
        n,
        T::DTYPE,
        full_matrices,
        compute_uv
    );
    let outcomes = try_map_batch(view.len(), view.element_bytes(), config, |i| {
        svd_kernel(view.matrix(i), full_matrices, compute_uv, config.max_sweeps)
    });
    let (parts, statuses) = split_outcomes(outcomes, || SvdParts {
        u: compute_uv.then(|| Mat::nan(m, u_cols)),
        s: vec![<T::Real as Float>::nan(); k],
        vh: compute_uv.then(|| Mat::nan(vh_rows, n)),
    });
    report_failures("svd", &statuses);
    let mut us = Vec::with_capacity(parts.len());
    let mut ss = Vec::with_capacity(parts.len());
    let mut vhs = Vec::with_capacity(parts.len());
    for p in parts {
        us.extend(p.u);
        ss.push(p.s);
        vhs.extend(p.vh);
    }
    let batch_shape = view.batch_shape();
    Ok(SvdResult {
        u: if compute_uv {
            Some(stack_matrices(batch_shape, m, u_cols, us)?)
        } else {
            None
        },
        s: stack_vectors(batch_shape, k, ss)?,
        vh: if compute_uv {
            Some(stack_matrices(batch_shape, vh_rows, n, vhs)?)
        } else {
            None
        },
        info: stack_values(batch_shape, statuses)?,
    })
}

#[cfg(test)]
#[path = "svd_test.rs"]
mod tests;

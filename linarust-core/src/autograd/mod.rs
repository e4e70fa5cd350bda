//! Forward- and reverse-mode differentiation rules for the factorizations
//! and solves in [`crate::ops::linalg`].
//!
//! Rules follow one convention for real and complex inputs: a cotangent `ā`
//! of an input `a` is the tensor with `δloss = Re tr(āᴴ·δa)`. Tangents and
//! cotangents have the same shape as the value they belong to.
//!
//! Factorizations are wrapped in the tagged [`Factorization`] enum, whose
//! [`jvp`](Factorization::jvp) and [`vjp`](Factorization::vjp) dispatch on the
//! tag. Solve-layer rules are plain functions in [`solve`].

pub mod cholesky;
pub mod eigh;
pub mod grad_check;
pub mod lu;
pub mod qr;
pub mod solve;
pub mod svd;

pub use grad_check::{check_vjp, GradCheckError};
pub use solve::{det_jvp, det_vjp, inv_jvp, inv_vjp, solve_jvp, solve_triangular_jvp, solve_triangular_vjp, solve_vjp};

use crate::batch::BatchView;
use crate::error::LinaRustError;
use crate::ops::linalg::{self, LuFactorResult, QrMode};
use crate::scalar::Scalar;
use crate::status::Status;
use crate::tensor::Tensor;

/// Selects the factorization computed by [`Factorization::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorKind {
    /// `L` (or `U = Lᴴ`) from the `lower` (or upper) triangle.
    Cholesky { lower: bool },
    /// Packed pivoted LU.
    Lu,
    /// Reduced QR, `m ≥ n`.
    Qr,
    Eigh { lower: bool },
    /// Reduced SVD; with `compute_uv = false` only `s` is differentiated.
    Svd { compute_uv: bool },
}

/// A factorization of `a` together with everything its rules need.
#[derive(Debug, Clone, PartialEq)]
pub enum Factorization<T: Scalar> {
    Cholesky {
        a: Tensor<T>,
        lower: bool,
        factor: Tensor<T>,
        info: Tensor<Status>,
    },
    Lu {
        a: Tensor<T>,
        result: LuFactorResult<T>,
    },
    Qr {
        a: Tensor<T>,
        q: Tensor<T>,
        r: Tensor<T>,
    },
    Eigh {
        a: Tensor<T>,
        lower: bool,
        w: Tensor<T::Real>,
        v: Tensor<T>,
        info: Tensor<Status>,
    },
    Svd {
        a: Tensor<T>,
        compute_uv: bool,
        u: Tensor<T>,
        s: Tensor<T::Real>,
        vh: Tensor<T>,
        info: Tensor<Status>,
    },
}

/// Tangent or cotangent of a factorization's outputs.
///
/// `None` in a cotangent means the loss does not depend on that output.
#[derive(Debug, Clone, PartialEq)]
pub enum FactorSensitivity<T: Scalar> {
    Cholesky { factor: Tensor<T> },
    Lu { lu: Tensor<T> },
    Qr { q: Tensor<T>, r: Tensor<T> },
    Eigh { w: Tensor<T::Real>, v: Option<Tensor<T>> },
    Svd {
        u: Option<Tensor<T>>,
        s: Tensor<T::Real>,
        vh: Option<Tensor<T>>,
    },
}

impl<T: Scalar> Factorization<T> {
    /// Factorizes `a` as selected by `kind`.
    pub fn compute(kind: FactorKind, a: &Tensor<T>) -> Result<Self, LinaRustError> {
        log::debug!("Factorization::compute: kind={:?} shape={:?}", kind, a.shape());
        match kind {
            FactorKind::Cholesky { lower } => {
                let result = linalg::cholesky(a, lower)?;
                Ok(Factorization::Cholesky {
                    a: a.clone(),
                    lower,
                    factor: result.factor,
                    info: result.info,
                })
            }
            FactorKind::Lu => Ok(Factorization::Lu {
                a: a.clone(),
                result: linalg::lu_factor(a)?,
            }),
            FactorKind::Qr => {
                let view = BatchView::matrices(a, "Factorization::compute (qr)")?;
                if view.rows() < view.cols() {
                    return Err(LinaRustError::UnsupportedOperation(format!(
                        "qr differentiation needs rows >= cols, got shape {:?}",
                        a.shape()
                    )));
                }
                let result = linalg::qr(a, QrMode::Economic)?;
                let q = result.q.ok_or_else(|| {
                    LinaRustError::InternalError("economic qr returned no Q".to_string())
                })?;
                Ok(Factorization::Qr {
                    a: a.clone(),
                    q,
                    r: result.r,
                })
            }
            FactorKind::Eigh { lower } => {
                let result = linalg::eigh(a, lower, false)?;
                let v = result.eigenvectors.ok_or_else(|| {
                    LinaRustError::InternalError("eigh returned no eigenvectors".to_string())
                })?;
                Ok(Factorization::Eigh {
                    a: a.clone(),
                    lower,
                    w: result.eigenvalues,
                    v,
                    info: result.info,
                })
            }
            FactorKind::Svd { compute_uv } => {
                // Vectors are needed by the rules even when only `s` is differentiated.
                let result = linalg::svd(a, false, true)?;
                match (result.u, result.vh) {
                    (Some(u), Some(vh)) => Ok(Factorization::Svd {
                        a: a.clone(),
                        compute_uv,
                        u,
                        s: result.s,
                        vh,
                        info: result.info,
                    }),
                    _ => Err(LinaRustError::InternalError(
                        "svd returned no singular vectors".to_string(),
                    )),
                }
            }
        }
    }

    pub fn kind(&self) -> FactorKind {
        match self {
            Factorization::Cholesky { lower, .. } => FactorKind::Cholesky { lower: *lower },
            Factorization::Lu { .. } => FactorKind::Lu,
            Factorization::Qr { .. } => FactorKind::Qr,
            Factorization::Eigh { lower, .. } => FactorKind::Eigh { lower: *lower },
            Factorization::Svd { compute_uv, .. } => FactorKind::Svd {
                compute_uv: *compute_uv,
            },
        }
    }

    /// The factorized input.
    pub fn input(&self) -> &Tensor<T> {
        match self {
            Factorization::Cholesky { a, .. }
            | Factorization::Lu { a, .. }
            | Factorization::Qr { a, .. }
            | Factorization::Eigh { a, .. }
            | Factorization::Svd { a, .. } => a,
        }
    }

    /// Per-element statuses. QR never fails.
    pub fn info(&self) -> Tensor<Status> {
        match self {
            Factorization::Cholesky { info, .. }
            | Factorization::Eigh { info, .. }
            | Factorization::Svd { info, .. } => info.clone(),
            Factorization::Lu { result, .. } => result.info.clone(),
            Factorization::Qr { a, .. } => {
                let batch = &a.shape()[..a.rank().saturating_sub(2)];
                crate::tensor::full(batch, Status::Success)
            }
        }
    }

    /// Output tangents for an input tangent `da`.
    pub fn jvp(&self, da: &Tensor<T>) -> Result<FactorSensitivity<T>, LinaRustError> {
        match self {
            Factorization::Cholesky { lower, factor, .. } => Ok(FactorSensitivity::Cholesky {
                factor: cholesky::cholesky_jvp(factor, da, *lower)?,
            }),
            Factorization::Lu { result, .. } => Ok(FactorSensitivity::Lu {
                lu: lu::lu_jvp(&result.lu, &result.permutation, da)?,
            }),
            Factorization::Qr { q, r, .. } => {
                let (dq, dr) = qr::qr_jvp(q, r, da)?;
                Ok(FactorSensitivity::Qr { q: dq, r: dr })
            }
            Factorization::Eigh { w, v, .. } => {
                let (dw, dv) = eigh::eigh_jvp(w, v, da)?;
                Ok(FactorSensitivity::Eigh { w: dw, v: Some(dv) })
            }
            Factorization::Svd {
                compute_uv, u, s, vh, ..
            } => {
                let (du, ds, dvh) = svd::svd_jvp(u, s, vh, da, *compute_uv)?;
                Ok(FactorSensitivity::Svd { u: du, s: ds, vh: dvh })
            }
        }
    }

    /// Input cotangent for output cotangents `ct`, which must be the
    /// [`FactorSensitivity`] variant matching this factorization.
    pub fn vjp(&self, ct: &FactorSensitivity<T>) -> Result<Tensor<T>, LinaRustError> {
        match (self, ct) {
            (Factorization::Cholesky { lower, factor, .. }, FactorSensitivity::Cholesky { factor: factor_bar }) => {
                cholesky::cholesky_vjp(factor, factor_bar, *lower)
            }
            (Factorization::Lu { result, .. }, FactorSensitivity::Lu { lu: lu_bar }) => {
                lu::lu_vjp(&result.lu, &result.permutation, lu_bar)
            }
            (Factorization::Qr { q, r, .. }, FactorSensitivity::Qr { q: q_bar, r: r_bar }) => {
                qr::qr_vjp(q, r, q_bar, r_bar)
            }
            (Factorization::Eigh { w, v, .. }, FactorSensitivity::Eigh { w: w_bar, v: v_bar }) => {
                eigh::eigh_vjp(w, v, w_bar, v_bar.as_ref())
            }
            (
                Factorization::Svd {
                    compute_uv, u, s, vh, ..
                },
                FactorSensitivity::Svd {
                    u: u_bar,
                    s: s_bar,
                    vh: vh_bar,
                },
            ) => {
                let (u_bar, vh_bar) = if *compute_uv {
                    (u_bar.as_ref(), vh_bar.as_ref())
                } else {
                    (None, None)
                };
                svd::svd_vjp(u, s, vh, u_bar, s_bar, vh_bar)
            }
            _ => Err(LinaRustError::UnsupportedOperation(format!(
                "cotangent does not match a {:?} factorization",
                self.kind()
            ))),
        }
    }
}

/// Matrix views of `tensors`, checked to share the batch dimensions of the
/// first one.
pub(crate) fn matrix_views<'a, T: Scalar>(
    tensors: &[&'a Tensor<T>],
    operation: &str,
) -> Result<Vec<BatchView<'a, T>>, LinaRustError> {
    let mut views: Vec<BatchView<'a, T>> = Vec::with_capacity(tensors.len());
    for t in tensors {
        let view = BatchView::matrices(t, operation)?;
        if let Some(first) = views.first() {
            first.ensure_same_batch(&view, operation)?;
        }
        views.push(view);
    }
    Ok(views)
}

/// Fails unless the core of `view` is `rows × cols`.
pub(crate) fn expect_core<T: Copy>(
    view: &BatchView<'_, T>,
    rows: usize,
    cols: usize,
    operation: &str,
) -> Result<(), LinaRustError> {
    if view.rows() != rows || view.cols() != cols {
        return Err(LinaRustError::ShapeMismatch {
            expected: vec![rows, cols],
            actual: view.core_shape().to_vec(),
            operation: operation.to_string(),
        });
    }
    Ok(())
}

/// Vector view of a real-valued tensor (eigenvalues, singular values),
/// checked against the batch of `like` and for `len` entries per element.
pub(crate) fn real_vectors<'a, R: Copy, T: Copy>(
    values: &'a Tensor<R>,
    like: &BatchView<'_, T>,
    len: usize,
    operation: &str,
) -> Result<BatchView<'a, R>, LinaRustError> {
    let view = BatchView::vectors(values, operation)?;
    like.ensure_same_batch(&view, operation)?;
    if view.rows() != len {
        return Err(LinaRustError::ShapeMismatch {
            expected: vec![len],
            actual: view.core_shape().to_vec(),
            operation: operation.to_string(),
        });
    }
    Ok(view)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

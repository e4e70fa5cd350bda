use super::matrix::{Mat, MatRef};
use crate::batch::{map_batch, stack_matrices, BatchConfig, BatchView};
use crate::error::LinaRustError;
use crate::scalar::Scalar;
use crate::tensor::Tensor;
use log::debug;
use num_traits::{Float, Zero};

/// Which factors [`qr`] materializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrMode {
    /// `Q` is `m × m`, `R` is `m × n`.
    #[default]
    Full,
    /// `Q` is `m × k`, `R` is `k × n`, with `k = min(m, n)`.
    Economic,
    /// Only `R` (`m × n`) is returned.
    R,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QrResult<T> {
    /// Absent in [`QrMode::R`].
    pub q: Option<Tensor<T>>,
    pub r: Tensor<T>,
}

/// Elementary reflector `H = I - tau·v·vᴴ` acting on rows `offset..`.
struct Reflector<T> {
    offset: usize,
    v: Vec<T>,
    tau: T,
}

impl<T: Scalar> Reflector<T> {
    /// Builds the reflector that maps `[alpha, x]` to `[beta, 0]` with real
    /// `beta`, as LAPACK's `larfg` does.
    fn generate(offset: usize, alpha: T, x: &[T]) -> Reflector<T> {
        let xnorm_sq = x
            .iter()
            .fold(T::Real::zero(), |acc, v| acc + v.modulus_sq());
        let mut v = Vec::with_capacity(x.len() + 1);
        v.push(T::one());
        if xnorm_sq == T::Real::zero() && alpha.im() == T::Real::zero() {
            v.extend(std::iter::repeat(T::zero()).take(x.len()));
            return Reflector {
                offset,
                v,
                tau: T::zero(),
            };
        }
        let norm = (alpha.modulus_sq() + xnorm_sq).sqrt();
        let beta = if alpha.re() >= T::Real::zero() { -norm } else { norm };
        let beta_t = T::from_re(beta);
        let tau = (beta_t - alpha) / beta_t;
        let scale = T::one() / (alpha - beta_t);
        v.extend(x.iter().map(|&xi| xi * scale));
        Reflector { offset, v, tau }
    }

    /// `beta` for the column this reflector was generated from.
    fn beta(&self, alpha: T, x: &[T]) -> T {
        if self.tau == T::zero() {
            return alpha;
        }
        let xnorm_sq = x
            .iter()
            .fold(T::Real::zero(), |acc, v| acc + v.modulus_sq());
        let norm = (alpha.modulus_sq() + xnorm_sq).sqrt();
        T::from_re(if alpha.re() >= T::Real::zero() { -norm } else { norm })
    }

    /// `m ← (I - t·v·vᴴ)·m` on columns `from..` with `t = tau` or `conj(tau)`.
    fn apply(&self, m: &mut Mat<T>, from: usize, adjoint: bool) {
        if self.tau == T::zero() {
            return;
        }
        let t = if adjoint { self.tau.conj() } else { self.tau };
        for c in from..m.cols() {
            let mut w = T::zero();
            for (i, &vi) in self.v.iter().enumerate() {
                w += vi.conj() * m[(self.offset + i, c)];
            }
            if w == T::zero() {
                continue;
            }
            let tw = t * w;
            for (i, &vi) in self.v.iter().enumerate() {
                m[(self.offset + i, c)] -= vi * tw;
            }
        }
    }
}

/// Householder QR of one matrix. `R` always comes back `m × n`; `Q` is
/// `m × q_cols` when requested.
pub(crate) fn qr_kernel<T: Scalar>(a: MatRef<'_, T>, q_cols: Option<usize>) -> (Option<Mat<T>>, Mat<T>) {
    let (m, n) = (a.rows(), a.cols());
    let k = m.min(n);
    let mut r = a.to_owned();
    let mut reflectors = Vec::with_capacity(k);
    for j in 0..k {
        let alpha = r[(j, j)];
        let below: Vec<T> = (j + 1..m).map(|i| r[(i, j)]).collect();
        let h = Reflector::generate(j, alpha, &below);
        let beta = h.beta(alpha, &below);
        h.apply(&mut r, j + 1, true);
        r[(j, j)] = beta;
        for i in j + 1..m {
            r[(i, j)] = T::zero();
        }
        reflectors.push(h);
    }
    let q = q_cols.map(|cols| {
        let mut q: Mat<T> = Mat::eye(m, cols);
        for h in reflectors.iter().rev() {
            h.apply(&mut q, 0, false);
        }
        q
    });
    (q, r)
}

/// QR decomposition `A = Q·R` by Householder reflections.
///
/// `Q` has orthonormal columns and `R` is upper triangular with a real
/// diagonal (also for complex input). See [`QrMode`] for the output shapes.
pub fn qr<T: Scalar>(a: &Tensor<T>, mode: QrMode) -> Result<QrResult<T>, LinaRustError> {
    let view = BatchView::matrices(a, "qr")?;
    let (m, n) = (view.rows(), view.cols());
    let k = m.min(n);
    debug!("qr: batch={} shape=[{}, {}] mode={:?} dtype={:?}", view.len(), m, n, mode, T::DTYPE);
    let (q_cols, r_rows) = match mode {
        QrMode::Full => (Some(m), m),
        QrMode::Economic => (Some(k), k),
        QrMode::R => (None, m),
    };
    let parts = map_batch(view.len(), view.element_bytes(), BatchConfig::global(), |i| {
        let (q, r) = qr_kernel(view.matrix(i), q_cols);
        (q, r.block(0, 0, r_rows, n))
    });
    let mut qs = Vec::with_capacity(parts.len());
    let mut rs = Vec::with_capacity(parts.len());
    for (q, r) in parts {
        if let Some(q) = q {
            qs.push(q);
        }
        rs.push(r);
    }
    let batch_shape = view.batch_shape();
    Ok(QrResult {
        q: match q_cols {
            Some(cols) => Some(stack_matrices(batch_shape, m, cols, qs)?),
            None => None,
        },
        r: stack_matrices(batch_shape, r_rows, n, rs)?,
    })
}

#[cfg(test)]
#[path = "qr_test.rs"]
mod tests;

use super::matrix::{Mat, MatRef};
use super::RhsLayout;
use crate::batch::{map_batch, BatchConfig, BatchView};
use crate::error::LinaRustError;
use crate::scalar::Scalar;
use crate::tensor::Tensor;
use log::debug;
use std::sync::Arc;

/// Which form of `A` a triangular solve applies: `A`, `Aᵀ` or `Aᴴ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trans {
    #[default]
    N,
    T,
    C,
}

impl Trans {
    /// The integer code used by LAPACK-style interfaces (0, 1, 2).
    pub fn from_code(code: u8) -> Option<Trans> {
        match code {
            0 => Some(Trans::N),
            1 => Some(Trans::T),
            2 => Some(Trans::C),
            _ => None,
        }
    }

    #[inline]
    fn read<T: Scalar>(self, a: MatRef<'_, T>, i: usize, k: usize) -> T {
        match self {
            Trans::N => a[(i, k)],
            Trans::T => a[(k, i)],
            Trans::C => a[(k, i)].conj(),
        }
    }
}

fn band_mask<T: Scalar>(m: &Tensor<T>, keep: impl Fn(isize) -> bool, operation: &str) -> Result<Tensor<T>, LinaRustError> {
    let view = BatchView::matrices(m, operation)?;
    let (rows, cols) = (view.rows(), view.cols());
    let per = rows * cols;
    let data = m
        .data()
        .iter()
        .enumerate()
        .map(|(idx, &x)| {
            let within = idx % per.max(1);
            let (i, j) = (within / cols.max(1), within % cols.max(1));
            if keep(j as isize - i as isize) {
                x
            } else {
                T::zero()
            }
        })
        .collect();
    Ok(Tensor {
        data: Arc::new(data),
        shape: m.shape().to_vec(),
    })
}

/// Lower triangle of every matrix in the batch: entries with `j - i <= k`
/// are kept, all others zeroed.
pub fn tril<T: Scalar>(m: &Tensor<T>, k: isize) -> Result<Tensor<T>, LinaRustError> {
    band_mask(m, |d| d <= k, "tril")
}

/// Upper triangle of every matrix in the batch: entries with `j - i >= k`
/// are kept, all others zeroed.
pub fn triu<T: Scalar>(m: &Tensor<T>, k: isize) -> Result<Tensor<T>, LinaRustError> {
    band_mask(m, |d| d >= k, "triu")
}

/// Solves `op(A)·X = B` by substitution, overwriting `b` with `X`.
///
/// Only the `lower` (or upper) triangle of `a` is read, and with
/// `unit_diagonal` the diagonal is not read either. A zero on the diagonal
/// produces non-finite values.
pub(crate) fn solve_triangular_in_place<T: Scalar>(
    a: MatRef<'_, T>,
    b: &mut Mat<T>,
    trans: Trans,
    lower: bool,
    unit_diagonal: bool,
) {
    let n = a.rows();
    let forward = lower == (trans == Trans::N);
    for col in 0..b.cols() {
        if forward {
            for i in 0..n {
                let mut acc = b[(i, col)];
                for k in 0..i {
                    acc -= trans.read(a, i, k) * b[(k, col)];
                }
                b[(i, col)] = if unit_diagonal { acc } else { acc / trans.read(a, i, i) };
            }
        } else {
            for i in (0..n).rev() {
                let mut acc = b[(i, col)];
                for k in i + 1..n {
                    acc -= trans.read(a, i, k) * b[(k, col)];
                }
                b[(i, col)] = if unit_diagonal { acc } else { acc / trans.read(a, i, i) };
            }
        }
    }
}

/// `op(A)⁻¹·B` as a new matrix.
pub(crate) fn tri_solve<T: Scalar>(a: &Mat<T>, b: &Mat<T>, trans: Trans, lower: bool, unit_diagonal: bool) -> Mat<T> {
    let mut x = b.clone();
    solve_triangular_in_place(a.as_ref(), &mut x, trans, lower, unit_diagonal);
    x
}

/// `B·A⁻¹` (or `B·A⁻ᴴ` with `adjoint_a`) for a triangular `A`.
pub(crate) fn tri_solve_right<T: Scalar>(b: &Mat<T>, a: &Mat<T>, adjoint_a: bool, lower: bool, unit_diagonal: bool) -> Mat<T> {
    // X·A = B  <=>  Aᴴ·Xᴴ = Bᴴ
    let trans = if adjoint_a { Trans::N } else { Trans::C };
    tri_solve(a, &b.adjoint(), trans, lower, unit_diagonal).adjoint()
}

/// Solves `op(A)·x = b` for triangular `A`, batched.
///
/// `trans` selects `A`, `Aᵀ` or `Aᴴ`. Only the triangle named by `lower` is
/// read; the other triangle may hold anything. With `unit_diagonal` the
/// diagonal is assumed to be all ones and is not read. `b` is a vector batch
/// when it has one axis fewer than `a`.
pub fn solve_triangular<T: Scalar>(
    a: &Tensor<T>,
    b: &Tensor<T>,
    trans: Trans,
    lower: bool,
    unit_diagonal: bool,
) -> Result<Tensor<T>, LinaRustError> {
    let a_view = BatchView::square_matrices(a, "solve_triangular")?;
    let rhs = RhsLayout::new(&a_view, b, "solve_triangular")?;
    debug!(
        "solve_triangular: batch={} n={} dtype={:?} trans={:?} lower={}",
        a_view.len(),
        a_view.rows(),
        T::DTYPE,
        trans,
        lower
    );
    let config = BatchConfig::global();
    let solutions = map_batch(
        a_view.len(),
        a_view.element_bytes() + rhs.element_bytes(),
        config,
        |i| {
            let mut x = rhs.get(i);
            solve_triangular_in_place(a_view.matrix(i), &mut x, trans, lower, unit_diagonal);
            x
        },
    );
    rhs.assemble(solutions)
}

#[cfg(test)]
#[path = "triangular_test.rs"]
mod tests;

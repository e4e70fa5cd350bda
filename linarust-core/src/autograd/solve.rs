//! Rules for the solve layer: `solve`, `solve_triangular`, `det` and `inv`.
//!
//! These are not factorizations, so they are free functions taking the
//! primal inputs and outputs they need.

use super::{expect_core, matrix_views};
use crate::batch::{map_batch, stack_matrices, stack_values, BatchConfig, BatchView};
use crate::error::LinaRustError;
use crate::ops::linalg::lu::{lu_kernel, lu_solve_kernel};
use crate::ops::linalg::matrix::{Mat, MatRef};
use crate::ops::linalg::triangular::{tri_solve, Trans};
use crate::ops::linalg::RhsLayout;
use crate::scalar::Scalar;
use crate::tensor::Tensor;
use log::debug;

/// Solves `op(A)·X = B` for each right-hand side in `rhs`, sharing one LU of
/// `a`. Singular `A` gives NaN solutions.
fn lu_solve_all<T: Scalar>(a: MatRef<'_, T>, rhs: &[&Mat<T>], trans: Trans) -> Vec<Mat<T>> {
    let parts = lu_kernel(a, true);
    rhs.iter()
        .map(|b| {
            if parts.status.is_success() {
                lu_solve_kernel(parts.lu.as_ref(), &parts.perm, b, trans)
            } else {
                Mat::nan(b.rows(), b.cols())
            }
        })
        .collect()
}

/// Tangent of `x = A⁻¹·b`: `δx = A⁻¹·(δb - δA·x)`.
///
/// `x`, `db` and the result share the layout of `b` (vector or matrix batch).
pub fn solve_jvp<T: Scalar>(a: &Tensor<T>, x: &Tensor<T>, da: &Tensor<T>, db: &Tensor<T>) -> Result<Tensor<T>, LinaRustError> {
    let views = matrix_views(&[a, da], "solve_jvp")?;
    let (av, dav) = (&views[0], &views[1]);
    let n = av.rows();
    expect_core(av, n, n, "solve_jvp")?;
    expect_core(dav, n, n, "solve_jvp")?;
    let xs = RhsLayout::new(av, x, "solve_jvp")?;
    let dbs = RhsLayout::new(av, db, "solve_jvp")?;
    debug!("solve_jvp: batch={} n={}", av.len(), n);
    let tangents = map_batch(av.len(), 2 * av.element_bytes() + 2 * xs.element_bytes(), BatchConfig::global(), |i| {
        let residual = dbs.get(i).sub(&dav.matrix(i).to_owned().matmul(&xs.get(i)));
        lu_solve_all(av.matrix(i), &[&residual], Trans::N).remove(0)
    });
    xs.assemble(tangents)
}

/// Cotangents `(Ā, b̄)` of `x = A⁻¹·b`: `b̄ = A⁻ᴴ·x̄` and `Ā = -b̄·xᴴ`.
pub fn solve_vjp<T: Scalar>(a: &Tensor<T>, x: &Tensor<T>, x_bar: &Tensor<T>) -> Result<(Tensor<T>, Tensor<T>), LinaRustError> {
    let av = BatchView::square_matrices(a, "solve_vjp")?;
    let n = av.rows();
    let xs = RhsLayout::new(&av, x, "solve_vjp")?;
    let xbs = RhsLayout::new(&av, x_bar, "solve_vjp")?;
    debug!("solve_vjp: batch={} n={}", av.len(), n);
    let pairs = map_batch(av.len(), av.element_bytes() + 2 * xs.element_bytes(), BatchConfig::global(), |i| {
        let b_bar = lu_solve_all(av.matrix(i), &[&xbs.get(i)], Trans::C).remove(0);
        let a_bar = b_bar.matmul_adjoint(&xs.get(i)).scale(-T::one());
        (a_bar, b_bar)
    });
    let (a_bars, b_bars): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
    Ok((stack_matrices(av.batch_shape(), n, n, a_bars)?, xs.assemble(b_bars)?))
}

/// `op(mask(A))` as an explicit matrix, with the triangle it occupies.
///
/// `mask` keeps the declared triangle; with `unit_diagonal` the diagonal is
/// replaced by ones (or zeros for tangents, via `diagonal`).
fn masked_operand<T: Scalar>(a: &Mat<T>, trans: Trans, lower: bool, diagonal: Option<T>) -> (Mat<T>, bool) {
    let n = a.rows();
    let masked = Mat::from_fn(n, n, |i, j| {
        if i == j {
            diagonal.unwrap_or(a[(i, i)])
        } else if (lower && i > j) || (!lower && i < j) {
            a[(i, j)]
        } else {
            T::zero()
        }
    });
    match trans {
        Trans::N => (masked, lower),
        Trans::T => (masked.transpose(), !lower),
        Trans::C => (masked.adjoint(), !lower),
    }
}

/// Tangent of `x = op(A)⁻¹·b` for triangular `A`. Only the declared part of
/// `da` (without the diagonal when `unit_diagonal`) contributes.
#[allow(clippy::too_many_arguments)]
pub fn solve_triangular_jvp<T: Scalar>(
    a: &Tensor<T>,
    x: &Tensor<T>,
    da: &Tensor<T>,
    db: &Tensor<T>,
    trans: Trans,
    lower: bool,
    unit_diagonal: bool,
) -> Result<Tensor<T>, LinaRustError> {
    let views = matrix_views(&[a, da], "solve_triangular_jvp")?;
    let (av, dav) = (&views[0], &views[1]);
    let n = av.rows();
    expect_core(av, n, n, "solve_triangular_jvp")?;
    expect_core(dav, n, n, "solve_triangular_jvp")?;
    let xs = RhsLayout::new(av, x, "solve_triangular_jvp")?;
    let dbs = RhsLayout::new(av, db, "solve_triangular_jvp")?;
    debug!("solve_triangular_jvp: batch={} n={} trans={:?}", av.len(), n, trans);
    let unit = unit_diagonal.then(T::one);
    let unit_tangent = unit_diagonal.then(T::zero);
    let tangents = map_batch(av.len(), 2 * av.element_bytes() + 2 * xs.element_bytes(), BatchConfig::global(), |i| {
        let (m, m_lower) = masked_operand(&av.matrix(i).to_owned(), trans, lower, unit);
        let (dm, _) = masked_operand(&dav.matrix(i).to_owned(), trans, lower, unit_tangent);
        let residual = dbs.get(i).sub(&dm.matmul(&xs.get(i)));
        tri_solve(&m, &residual, Trans::N, m_lower, unit_diagonal)
    });
    xs.assemble(tangents)
}

/// Cotangents `(Ā, b̄)` of `x = op(A)⁻¹·b` for triangular `A`.
///
/// `Ā` is zero outside the declared triangle (and on the diagonal when
/// `unit_diagonal`).
pub fn solve_triangular_vjp<T: Scalar>(
    a: &Tensor<T>,
    x: &Tensor<T>,
    x_bar: &Tensor<T>,
    trans: Trans,
    lower: bool,
    unit_diagonal: bool,
) -> Result<(Tensor<T>, Tensor<T>), LinaRustError> {
    let av = BatchView::square_matrices(a, "solve_triangular_vjp")?;
    let n = av.rows();
    let xs = RhsLayout::new(&av, x, "solve_triangular_vjp")?;
    let xbs = RhsLayout::new(&av, x_bar, "solve_triangular_vjp")?;
    debug!("solve_triangular_vjp: batch={} n={} trans={:?}", av.len(), n, trans);
    let unit = unit_diagonal.then(T::one);
    let unit_tangent = unit_diagonal.then(T::zero);
    let pairs = map_batch(av.len(), av.element_bytes() + 2 * xs.element_bytes(), BatchConfig::global(), |i| {
        let (m, m_lower) = masked_operand(&av.matrix(i).to_owned(), trans, lower, unit);
        let b_bar = tri_solve(&m, &xbs.get(i), Trans::C, m_lower, unit_diagonal);
        let m_bar = b_bar.matmul_adjoint(&xs.get(i)).scale(-T::one());
        let a_bar = match trans {
            Trans::N => m_bar,
            Trans::T => m_bar.transpose(),
            Trans::C => m_bar.adjoint(),
        };
        let (a_bar, _) = masked_operand(&a_bar, Trans::N, lower, unit_tangent);
        (a_bar, b_bar)
    });
    let (a_bars, b_bars): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
    Ok((stack_matrices(av.batch_shape(), n, n, a_bars)?, xs.assemble(b_bars)?))
}

/// Per-element determinants as a view, checked against the batch of `like`.
fn det_values<'a, T: Scalar>(d: &'a Tensor<T>, like: &BatchView<'_, T>, operation: &str) -> Result<BatchView<'a, T>, LinaRustError> {
    let view = BatchView::new(d, 0, operation)?;
    like.ensure_same_batch(&view, operation)?;
    Ok(view)
}

/// Tangent of `d = det(A)`: `δd = d·tr(A⁻¹·δA)`.
pub fn det_jvp<T: Scalar>(a: &Tensor<T>, d: &Tensor<T>, da: &Tensor<T>) -> Result<Tensor<T>, LinaRustError> {
    let views = matrix_views(&[a, da], "det_jvp")?;
    let (av, dav) = (&views[0], &views[1]);
    let n = av.rows();
    expect_core(av, n, n, "det_jvp")?;
    expect_core(dav, n, n, "det_jvp")?;
    let dv = det_values(d, av, "det_jvp")?;
    debug!("det_jvp: batch={} n={}", av.len(), n);
    let tangents = map_batch(av.len(), 2 * av.element_bytes(), BatchConfig::global(), |i| {
        let solved = lu_solve_all(av.matrix(i), &[&dav.matrix(i).to_owned()], Trans::N).remove(0);
        let trace: T = solved.diag().into_iter().sum();
        dv.get(i)[0] * trace
    });
    stack_values(av.batch_shape(), tangents)
}

/// Cotangent of `d = det(A)`: `Ā = d̄·conj(d)·A⁻ᴴ`. NaN for singular `A`.
pub fn det_vjp<T: Scalar>(a: &Tensor<T>, d: &Tensor<T>, d_bar: &Tensor<T>) -> Result<Tensor<T>, LinaRustError> {
    let av = BatchView::square_matrices(a, "det_vjp")?;
    let n = av.rows();
    let dv = det_values(d, &av, "det_vjp")?;
    let dbv = det_values(d_bar, &av, "det_vjp")?;
    debug!("det_vjp: batch={} n={}", av.len(), n);
    let identity = Mat::identity(n);
    let cotangents = map_batch(av.len(), 2 * av.element_bytes(), BatchConfig::global(), |i| {
        let inv_h = lu_solve_all(av.matrix(i), &[&identity], Trans::C).remove(0);
        inv_h.scale(dbv.get(i)[0] * dv.get(i)[0].conj())
    });
    stack_matrices(av.batch_shape(), n, n, cotangents)
}

/// Tangent of `X = A⁻¹` given `X`: `δX = -X·δA·X`.
pub fn inv_jvp<T: Scalar>(x: &Tensor<T>, da: &Tensor<T>) -> Result<Tensor<T>, LinaRustError> {
    let views = matrix_views(&[x, da], "inv_jvp")?;
    let (xv, dav) = (&views[0], &views[1]);
    let n = xv.rows();
    expect_core(xv, n, n, "inv_jvp")?;
    expect_core(dav, n, n, "inv_jvp")?;
    debug!("inv_jvp: batch={} n={}", xv.len(), n);
    let tangents = map_batch(xv.len(), 2 * xv.element_bytes(), BatchConfig::global(), |i| {
        let x = xv.matrix(i).to_owned();
        x.matmul(&dav.matrix(i).to_owned()).matmul(&x).scale(-T::one())
    });
    stack_matrices(xv.batch_shape(), n, n, tangents)
}

/// Cotangent of `X = A⁻¹` given `X`: `Ā = -Xᴴ·X̄·Xᴴ`.
pub fn inv_vjp<T: Scalar>(x: &Tensor<T>, x_bar: &Tensor<T>) -> Result<Tensor<T>, LinaRustError> {
    let views = matrix_views(&[x, x_bar], "inv_vjp")?;
    let (xv, xbv) = (&views[0], &views[1]);
    let n = xv.rows();
    expect_core(xv, n, n, "inv_vjp")?;
    expect_core(xbv, n, n, "inv_vjp")?;
    debug!("inv_vjp: batch={} n={}", xv.len(), n);
    let cotangents = map_batch(xv.len(), 2 * xv.element_bytes(), BatchConfig::global(), |i| {
        let x = xv.matrix(i).to_owned();
        x.adjoint_matmul(&xbv.matrix(i).to_owned())
            .matmul_adjoint(&x)
            .scale(-T::one())
    });
    stack_matrices(xv.batch_shape(), n, n, cotangents)
}

#[cfg(test)]
#[path = "solve_test.rs"]
mod tests;

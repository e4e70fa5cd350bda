//! Single-matrix storage used inside the kernels.
//!
//! `Mat` is an owned row-major matrix and `MatRef` a borrowed one; both are
//! what a batch element looks like once the batch layer has stripped the
//! leading dimensions. Nothing here knows about batches.

use crate::scalar::Scalar;
use num_traits::Zero;
use std::ops::{Index, IndexMut};

/// Borrowed row-major matrix.
#[derive(Debug, Clone, Copy)]
pub struct MatRef<'a, T> {
    rows: usize,
    cols: usize,
    data: &'a [T],
}

impl<'a, T: Copy> MatRef<'a, T> {
    /// Wraps `data` as a `rows × cols` matrix.
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    pub fn new(rows: usize, cols: usize, data: &'a [T]) -> Self {
        assert_eq!(data.len(), rows * cols, "MatRef data length mismatch");
        MatRef { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn data(&self) -> &'a [T] {
        self.data
    }

    pub fn to_owned(&self) -> Mat<T> {
        Mat {
            rows: self.rows,
            cols: self.cols,
            data: self.data.to_vec(),
        }
    }
}

impl<'a, T> Index<(usize, usize)> for MatRef<'a, T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.data[i * self.cols + j]
    }
}

/// Owned row-major matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Mat<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Index<(usize, usize)> for Mat<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.data[i * self.cols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Mat<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        &mut self.data[i * self.cols + j]
    }
}

impl<T: Copy> Mat<T> {
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), rows * cols, "Mat data length mismatch");
        Mat { rows, cols, data }
    }

    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Mat { rows, cols, data }
    }

    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Mat {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn as_ref(&self) -> MatRef<'_, T> {
        MatRef {
            rows: self.rows,
            cols: self.cols,
            data: &self.data,
        }
    }

    pub fn transpose(&self) -> Mat<T> {
        Mat::from_fn(self.cols, self.rows, |i, j| self[(j, i)])
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    /// Copy of the sub-block starting at `(row, col)`.
    pub fn block(&self, row: usize, col: usize, rows: usize, cols: usize) -> Mat<T> {
        Mat::from_fn(rows, cols, |i, j| self[(row + i, col + j)])
    }

    pub fn column(&self, j: usize) -> Vec<T> {
        (0..self.rows).map(|i| self[(i, j)]).collect()
    }

    pub fn set_column(&mut self, j: usize, values: &[T]) {
        for (i, &v) in values.iter().enumerate() {
            self[(i, j)] = v;
        }
    }

    /// Keeps the columns listed in `order`, in that order.
    pub fn select_columns(&self, order: &[usize]) -> Mat<T> {
        Mat::from_fn(self.rows, order.len(), |i, j| self[(i, order[j])])
    }
}

impl<T: Scalar> Mat<T> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Mat::filled(rows, cols, T::zero())
    }

    pub fn identity(n: usize) -> Self {
        Mat::eye(n, n)
    }

    /// Rectangular identity: ones on the main diagonal.
    pub fn eye(rows: usize, cols: usize) -> Self {
        Mat::from_fn(rows, cols, |i, j| if i == j { T::one() } else { T::zero() })
    }

    pub fn nan(rows: usize, cols: usize) -> Self {
        Mat::filled(rows, cols, T::nan_value())
    }

    pub fn from_diag(values: &[T]) -> Self {
        let n = values.len();
        Mat::from_fn(n, n, |i, j| if i == j { values[i] } else { T::zero() })
    }

    pub fn diag(&self) -> Vec<T> {
        (0..self.rows.min(self.cols)).map(|i| self[(i, i)]).collect()
    }

    /// Conjugate transpose.
    pub fn adjoint(&self) -> Mat<T> {
        Mat::from_fn(self.cols, self.rows, |i, j| self[(j, i)].conj())
    }

    pub fn conj(&self) -> Mat<T> {
        self.map(|x| x.conj())
    }

    pub fn map(&self, f: impl Fn(T) -> T) -> Mat<T> {
        Mat {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    /// `self · rhs`.
    ///
    /// # Panics
    /// Panics on an inner dimension mismatch; callers validate shapes first.
    pub fn matmul(&self, rhs: &Mat<T>) -> Mat<T> {
        assert_eq!(self.cols, rhs.rows, "matmul inner dimension mismatch");
        let (m, k, n) = (self.rows, self.cols, rhs.cols);
        let mut out = vec![T::zero(); m * n];
        for i in 0..m {
            let out_row = &mut out[i * n..(i + 1) * n];
            for l in 0..k {
                let a_il = self.data[i * k + l];
                let rhs_row = &rhs.data[l * n..(l + 1) * n];
                for (o, &b) in out_row.iter_mut().zip(rhs_row) {
                    *o += a_il * b;
                }
            }
        }
        Mat {
            rows: m,
            cols: n,
            data: out,
        }
    }

    /// `selfᴴ · rhs` without materializing the adjoint.
    pub fn adjoint_matmul(&self, rhs: &Mat<T>) -> Mat<T> {
        assert_eq!(self.rows, rhs.rows, "adjoint_matmul dimension mismatch");
        let (k, m, n) = (self.rows, self.cols, rhs.cols);
        let mut out: Mat<T> = Mat::zeros(m, n);
        for l in 0..k {
            for i in 0..m {
                let a = self[(l, i)].conj();
                for j in 0..n {
                    out[(i, j)] += a * rhs[(l, j)];
                }
            }
        }
        out
    }

    /// `self · rhsᴴ` without materializing the adjoint.
    pub fn matmul_adjoint(&self, rhs: &Mat<T>) -> Mat<T> {
        assert_eq!(self.cols, rhs.cols, "matmul_adjoint dimension mismatch");
        Mat::from_fn(self.rows, rhs.rows, |i, j| {
            (0..self.cols)
                .map(|l| self[(i, l)] * rhs[(j, l)].conj())
                .sum()
        })
    }

    pub fn add(&self, rhs: &Mat<T>) -> Mat<T> {
        self.zip_with(rhs, |a, b| a + b)
    }

    pub fn sub(&self, rhs: &Mat<T>) -> Mat<T> {
        self.zip_with(rhs, |a, b| a - b)
    }

    pub fn scale(&self, factor: T) -> Mat<T> {
        self.map(|x| x * factor)
    }

    /// Elementwise product with a real matrix of the same shape.
    pub fn hadamard_real(&self, weights: &Mat<T::Real>) -> Mat<T> {
        assert_eq!((self.rows, self.cols), (weights.rows, weights.cols));
        Mat {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&weights.data)
                .map(|(&x, &w)| x.scale(w))
                .collect(),
        }
    }

    pub fn zip_with(&self, rhs: &Mat<T>, f: impl Fn(T, T) -> T) -> Mat<T> {
        assert_eq!(
            (self.rows, self.cols),
            (rhs.rows, rhs.cols),
            "elementwise shape mismatch"
        );
        Mat {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&rhs.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    /// Hermitian part `(A + Aᴴ) / 2` of a square matrix.
    pub fn hermitian_part(&self) -> Mat<T> {
        let half = T::from_f64(0.5);
        Mat::from_fn(self.rows, self.cols, |i, j| {
            (self[(i, j)] + self[(j, i)].conj()) * half
        })
    }

    /// Entries on or below diagonal `k`, zero elsewhere.
    pub fn tril(&self, k: isize) -> Mat<T> {
        Mat::from_fn(self.rows, self.cols, |i, j| {
            if (j as isize) - (i as isize) <= k {
                self[(i, j)]
            } else {
                T::zero()
            }
        })
    }

    /// Entries on or above diagonal `k`, zero elsewhere.
    pub fn triu(&self, k: isize) -> Mat<T> {
        Mat::from_fn(self.rows, self.cols, |i, j| {
            if (j as isize) - (i as isize) >= k {
                self[(i, j)]
            } else {
                T::zero()
            }
        })
    }

    /// Lower triangle with the diagonal halved.
    pub fn tril_half_diag(&self) -> Mat<T> {
        let half = T::from_f64(0.5);
        Mat::from_fn(self.rows, self.cols, |i, j| match j.cmp(&i) {
            std::cmp::Ordering::Less => self[(i, j)],
            std::cmp::Ordering::Equal => self[(i, j)] * half,
            std::cmp::Ordering::Greater => T::zero(),
        })
    }

    /// Unit lower factor of a packed LU, `rows × min(rows, cols)`.
    pub fn unit_lower(&self) -> Mat<T> {
        let k = self.rows.min(self.cols);
        Mat::from_fn(self.rows, k, |i, j| match j.cmp(&i) {
            std::cmp::Ordering::Less => self[(i, j)],
            std::cmp::Ordering::Equal => T::one(),
            std::cmp::Ordering::Greater => T::zero(),
        })
    }

    /// Upper factor of a packed LU, `min(rows, cols) × cols`.
    pub fn upper(&self) -> Mat<T> {
        let k = self.rows.min(self.cols);
        Mat::from_fn(k, self.cols, |i, j| if j >= i { self[(i, j)] } else { T::zero() })
    }

    /// Squared Frobenius norm.
    pub fn norm_sq(&self) -> T::Real {
        self.data
            .iter()
            .fold(T::Real::zero(), |acc, &x| acc + x.modulus_sq())
    }

    /// Largest modulus of `self - rhs`.
    pub fn max_abs_diff(&self, rhs: &Mat<T>) -> T::Real {
        self.data
            .iter()
            .zip(&rhs.data)
            .fold(T::Real::zero(), |acc, (&a, &b)| {
                let d = (a - b).modulus();
                if d > acc {
                    d
                } else {
                    acc
                }
            })
    }

    /// `Re tr(selfᴴ · rhs)`, the real inner product used by the gradient rules.
    pub fn real_inner(&self, rhs: &Mat<T>) -> T::Real {
        self.data
            .iter()
            .zip(&rhs.data)
            .fold(T::Real::zero(), |acc, (&a, &b)| acc + (a.conj() * b).re())
    }
}

impl<T: Scalar> Mat<T> {
    /// Row permutation matrix `P` with `(P·A)[i] = A[perm[i]]`.
    pub fn permutation(perm: &[usize]) -> Mat<T> {
        let n = perm.len();
        let mut p: Mat<T> = Mat::zeros(n, n);
        for (i, &src) in perm.iter().enumerate() {
            p[(i, src)] = T::one();
        }
        p
    }

    /// Applies `perm` to the rows: `out[i] = self[perm[i]]`.
    pub fn permute_rows(&self, perm: &[usize]) -> Mat<T> {
        Mat::from_fn(perm.len(), self.cols, |i, j| self[(perm[i], j)])
    }

    /// Inverse of [`permute_rows`](Self::permute_rows): `out[perm[i]] = self[i]`.
    pub fn unpermute_rows(&self, perm: &[usize]) -> Mat<T> {
        let mut out: Mat<T> = Mat::zeros(self.rows, self.cols);
        for (i, &dst) in perm.iter().enumerate() {
            for j in 0..self.cols {
                out[(dst, j)] = self[(i, j)];
            }
        }
        out
    }
}

/// `1 / (x_j - x_i)` off the diagonal, zero on it.
///
/// Entries blow up when two values coincide; that is the known boundary of
/// the spectral differentiation rules and is left to the caller.
pub(crate) fn reciprocal_gaps<R: crate::scalar::RealScalar>(values: &[R]) -> Mat<R> {
    let n = values.len();
    Mat::from_fn(n, n, |i, j| {
        if i == j {
            R::zero()
        } else {
            R::one() / (values[j] - values[i])
        }
    })
}

impl<T: Scalar> Default for Mat<T> {
    fn default() -> Self {
        Mat {
            rows: 0,
            cols: 0,
            data: Vec::new(),
        }
    }
}

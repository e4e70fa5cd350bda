//! Batch iteration: every operation in this crate treats the trailing one or
//! two axes of its operands as the core object and maps a single-element
//! kernel over all leading (batch) axes.

pub mod config;
pub mod executor;

pub use config::BatchConfig;
pub use executor::{map_batch, try_map_batch};

use crate::error::LinaRustError;
use crate::ops::linalg::matrix::{Mat, MatRef};
use crate::tensor::utils::{index_to_coord, split_batch_shape};
use crate::tensor::Tensor;
use std::sync::Arc;

/// Read-only view of a tensor as a sequence of core elements.
#[derive(Debug, Clone, Copy)]
pub struct BatchView<'a, T> {
    data: &'a [T],
    batch_shape: &'a [usize],
    core_shape: &'a [usize],
    core_len: usize,
    len: usize,
}

impl<'a, T: Copy> BatchView<'a, T> {
    /// Splits `tensor` into batch dims and `core_rank` core dims.
    pub fn new(tensor: &'a Tensor<T>, core_rank: usize, operation: &str) -> Result<Self, LinaRustError> {
        let (batch_shape, core_shape) =
            split_batch_shape(&tensor.shape, core_rank).ok_or_else(|| LinaRustError::RankTooLow {
                shape: tensor.shape.clone(),
                min_rank: core_rank,
                operation: operation.to_string(),
            })?;
        Ok(BatchView {
            data: tensor.data(),
            batch_shape,
            core_shape,
            core_len: core_shape.iter().product(),
            len: batch_shape.iter().product(),
        })
    }

    pub fn matrices(tensor: &'a Tensor<T>, operation: &str) -> Result<Self, LinaRustError> {
        BatchView::new(tensor, 2, operation)
    }

    /// Matrices whose last two axes must be equal.
    pub fn square_matrices(tensor: &'a Tensor<T>, operation: &str) -> Result<Self, LinaRustError> {
        let view = BatchView::matrices(tensor, operation)?;
        if view.rows() != view.cols() {
            return Err(LinaRustError::NotSquare {
                shape: tensor.shape.clone(),
                operation: operation.to_string(),
            });
        }
        Ok(view)
    }

    pub fn vectors(tensor: &'a Tensor<T>, operation: &str) -> Result<Self, LinaRustError> {
        BatchView::new(tensor, 1, operation)
    }

    /// Number of batch elements (1 for an unbatched operand, 0 for an empty batch).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn batch_shape(&self) -> &'a [usize] {
        self.batch_shape
    }

    pub fn core_shape(&self) -> &'a [usize] {
        self.core_shape
    }

    pub fn rows(&self) -> usize {
        self.core_shape[0]
    }

    pub fn cols(&self) -> usize {
        self.core_shape[self.core_shape.len() - 1]
    }

    /// Approximate bytes of one core element, used to size chunks.
    pub fn element_bytes(&self) -> usize {
        self.core_len * std::mem::size_of::<T>()
    }

    /// Row-major data of element `i`.
    pub fn get(&self, i: usize) -> &'a [T] {
        &self.data[i * self.core_len..(i + 1) * self.core_len]
    }

    /// Element `i` as a matrix. Only meaningful for views with a 2-D core.
    pub fn matrix(&self, i: usize) -> MatRef<'a, T> {
        MatRef::new(self.rows(), self.cols(), self.get(i))
    }

    /// Batch coordinates of element `i`.
    pub fn coord(&self, i: usize) -> Vec<usize> {
        index_to_coord(i, self.batch_shape)
    }

    /// Fails unless `other` has exactly the same batch dimensions.
    pub fn ensure_same_batch<U>(&self, other: &BatchView<'_, U>, operation: &str) -> Result<(), LinaRustError> {
        if self.batch_shape != other.batch_shape {
            return Err(LinaRustError::IncompatibleShapes {
                shape1: self.full_shape(),
                shape2: other.full_shape(),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }
}

impl<'a, T> BatchView<'a, T> {
    fn full_shape(&self) -> Vec<usize> {
        let mut shape = self.batch_shape.to_vec();
        shape.extend_from_slice(self.core_shape);
        shape
    }
}

fn assemble<T>(batch_shape: &[usize], core_shape: &[usize], data: Vec<T>) -> Tensor<T> {
    let mut shape = batch_shape.to_vec();
    shape.extend_from_slice(core_shape);
    Tensor {
        data: Arc::new(data),
        shape,
    }
}

/// Stacks per-element matrices into a `[..batch_shape, rows, cols]` tensor.
pub fn stack_matrices<T: Copy>(
    batch_shape: &[usize],
    rows: usize,
    cols: usize,
    mats: Vec<Mat<T>>,
) -> Result<Tensor<T>, LinaRustError> {
    let mut data = Vec::with_capacity(mats.len() * rows * cols);
    for m in mats {
        if m.rows() != rows || m.cols() != cols {
            return Err(LinaRustError::InternalError(format!(
                "batch element has shape [{}, {}], expected [{}, {}]",
                m.rows(),
                m.cols(),
                rows,
                cols
            )));
        }
        data.extend(m.into_vec());
    }
    check_len(batch_shape, rows * cols, data.len())?;
    Ok(assemble(batch_shape, &[rows, cols], data))
}

/// Stacks per-element vectors into a `[..batch_shape, len]` tensor.
pub fn stack_vectors<T: Copy>(
    batch_shape: &[usize],
    len: usize,
    vectors: Vec<Vec<T>>,
) -> Result<Tensor<T>, LinaRustError> {
    let mut data = Vec::with_capacity(vectors.len() * len);
    for v in vectors {
        if v.len() != len {
            return Err(LinaRustError::InternalError(format!(
                "batch element has length {}, expected {}",
                v.len(),
                len
            )));
        }
        data.extend(v);
    }
    check_len(batch_shape, len, data.len())?;
    Ok(assemble(batch_shape, &[len], data))
}

/// Stacks one value per element into a tensor of shape `batch_shape`.
pub fn stack_values<T: Copy>(batch_shape: &[usize], values: Vec<T>) -> Result<Tensor<T>, LinaRustError> {
    check_len(batch_shape, 1, values.len())?;
    Ok(assemble(batch_shape, &[], values))
}

fn check_len(batch_shape: &[usize], core_len: usize, actual: usize) -> Result<(), LinaRustError> {
    let expected = batch_shape.iter().product::<usize>() * core_len;
    if expected != actual {
        return Err(LinaRustError::InternalError(format!(
            "stacked {} elements for batch shape {:?}, expected {}",
            actual, batch_shape, expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_view_splits_shape() {
        let t = Tensor::new((0..24).map(|x| x as f64).collect(), vec![2, 3, 2, 2]).unwrap();
        let view = BatchView::square_matrices(&t, "test").unwrap();
        assert_eq!(view.len(), 6);
        assert_eq!(view.batch_shape(), &[2, 3]);
        assert_eq!(view.get(1), &[4.0, 5.0, 6.0, 7.0]);
        assert_eq!(view.matrix(5)[(1, 0)], 22.0);
        assert_eq!(view.coord(4), vec![1, 1]);
    }

    #[test]
    fn test_batch_view_errors() {
        let v = Tensor::new(vec![1.0f64, 2.0], vec![2]).unwrap();
        assert!(matches!(
            BatchView::matrices(&v, "test"),
            Err(LinaRustError::RankTooLow { min_rank: 2, .. })
        ));
        let r = Tensor::new(vec![0.0f64; 6], vec![2, 3]).unwrap();
        assert!(matches!(
            BatchView::square_matrices(&r, "test"),
            Err(LinaRustError::NotSquare { .. })
        ));
    }

    #[test]
    fn test_batch_mismatch_is_rejected() {
        let a = Tensor::new(vec![0.0f64; 8], vec![2, 2, 2]).unwrap();
        let b = Tensor::new(vec![0.0f64; 12], vec![3, 2, 2]).unwrap();
        let va = BatchView::matrices(&a, "test").unwrap();
        let vb = BatchView::matrices(&b, "test").unwrap();
        assert!(va.ensure_same_batch(&vb, "test").is_err());
        assert!(va.ensure_same_batch(&va, "test").is_ok());
    }

    #[test]
    fn test_stacking_empty_batch() {
        let stacked = stack_matrices::<f64>(&[0, 4], 3, 3, vec![]).unwrap();
        assert_eq!(stacked.shape(), &[0, 4, 3, 3]);
        let vectors = stack_vectors::<f64>(&[0], 3, vec![]).unwrap();
        assert_eq!(vectors.shape(), &[0, 3]);
        let values = stack_values::<f64>(&[], vec![1.0]).unwrap();
        assert_eq!(values.shape(), &[] as &[usize]);
    }
}

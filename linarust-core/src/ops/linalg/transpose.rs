use crate::batch::BatchView;
use crate::error::LinaRustError;
use crate::scalar::Scalar;
use crate::tensor::Tensor;
use std::sync::Arc;

fn swap_last_two<T: Copy>(a: &Tensor<T>, f: impl Fn(T) -> T, operation: &str) -> Result<Tensor<T>, LinaRustError> {
    let view = BatchView::matrices(a, operation)?;
    let (rows, cols) = (view.rows(), view.cols());
    let mut data = Vec::with_capacity(a.numel());
    for e in 0..view.len() {
        let m = view.get(e);
        for j in 0..cols {
            for i in 0..rows {
                data.push(f(m[i * cols + j]));
            }
        }
    }
    let mut shape = view.batch_shape().to_vec();
    shape.extend([cols, rows]);
    Ok(Tensor {
        data: Arc::new(data),
        shape,
    })
}

/// Swaps the last two axes.
pub fn transpose_op<T: Copy>(a: &Tensor<T>) -> Result<Tensor<T>, LinaRustError> {
    swap_last_two(a, |x| x, "transpose")
}

/// Conjugate transpose of the last two axes.
pub fn adjoint_op<T: Scalar>(a: &Tensor<T>) -> Result<Tensor<T>, LinaRustError> {
    swap_last_two(a, |x| x.conj(), "adjoint")
}

impl<T: Scalar> Tensor<T> {
    /// Matrix transpose over the last two axes.
    pub fn mt(&self) -> Result<Tensor<T>, LinaRustError> {
        transpose_op(self)
    }

    /// Matrix conjugate transpose over the last two axes.
    pub fn mh(&self) -> Result<Tensor<T>, LinaRustError> {
        adjoint_op(self)
    }
}

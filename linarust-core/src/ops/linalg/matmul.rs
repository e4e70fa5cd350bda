use crate::batch::{map_batch, stack_matrices, BatchConfig, BatchView};
use crate::error::LinaRustError;
use crate::scalar::Scalar;
use crate::tensor::Tensor;

/// Batched matrix product `C = A @ B`.
///
/// A: [..batch, M, K], B: [..batch, K, N] -> C: [..batch, M, N]. Both operands
/// must carry the same batch dimensions.
pub fn matmul_op<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) -> Result<Tensor<T>, LinaRustError> {
    if a.rank() < 2 || a.rank() != b.rank() {
        return Err(LinaRustError::ShapeMismatch {
            expected: a.shape().to_vec(),
            actual: b.shape().to_vec(),
            operation: "matmul (rank check)".to_string(),
        });
    }
    let a_view = BatchView::matrices(a, "matmul")?;
    let b_view = BatchView::matrices(b, "matmul")?;
    a_view.ensure_same_batch(&b_view, "matmul")?;
    if a_view.cols() != b_view.rows() {
        return Err(LinaRustError::ShapeMismatch {
            expected: vec![a_view.cols()],
            actual: vec![b_view.rows()],
            operation: "matmul (inner dim)".to_string(),
        });
    }
    let products = map_batch(
        a_view.len(),
        a_view.element_bytes() + b_view.element_bytes(),
        BatchConfig::global(),
        |i| a_view.matrix(i).to_owned().matmul(&b_view.matrix(i).to_owned()),
    );
    stack_matrices(a_view.batch_shape(), a_view.rows(), b_view.cols(), products)
}

impl<T: Scalar> Tensor<T> {
    /// Batched matrix product, see [`matmul_op`].
    pub fn matmul(&self, other: &Tensor<T>) -> Result<Tensor<T>, LinaRustError> {
        matmul_op(self, other)
    }
}

#[cfg(test)]
#[path = "matmul_test.rs"]
mod tests;

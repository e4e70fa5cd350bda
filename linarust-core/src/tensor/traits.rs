// src/tensor/traits.rs

use crate::tensor::Tensor;
use std::fmt::{self, Debug};
use std::sync::Arc;

impl<T> Clone for Tensor<T> {
    /// Shallow clone: the buffer is shared, which is safe because tensors are
    /// never mutated after construction.
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
            shape: self.shape.clone(),
        }
    }
}

impl<T: Debug> Debug for Tensor<T> {
    /// Shows the shape and at most the first eight elements.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 8;
        write!(f, "Tensor(shape={:?}, data=", self.shape)?;
        if self.data.len() <= PREVIEW {
            write!(f, "{:?}", self.data.as_slice())?;
        } else {
            write!(
                f,
                "{:?} ... ({} elements)",
                &self.data[..PREVIEW],
                self.data.len()
            )?;
        }
        write!(f, ")")
    }
}

impl<T: PartialEq> PartialEq for Tensor<T> {
    /// Exact equality of shape and data.
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.data, &other.data) && self.shape == other.shape {
            return true;
        }
        self.shape == other.shape && self.data == other.data
    }
}

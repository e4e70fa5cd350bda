// src/tensor/mod.rs

use crate::error::LinaRustError;
use crate::scalar::Scalar;
use crate::types::DType;
use std::sync::Arc;

mod traits;

pub mod create;
pub mod utils;

pub use create::{eye, from_vec, full, ones, randn, zeros};

/// An immutable, contiguous, row-major n-dimensional array.
///
/// `Tensor` stores its buffer behind an `Arc`, so clones are shallow and
/// cheap. Every operation in this crate returns a fresh tensor; nothing is
/// mutated in place.
///
/// The element type is generic so the same container carries floating-point
/// data (`Tensor<f64>`, `Tensor<Complex64>`, ...), pivot indices
/// (`Tensor<usize>`) and per-element outcomes (`Tensor<Status>`).
pub struct Tensor<T> {
    pub(crate) data: Arc<Vec<T>>,
    pub(crate) shape: Vec<usize>,
}

impl<T: Copy> Tensor<T> {
    /// Creates a new tensor from row-major data and a shape.
    ///
    /// Fails with `TensorCreationError` when `data_vec.len()` differs from
    /// the product of `shape`.
    pub fn new(data_vec: Vec<T>, shape: Vec<usize>) -> Result<Self, LinaRustError> {
        let numel: usize = shape.iter().product();
        if data_vec.len() != numel {
            return Err(LinaRustError::TensorCreationError {
                data_len: data_vec.len(),
                shape,
            });
        }
        Ok(Tensor {
            data: Arc::new(data_vec),
            shape,
        })
    }

    /// Creates a rank-0 tensor holding `value`.
    pub fn scalar(value: T) -> Self {
        Tensor {
            data: Arc::new(vec![value]),
            shape: vec![],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn strides(&self) -> Vec<usize> {
        utils::calculate_strides(&self.shape)
    }

    /// Row-major view of the elements.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.data.as_ref().clone()
    }

    /// Element at a full multi-dimensional index.
    pub fn at(&self, index: &[usize]) -> Result<T, LinaRustError> {
        if index.len() != self.rank() || index.iter().zip(&self.shape).any(|(&i, &d)| i >= d) {
            return Err(LinaRustError::IndexOutOfBounds {
                index: index.to_vec(),
                shape: self.shape.clone(),
            });
        }
        let offset: usize = index
            .iter()
            .zip(self.strides())
            .map(|(&i, s)| i * s)
            .sum();
        Ok(self.data[offset])
    }

    /// The single value of a one-element tensor.
    pub fn item(&self) -> Result<T, LinaRustError> {
        if self.numel() != 1 {
            return Err(LinaRustError::ShapeMismatch {
                expected: vec![],
                actual: self.shape.clone(),
                operation: "item".to_string(),
            });
        }
        Ok(self.data[0])
    }

    /// Same data under a new shape with the same number of elements.
    pub fn reshape(&self, new_shape: Vec<usize>) -> Result<Self, LinaRustError> {
        let numel: usize = new_shape.iter().product();
        if numel != self.numel() {
            return Err(LinaRustError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: new_shape,
                operation: "reshape".to_string(),
            });
        }
        Ok(Tensor {
            data: Arc::clone(&self.data),
            shape: new_shape,
        })
    }

    /// Applies `f` to every element.
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Tensor<U> {
        Tensor {
            data: Arc::new(self.data.iter().map(|&x| f(x)).collect()),
            shape: self.shape.clone(),
        }
    }

    /// Combines two tensors of identical shape element by element.
    pub fn zip_map<U: Copy, V: Copy>(
        &self,
        other: &Tensor<U>,
        operation: &str,
        f: impl Fn(T, U) -> V,
    ) -> Result<Tensor<V>, LinaRustError> {
        if self.shape != other.shape {
            return Err(LinaRustError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: other.shape.clone(),
                operation: operation.to_string(),
            });
        }
        Ok(Tensor {
            data: Arc::new(
                self.data
                    .iter()
                    .zip(other.data.iter())
                    .map(|(&a, &b)| f(a, b))
                    .collect(),
            ),
            shape: self.shape.clone(),
        })
    }

    /// True when both tensors share the same buffer.
    pub fn ptr_eq(&self, other: &Tensor<T>) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl<T: Scalar> Tensor<T> {
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Elementwise complex conjugate.
    pub fn conj(&self) -> Tensor<T> {
        self.map(|x| x.conj())
    }

    /// Real parts.
    pub fn real(&self) -> Tensor<T::Real> {
        self.map(|x| x.re())
    }

    /// Imaginary parts (all zero for real element types).
    pub fn imag(&self) -> Tensor<T::Real> {
        self.map(|x| x.im())
    }

    /// Promotes a real tensor to this element type.
    pub fn from_real(values: &Tensor<T::Real>) -> Tensor<T> {
        values.map(T::from_re)
    }

    /// True when every element is finite.
    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite_value())
    }

    /// Largest elementwise modulus of `self - other`.
    pub fn max_abs_diff(&self, other: &Tensor<T>) -> Result<T::Real, LinaRustError> {
        let diffs = self.zip_map(other, "max_abs_diff", |a, b| (a - b).modulus())?;
        Ok(diffs
            .data
            .iter()
            .fold(<T::Real as num_traits::Zero>::zero(), |acc, &d| {
                if d > acc || num_traits::Float::is_nan(d) {
                    d
                } else {
                    acc
                }
            }))
    }
}

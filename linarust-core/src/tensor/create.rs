// src/tensor/create.rs

use crate::error::LinaRustError;
use crate::scalar::Scalar;
use crate::tensor::Tensor;
use rand::Rng;
use rand_distr::StandardNormal;

/// Creates a new tensor filled with zeros with the specified shape.
pub fn zeros<T: Scalar>(shape: &[usize]) -> Tensor<T> {
    full(shape, T::zero())
}

/// Creates a new tensor filled with ones with the specified shape.
pub fn ones<T: Scalar>(shape: &[usize]) -> Tensor<T> {
    full(shape, T::one())
}

/// Creates a new tensor filled with `value`.
pub fn full<T: Copy>(shape: &[usize], value: T) -> Tensor<T> {
    let numel = shape.iter().product();
    Tensor {
        data: std::sync::Arc::new(vec![value; numel]),
        shape: shape.to_vec(),
    }
}

/// Creates a tensor from row-major data, validating the length.
pub fn from_vec<T: Copy>(data_vec: Vec<T>, shape: Vec<usize>) -> Result<Tensor<T>, LinaRustError> {
    Tensor::new(data_vec, shape)
}

/// A batch of `n × n` identity matrices with shape `[..batch_shape, n, n]`.
pub fn eye<T: Scalar>(batch_shape: &[usize], n: usize) -> Tensor<T> {
    let batch: usize = batch_shape.iter().product();
    let mut data = Vec::with_capacity(batch * n * n);
    for _ in 0..batch {
        for i in 0..n {
            for j in 0..n {
                data.push(if i == j { T::one() } else { T::zero() });
            }
        }
    }
    let mut shape = batch_shape.to_vec();
    shape.extend([n, n]);
    Tensor {
        data: std::sync::Arc::new(data),
        shape,
    }
}

/// Standard normal samples. Complex types get independent real and
/// imaginary parts, each with variance one half.
pub fn randn<T: Scalar, R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Tensor<T> {
    let numel: usize = shape.iter().product();
    let complex = T::DTYPE.is_complex();
    let data = (0..numel)
        .map(|_| {
            let re: f64 = rng.sample(StandardNormal);
            if complex {
                let im: f64 = rng.sample(StandardNormal);
                let s = std::f64::consts::FRAC_1_SQRT_2;
                T::from_re_im(
                    <T::Real as crate::scalar::RealScalar>::of_f64(re * s),
                    <T::Real as crate::scalar::RealScalar>::of_f64(im * s),
                )
            } else {
                T::from_f64(re)
            }
        })
        .collect();
    Tensor {
        data: std::sync::Arc::new(data),
        shape: shape.to_vec(),
    }
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;

use crate::error::LinaRustError;
use crate::scalar::{RealScalar, Scalar};
use crate::tensor::Tensor;
use log::{debug, trace};
use std::sync::Arc;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed at element {element_index} (imaginary part: {imaginary}): Analytical grad {analytical_grad:?} != Numerical grad {numerical_grad:?}. Difference: {difference:?}")]
    GradientMismatch {
        element_index: usize,
        imaginary: bool,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },
    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(LinaRustError),
    #[error("Tensor error during intermediate calculation: {0}")]
    TensorError(LinaRustError),
    #[error("Analytical gradient has shape {actual:?} but the input has shape {expected:?}")]
    GradientShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("Numerical gradient is NaN or infinite at element {element_index}. Details: Loss+: {loss_plus:?}, Loss-: {loss_minus:?}")]
    NumericalGradNaNOrInfinite {
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },
    #[error("Analytical gradient is NaN or infinite at element {element_index}. Value: {value:?}")]
    AnalyticalGradNaNOrInfinite { element_index: usize, value: f64 },
}

impl From<LinaRustError> for GradCheckError {
    fn from(err: LinaRustError) -> Self {
        GradCheckError::TensorError(err)
    }
}

/// Checks a reverse-mode rule against central finite differences.
///
/// The scalar loss is `Re⟨output_cotangent, func(input)⟩`, so `analytical`
/// must be the input cotangent produced by pulling `output_cotangent` back
/// through `func`. Each element is perturbed by `±epsilon` along the real
/// axis and, for complex inputs, along the imaginary axis; the resulting
/// slopes are compared with the real and imaginary parts of `analytical`.
/// A component fails when both its absolute and its relative difference
/// exceed `tolerance`.
pub fn check_vjp<T, U, F>(
    func: F,
    input: &Tensor<T>,
    output_cotangent: &Tensor<U>,
    analytical: &Tensor<T>,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    T: Scalar,
    U: Scalar,
    F: Fn(&Tensor<T>) -> Result<Tensor<U>, LinaRustError>,
{
    if analytical.shape() != input.shape() {
        return Err(GradCheckError::GradientShapeMismatch {
            expected: input.shape().to_vec(),
            actual: analytical.shape().to_vec(),
        });
    }
    debug!(
        "check_vjp: input shape={:?} dtype={:?} epsilon={} tolerance={}",
        input.shape(),
        T::DTYPE,
        epsilon,
        tolerance
    );
    let loss_at = |x: &Tensor<T>| -> Result<f64, GradCheckError> {
        let y = func(x).map_err(GradCheckError::ForwardPassError)?;
        calculate_loss(&y, output_cotangent)
    };

    let eps = <T::Real as RealScalar>::of_f64(epsilon);
    let zero = <T::Real as RealScalar>::of_f64(0.0);
    let mut directions = vec![(false, T::from_re_im(eps, zero))];
    if T::DTYPE.is_complex() {
        directions.push((true, T::from_re_im(zero, eps)));
    }

    let original = input.data();
    for elem_idx in 0..input.numel() {
        let grad = analytical.data()[elem_idx];
        for &(imaginary, step) in &directions {
            let perturbed = |delta: T| {
                let mut data = original.to_vec();
                data[elem_idx] += delta;
                Tensor {
                    data: Arc::new(data),
                    shape: input.shape().to_vec(),
                }
            };
            let loss_plus = loss_at(&perturbed(step))?;
            let loss_minus = loss_at(&perturbed(-step))?;
            let numerical_grad = (loss_plus - loss_minus) / (2.0 * epsilon);
            let analytical_grad = (if imaginary { grad.im() } else { grad.re() }).as_f64();

            if !numerical_grad.is_finite() {
                return Err(GradCheckError::NumericalGradNaNOrInfinite {
                    element_index: elem_idx,
                    loss_plus,
                    loss_minus,
                });
            }
            if !analytical_grad.is_finite() {
                return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                    element_index: elem_idx,
                    value: analytical_grad,
                });
            }

            let difference = (analytical_grad - numerical_grad).abs();
            trace!(
                "check_vjp: element {} imaginary={} analytical={} numerical={}",
                elem_idx,
                imaginary,
                analytical_grad,
                numerical_grad
            );
            if difference > tolerance && difference / (analytical_grad.abs() + epsilon) > tolerance {
                return Err(GradCheckError::GradientMismatch {
                    element_index: elem_idx,
                    imaginary,
                    analytical_grad,
                    numerical_grad,
                    difference,
                });
            }
        }
    }
    Ok(())
}

/// `Re⟨cotangent, output⟩ = Σ Re(conj(c)·y)`, accumulated in `f64`.
fn calculate_loss<U: Scalar>(output: &Tensor<U>, cotangent: &Tensor<U>) -> Result<f64, GradCheckError> {
    if output.shape() != cotangent.shape() {
        return Err(GradCheckError::TensorError(LinaRustError::ShapeMismatch {
            expected: cotangent.shape().to_vec(),
            actual: output.shape().to_vec(),
            operation: "calculate_loss (grad_check)".to_string(),
        }));
    }
    Ok(output
        .data()
        .iter()
        .zip(cotangent.data())
        .map(|(&y, &c)| (c.conj() * y).re().as_f64())
        .sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_check_vjp_accepts_correct_gradient() {
        // f(x) = x², cotangent 1 => gradient 2x.
        let x = Tensor::new(vec![1.0f64, -2.0, 0.5], vec![3]).unwrap();
        let ones = Tensor::new(vec![1.0f64; 3], vec![3]).unwrap();
        let grad = x.map(|v| 2.0 * v);
        check_vjp(|t| Ok(t.map(|v| v * v)), &x, &ones, &grad, 1e-6, 1e-6).unwrap();
    }

    #[test]
    fn test_check_vjp_rejects_wrong_gradient() {
        let x = Tensor::new(vec![1.0f64, 3.0], vec![2]).unwrap();
        let ones = Tensor::new(vec![1.0f64; 2], vec![2]).unwrap();
        let wrong = x.map(|v| v);
        let err = check_vjp(|t| Ok(t.map(|v| v * v)), &x, &ones, &wrong, 1e-6, 1e-6).unwrap_err();
        assert!(matches!(err, GradCheckError::GradientMismatch { element_index: 0, .. }));
    }

    #[test]
    fn test_check_vjp_complex_uses_both_parts() {
        // f(z) = c·z has cotangent conj(c)·ȳ under Re⟨ȳ, δy⟩.
        let c = Complex64::new(0.5, -2.0);
        let z = Tensor::new(vec![Complex64::new(1.0, 1.0)], vec![1]).unwrap();
        let ybar = Tensor::new(vec![Complex64::new(1.0, 0.5)], vec![1]).unwrap();
        let good = ybar.map(|y| c.conj() * y);
        check_vjp(|t| Ok(t.map(|v| c * v)), &z, &ybar, &good, 1e-6, 1e-8).unwrap();
        let conj_wrong = ybar.map(|y| c * y);
        let err = check_vjp(|t| Ok(t.map(|v| c * v)), &z, &ybar, &conj_wrong, 1e-6, 1e-8).unwrap_err();
        assert!(matches!(err, GradCheckError::GradientMismatch { .. }));
    }

    #[test]
    fn test_check_vjp_shape_errors() {
        let x = Tensor::new(vec![1.0f64, 2.0], vec![2]).unwrap();
        let bad = Tensor::new(vec![1.0f64], vec![1]).unwrap();
        assert!(matches!(
            check_vjp(|t| Ok(t.clone()), &x, &x, &bad, 1e-6, 1e-6),
            Err(GradCheckError::GradientShapeMismatch { .. })
        ));
        assert!(matches!(
            check_vjp(|t| Ok(t.clone()), &x, &bad, &x, 1e-6, 1e-6),
            Err(GradCheckError::TensorError(LinaRustError::ShapeMismatch { .. }))
        ));
    }
}

//! Shape-preserving tensor versions of the scalar special functions.
//!
//! Inputs of any precision are evaluated in `f64` and rounded back to the
//! tensor's element type, so `f32` tensors get correctly rounded results.

use crate::functions;
use linarust_core::scalar::RealScalar;
use linarust_core::tensor::Tensor;

/// Applies an `f64` kernel to every element of `x`.
pub fn map_f64<T: RealScalar>(x: &Tensor<T>, f: impl Fn(f64) -> f64) -> Tensor<T> {
    x.map(|v| T::of_f64(f(v.as_f64())))
}

macro_rules! elementwise {
    ($($(#[$doc:meta])* $name:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name<T: RealScalar>(x: &Tensor<T>) -> Tensor<T> {
                map_f64(x, functions::$name)
            }
        )*
    };
}

elementwise! {
    /// Elementwise [`erf`](functions::erf).
    erf;
    /// Elementwise [`erfc`](functions::erfc).
    erfc;
    /// Elementwise [`erfinv`](functions::erfinv).
    erfinv;
    /// Elementwise standard normal CDF.
    ndtr;
    /// Elementwise `ln Φ(x)`.
    log_ndtr;
    /// Elementwise standard normal quantile.
    ndtri;
    /// Elementwise logistic sigmoid.
    expit;
    /// Elementwise `ln(expit(x))`.
    log_expit;
    /// Elementwise log-odds.
    logit;
    /// Elementwise `ln |Γ(x)|`.
    gammaln;
    /// Elementwise digamma.
    digamma;
}

/// Elementwise regularized lower incomplete gamma `P(a, x)` with a scalar shape `a`.
pub fn gammainc<T: RealScalar>(a: f64, x: &Tensor<T>) -> Tensor<T> {
    map_f64(x, |v| functions::gammainc(a, v))
}

/// Elementwise regularized upper incomplete gamma `Q(a, x)` with a scalar shape `a`.
pub fn gammaincc<T: RealScalar>(a: f64, x: &Tensor<T>) -> Tensor<T> {
    map_f64(x, |v| functions::gammaincc(a, v))
}

/// Elementwise regularized incomplete beta `I_x(a, b)`.
pub fn betainc<T: RealScalar>(a: f64, b: f64, x: &Tensor<T>) -> Tensor<T> {
    map_f64(x, |v| functions::betainc(a, b, v))
}

#[cfg(test)]
#[path = "elementwise_test.rs"]
mod tests;

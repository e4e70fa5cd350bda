//! Scalar special functions over `f64`.
//!
//! These are the kernels behind the elementwise tensor wrappers in
//! [`crate::elementwise`] and the distribution functions in [`crate::stats`].

pub mod error_functions;
pub mod gamma_functions;
pub mod logistic;

pub use error_functions::{erf, erfc, erfinv, log_ndtr, ndtr, ndtri, LN_SQRT_2PI};
pub use gamma_functions::{betainc, betaln, digamma, gammainc, gammaincc, gammaln};
pub use logistic::{expit, log_expit, logit};

/// `x·ln(y)`, zero when `x` is zero (even for `y = 0`).
pub fn xlogy(x: f64, y: f64) -> f64 {
    if x == 0.0 && !y.is_nan() {
        0.0
    } else {
        x * y.ln()
    }
}

/// `x·ln(1 + y)`, zero when `x` is zero (even for `y = -1`).
pub fn xlog1py(x: f64, y: f64) -> f64 {
    if x == 0.0 && !y.is_nan() {
        0.0
    } else {
        x * y.ln_1p()
    }
}

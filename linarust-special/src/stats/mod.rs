//! Univariate continuous distributions in the `loc`/`scale` convention.
//!
//! Every distribution is evaluated at `z = (x - loc) / scale`, with the
//! density divided by `scale`. Parameters outside their domain make every
//! function return NaN; points outside the support give `pdf = 0` and
//! `logpdf = -∞`.

pub mod beta;
pub mod expon;
pub mod gamma;
pub mod laplace;
pub mod norm;
pub mod uniform;

pub use beta::Beta;
pub use expon::Expon;
pub use gamma::Gamma;
pub use laplace::Laplace;
pub use norm::Norm;
pub use uniform::Uniform;

use crate::elementwise::map_f64;
use linarust_core::scalar::RealScalar;
use linarust_core::tensor::Tensor;
use log::trace;

/// Density and distribution function of a continuous distribution.
///
/// Implementors provide the log-density and the CDF; the density and log-CDF
/// have defaults that distributions override where a closed form is more
/// accurate.
pub trait Distribution: std::fmt::Debug {
    fn logpdf(&self, x: f64) -> f64;

    fn cdf(&self, x: f64) -> f64;

    fn pdf(&self, x: f64) -> f64 {
        self.logpdf(x).exp()
    }

    fn logcdf(&self, x: f64) -> f64 {
        self.cdf(x).ln()
    }
}

/// Location and scale shared by every distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocScale {
    pub loc: f64,
    pub scale: f64,
}

impl LocScale {
    pub fn new(loc: f64, scale: f64) -> Self {
        LocScale { loc, scale }
    }

    /// Whether `scale` is positive and both parameters are finite.
    pub fn is_valid(&self) -> bool {
        self.loc.is_finite() && self.scale.is_finite() && self.scale > 0.0
    }

    /// `(x - loc) / scale`.
    pub fn standardize(&self, x: f64) -> f64 {
        (x - self.loc) / self.scale
    }

    pub fn ln_scale(&self) -> f64 {
        self.scale.ln()
    }
}

impl Default for LocScale {
    fn default() -> Self {
        LocScale::new(0.0, 1.0)
    }
}

/// Elementwise `logpdf` of `dist` over `x`.
pub fn logpdf<D: Distribution, T: RealScalar>(dist: &D, x: &Tensor<T>) -> Tensor<T> {
    trace!("logpdf: {:?} over shape {:?}", dist, x.shape());
    map_f64(x, |v| dist.logpdf(v))
}

/// Elementwise `pdf` of `dist` over `x`.
pub fn pdf<D: Distribution, T: RealScalar>(dist: &D, x: &Tensor<T>) -> Tensor<T> {
    trace!("pdf: {:?} over shape {:?}", dist, x.shape());
    map_f64(x, |v| dist.pdf(v))
}

/// Elementwise `cdf` of `dist` over `x`.
pub fn cdf<D: Distribution, T: RealScalar>(dist: &D, x: &Tensor<T>) -> Tensor<T> {
    trace!("cdf: {:?} over shape {:?}", dist, x.shape());
    map_f64(x, |v| dist.cdf(v))
}

/// Elementwise `logcdf` of `dist` over `x`.
pub fn logcdf<D: Distribution, T: RealScalar>(dist: &D, x: &Tensor<T>) -> Tensor<T> {
    trace!("logcdf: {:?} over shape {:?}", dist, x.shape());
    map_f64(x, |v| dist.logcdf(v))
}

#[cfg(test)]
#[path = "distributions_test.rs"]
mod tests;

//! Laplace (double exponential) distribution.

use super::{Distribution, LocScale};
use std::f64::consts::LN_2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Laplace {
    pub params: LocScale,
}

impl Laplace {
    pub fn new(loc: f64, scale: f64) -> Self {
        Laplace {
            params: LocScale::new(loc, scale),
        }
    }
}

impl Distribution for Laplace {
    fn logpdf(&self, x: f64) -> f64 {
        if !self.params.is_valid() {
            return f64::NAN;
        }
        -self.params.standardize(x).abs() - LN_2 - self.params.ln_scale()
    }

    fn cdf(&self, x: f64) -> f64 {
        if !self.params.is_valid() || x.is_nan() {
            return f64::NAN;
        }
        let z = self.params.standardize(x);
        if z < 0.0 {
            0.5 * z.exp()
        } else {
            1.0 - 0.5 * (-z).exp()
        }
    }

    fn logcdf(&self, x: f64) -> f64 {
        if !self.params.is_valid() || x.is_nan() {
            return f64::NAN;
        }
        let z = self.params.standardize(x);
        if z < 0.0 {
            z - LN_2
        } else {
            (-0.5 * (-z).exp()).ln_1p()
        }
    }
}

//! Normal distribution.

use super::{Distribution, LocScale};
use crate::functions::{log_ndtr, ndtr, LN_SQRT_2PI};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Norm {
    pub params: LocScale,
}

impl Norm {
    pub fn new(loc: f64, scale: f64) -> Self {
        Norm {
            params: LocScale::new(loc, scale),
        }
    }

    /// The standard normal.
    pub fn standard() -> Self {
        Norm::default()
    }
}

impl Distribution for Norm {
    fn logpdf(&self, x: f64) -> f64 {
        if !self.params.is_valid() {
            return f64::NAN;
        }
        let z = self.params.standardize(x);
        -0.5 * z * z - LN_SQRT_2PI - self.params.ln_scale()
    }

    fn cdf(&self, x: f64) -> f64 {
        if !self.params.is_valid() {
            return f64::NAN;
        }
        ndtr(self.params.standardize(x))
    }

    fn logcdf(&self, x: f64) -> f64 {
        if !self.params.is_valid() {
            return f64::NAN;
        }
        log_ndtr(self.params.standardize(x))
    }
}

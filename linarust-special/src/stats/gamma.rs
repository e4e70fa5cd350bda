//! Gamma distribution with shape `a`.

use super::{Distribution, LocScale};
use crate::functions::{gammainc, gammaln, xlogy};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gamma {
    pub a: f64,
    pub params: LocScale,
}

impl Gamma {
    pub fn new(a: f64, loc: f64, scale: f64) -> Self {
        Gamma {
            a,
            params: LocScale::new(loc, scale),
        }
    }

    fn is_valid(&self) -> bool {
        self.params.is_valid() && self.a.is_finite() && self.a > 0.0
    }
}

impl Distribution for Gamma {
    fn logpdf(&self, x: f64) -> f64 {
        if !self.is_valid() || x.is_nan() {
            return f64::NAN;
        }
        let z = self.params.standardize(x);
        if z < 0.0 {
            return f64::NEG_INFINITY;
        }
        xlogy(self.a - 1.0, z) - z - gammaln(self.a) - self.params.ln_scale()
    }

    fn cdf(&self, x: f64) -> f64 {
        if !self.is_valid() || x.is_nan() {
            return f64::NAN;
        }
        let z = self.params.standardize(x);
        if z <= 0.0 {
            return 0.0;
        }
        gammainc(self.a, z)
    }
}

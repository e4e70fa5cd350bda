//! Beta distribution with shapes `a` and `b` on `[loc, loc + scale]`.

use super::{Distribution, LocScale};
use crate::functions::{betainc, betaln, xlog1py, xlogy};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beta {
    pub a: f64,
    pub b: f64,
    pub params: LocScale,
}

impl Beta {
    pub fn new(a: f64, b: f64, loc: f64, scale: f64) -> Self {
        Beta {
            a,
            b,
            params: LocScale::new(loc, scale),
        }
    }

    fn is_valid(&self) -> bool {
        self.params.is_valid() && self.a.is_finite() && self.b.is_finite() && self.a > 0.0 && self.b > 0.0
    }
}

impl Distribution for Beta {
    fn logpdf(&self, x: f64) -> f64 {
        if !self.is_valid() || x.is_nan() {
            return f64::NAN;
        }
        let z = self.params.standardize(x);
        if !(0.0..=1.0).contains(&z) {
            return f64::NEG_INFINITY;
        }
        xlogy(self.a - 1.0, z) + xlog1py(self.b - 1.0, -z) - betaln(self.a, self.b) - self.params.ln_scale()
    }

    fn cdf(&self, x: f64) -> f64 {
        if !self.is_valid() || x.is_nan() {
            return f64::NAN;
        }
        betainc(self.a, self.b, self.params.standardize(x).clamp(0.0, 1.0))
    }
}

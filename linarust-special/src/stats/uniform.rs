//! Uniform distribution on `[loc, loc + scale]`.

use super::{Distribution, LocScale};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Uniform {
    pub params: LocScale,
}

impl Uniform {
    pub fn new(loc: f64, scale: f64) -> Self {
        Uniform {
            params: LocScale::new(loc, scale),
        }
    }
}

impl Distribution for Uniform {
    fn logpdf(&self, x: f64) -> f64 {
        if !self.params.is_valid() || x.is_nan() {
            return f64::NAN;
        }
        let z = self.params.standardize(x);
        if (0.0..=1.0).contains(&z) {
            -self.params.ln_scale()
        } else {
            f64::NEG_INFINITY
        }
    }

    fn cdf(&self, x: f64) -> f64 {
        if !self.params.is_valid() || x.is_nan() {
            return f64::NAN;
        }
        self.params.standardize(x).clamp(0.0, 1.0)
    }
}

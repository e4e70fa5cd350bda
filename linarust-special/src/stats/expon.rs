//! Exponential distribution, support `[loc, ∞)`.

use super::{Distribution, LocScale};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Expon {
    pub params: LocScale,
}

impl Expon {
    pub fn new(loc: f64, scale: f64) -> Self {
        Expon {
            params: LocScale::new(loc, scale),
        }
    }
}

impl Distribution for Expon {
    fn logpdf(&self, x: f64) -> f64 {
        if !self.params.is_valid() || x.is_nan() {
            return f64::NAN;
        }
        let z = self.params.standardize(x);
        if z < 0.0 {
            return f64::NEG_INFINITY;
        }
        -z - self.params.ln_scale()
    }

    fn cdf(&self, x: f64) -> f64 {
        if !self.params.is_valid() || x.is_nan() {
            return f64::NAN;
        }
        let z = self.params.standardize(x);
        if z <= 0.0 {
            return 0.0;
        }
        -(-z).exp_m1()
    }

    fn logcdf(&self, x: f64) -> f64 {
        if !self.params.is_valid() || x.is_nan() {
            return f64::NAN;
        }
        let z = self.params.standardize(x);
        if z <= 0.0 {
            return f64::NEG_INFINITY;
        }
        // ln(1 - e^(-z)), switching formulas at ln 2.
        if z < std::f64::consts::LN_2 {
            (-(-z).exp_m1()).ln()
        } else {
            (-(-z).exp()).ln_1p()
        }
    }
}

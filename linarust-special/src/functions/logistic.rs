//! Logistic sigmoid and its inverse.

/// `1 / (1 + e^(-x))`, evaluated on the side that cannot overflow.
pub fn expit(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// `ln(expit(x)) = -ln(1 + e^(-x))`.
pub fn log_expit(x: f64) -> f64 {
    if x >= 0.0 {
        -(-x).exp().ln_1p()
    } else {
        x - x.exp().ln_1p()
    }
}

/// `ln(p / (1 - p))`; `±∞` at the end points and NaN outside `[0, 1]`.
pub fn logit(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    p.ln() - (-p).ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_expit_values() {
        assert_eq!(expit(0.0), 0.5);
        assert_relative_eq!(expit(2.0), 0.880_797_077_977_882_3, max_relative = 1e-15);
        assert_relative_eq!(expit(-2.0), 0.119_202_922_022_117_57, max_relative = 1e-15);
        assert_eq!(expit(1000.0), 1.0);
        assert_eq!(expit(-1000.0), 0.0);
        assert!(expit(f64::NAN).is_nan());
    }

    #[test]
    fn test_logit_inverts_expit() {
        for &x in &[-30.0, -4.5, -0.1, 0.0, 0.7, 12.0] {
            assert_relative_eq!(logit(expit(x)), x, epsilon = 1e-12, max_relative = 1e-9);
        }
        assert_eq!(logit(0.0), f64::NEG_INFINITY);
        assert_eq!(logit(1.0), f64::INFINITY);
        assert!(logit(1.5).is_nan());
    }

    #[test]
    fn test_log_expit_tails() {
        assert_relative_eq!(log_expit(-800.0), -800.0, max_relative = 1e-15);
        assert_relative_eq!(log_expit(40.0), -(-40.0f64).exp(), max_relative = 1e-12);
        assert_relative_eq!(log_expit(1.3), expit(1.3).ln(), max_relative = 1e-14);
    }
}

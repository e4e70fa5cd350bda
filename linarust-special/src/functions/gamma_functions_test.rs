use super::*;
use crate::functions::erf;
use approx::assert_relative_eq;

#[test]
fn test_gammaln_matches_factorials() {
    let mut log_factorial = 0.0f64;
    for n in 1..25u32 {
        if n > 1 {
            log_factorial += f64::from(n - 1).ln();
        }
        assert_relative_eq!(gammaln(f64::from(n)), log_factorial, epsilon = 1e-12, max_relative = 1e-13);
    }
}

#[test]
fn test_gammaln_reference_values() {
    assert_relative_eq!(gammaln(0.5), 0.572_364_942_924_700_1, max_relative = 1e-14);
    assert_relative_eq!(gammaln(-0.5), 1.265_512_123_484_645_4, max_relative = 1e-13);
    assert_relative_eq!(gammaln(100.0), 359.134_205_369_575_4, max_relative = 1e-14);
    assert_eq!(gammaln(0.0), f64::INFINITY);
    assert_eq!(gammaln(-3.0), f64::INFINITY);
}

#[test]
fn test_digamma_reference_values() {
    assert_relative_eq!(digamma(1.0), -0.577_215_664_901_532_9, max_relative = 1e-14);
    assert_relative_eq!(digamma(0.5), -1.963_510_026_021_423_5, max_relative = 1e-14);
    assert_relative_eq!(digamma(-0.5), 0.036_490_102_823_803_68, max_relative = 1e-12);
    assert_relative_eq!(digamma(10.0), 2.251_752_589_066_721, max_relative = 1e-14);
    assert!(digamma(0.0).is_nan());
    assert!(digamma(-2.0).is_nan());
}

#[test]
fn test_gammainc_identities() {
    for &x in &[0.01, 0.5, 1.0, 3.0, 12.0] {
        // P(1, x) = 1 - e^(-x) and P(1/2, x) = erf(√x).
        assert_relative_eq!(gammainc(1.0, x), -(-x).exp_m1(), max_relative = 1e-13);
        assert_relative_eq!(gammainc(0.5, x), erf(x.sqrt()), max_relative = 1e-13);
        for &a in &[0.3, 2.0, 7.5] {
            assert_relative_eq!(gammainc(a, x) + gammaincc(a, x), 1.0, epsilon = 1e-14);
        }
    }
    assert_eq!(gammainc(2.0, 0.0), 0.0);
    assert_eq!(gammaincc(2.0, f64::INFINITY), 0.0);
    assert!(gammainc(-1.0, 1.0).is_nan());
}

#[test]
fn test_betainc_values() {
    // I_x(2, 3) = Σ_{j=2}^{4} C(4, j)·x^j·(1 - x)^(4 - j).
    assert_relative_eq!(betainc(2.0, 3.0, 0.4), 0.5248, max_relative = 1e-13);
    for &x in &[0.05, 0.3, 0.7, 0.95] {
        assert_relative_eq!(betainc(1.0, 1.0, x), x, max_relative = 1e-13);
        assert_relative_eq!(betainc(2.5, 1.0, x), x.powf(2.5), max_relative = 1e-13);
        assert_relative_eq!(betainc(0.7, 3.2, x), 1.0 - betainc(3.2, 0.7, 1.0 - x), epsilon = 1e-14);
    }
    assert_eq!(betainc(2.0, 2.0, 0.0), 0.0);
    assert_eq!(betainc(2.0, 2.0, 1.0), 1.0);
    assert!(betainc(2.0, 2.0, 1.5).is_nan());
}

#[test]
fn test_digamma_small_arguments() {
    assert_relative_eq!(digamma(2.0), 0.422_784_335_098_467_1, max_relative = 1e-14);
    assert_relative_eq!(digamma(0.1), -10.423_754_940_411_076, max_relative = 1e-14);
    // ψ(x + 1) = ψ(x) + 1/x across the shift boundary.
    for &x in &[0.25, 1.5, 5.0, 9.5, 10.0, 30.0] {
        assert_relative_eq!(digamma(x + 1.0), digamma(x) + 1.0 / x, epsilon = 1e-14, max_relative = 1e-14);
    }
}

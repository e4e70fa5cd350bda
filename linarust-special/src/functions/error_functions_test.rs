use super::*;
use approx::assert_relative_eq;

#[test]
fn test_erf_reference_values() {
    let cases = [
        (0.5, 0.520_499_877_813_046_5),
        (1.0, 0.842_700_792_949_714_9),
        (2.0, 0.995_322_265_018_952_7),
        (3.5, 0.999_999_256_901_627_7),
    ];
    for (x, expected) in cases {
        assert_relative_eq!(erf(x), expected, max_relative = 1e-13);
        assert_relative_eq!(erf(-x), -expected, max_relative = 1e-13);
    }
    assert_eq!(erf(0.0), 0.0);
    assert_eq!(erf(f64::INFINITY), 1.0);
    assert_eq!(erf(f64::NEG_INFINITY), -1.0);
    assert!(erf(f64::NAN).is_nan());
}

#[test]
fn test_erfc_keeps_relative_precision_in_tail() {
    assert_relative_eq!(erfc(1.0), 0.157_299_207_050_285_13, max_relative = 1e-13);
    assert_relative_eq!(erfc(5.0), 1.537_459_794_428_035e-12, max_relative = 1e-12);
    assert_relative_eq!(erfc(10.0), 2.088_487_583_762_545e-45, max_relative = 1e-12);
    assert_relative_eq!(erfc(-1.0), 1.842_700_792_949_715, max_relative = 1e-14);
    assert_eq!(erfc(f64::INFINITY), 0.0);
    assert_eq!(erfc(f64::NEG_INFINITY), 2.0);
}

#[test]
fn test_ndtr_values() {
    assert_eq!(ndtr(0.0), 0.5);
    assert_relative_eq!(ndtr(1.96), 0.975_002_104_851_779_5, max_relative = 1e-13);
    assert_relative_eq!(ndtr(-3.0), 1.349_898_031_630_094_6e-3, max_relative = 1e-10);
}

#[test]
fn test_ndtri_inverts_ndtr() {
    assert_relative_eq!(ndtri(0.975), 1.959_963_984_540_054, max_relative = 1e-12);
    for &x in &[-9.0, -6.5, -5.5, -2.0, -0.3, 0.0, 0.8, 3.0] {
        assert_relative_eq!(ndtri(ndtr(x)), x, epsilon = 1e-12, max_relative = 1e-9);
    }
    // Above the median ndtr(x) rounds to within one ulp of 1, so the round
    // trip is only as good as ulp(1) / φ(x).
    for &x in &[4.0, 6.5] {
        let conditioning = f64::EPSILON / normal_density(x);
        assert_relative_eq!(ndtri(ndtr(x)), x, epsilon = 4.0 * conditioning);
    }
    for &p in &[0.001, 0.02, 0.125, 0.3] {
        assert_relative_eq!(ndtri(1.0 - p), -ndtri(p), max_relative = 1e-6);
    }
    assert_eq!(ndtri(0.0), f64::NEG_INFINITY);
    assert_eq!(ndtri(1.0), f64::INFINITY);
    assert!(ndtri(-0.1).is_nan());
}

#[test]
fn test_erfinv_inverts_erf() {
    for &y in &[-0.999, -0.5, -1e-6, 2e-4, 0.25, 0.9, 0.999_999] {
        assert_relative_eq!(erf(erfinv(y)), y, max_relative = 1e-12);
    }
    assert_eq!(erfinv(1.0), f64::INFINITY);
    assert_eq!(erfinv(-1.0), f64::NEG_INFINITY);
    assert!(erfinv(1.01).is_nan());
    assert_eq!(erfinv(0.0), 0.0);
}

#[test]
fn test_log_ndtr_branches_agree() {
    let direct = ndtr(-20.0).ln();
    assert_relative_eq!(log_ndtr(-20.0), direct, max_relative = 1e-10);
    assert_relative_eq!(log_ndtr(-1.0), ndtr(-1.0).ln(), max_relative = 1e-15);
    assert!(log_ndtr(-1e3).is_finite());
    assert!(log_ndtr(-1e3) < -4.9e5);
}

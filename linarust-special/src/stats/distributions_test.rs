use super::*;
use approx::assert_relative_eq;

/// Trapezoid integral of the density over `[lo, hi]`.
fn integrate_pdf<D: Distribution>(dist: &D, lo: f64, hi: f64, steps: usize) -> f64 {
    let h = (hi - lo) / steps as f64;
    let inner: f64 = (1..steps).map(|i| dist.pdf(lo + i as f64 * h)).sum();
    h * (inner + 0.5 * (dist.pdf(lo) + dist.pdf(hi)))
}

fn check_cdf_matches_pdf<D: Distribution>(dist: &D, lo: f64, hi: f64) {
    let integral = integrate_pdf(dist, lo, hi, 20_000);
    assert_relative_eq!(dist.cdf(hi) - dist.cdf(lo), integral, epsilon = 1e-6);
}

fn check_logs_agree<D: Distribution>(dist: &D, points: &[f64]) {
    for &x in points {
        assert_relative_eq!(dist.logpdf(x).exp(), dist.pdf(x), epsilon = 1e-14, max_relative = 1e-12);
        assert_relative_eq!(dist.logcdf(x).exp(), dist.cdf(x), epsilon = 1e-14, max_relative = 1e-12);
    }
}

#[test]
fn test_norm_reference_values() {
    let n = Norm::standard();
    assert_relative_eq!(n.logpdf(0.0), -0.918_938_533_204_672_7, epsilon = 1e-15);
    assert_relative_eq!(n.pdf(1.0), 0.241_970_724_519_143_35, epsilon = 1e-15);
    assert_relative_eq!(n.cdf(1.96), 0.975_002_104_851_779_6, epsilon = 1e-14);
    assert_relative_eq!(Norm::new(1.0, 2.0).pdf(3.0), 0.120_985_362_259_571_67, epsilon = 1e-15);
    // Far tail stays finite in log space.
    assert_relative_eq!(n.logcdf(-30.0), -454.321_243_956_343_2, max_relative = 1e-12);
}

#[test]
fn test_expon_support_and_tail() {
    let e = Expon::new(1.0, 2.0);
    assert_eq!(e.pdf(0.5), 0.0);
    assert_eq!(e.logpdf(0.5), f64::NEG_INFINITY);
    assert_eq!(e.cdf(1.0), 0.0);
    assert_eq!(e.logcdf(1.0), f64::NEG_INFINITY);
    assert_relative_eq!(e.pdf(1.0), 0.5, epsilon = 1e-15);
    assert_relative_eq!(e.cdf(3.0), 1.0 - (-1.0f64).exp(), epsilon = 1e-15);
    // ln(1 - e^(-z)) for tiny z keeps relative precision.
    assert_relative_eq!(Expon::default().logcdf(1e-10), -23.025_850_929_990_457, max_relative = 1e-12);
}

#[test]
fn test_laplace_is_symmetric() {
    let l = Laplace::new(2.0, 0.5);
    for d in [0.1, 0.7, 3.0] {
        assert_relative_eq!(l.pdf(2.0 - d), l.pdf(2.0 + d), epsilon = 1e-15);
        assert_relative_eq!(l.cdf(2.0 - d) + l.cdf(2.0 + d), 1.0, epsilon = 1e-15);
    }
    assert_relative_eq!(l.cdf(2.0), 0.5, epsilon = 1e-15);
    assert_relative_eq!(l.pdf(2.0), 1.0, epsilon = 1e-15);
}

#[test]
fn test_uniform_support() {
    let u = Uniform::new(-1.0, 4.0);
    assert_relative_eq!(u.pdf(0.0), 0.25, epsilon = 1e-15);
    assert_relative_eq!(u.pdf(3.0), 0.25, epsilon = 1e-15);
    assert_eq!(u.pdf(3.5), 0.0);
    assert_eq!(u.logpdf(-1.5), f64::NEG_INFINITY);
    assert_eq!(u.cdf(-2.0), 0.0);
    assert_eq!(u.cdf(10.0), 1.0);
    assert_relative_eq!(u.cdf(1.0), 0.5, epsilon = 1e-15);
}

#[test]
fn test_gamma_reference_values() {
    // a = 2: F(x) = 1 - (1 + x)e^(-x).
    let g = Gamma::new(2.0, 0.0, 1.0);
    assert_relative_eq!(g.cdf(1.0), 0.264_241_117_657_115_36, epsilon = 1e-14);
    assert_relative_eq!(g.pdf(1.0), (-1.0f64).exp(), epsilon = 1e-14);
    assert_relative_eq!(Gamma::new(3.0, 0.0, 1.0).cdf(2.5), 0.456_186_884_116_670_5, epsilon = 1e-13);
    assert_eq!(g.pdf(-0.1), 0.0);
    assert_eq!(g.cdf(0.0), 0.0);
    // a = 1 is the exponential, including the density at the boundary.
    let as_expon = Gamma::new(1.0, 0.0, 3.0);
    let e = Expon::new(0.0, 3.0);
    for x in [0.0, 0.4, 5.0] {
        assert_relative_eq!(as_expon.pdf(x), e.pdf(x), epsilon = 1e-14);
        assert_relative_eq!(as_expon.cdf(x), e.cdf(x), epsilon = 1e-14);
    }
    assert_eq!(Gamma::new(0.5, 0.0, 1.0).pdf(0.0), f64::INFINITY);
}

#[test]
fn test_beta_reference_values() {
    let b = Beta::new(2.0, 3.0, 0.0, 1.0);
    assert_relative_eq!(b.logpdf(0.4), 0.546_964_670_381_864, epsilon = 1e-13);
    assert_relative_eq!(b.cdf(0.4), 0.5248, epsilon = 1e-13);
    assert_eq!(b.pdf(1.2), 0.0);
    assert_eq!(b.cdf(1.2), 1.0);
    assert_eq!(b.cdf(-0.2), 0.0);
    // Beta(1, 1) is the uniform on the same interval.
    let flat = Beta::new(1.0, 1.0, 2.0, 4.0);
    let u = Uniform::new(2.0, 4.0);
    for x in [2.0, 3.3, 6.0] {
        assert_relative_eq!(flat.pdf(x), u.pdf(x), epsilon = 1e-14);
        assert_relative_eq!(flat.cdf(x), u.cdf(x), epsilon = 1e-14);
    }
}

#[test]
fn test_cdf_is_integral_of_pdf() {
    check_cdf_matches_pdf(&Norm::new(0.5, 1.5), -3.0, 2.0);
    check_cdf_matches_pdf(&Expon::new(0.0, 2.0), 0.0, 5.0);
    check_cdf_matches_pdf(&Laplace::new(0.0, 1.0), -2.0, 2.0);
    check_cdf_matches_pdf(&Gamma::new(2.5, 0.0, 1.0), 0.0, 6.0);
    check_cdf_matches_pdf(&Beta::new(2.0, 5.0, 0.0, 1.0), 0.0, 1.0);
}

#[test]
fn test_log_functions_agree_with_plain_ones() {
    let points = [0.05, 0.3, 0.9, 2.5];
    check_logs_agree(&Norm::new(0.0, 1.0), &points);
    check_logs_agree(&Expon::new(0.0, 1.0), &points);
    check_logs_agree(&Laplace::new(0.5, 2.0), &points);
    check_logs_agree(&Gamma::new(1.7, 0.0, 0.8), &points);
    check_logs_agree(&Beta::new(2.0, 2.0, 0.0, 3.0), &points);
}

#[test]
fn test_invalid_parameters_give_nan() {
    assert!(Norm::new(0.0, 0.0).pdf(1.0).is_nan());
    assert!(Norm::new(0.0, -1.0).cdf(1.0).is_nan());
    assert!(Expon::new(f64::NAN, 1.0).logpdf(1.0).is_nan());
    assert!(Uniform::new(0.0, f64::INFINITY).cdf(0.5).is_nan());
    assert!(Gamma::new(0.0, 0.0, 1.0).pdf(1.0).is_nan());
    assert!(Beta::new(1.0, -2.0, 0.0, 1.0).cdf(0.5).is_nan());
}

#[test]
fn test_tensor_helpers_keep_shape_and_dtype() {
    let x = Tensor::new(vec![-1.0f32, 0.0, 1.0, 2.0], vec![2, 2]).unwrap();
    let n = Norm::standard();
    let p = pdf(&n, &x);
    assert_eq!(p.shape(), &[2, 2]);
    for (got, v) in p.data().iter().zip(x.data()) {
        assert_relative_eq!(*got, n.pdf(*v as f64) as f32, epsilon = 1e-7);
    }
    let c = cdf(&n, &x);
    assert_relative_eq!(c.data()[1], 0.5f32, epsilon = 1e-7);
    let lc = logcdf(&n, &x);
    assert_relative_eq!(lc.data()[1], 0.5f32.ln(), epsilon = 1e-7);
    let lp = logpdf(&Uniform::new(0.0, 1.0), &x);
    assert_eq!(lp.data()[0], f32::NEG_INFINITY);
    assert_eq!(lp.data()[1], 0.0);
}

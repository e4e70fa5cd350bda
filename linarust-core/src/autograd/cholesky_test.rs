use super::*;
use crate::autograd::check_vjp;
use crate::ops::linalg::cholesky;
use crate::utils::testing::{hermitian_part, random_matrix, random_spd, real_inner, seeded_rng};
use approx::assert_relative_eq;
use num_complex::Complex64;

fn check_cholesky_rules<T: Scalar>(seed: u64, lower: bool) {
    let mut rng = seeded_rng(seed);
    let a: Tensor<T> = random_spd(&mut rng, &[2], 3);
    let factor = cholesky(&a, lower).unwrap().factor;
    let ct: Tensor<T> = random_matrix(&mut rng, &[2], 3, 3);
    let a_bar = cholesky_vjp(&factor, &ct, lower).unwrap();

    check_vjp(
        |x| Ok(cholesky(&hermitian_part(x)?, lower)?.factor),
        &a,
        &ct,
        &a_bar,
        1e-6,
        1e-5,
    )
    .unwrap();

    let da: Tensor<T> = random_matrix(&mut rng, &[2], 3, 3);
    let dl = cholesky_jvp(&factor, &da, lower).unwrap();
    assert_relative_eq!(real_inner(&ct, &dl), real_inner(&a_bar, &da), epsilon = 1e-9, max_relative = 1e-9);
}

#[test]
fn test_cholesky_rules_real_lower() {
    check_cholesky_rules::<f64>(11, true);
}

#[test]
fn test_cholesky_rules_real_upper() {
    check_cholesky_rules::<f64>(12, false);
}

#[test]
fn test_cholesky_rules_complex() {
    check_cholesky_rules::<Complex64>(13, true);
    check_cholesky_rules::<Complex64>(14, false);
}

#[test]
fn test_cholesky_vjp_is_hermitian() {
    let mut rng = seeded_rng(15);
    let a: Tensor<Complex64> = random_spd(&mut rng, &[], 4);
    let factor = cholesky(&a, true).unwrap().factor;
    let ct: Tensor<Complex64> = random_matrix(&mut rng, &[], 4, 4);
    let a_bar = cholesky_vjp(&factor, &ct, true).unwrap();
    let sym = hermitian_part(&a_bar).unwrap();
    assert!(a_bar.max_abs_diff(&sym).unwrap() < 1e-12);
}

#[test]
fn test_cholesky_jvp_of_scalar_matrix() {
    // L = √a, so δL = δa / (2√a).
    let factor = Tensor::new(vec![2.0f64], vec![1, 1]).unwrap();
    let da = Tensor::new(vec![1.0f64], vec![1, 1]).unwrap();
    let dl = cholesky_jvp(&factor, &da, true).unwrap();
    assert_relative_eq!(dl.data()[0], 0.25, epsilon = 1e-15);
}

#[test]
fn test_cholesky_rules_reject_mismatched_batches() {
    let mut rng = seeded_rng(16);
    let a: Tensor<f64> = random_spd(&mut rng, &[2], 3);
    let factor = cholesky(&a, true).unwrap().factor;
    let da: Tensor<f64> = random_matrix(&mut rng, &[3], 3, 3);
    assert!(matches!(
        cholesky_jvp(&factor, &da, true),
        Err(LinaRustError::IncompatibleShapes { .. })
    ));
    let wrong_core: Tensor<f64> = random_matrix(&mut rng, &[2], 3, 2);
    assert!(matches!(
        cholesky_vjp(&factor, &wrong_core, true),
        Err(LinaRustError::ShapeMismatch { .. })
    ));
}

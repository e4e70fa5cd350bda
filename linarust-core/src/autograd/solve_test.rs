use super::*;
use crate::autograd::check_vjp;
use crate::ops::linalg::{det, inv, solve, solve_triangular};
use crate::tensor::eye;
use crate::utils::testing::{random_matrix, real_inner, seeded_rng};
use approx::assert_relative_eq;
use num_complex::Complex64;

/// Diagonally dominant, so both triangles are well conditioned.
fn well_conditioned<T: Scalar>(rng: &mut rand::rngs::StdRng, batch: &[usize], n: usize) -> Tensor<T> {
    let b: Tensor<T> = random_matrix(rng, batch, n, n);
    let shift: Tensor<T> = eye(batch, n);
    let scale = T::from_f64(2.0 * n as f64);
    b.zip_map(&shift, "well_conditioned", |x, e| x + e * scale).unwrap()
}

fn check_solve_rules<T: Scalar>(seed: u64, vector_rhs: bool) {
    let mut rng = seeded_rng(seed);
    let a: Tensor<T> = well_conditioned(&mut rng, &[2], 3);
    let b: Tensor<T> = if vector_rhs {
        random_matrix(&mut rng, &[], 2, 3)
    } else {
        random_matrix(&mut rng, &[2], 3, 2)
    };
    let x = solve(&a, &b, false, true).unwrap().x;
    let x_bar: Tensor<T> = random_matrix(&mut rng, &[], 1, x.numel()).reshape(x.shape().to_vec()).unwrap();
    let (a_bar, b_bar) = solve_vjp(&a, &x, &x_bar).unwrap();
    assert_eq!(b_bar.shape(), b.shape());

    check_vjp(|m| Ok(solve(m, &b, false, true)?.x), &a, &x_bar, &a_bar, 1e-6, 1e-5).unwrap();
    check_vjp(|rhs| Ok(solve(&a, rhs, false, true)?.x), &b, &x_bar, &b_bar, 1e-6, 1e-5).unwrap();

    let da: Tensor<T> = random_matrix(&mut rng, &[2], 3, 3);
    let db: Tensor<T> = random_matrix(&mut rng, &[], 1, b.numel()).reshape(b.shape().to_vec()).unwrap();
    let dx = solve_jvp(&a, &x, &da, &db).unwrap();
    let lhs = real_inner(&x_bar, &dx);
    let rhs = real_inner(&a_bar, &da) + real_inner(&b_bar, &db);
    assert_relative_eq!(lhs, rhs, epsilon = 1e-9, max_relative = 1e-9);
}

#[test]
fn test_solve_rules_matrix_rhs() {
    check_solve_rules::<f64>(61, false);
    check_solve_rules::<Complex64>(62, false);
}

#[test]
fn test_solve_rules_vector_rhs() {
    check_solve_rules::<f64>(63, true);
    check_solve_rules::<Complex64>(64, true);
}

fn check_triangular_rules<T: Scalar>(seed: u64, trans: Trans, lower: bool, unit_diagonal: bool) {
    let mut rng = seeded_rng(seed);
    let a: Tensor<T> = well_conditioned(&mut rng, &[2], 3);
    let b: Tensor<T> = random_matrix(&mut rng, &[2], 3, 2);
    let x = solve_triangular(&a, &b, trans, lower, unit_diagonal).unwrap();
    let x_bar: Tensor<T> = random_matrix(&mut rng, &[2], 3, 2);
    let (a_bar, b_bar) = solve_triangular_vjp(&a, &x, &x_bar, trans, lower, unit_diagonal).unwrap();

    check_vjp(
        |m| solve_triangular(m, &b, trans, lower, unit_diagonal),
        &a,
        &x_bar,
        &a_bar,
        1e-6,
        1e-5,
    )
    .unwrap();
    check_vjp(
        |rhs| solve_triangular(&a, rhs, trans, lower, unit_diagonal),
        &b,
        &x_bar,
        &b_bar,
        1e-6,
        1e-5,
    )
    .unwrap();

    let da: Tensor<T> = random_matrix(&mut rng, &[2], 3, 3);
    let db: Tensor<T> = random_matrix(&mut rng, &[2], 3, 2);
    let dx = solve_triangular_jvp(&a, &x, &da, &db, trans, lower, unit_diagonal).unwrap();
    let lhs = real_inner(&x_bar, &dx);
    let rhs = real_inner(&a_bar, &da) + real_inner(&b_bar, &db);
    assert_relative_eq!(lhs, rhs, epsilon = 1e-9, max_relative = 1e-9);
}

#[test]
fn test_solve_triangular_rules_every_variant() {
    let mut seed = 70;
    for trans in [Trans::N, Trans::T, Trans::C] {
        for lower in [true, false] {
            for unit_diagonal in [false, true] {
                seed += 1;
                check_triangular_rules::<f64>(seed, trans, lower, unit_diagonal);
                check_triangular_rules::<Complex64>(seed + 100, trans, lower, unit_diagonal);
            }
        }
    }
}

#[test]
fn test_solve_triangular_vjp_stays_in_triangle() {
    let mut rng = seeded_rng(90);
    let a: Tensor<f64> = well_conditioned(&mut rng, &[], 3);
    let b: Tensor<f64> = random_matrix(&mut rng, &[], 3, 1);
    let x = solve_triangular(&a, &b, Trans::T, true, true).unwrap();
    let x_bar: Tensor<f64> = random_matrix(&mut rng, &[], 3, 1);
    let (a_bar, _) = solve_triangular_vjp(&a, &x, &x_bar, Trans::T, true, true).unwrap();
    for i in 0..3 {
        for j in i..3 {
            assert_eq!(a_bar.at(&[i, j]).unwrap(), 0.0);
        }
    }
}

fn check_det_rules<T: Scalar>(seed: u64) {
    let mut rng = seeded_rng(seed);
    let a: Tensor<T> = well_conditioned(&mut rng, &[2], 3);
    let d = det(&a).unwrap();
    let d_bar: Tensor<T> = random_matrix(&mut rng, &[], 1, 2).reshape(vec![2]).unwrap();
    let a_bar = det_vjp(&a, &d, &d_bar).unwrap();
    check_vjp(det, &a, &d_bar, &a_bar, 1e-6, 1e-5).unwrap();

    let da: Tensor<T> = random_matrix(&mut rng, &[2], 3, 3);
    let dd = det_jvp(&a, &d, &da).unwrap();
    assert_relative_eq!(real_inner(&d_bar, &dd), real_inner(&a_bar, &da), epsilon = 1e-8, max_relative = 1e-9);
}

#[test]
fn test_det_rules() {
    check_det_rules::<f64>(91);
    check_det_rules::<Complex64>(92);
}

#[test]
fn test_det_vjp_is_cofactor_matrix() {
    // For [[a, b], [c, d]] the gradient of ad - bc is [[d, -c], [-b, a]].
    let a = Tensor::new(vec![1.0f64, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
    let d = det(&a).unwrap();
    let a_bar = det_vjp(&a, &d, &Tensor::scalar(1.0)).unwrap();
    let expected = [4.0, -3.0, -2.0, 1.0];
    for (got, want) in a_bar.data().iter().zip(expected) {
        assert_relative_eq!(*got, want, epsilon = 1e-12);
    }
}

fn check_inv_rules<T: Scalar>(seed: u64) {
    let mut rng = seeded_rng(seed);
    let a: Tensor<T> = well_conditioned(&mut rng, &[2], 3);
    let x = inv(&a).unwrap().x;
    let x_bar: Tensor<T> = random_matrix(&mut rng, &[2], 3, 3);
    let a_bar = inv_vjp(&x, &x_bar).unwrap();
    check_vjp(|m| Ok(inv(m)?.x), &a, &x_bar, &a_bar, 1e-6, 1e-5).unwrap();

    let da: Tensor<T> = random_matrix(&mut rng, &[2], 3, 3);
    let dx = inv_jvp(&x, &da).unwrap();
    assert_relative_eq!(real_inner(&x_bar, &dx), real_inner(&a_bar, &da), epsilon = 1e-9, max_relative = 1e-9);
}

#[test]
fn test_inv_rules() {
    check_inv_rules::<f64>(93);
    check_inv_rules::<Complex64>(94);
}

#[test]
fn test_solve_rules_reject_mismatched_rhs() {
    let mut rng = seeded_rng(95);
    let a: Tensor<f64> = well_conditioned(&mut rng, &[2], 3);
    let x: Tensor<f64> = random_matrix(&mut rng, &[3], 3, 1);
    assert!(matches!(
        solve_vjp(&a, &x, &x),
        Err(LinaRustError::IncompatibleShapes { .. })
    ));
    let d = Tensor::new(vec![1.0f64], vec![1]).unwrap();
    assert!(matches!(
        det_vjp(&a, &d, &d),
        Err(LinaRustError::IncompatibleShapes { .. })
    ));
}

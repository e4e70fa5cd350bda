use super::*;
use crate::ops::linalg::matmul_op;
use crate::utils::testing::{check_tensor_near, random_matrix, seeded_rng};
use num_complex::Complex64;

#[test]
fn test_tril_triu_offsets() {
    let m = Tensor::new((1..=9).map(|x| x as f64).collect(), vec![3, 3]).unwrap();
    check_tensor_near(
        &tril(&m, 0).unwrap(),
        &[3, 3],
        &[1.0, 0.0, 0.0, 4.0, 5.0, 0.0, 7.0, 8.0, 9.0],
        0.0,
    );
    check_tensor_near(
        &tril(&m, -1).unwrap(),
        &[3, 3],
        &[0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 7.0, 8.0, 0.0],
        0.0,
    );
    check_tensor_near(
        &triu(&m, 1).unwrap(),
        &[3, 3],
        &[0.0, 2.0, 3.0, 0.0, 0.0, 6.0, 0.0, 0.0, 0.0],
        0.0,
    );
}

#[test]
fn test_tril_rectangular_batch() {
    let m = Tensor::new(vec![1.0f64; 12], vec![2, 2, 3]).unwrap();
    let l = tril(&m, 0).unwrap();
    assert_eq!(l.shape(), &[2, 2, 3]);
    assert_eq!(l.data(), &[1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0]);
    assert!(tril(&Tensor::new(vec![1.0f64], vec![1]).unwrap(), 0).is_err());
}

#[test]
fn test_solve_triangular_lower_ignores_upper_garbage() {
    // Upper triangle holds values that must never be read.
    let a = Tensor::new(vec![2.0f64, 99.0, 1.0, 4.0], vec![2, 2]).unwrap();
    let b = Tensor::new(vec![2.0f64, 9.0], vec![2]).unwrap();
    let x = solve_triangular(&a, &b, Trans::N, true, false).unwrap();
    check_tensor_near(&x, &[2], &[1.0, 2.0], 1e-12);
}

#[test]
fn test_solve_triangular_transposes() {
    let mut rng = seeded_rng(11);
    let raw: Tensor<Complex64> = random_matrix(&mut rng, &[], 4, 4);
    let eye4: Tensor<Complex64> = crate::tensor::eye(&[], 4);
    let shift = Complex64::new(4.0, 0.0);
    let a = raw.zip_map(&eye4, "test", |x, e| x + e * shift).unwrap();
    let l = tril(&a, 0).unwrap();
    let b: Tensor<Complex64> = random_matrix(&mut rng, &[], 4, 2);
    for (trans, op) in [
        (Trans::N, l.clone()),
        (Trans::T, l.mt().unwrap()),
        (Trans::C, l.mh().unwrap()),
    ] {
        let x = solve_triangular(&a, &b, trans, true, false).unwrap();
        let back = matmul_op(&op, &x).unwrap();
        check_tensor_near(&back, &[4, 2], b.data(), 1e-10);
    }
}

#[test]
fn test_solve_triangular_unit_diagonal() {
    let a = Tensor::new(vec![5.0f64, 2.0, 0.0, 7.0], vec![2, 2]).unwrap();
    let b = Tensor::new(vec![4.0f64, 1.0], vec![2]).unwrap();
    // Treated as [[1, 2], [0, 1]].
    let x = solve_triangular(&a, &b, Trans::N, false, true).unwrap();
    check_tensor_near(&x, &[2], &[2.0, 1.0], 1e-12);
}

#[test]
fn test_solve_triangular_shape_errors() {
    let a = Tensor::new(vec![1.0f64; 4], vec![2, 2]).unwrap();
    let b = Tensor::new(vec![1.0f64; 3], vec![3]).unwrap();
    assert!(matches!(
        solve_triangular(&a, &b, Trans::N, true, false),
        Err(LinaRustError::ShapeMismatch { .. })
    ));
    let batched_b = Tensor::new(vec![1.0f64; 8], vec![2, 2, 2]).unwrap();
    let batched_a = Tensor::new(vec![1.0f64; 12], vec![3, 2, 2]).unwrap();
    assert!(matches!(
        solve_triangular(&batched_a, &batched_b, Trans::N, true, false),
        Err(LinaRustError::IncompatibleShapes { .. })
    ));
}

#[test]
fn test_trans_codes() {
    assert_eq!(Trans::from_code(0), Some(Trans::N));
    assert_eq!(Trans::from_code(2), Some(Trans::C));
    assert_eq!(Trans::from_code(3), None);
}

use super::*;
use crate::ops::linalg::{adjoint_op, matmul_op};
use crate::tensor::eye;
use crate::utils::testing::{assert_tensors_near, random_matrix, seeded_rng};
use num_complex::Complex64;

fn check_qr<T: Scalar>(a: &Tensor<T>, mode: QrMode, tol: f64) {
    let result = qr(a, mode).unwrap();
    let q = result.q.expect("Q requested");
    let qr_prod = matmul_op(&q, &result.r).unwrap();
    assert_tensors_near(&qr_prod, a, tol);
    let qhq = matmul_op(&adjoint_op(&q).unwrap(), &q).unwrap();
    let cols = q.shape()[q.rank() - 1];
    let batch = &q.shape()[..q.rank() - 2];
    assert_tensors_near(&qhq, &eye(batch, cols), tol);
}

#[test]
fn test_qr_known_real() {
    let a = Tensor::new(vec![3.0f64, 1.0, 4.0, 2.0], vec![2, 2]).unwrap();
    let result = qr(&a, QrMode::Full).unwrap();
    let r = result.r;
    // First column of A has norm 5; LAPACK sign convention makes R[0,0] negative.
    approx::assert_relative_eq!(r.at(&[0, 0]).unwrap(), -5.0, epsilon = 1e-12);
    assert_eq!(r.at(&[1, 0]).unwrap(), 0.0);
    check_qr(&a, QrMode::Full, 1e-12);
}

#[test]
fn test_qr_reconstructs_all_geometries() {
    let mut rng = seeded_rng(31);
    for (m, n) in [(4, 4), (6, 3), (3, 6), (1, 4), (4, 1)] {
        let a: Tensor<f64> = random_matrix(&mut rng, &[2], m, n);
        check_qr(&a, QrMode::Full, 1e-12);
        check_qr(&a, QrMode::Economic, 1e-12);
        let c: Tensor<Complex64> = random_matrix(&mut rng, &[], m, n);
        check_qr(&c, QrMode::Full, 1e-12);
        check_qr(&c, QrMode::Economic, 1e-12);
    }
}

#[test]
fn test_qr_complex_r_has_real_diagonal() {
    let mut rng = seeded_rng(2);
    let a: Tensor<Complex64> = random_matrix(&mut rng, &[], 5, 3);
    let r = qr(&a, QrMode::Economic).unwrap().r;
    assert_eq!(r.shape(), &[3, 3]);
    for i in 0..3 {
        assert_eq!(r.at(&[i, i]).unwrap().im, 0.0);
        for j in 0..i {
            assert_eq!(r.at(&[i, j]).unwrap(), Complex64::new(0.0, 0.0));
        }
    }
}

#[test]
fn test_qr_mode_r_and_shapes() {
    let mut rng = seeded_rng(4);
    let a: Tensor<f64> = random_matrix(&mut rng, &[3], 5, 2);
    let full = qr(&a, QrMode::Full).unwrap();
    assert_eq!(full.q.as_ref().unwrap().shape(), &[3, 5, 5]);
    assert_eq!(full.r.shape(), &[3, 5, 2]);
    let econ = qr(&a, QrMode::Economic).unwrap();
    assert_eq!(econ.q.as_ref().unwrap().shape(), &[3, 5, 2]);
    assert_eq!(econ.r.shape(), &[3, 2, 2]);
    let r_only = qr(&a, QrMode::R).unwrap();
    assert!(r_only.q.is_none());
    assert_eq!(r_only.r, full.r);
}

#[test]
fn test_qr_zero_column() {
    let a = Tensor::new(vec![0.0f64, 1.0, 0.0, 2.0, 0.0, 3.0], vec![3, 2]).unwrap();
    check_qr(&a, QrMode::Full, 1e-12);
}

#[test]
fn test_qr_empty() {
    let a: Tensor<f64> = crate::tensor::zeros(&[0, 4]);
    let result = qr(&a, QrMode::Full).unwrap();
    assert_eq!(result.q.unwrap().shape(), &[0, 0]);
    assert_eq!(result.r.shape(), &[0, 4]);
}

use super::*;
use crate::ops::linalg::matmul_op;
use crate::utils::testing::{assert_tensors_near, check_tensor_near, random_matrix, random_spd, seeded_rng};
use num_complex::Complex64;

#[test]
fn test_lu_factor_known_pivots() {
    let a = Tensor::new(vec![1.0f64, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
    let f = lu_factor(&a).unwrap();
    assert_eq!(f.pivots.data(), &[1, 1]);
    assert_eq!(f.permutation.data(), &[1, 0]);
    check_tensor_near(&f.lu, &[2, 2], &[3.0, 4.0, 1.0 / 3.0, 2.0 - 4.0 / 3.0], 1e-12);
    assert_eq!(f.info.data(), &[Status::Success]);
}

#[test]
fn test_lu_pivot_tie_picks_first_row() {
    let a = Tensor::new(vec![2.0f64, 1.0, -2.0, 3.0], vec![2, 2]).unwrap();
    let f = lu_factor(&a).unwrap();
    assert_eq!(f.pivots.data(), &[0, 1]);
}

#[test]
fn test_lu_reconstructs_permuted_input() {
    let mut rng = seeded_rng(21);
    for (m, n) in [(4, 4), (5, 3), (3, 5)] {
        let a: Tensor<Complex64> = random_matrix(&mut rng, &[2], m, n);
        let r = lu(&a, false).unwrap();
        let p = r.p.clone().unwrap();
        assert_eq!(r.l.shape(), &[2, m, m.min(n)]);
        assert_eq!(r.u.shape(), &[2, m.min(n), n]);
        let plu = matmul_op(&p, &matmul_op(&r.l, &r.u).unwrap()).unwrap();
        assert_tensors_near(&plu, &a, 1e-12);

        let folded = lu(&a, true).unwrap();
        assert!(folded.p.is_none());
        let lu_prod = matmul_op(&folded.l, &folded.u).unwrap();
        assert_tensors_near(&lu_prod, &a, 1e-12);
    }
}

#[test]
fn test_lu_zero_pivot_reported_without_aborting() {
    let a = Tensor::new(
        vec![1.0f64, 2.0, 2.0, 4.0, 2.0, 1.0, 1.0, 3.0],
        vec![2, 2, 2],
    )
    .unwrap();
    let f = lu_factor(&a).unwrap();
    assert_eq!(
        f.info.data(),
        &[Status::ZeroPivot { index: 1 }, Status::Success]
    );
    assert!(f.lu.all_finite());
}

#[test]
fn test_lu_solve_all_transposes() {
    let mut rng = seeded_rng(8);
    let a: Tensor<Complex64> = random_matrix(&mut rng, &[], 4, 4);
    let b: Tensor<Complex64> = random_matrix(&mut rng, &[], 4, 3);
    let f = lu_factor(&a).unwrap();
    for (trans, op) in [
        (Trans::N, a.clone()),
        (Trans::T, a.mt().unwrap()),
        (Trans::C, a.mh().unwrap()),
    ] {
        let x = lu_solve(&f, &b, trans).unwrap();
        let back = matmul_op(&op, &x).unwrap();
        assert_tensors_near(&back, &b, 1e-10);
    }
}

#[test]
fn test_lu_empty_shapes() {
    let a: Tensor<f64> = crate::tensor::zeros(&[0, 3, 2]);
    let f = lu_factor(&a).unwrap();
    assert_eq!(f.lu.shape(), &[0, 3, 2]);
    assert_eq!(f.pivots.shape(), &[0, 2]);
    assert_eq!(f.permutation.shape(), &[0, 3]);

    let z: Tensor<f64> = crate::tensor::zeros(&[0, 0]);
    let r = lu(&z, false).unwrap();
    assert_eq!(r.l.shape(), &[0, 0]);
    assert_eq!(r.info.data(), &[Status::Success]);
}

#[test]
fn test_lu_factor_unpivoted_keeps_row_order() {
    let a = Tensor::new(vec![1.0f64, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
    let f = lu_factor_unpivoted(&a).unwrap();
    assert_eq!(f.pivots.data(), &[0, 1]);
    assert_eq!(f.permutation.data(), &[0, 1]);
    check_tensor_near(&f.lu, &[2, 2], &[1.0, 2.0, 3.0, -2.0], 1e-12);
    assert_eq!(f.info.data(), &[Status::Success]);
}

#[test]
fn test_lu_factor_unpivoted_zero_leading_minor() {
    let a = Tensor::new(vec![0.0f64, 1.0, 1.0, 0.0], vec![2, 2]).unwrap();
    assert_eq!(lu_factor(&a).unwrap().info.data(), &[Status::Success]);
    let f = lu_factor_unpivoted(&a).unwrap();
    assert_eq!(f.info.data(), &[Status::ZeroPivot { index: 0 }]);
    assert_eq!(f.permutation.data(), &[0, 1]);
}

#[test]
fn test_lu_factor_unpivoted_solves_spd_batch() {
    let mut rng = seeded_rng(31);
    let a: Tensor<Complex64> = random_spd(&mut rng, &[2], 4);
    let b: Tensor<Complex64> = random_matrix(&mut rng, &[2], 4, 2);
    let f = lu_factor_unpivoted(&a).unwrap();
    assert!(f.info.data().iter().all(|s| s.is_success()));
    assert!(f.permutation.data().chunks(4).all(|p| p == [0, 1, 2, 3]));
    let x = lu_solve(&f, &b, Trans::N).unwrap();
    assert_tensors_near(&matmul_op(&a, &x).unwrap(), &b, 1e-10);
}

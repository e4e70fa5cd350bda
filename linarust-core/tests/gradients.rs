use linarust_core::autograd::cholesky::cholesky_vjp;
use linarust_core::autograd::{check_vjp, FactorKind, FactorSensitivity, Factorization};
use linarust_core::tensor::Tensor;
use linarust_core::utils::testing::hermitian_part;
use linarust_core::{cholesky, inv};

mod common;
use common::{assert_close, create_test_tensor};

fn fixed_spd() -> Tensor<f64> {
    create_test_tensor(vec![4.0, 1.0, 0.5, 1.0, 3.0, 0.25, 0.5, 0.25, 2.0], vec![3, 3])
}

#[test]
fn test_sum_of_cholesky_factor_matches_finite_differences() {
    let a = fixed_spd();
    let factor = cholesky(&a, true).unwrap().factor;
    let ones = create_test_tensor(vec![1.0f64; 9], vec![3, 3]);
    let a_bar = cholesky_vjp(&factor, &ones, true).unwrap();
    check_vjp(
        |x| Ok(cholesky(&hermitian_part(x)?, true)?.factor),
        &a,
        &ones,
        &a_bar,
        1e-6,
        1e-6,
    )
    .unwrap();
}

#[test]
fn test_log_det_gradient_through_cholesky_is_inverse() {
    // log det A = 2·Σ log L_ii, whose gradient is A⁻¹.
    let a = fixed_spd();
    let f = Factorization::compute(FactorKind::Cholesky { lower: true }, &a).unwrap();
    let l = cholesky(&a, true).unwrap().factor;
    let mut l_bar = vec![0.0f64; 9];
    for i in 0..3 {
        l_bar[i * 4] = 2.0 / l.at(&[i, i]).unwrap();
    }
    let ct = FactorSensitivity::Cholesky {
        factor: create_test_tensor(l_bar, vec![3, 3]),
    };
    let a_bar = f.vjp(&ct).unwrap();
    let expected = inv(&a).unwrap().x;
    assert_close(&a_bar, &expected, 1e-12, "d log det / dA");
}

use linarust_core::scalar::{RealScalar, Scalar};
use linarust_core::tensor::{eye, Tensor};

// Shared across test binaries; not every binary uses every helper.
#[allow(dead_code)]
pub fn create_test_tensor<T: Copy>(data: Vec<T>, shape: Vec<usize>) -> Tensor<T> {
    Tensor::new(data, shape).expect("Test tensor creation failed")
}

/// Asserts `‖actual - expected‖_max ≤ tol`.
#[allow(dead_code)]
pub fn assert_close<T: Scalar>(actual: &Tensor<T>, expected: &Tensor<T>, tol: f64, what: &str) {
    assert_eq!(actual.shape(), expected.shape(), "{}: shape mismatch", what);
    let diff = actual.max_abs_diff(expected).expect("same shapes");
    assert!(
        diff.as_f64() <= tol,
        "{}: max abs diff {} exceeds {}",
        what,
        diff,
        tol
    );
}

/// Asserts that the matrices in `q` have orthonormal columns.
#[allow(dead_code)]
pub fn assert_orthonormal_columns<T: Scalar>(q: &Tensor<T>, tol: f64) {
    let rank = q.rank();
    let cols = q.shape()[rank - 1];
    let qhq = q.mh().unwrap().matmul(q).unwrap();
    let identity: Tensor<T> = eye(&q.shape()[..rank - 2], cols);
    assert_close(&qhq, &identity, tol, "Qᴴ·Q");
}

/// `M·diag(d)` over a batch, with `d` real.
#[allow(dead_code)]
pub fn scale_columns<T: Scalar>(m: &Tensor<T>, d: &Tensor<T::Real>) -> Tensor<T> {
    let cols = m.shape()[m.rank() - 1];
    let rows = m.shape()[m.rank() - 2];
    let data = m
        .data()
        .iter()
        .enumerate()
        .map(|(idx, &x)| {
            let element = idx / (rows * cols);
            x.scale(d.data()[element * cols + idx % cols])
        })
        .collect();
    create_test_tensor(data, m.shape().to_vec())
}

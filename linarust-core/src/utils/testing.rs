use crate::error::LinaRustError;
use crate::ops::linalg::{adjoint_op, matmul_op};
use crate::scalar::{RealScalar, Scalar};
use crate::tensor::{eye, randn, Tensor};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Checks if a tensor has the expected shape and data within tolerance.
/// Panics if shapes differ or any element differs by more than `tolerance`
/// in modulus.
pub fn check_tensor_near<T: Scalar>(
    actual: &Tensor<T>,
    expected_shape: &[usize],
    expected_data: &[T],
    tolerance: f64,
) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");
    assert_eq!(
        actual.numel(),
        expected_data.len(),
        "Data length mismatch"
    );
    for (i, (a, e)) in actual.data().iter().zip(expected_data.iter()).enumerate() {
        let diff = (*a - *e).modulus().as_f64();
        if !(diff <= tolerance) {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}

/// Asserts that two tensors have the same shape and agree elementwise.
pub fn assert_tensors_near<T: Scalar>(actual: &Tensor<T>, expected: &Tensor<T>, tolerance: f64) {
    check_tensor_near(actual, expected.shape(), expected.data(), tolerance);
}

/// Helper to create a simple tensor for testing purposes.
pub fn create_test_tensor<T: Copy>(data: Vec<T>, shape: Vec<usize>) -> Tensor<T> {
    Tensor::new(data, shape).expect("Failed to create test tensor")
}

/// Deterministic generator for reproducible tests.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn batched(batch_shape: &[usize], core: [usize; 2]) -> Vec<usize> {
    let mut shape = batch_shape.to_vec();
    shape.extend(core);
    shape
}

/// Standard normal `[..batch_shape, rows, cols]` tensor.
pub fn random_matrix<T: Scalar>(rng: &mut StdRng, batch_shape: &[usize], rows: usize, cols: usize) -> Tensor<T> {
    randn(&batched(batch_shape, [rows, cols]), rng)
}

/// Random Hermitian matrices `(B + Bᴴ) / 2`.
pub fn random_hermitian<T: Scalar>(rng: &mut StdRng, batch_shape: &[usize], n: usize) -> Tensor<T> {
    let b: Tensor<T> = random_matrix(rng, batch_shape, n, n);
    let bh = adjoint_op(&b).expect("adjoint of a square batch");
    let half = T::from_f64(0.5);
    b.zip_map(&bh, "random_hermitian", |x, y| (x + y) * half)
        .expect("same shapes")
}

/// Well-conditioned Hermitian positive-definite matrices `B·Bᴴ + n·I`.
pub fn random_spd<T: Scalar>(rng: &mut StdRng, batch_shape: &[usize], n: usize) -> Tensor<T> {
    let b: Tensor<T> = random_matrix(rng, batch_shape, n, n);
    let bh = adjoint_op(&b).expect("adjoint of a square batch");
    let gram = matmul_op(&b, &bh).expect("square product");
    let shift = T::from_re(<T::Real as RealScalar>::of_usize(n));
    let identity: Tensor<T> = eye(batch_shape, n);
    gram.zip_map(&identity, "random_spd", |g, e| g + e * shift)
        .expect("same shapes")
}

/// Element `index` of a batch as its own unbatched tensor.
pub fn batch_element<T: Copy>(t: &Tensor<T>, core_rank: usize, index: usize) -> Tensor<T> {
    let core_shape = t.shape()[t.rank() - core_rank..].to_vec();
    let core_len: usize = core_shape.iter().product();
    Tensor::new(
        t.data()[index * core_len..(index + 1) * core_len].to_vec(),
        core_shape,
    )
    .expect("slice matches core shape")
}

/// `(A + Aᴴ) / 2` per batch element. Lets finite differences see every entry
/// of an input that a Hermitian routine reads from one triangle only.
pub fn hermitian_part<T: Scalar>(a: &Tensor<T>) -> Result<Tensor<T>, LinaRustError> {
    let ah = adjoint_op(a)?;
    let half = T::from_f64(0.5);
    a.zip_map(&ah, "hermitian_part", |x, y| (x + y) * half)
}

/// `Re Σ conj(a)·b`, the pairing under which tangents and cotangents are dual.
pub fn real_inner<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) -> f64 {
    assert_eq!(a.shape(), b.shape(), "real_inner shape mismatch");
    a.data()
        .iter()
        .zip(b.data())
        .map(|(&x, &y)| (x.conj() * y).re().as_f64())
        .sum()
}

/// Elementwise `|x|²`, a phase-invariant view of singular or eigen vectors.
pub fn abs_sq<T: Scalar>(t: &Tensor<T>) -> Tensor<T::Real> {
    t.map(|x| x.modulus_sq())
}

/// Cotangent of `Σ c ∘ |v|²` with respect to `v`: `2·c ∘ v`.
pub fn abs_sq_cotangent<T: Scalar>(v: &Tensor<T>, c: &Tensor<T::Real>) -> Tensor<T> {
    let two = <T::Real as RealScalar>::of_f64(2.0);
    let data = v
        .data()
        .iter()
        .zip(c.data())
        .map(|(&x, &w)| x.scale(two * w))
        .collect();
    Tensor::new(data, v.shape().to_vec()).expect("cotangent keeps the shape of v")
}

//! Overflow-safe `ln Σ exp(x)` reductions.

use linarust_core::error::LinaRustError;
use linarust_core::scalar::RealScalar;
use linarust_core::tensor::utils::normalize_axis;
use linarust_core::tensor::Tensor;
use log::debug;

/// `ln Σ exp(v)` for one slice, shifted by its maximum.
///
/// NaN anywhere gives NaN. An empty or all `-∞` slice gives `-∞`, and `+∞`
/// anywhere gives `+∞`.
pub fn logsumexp_slice(values: &[f64]) -> f64 {
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_infinite() {
        return max;
    }
    let sum: f64 = values.iter().map(|&v| (v - max).exp()).sum();
    max + sum.ln()
}

/// `ln Σ exp(a)` along `axis`, or over every element when `axis` is `None`.
///
/// Negative axes count from the end. With `keepdims` the reduced axis (or
/// every axis, for a full reduction) is kept with length 1. Sums are
/// accumulated in `f64`.
pub fn logsumexp<T: RealScalar>(a: &Tensor<T>, axis: Option<isize>, keepdims: bool) -> Result<Tensor<T>, LinaRustError> {
    let shape = a.shape();
    let rank = shape.len();
    let (outer, len, inner, out_shape) = match axis {
        None => {
            let out_shape = if keepdims { vec![1; rank] } else { Vec::new() };
            (1, a.numel(), 1, out_shape)
        }
        Some(axis) => {
            let ax = normalize_axis(axis, rank).ok_or(LinaRustError::AxisOutOfBounds { axis, rank })?;
            let mut out_shape = shape.to_vec();
            if keepdims {
                out_shape[ax] = 1;
            } else {
                out_shape.remove(ax);
            }
            (
                shape[..ax].iter().product(),
                shape[ax],
                shape[ax + 1..].iter().product(),
                out_shape,
            )
        }
    };
    debug!(
        "logsumexp: shape={:?} axis={:?} keepdims={} dtype={:?}",
        shape,
        axis,
        keepdims,
        T::DTYPE
    );

    let data = a.data();
    let mut slice = Vec::with_capacity(len);
    let mut out = Vec::with_capacity(outer * inner);
    for o in 0..outer {
        for i in 0..inner {
            slice.clear();
            slice.extend((0..len).map(|k| data[(o * len + k) * inner + i].as_f64()));
            out.push(T::of_f64(logsumexp_slice(&slice)));
        }
    }
    Tensor::new(out, out_shape)
}

#[cfg(test)]
#[path = "logsumexp_test.rs"]
mod tests;

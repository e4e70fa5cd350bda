//! Special functions, log-sum-exp reductions and continuous distributions
//! over [`linarust_core::Tensor`].
//!
//! Scalar kernels live in [`functions`] and work on `f64`. The tensor
//! wrappers in [`elementwise`], [`logsumexp`] and [`stats`] evaluate in
//! `f64` and round back to the tensor's element type.

pub mod elementwise;
pub mod functions;
pub mod logsumexp;
pub mod stats;

pub use logsumexp::{logsumexp, logsumexp_slice};
pub use stats::{Beta, Distribution, Expon, Gamma, Laplace, LocScale, Norm, Uniform};

//! # Tensor Operations Module (`ops`)
//!
//! Operations are grouped by concern. Each batched operation validates its
//! operands through [`crate::batch::BatchView`], runs a per-matrix kernel
//! (named `xxx_kernel`, `pub(crate)`) over the batch, and stacks the results.
//!
//! - [`linalg`]: factorizations, solves, determinants and triangular helpers.

pub mod linalg;

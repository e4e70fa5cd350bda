use std::fmt;

/// Numerical outcome of one batch element.
///
/// Kernels never abort a batch because one element failed: each element gets
/// its own status, and the caller decides whether a failure is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Success,
    /// The leading minor of this order (1-based) is not positive definite.
    NotPositiveDefinite { order: usize },
    /// The pivot at this 0-based position is exactly zero.
    ZeroPivot { index: usize },
    /// The Jacobi iteration did not converge within this many sweeps.
    NotConverged { sweeps: usize },
    /// The element failed for a reason the kernel could not classify.
    ElementFailed,
}

impl Status {
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }

    /// LAPACK-style `info` code: 0 on success, a positive 1-based index or
    /// sweep count for numerical failures, -1 for unclassified failures.
    pub fn code(&self) -> i32 {
        match *self {
            Status::Success => 0,
            Status::NotPositiveDefinite { order } => order as i32,
            Status::ZeroPivot { index } => index as i32 + 1,
            Status::NotConverged { sweeps } => sweeps as i32,
            Status::ElementFailed => -1,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::NotPositiveDefinite { order } => {
                write!(f, "leading minor of order {} is not positive definite", order)
            }
            Status::ZeroPivot { index } => write!(f, "pivot {} is exactly zero", index),
            Status::NotConverged { sweeps } => {
                write!(f, "no convergence after {} sweeps", sweeps)
            }
            Status::ElementFailed => write!(f, "element failed"),
        }
    }
}

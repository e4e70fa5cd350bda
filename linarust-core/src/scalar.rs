//! Element types accepted by the linear-algebra kernels.
//!
//! Kernels are written once against [`Scalar`] and instantiated for `f32`,
//! `f64`, `Complex32` and `Complex64`. Real types are their own `Real`
//! counterpart, so conjugation and the real/imaginary split cost nothing for
//! them.

use crate::types::DType;
use num_complex::{Complex32, Complex64};
use num_traits::{Float, One, Zero};
use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// A real or complex floating-point element.
pub trait Scalar:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Sum
{
    /// The real type of the same precision.
    type Real: RealScalar;

    /// Runtime tag of this element type.
    const DTYPE: DType;

    /// Complex conjugate (identity for real types).
    fn conj(self) -> Self;

    /// Modulus `|x|`.
    fn modulus(self) -> Self::Real;

    /// Squared modulus `|x|²`, without the square root.
    fn modulus_sq(self) -> Self::Real;

    fn re(self) -> Self::Real;

    fn im(self) -> Self::Real;

    fn from_re(re: Self::Real) -> Self;

    /// Builds a value from its parts. Real types drop `im`.
    fn from_re_im(re: Self::Real, im: Self::Real) -> Self;

    /// Multiplies by a real factor.
    fn scale(self, factor: Self::Real) -> Self;

    fn from_f64(value: f64) -> Self {
        Self::from_re(<Self::Real as RealScalar>::of_f64(value))
    }

    fn is_finite_value(self) -> bool {
        self.re().is_finite() && self.im().is_finite()
    }

    /// Quiet NaN of this type.
    fn nan_value() -> Self {
        Self::from_re_im(Self::Real::nan(), Self::Real::nan())
    }
}

/// A real floating-point element (`f32` or `f64`).
pub trait RealScalar: Scalar<Real = Self> + Float + Display {
    /// Runtime tag of the complex type with this precision.
    const COMPLEX_DTYPE: DType;

    fn of_f64(value: f64) -> Self;

    fn as_f64(self) -> f64;

    fn of_usize(value: usize) -> Self {
        Self::of_f64(value as f64)
    }
}

macro_rules! impl_real_scalar {
    ($ty:ty, $dtype:expr, $complex_dtype:expr) => {
        impl Scalar for $ty {
            type Real = $ty;
            const DTYPE: DType = $dtype;

            #[inline]
            fn conj(self) -> Self {
                self
            }
            #[inline]
            fn modulus(self) -> Self {
                Float::abs(self)
            }
            #[inline]
            fn modulus_sq(self) -> Self {
                self * self
            }
            #[inline]
            fn re(self) -> Self {
                self
            }
            #[inline]
            fn im(self) -> Self {
                0.0
            }
            #[inline]
            fn from_re(re: Self) -> Self {
                re
            }
            #[inline]
            fn from_re_im(re: Self, _im: Self) -> Self {
                re
            }
            #[inline]
            fn scale(self, factor: Self) -> Self {
                self * factor
            }
        }

        impl RealScalar for $ty {
            const COMPLEX_DTYPE: DType = $complex_dtype;

            #[inline]
            fn of_f64(value: f64) -> Self {
                value as $ty
            }
            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

macro_rules! impl_complex_scalar {
    ($ty:ty, $real:ty, $dtype:expr) => {
        impl Scalar for $ty {
            type Real = $real;
            const DTYPE: DType = $dtype;

            #[inline]
            fn conj(self) -> Self {
                <$ty>::new(self.re, -self.im)
            }
            #[inline]
            fn modulus(self) -> $real {
                self.re.hypot(self.im)
            }
            #[inline]
            fn modulus_sq(self) -> $real {
                self.re * self.re + self.im * self.im
            }
            #[inline]
            fn re(self) -> $real {
                self.re
            }
            #[inline]
            fn im(self) -> $real {
                self.im
            }
            #[inline]
            fn from_re(re: $real) -> Self {
                <$ty>::new(re, 0.0)
            }
            #[inline]
            fn from_re_im(re: $real, im: $real) -> Self {
                <$ty>::new(re, im)
            }
            #[inline]
            fn scale(self, factor: $real) -> Self {
                <$ty>::new(self.re * factor, self.im * factor)
            }
        }
    };
}

impl_real_scalar!(f32, DType::F32, DType::C64);
impl_real_scalar!(f64, DType::F64, DType::C128);
impl_complex_scalar!(Complex32, f32, DType::C64);
impl_complex_scalar!(Complex64, f64, DType::C128);

/// `x / |x|`, or one when `x` is zero. Used to align complex phases.
#[inline]
pub(crate) fn phase<T: Scalar>(x: T) -> T {
    let m = x.modulus();
    if m == T::Real::zero() {
        T::one()
    } else {
        x.scale(m.recip())
    }
}

/// Multiplies by the imaginary unit: `i·x`. Zero for real types.
#[inline]
pub(crate) fn mul_i<T: Scalar>(x: T) -> T {
    T::from_re_im(-x.im(), x.re())
}

/// Index of the element with the largest modulus, first one on ties.
pub(crate) fn argmax_modulus<T: Scalar>(values: impl Iterator<Item = T>) -> Option<usize> {
    let mut best: Option<(usize, T::Real)> = None;
    for (i, v) in values.enumerate() {
        let m = v.modulus();
        match best {
            Some((_, bm)) if !(m > bm) => {}
            _ => best = Some((i, m)),
        }
    }
    best.map(|(i, _)| i)
}

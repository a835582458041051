//! Floating point abstraction shared by every descriptor.
//!
//! Descriptors are generic over [`Real`], which is implemented for `f32` and
//! `f64`. The width is picked at compile time by the caller's sample type.

use std::fmt::Debug;

use num_traits::{Float, FloatConst};

/// Floating point sample type accepted by the engine.
pub trait Real: Float + FloatConst + Default + Debug + Send + Sync + 'static {}

impl<T> Real for T where T: Float + FloatConst + Default + Debug + Send + Sync + 'static {}

/// Converts an `f64` literal into `F`.
#[inline]
pub fn lit<F: Real>(value: f64) -> F {
    F::from(value).unwrap_or_else(F::zero)
}

/// Converts a count or index into `F`.
#[inline]
pub fn from_usize<F: Real>(value: usize) -> F {
    F::from(value).unwrap_or_else(F::zero)
}

/// Converts `F` back into `f64`, used for error reporting and serialisation.
#[inline]
pub fn to_f64<F: Real>(value: F) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Sum of absolute values.
#[inline]
pub(crate) fn abs_sum<F: Real>(values: &[F]) -> F {
    values.iter().fold(F::zero(), |acc, v| acc + v.abs())
}

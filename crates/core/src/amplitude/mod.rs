//! Time domain descriptors computed directly over a block of samples.
//!
//! Every function is pure and returns zero for inputs that are too short to
//! describe, so callers never have to special-case silence or empty blocks.

use crate::numeric::{from_usize, lit, Real};

/// Largest absolute sample value.
pub fn peak<F: Real>(buffer: &[F]) -> F {
    buffer
        .iter()
        .fold(F::zero(), |peak, sample| peak.max(sample.abs()))
}

/// Root mean square amplitude.
pub fn rms<F: Real>(buffer: &[F]) -> F {
    if buffer.is_empty() {
        return F::zero();
    }

    let sum = buffer
        .iter()
        .fold(F::zero(), |acc, &sample| acc + sample * sample);
    (sum / from_usize(buffer.len())).sqrt()
}

/// Arithmetic mean of the samples.
pub fn mean<F: Real>(buffer: &[F]) -> F {
    if buffer.is_empty() {
        return F::zero();
    }

    let sum = buffer.iter().fold(F::zero(), |acc, &sample| acc + sample);
    sum / from_usize(buffer.len())
}

/// Population variance about the sample mean.
pub fn variance<F: Real>(buffer: &[F]) -> F {
    if buffer.is_empty() {
        return F::zero();
    }

    let mean = mean(buffer);
    let sum = buffer.iter().fold(F::zero(), |acc, &sample| {
        let deviation = sample - mean;
        acc + deviation * deviation
    });
    sum / from_usize(buffer.len())
}

/// Excess kurtosis (fourth standardised moment minus 3).
///
/// `mean` and `variance` may be supplied when already known; `None` computes
/// them from `buffer`. Returns zero for empty or constant input.
pub fn kurtosis<F: Real>(buffer: &[F], mean: Option<F>, variance: Option<F>) -> F {
    let (mean, variance) = match moments(buffer, mean, variance) {
        Some(moments) => moments,
        None => return F::zero(),
    };

    let fourth = central_moment_sum(buffer, mean, 4) / from_usize(buffer.len());
    fourth / (variance * variance) - lit(3.0)
}

/// Third standardised moment. Same argument and guard policy as [`kurtosis`].
pub fn skewness<F: Real>(buffer: &[F], mean: Option<F>, variance: Option<F>) -> F {
    let (mean, variance) = match moments(buffer, mean, variance) {
        Some(moments) => moments,
        None => return F::zero(),
    };

    let third = central_moment_sum(buffer, mean, 3) / from_usize(buffer.len());
    third / variance.sqrt().powi(3)
}

/// Fraction of adjacent sample pairs whose sign differs.
///
/// Zero is grouped with the positive values, so `[0.0, 1.0]` does not cross
/// while `[0.0, -1.0]` does.
pub fn zerocrossing<F: Real>(buffer: &[F]) -> F {
    if buffer.len() < 2 {
        return F::zero();
    }

    let crossings = buffer
        .windows(2)
        .filter(|pair| pair[0].is_sign_negative() != pair[1].is_sign_negative())
        .count();
    from_usize::<F>(crossings) / from_usize(buffer.len() - 1)
}

fn moments<F: Real>(buffer: &[F], mean: Option<F>, var: Option<F>) -> Option<(F, F)> {
    if buffer.is_empty() {
        return None;
    }

    // Constant input: the computed variance can land a few ulps above zero
    // when the mean is not exactly representable.
    let first = buffer[0];
    if buffer.iter().all(|&sample| sample == first) {
        return None;
    }

    let var = var.unwrap_or_else(|| variance(buffer));
    if var <= F::zero() {
        return None;
    }

    let mean = mean.unwrap_or_else(|| self::mean(buffer));
    Some((mean, var))
}

fn central_moment_sum<F: Real>(buffer: &[F], mean: F, order: i32) -> F {
    buffer
        .iter()
        .fold(F::zero(), |acc, &sample| acc + (sample - mean).powi(order))
}

//! Frequency domain descriptors over a one-sided magnitude spectrum.
//!
//! The magnitude array runs from DC to Nyquist and every bin takes part in
//! the sums. Functions that need bin frequencies accept an optional
//! precomputed table; a missing or too short table is replaced by one built
//! for the inferred transform size `(bins - 1) * 2`.
//!
//! Centroid feeds spread, and both feed kurtosis and skewness. Those
//! functions take the intermediate values as `Option`s so a caller that
//! already has them (see [`crate::DescriptorEngine`]) does not pay for them
//! twice.

mod table;

use std::borrow::Cow;

pub use table::{precompute_frequencies, FrequencyTable};

use crate::numeric::{abs_sum, from_usize, lit, Real};

/// Magnitudes below this value are clamped before taking logarithms.
pub const FLATNESS_FLOOR: f64 = 1e-5;

/// Default fraction of cumulative magnitude used by [`rolloff`].
pub const DEFAULT_ROLLOFF_POINT: f64 = 0.85;

/// Magnitude weighted mean frequency.
pub fn centroid<F: Real>(magnitudes: &[F], sample_rate: F, frequencies: Option<&[F]>) -> F {
    if magnitudes.len() < 2 {
        return F::zero();
    }

    let frequencies = resolve(magnitudes.len(), sample_rate, frequencies);
    let (weighted, total) = magnitudes.iter().zip(frequencies.iter()).fold(
        (F::zero(), F::zero()),
        |(weighted, total), (&m, &f)| (weighted + f * m.abs(), total + m.abs()),
    );

    if total > F::zero() {
        weighted / total
    } else {
        F::zero()
    }
}

/// Magnitude weighted standard deviation of frequency about the centroid.
pub fn spread<F: Real>(
    magnitudes: &[F],
    sample_rate: F,
    frequencies: Option<&[F]>,
    centroid: Option<F>,
) -> F {
    if magnitudes.len() < 2 {
        return F::zero();
    }

    let frequencies = resolve(magnitudes.len(), sample_rate, frequencies);
    let centroid =
        centroid.unwrap_or_else(|| self::centroid(magnitudes, sample_rate, Some(&*frequencies)));
    let total = abs_sum(magnitudes);
    if total <= F::zero() {
        return F::zero();
    }

    let spread = (weighted_moment(magnitudes, &frequencies, centroid, 2) / total).sqrt();
    if spread <= spread_tolerance(&frequencies) {
        F::zero()
    } else {
        spread
    }
}

/// Largest magnitude divided by the magnitude sum.
pub fn crestfactor<F: Real>(magnitudes: &[F]) -> F {
    if magnitudes.len() < 2 {
        return F::zero();
    }

    let (max, total) = magnitudes
        .iter()
        .fold((F::zero(), F::zero()), |(max, total), m| {
            (max.max(m.abs()), total + m.abs())
        });

    if total > F::zero() {
        max / total
    } else {
        F::zero()
    }
}

/// Average slope of the spectrum relative to the DC bin.
///
/// `sum_{k>=1} (|m[k]| - |m[0]|) / k`, normalised by the magnitude sum over
/// the same bins (DC excluded).
pub fn decrease<F: Real>(magnitudes: &[F]) -> F {
    if magnitudes.len() < 2 {
        return F::zero();
    }

    let first = magnitudes[0].abs();
    let (diff_sum, total) = magnitudes.iter().enumerate().skip(1).fold(
        (F::zero(), F::zero()),
        |(diff_sum, total), (k, m)| {
            (
                diff_sum + (m.abs() - first) / from_usize(k),
                total + m.abs(),
            )
        },
    );

    if total > F::zero() {
        diff_sum / total
    } else {
        F::zero()
    }
}

/// Normalised Shannon entropy of the power spectrum, in `[0, 1]`.
pub fn entropy<F: Real>(magnitudes: &[F]) -> F {
    if magnitudes.len() < 2 {
        return F::zero();
    }

    let power_sum = magnitudes.iter().fold(F::zero(), |acc, &m| acc + m * m);
    if power_sum <= F::zero() {
        return F::zero();
    }

    let h = magnitudes.iter().fold(F::zero(), |acc, &m| {
        let p = m * m / power_sum;
        if p > F::zero() {
            acc + p * p.log2()
        } else {
            acc
        }
    });

    -h / from_usize::<F>(magnitudes.len()).log2()
}

/// Geometric mean over arithmetic mean of the magnitudes (Wiener entropy).
pub fn flatness<F: Real>(magnitudes: &[F]) -> F {
    if magnitudes.len() < 2 {
        return F::zero();
    }

    let floor = lit::<F>(FLATNESS_FLOOR);
    let (total, log_sum) = magnitudes
        .iter()
        .fold((F::zero(), F::zero()), |(total, log_sum), m| {
            let m = m.abs();
            (total + m, log_sum + m.max(floor).ln())
        });

    if total <= F::zero() {
        return F::zero();
    }

    let count = from_usize::<F>(magnitudes.len());
    (log_sum / count).exp() / (total / count)
}

/// Euclidean distance between two spectra, divided by the bin count.
///
/// Spectra of different lengths cannot be compared and yield zero.
pub fn flux<F: Real>(magnitudes: &[F], previous: &[F]) -> F {
    if magnitudes.is_empty() || magnitudes.len() != previous.len() {
        return F::zero();
    }

    let squared = magnitudes
        .iter()
        .zip(previous)
        .fold(F::zero(), |acc, (&m, &p)| {
            let diff = m.abs() - p.abs();
            acc + diff * diff
        });

    squared.sqrt() / from_usize(magnitudes.len())
}

/// Sum of absolute differences between neighbouring bins over the magnitude
/// sum.
pub fn irregularity<F: Real>(magnitudes: &[F]) -> F {
    if magnitudes.len() < 2 {
        return F::zero();
    }

    let total = abs_sum(magnitudes);
    if total <= F::zero() {
        return F::zero();
    }

    let diffs = magnitudes
        .windows(2)
        .fold(F::zero(), |acc, pair| acc + (pair[1].abs() - pair[0].abs()).abs());
    diffs / total
}

/// Excess kurtosis of the frequency distribution about the centroid.
pub fn kurtosis<F: Real>(
    magnitudes: &[F],
    sample_rate: F,
    frequencies: Option<&[F]>,
    centroid: Option<F>,
    spread: Option<F>,
) -> F {
    standardized_moment(magnitudes, sample_rate, frequencies, centroid, spread, 4)
        .map(|moment| moment - lit(3.0))
        .unwrap_or_else(F::zero)
}

/// Frequency of the strongest bin (the lowest one on ties).
pub fn peak<F: Real>(magnitudes: &[F], sample_rate: F, frequencies: Option<&[F]>) -> F {
    if magnitudes.len() < 2 {
        return F::zero();
    }

    let frequencies = resolve(magnitudes.len(), sample_rate, frequencies);
    let (index, _) = magnitudes
        .iter()
        .enumerate()
        .fold((0, F::zero()), |(index, max), (k, m)| {
            if m.abs() > max {
                (k, m.abs())
            } else {
                (index, max)
            }
        });

    frequencies[index]
}

/// Lowest frequency at which the cumulative magnitude reaches
/// `rolloff_point` of the total. Falls back to the last bin.
pub fn rolloff<F: Real>(
    magnitudes: &[F],
    sample_rate: F,
    rolloff_point: F,
    frequencies: Option<&[F]>,
) -> F {
    if magnitudes.len() < 2 {
        return F::zero();
    }

    let frequencies = resolve(magnitudes.len(), sample_rate, frequencies);
    let threshold = rolloff_point * abs_sum(magnitudes);

    let mut cumulative = F::zero();
    let index = magnitudes
        .iter()
        .position(|m| {
            cumulative = cumulative + m.abs();
            cumulative >= threshold
        })
        .unwrap_or(magnitudes.len() - 1);

    frequencies[index]
}

/// Third standardised moment of the frequency distribution about the
/// centroid.
pub fn skewness<F: Real>(
    magnitudes: &[F],
    sample_rate: F,
    frequencies: Option<&[F]>,
    centroid: Option<F>,
    spread: Option<F>,
) -> F {
    standardized_moment(magnitudes, sample_rate, frequencies, centroid, spread, 3)
        .unwrap_or_else(F::zero)
}

/// Least squares slope of magnitude against frequency.
pub fn slope<F: Real>(magnitudes: &[F], sample_rate: F, frequencies: Option<&[F]>) -> F {
    if magnitudes.len() < 2 {
        return F::zero();
    }

    let frequencies = resolve(magnitudes.len(), sample_rate, frequencies);
    let count = from_usize::<F>(magnitudes.len());
    let mean_frequency = frequencies.iter().fold(F::zero(), |acc, &f| acc + f) / count;
    let mean_magnitude = abs_sum(magnitudes) / count;

    let (numerator, denominator) = magnitudes.iter().zip(frequencies.iter()).fold(
        (F::zero(), F::zero()),
        |(numerator, denominator), (&m, &f)| {
            let df = f - mean_frequency;
            (
                numerator + df * (m.abs() - mean_magnitude),
                denominator + df * df,
            )
        },
    );

    if denominator > F::zero() {
        numerator / denominator
    } else {
        F::zero()
    }
}

/// Returns a frequency table of exactly `bins` entries, borrowing the
/// supplied one when it is long enough.
fn resolve<'a, F: Real>(bins: usize, sample_rate: F, frequencies: Option<&'a [F]>) -> Cow<'a, [F]> {
    match frequencies {
        Some(table) if table.len() >= bins => Cow::Borrowed(&table[..bins]),
        _ => Cow::Owned(table::bin_frequencies(
            bins.saturating_sub(1) * 2,
            sample_rate,
            bins,
        )),
    }
}

/// Spreads at or below this are rounding noise left by the centroid
/// division, as with a single nonzero bin.
fn spread_tolerance<F: Real>(frequencies: &[F]) -> F {
    let top = frequencies.iter().fold(F::zero(), |top, f| top.max(f.abs()));
    from_usize::<F>(frequencies.len()) * F::epsilon() * top
}

fn weighted_moment<F: Real>(magnitudes: &[F], frequencies: &[F], centre: F, order: i32) -> F {
    magnitudes
        .iter()
        .zip(frequencies)
        .fold(F::zero(), |acc, (&m, &f)| acc + (f - centre).powi(order) * m.abs())
}

/// Shared body of spectral kurtosis and skewness. `None` means the moment is
/// undefined (too few bins, silent spectrum or zero spread).
fn standardized_moment<F: Real>(
    magnitudes: &[F],
    sample_rate: F,
    frequencies: Option<&[F]>,
    centroid: Option<F>,
    spread: Option<F>,
    order: i32,
) -> Option<F> {
    if magnitudes.len() < 2 {
        return None;
    }

    let frequencies = resolve(magnitudes.len(), sample_rate, frequencies);
    let centroid =
        centroid.unwrap_or_else(|| self::centroid(magnitudes, sample_rate, Some(&*frequencies)));
    let spread = spread.unwrap_or_else(|| {
        self::spread(magnitudes, sample_rate, Some(&*frequencies), Some(centroid))
    });

    let total = abs_sum(magnitudes);
    if total <= F::zero() || spread <= spread_tolerance(&frequencies) {
        return None;
    }

    let numerator = weighted_moment(magnitudes, &frequencies, centroid, order);
    Some(numerator / (total * spread.powi(order)))
}

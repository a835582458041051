//! Conversion from raw forward transform output to one-sided magnitudes.
//!
//! The engine does not run transforms itself. Whatever FFT the host uses
//! hands over its output in one of the layouts below.

use realfft::num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::{numeric::Real, DescriptorError, Result};

/// Memory layout of a raw transform buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformLayout {
    /// `[re0, im0, re1, im1, ...]` holding all N complex bins of an N-point
    /// transform. Only bins `0..=N/2` are kept.
    #[default]
    Interleaved,
    /// Packed real transform of length N:
    /// `[re0, re(N/2), re1, im1, ..., re(N/2-1), im(N/2-1)]`.
    /// DC and Nyquist have no imaginary part.
    Packed,
}

impl TransformLayout {
    /// Transform size N described by a raw buffer of `len` values.
    pub fn transform_size(self, len: usize) -> usize {
        match self {
            Self::Interleaved => len / 2,
            Self::Packed => len,
        }
    }
}

/// Derives the one-sided magnitude spectrum (`N / 2 + 1` bins) from a raw
/// transform buffer.
pub fn magnitudes<F: Real>(stft: &[F], layout: TransformLayout) -> Result<Vec<F>> {
    match layout {
        TransformLayout::Interleaved => interleaved_magnitudes(stft),
        TransformLayout::Packed => packed_magnitudes(stft),
    }
}

/// Magnitudes of complex bins that are already one-sided, such as the output
/// of a real-to-complex FFT.
pub fn magnitudes_from_complex<F: Real>(spectrum: &[Complex<F>]) -> Vec<F> {
    spectrum.iter().map(|bin| bin.norm()).collect()
}

fn interleaved_magnitudes<F: Real>(stft: &[F]) -> Result<Vec<F>> {
    if stft.len() % 2 != 0 {
        return Err(DescriptorError::InvalidTransform(
            "interleaved data must hold real/imaginary pairs",
        ));
    }

    let size = stft.len() / 2;
    if size <= 2 {
        return Err(DescriptorError::InvalidTransform(
            "interleaved data must describe more than two bins",
        ));
    }

    Ok(stft
        .chunks_exact(2)
        .take(size / 2 + 1)
        .map(|pair| pair[0].hypot(pair[1]))
        .collect())
}

fn packed_magnitudes<F: Real>(stft: &[F]) -> Result<Vec<F>> {
    let size = stft.len();
    if size <= 2 || size % 2 != 0 {
        return Err(DescriptorError::InvalidTransform(
            "packed data must have an even length greater than two",
        ));
    }

    let half = size / 2;
    let mut magnitudes = Vec::with_capacity(half + 1);
    magnitudes.push(stft[0].abs());
    magnitudes.extend(
        stft[2..]
            .chunks_exact(2)
            .map(|pair| pair[0].hypot(pair[1])),
    );
    magnitudes.push(stft[1].abs());
    Ok(magnitudes)
}

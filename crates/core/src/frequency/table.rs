use tracing::debug;

use crate::numeric::{from_usize, to_f64, Real};

/// Bin centre frequencies in Hz for a transform of `stft_size` samples.
///
/// The result spans DC through Nyquist inclusive (`stft_size / 2 + 1`
/// entries) and is empty when `stft_size <= 2` or the sample rate is not
/// positive.
pub fn precompute_frequencies<F: Real>(stft_size: usize, sample_rate: F) -> Vec<F> {
    if stft_size <= 2 || sample_rate <= F::zero() {
        return Vec::new();
    }

    bin_frequencies(stft_size, sample_rate, stft_size / 2 + 1)
}

/// `len` bin frequencies spaced `sample_rate / stft_size` apart.
pub(crate) fn bin_frequencies<F: Real>(stft_size: usize, sample_rate: F, len: usize) -> Vec<F> {
    if stft_size == 0 {
        return vec![F::zero(); len];
    }

    let bandwidth = sample_rate / from_usize(stft_size);
    (0..len).map(|bin| from_usize::<F>(bin) * bandwidth).collect()
}

/// Cached frequency table keyed by transform size and sample rate.
///
/// The table is only rebuilt when its key changes or when it becomes shorter
/// than the spectrum it has to describe.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable<F: Real> {
    stft_size: usize,
    sample_rate: F,
    frequencies: Vec<F>,
}

impl<F: Real> FrequencyTable<F> {
    /// Builds a table covering DC through Nyquist.
    pub fn new(stft_size: usize, sample_rate: F) -> Self {
        let mut table = Self::default();
        table.ensure(stft_size, sample_rate, 0);
        table
    }

    /// Makes the table valid for the given key and at least `bins` entries
    /// long. Returns `true` when a rebuild happened.
    ///
    /// Entries past Nyquist keep the same bin width so that
    /// `frequency[k] == k * sample_rate / stft_size` holds for every `k`.
    pub fn ensure(&mut self, stft_size: usize, sample_rate: F, bins: usize) -> bool {
        let fresh = self.stft_size == stft_size
            && self.sample_rate == sample_rate
            && self.frequencies.len() >= bins
            && !self.frequencies.is_empty();
        if fresh {
            return false;
        }

        let len = (stft_size / 2 + 1).max(bins);
        self.frequencies = bin_frequencies(stft_size, sample_rate, len);
        self.stft_size = stft_size;
        self.sample_rate = sample_rate;

        debug!(
            stft_size,
            sample_rate = to_f64(sample_rate),
            bins = len,
            "rebuilt frequency table"
        );
        true
    }

    pub fn as_slice(&self) -> &[F] {
        &self.frequencies
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

//! Stateful facade that owns the current frame and runs every descriptor.
//!
//! The engine keeps the latest sample buffer, the current and previous
//! magnitude spectra, the configuration and a cached frequency table. A call
//! to [`DescriptorEngine::compute_descriptors`] evaluates both catalogues in
//! dependency order and stores the results under their names.
//!
//! It is meant to be owned by a single audio context. Results that have to
//! cross threads should be copied out with [`DescriptorEngine::snapshot`].

mod builder;
#[cfg(test)]
mod tests;

use std::fmt;

use tracing::{debug, trace};

pub use builder::EngineBuilder;

use crate::{
    amplitude,
    config::{validate_rolloff_point, validate_sample_rate, validate_stft_size},
    descriptor::{DescriptorMap, DescriptorSnapshot, FrequencyDescriptor, TimeDescriptor},
    frequency::{self, FrequencyTable},
    numeric::{lit, to_f64, Real},
    transform::{self, TransformLayout},
    DescriptorError, EngineConfig, Result,
};

/// Fewest bins for which the frequency domain group is evaluated.
pub const MIN_SPECTRUM_BINS: usize = 3;

/// Descriptor engine over samples and magnitudes of type `F`.
pub struct DescriptorEngine<F: Real = f64> {
    buffer: Vec<F>,
    magnitudes: Vec<F>,
    previous_magnitudes: Vec<F>,
    sample_rate: F,
    stft_size: usize,
    rolloff_point: F,
    frequencies: FrequencyTable<F>,
    time: DescriptorMap<TimeDescriptor, F>,
    frequency: DescriptorMap<FrequencyDescriptor, F>,
}

impl<F: Real> Default for DescriptorEngine<F> {
    fn default() -> Self {
        Self::from_valid_config(&EngineConfig::default())
    }
}

impl<F: Real> DescriptorEngine<F> {
    /// Creates an engine with the default configuration and no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine from an explicit configuration.
    pub fn with_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    pub fn builder() -> EngineBuilder<F> {
        EngineBuilder::new()
    }

    fn from_valid_config(config: &EngineConfig) -> Self {
        let sample_rate = lit(config.sample_rate);
        Self {
            buffer: Vec::new(),
            magnitudes: Vec::new(),
            previous_magnitudes: Vec::new(),
            sample_rate,
            stft_size: config.stft_size,
            rolloff_point: lit(config.rolloff_point),
            frequencies: FrequencyTable::new(config.stft_size, sample_rate),
            time: DescriptorMap::new(),
            frequency: DescriptorMap::new(),
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: F) -> Result<()> {
        checked(validate_sample_rate(to_f64(sample_rate)))?;
        self.sample_rate = sample_rate;
        self.sync_frequencies();
        Ok(())
    }

    pub fn set_rolloff_point(&mut self, rolloff_point: F) -> Result<()> {
        checked(validate_rolloff_point(to_f64(rolloff_point)))?;
        self.rolloff_point = rolloff_point;
        Ok(())
    }

    pub fn set_stft_size(&mut self, stft_size: usize) -> Result<()> {
        checked(validate_stft_size(stft_size))?;
        self.stft_size = stft_size;
        self.sync_frequencies();
        Ok(())
    }

    /// Replaces the sample buffer used by the time domain group.
    pub fn set_buffer(&mut self, buffer: &[F]) -> Result<()> {
        if buffer.is_empty() {
            return checked(Err(DescriptorError::EmptyBuffer));
        }

        self.buffer.clear();
        self.buffer.extend_from_slice(buffer);
        Ok(())
    }

    /// Stores a new one-sided magnitude spectrum.
    ///
    /// The spectrum held so far becomes the previous one, which feeds
    /// spectral flux. On the very first call the previous spectrum is a run
    /// of zeros of the same length. With `update_stft_size` the transform
    /// size is set to `(len - 1) * 2` when that is a valid size.
    pub fn set_magnitudes(&mut self, magnitudes: &[F], update_stft_size: bool) -> Result<()> {
        if magnitudes.is_empty() {
            return checked(Err(DescriptorError::EmptyMagnitudes));
        }

        if self.magnitudes.is_empty() {
            self.previous_magnitudes.clear();
            self.previous_magnitudes.resize(magnitudes.len(), F::zero());
        } else {
            std::mem::swap(&mut self.previous_magnitudes, &mut self.magnitudes);
        }
        self.magnitudes.clear();
        self.magnitudes.extend_from_slice(magnitudes);

        if update_stft_size {
            let inferred = (magnitudes.len() - 1) * 2;
            if validate_stft_size(inferred).is_ok() {
                self.stft_size = inferred;
            }
        }

        self.sync_frequencies();
        Ok(())
    }

    /// Derives magnitudes from raw transform output and stores them like
    /// [`Self::set_magnitudes`]. The transform size is taken from the raw
    /// buffer, so odd interleaved sizes keep their true bin width.
    pub fn set_magnitudes_from_stft(&mut self, stft: &[F], layout: TransformLayout) -> Result<()> {
        let magnitudes = checked(transform::magnitudes(stft, layout))?;
        self.set_magnitudes(&magnitudes, false)?;
        self.stft_size = layout.transform_size(stft.len());
        self.sync_frequencies();
        Ok(())
    }

    /// Overrides the spectrum that flux compares against.
    pub fn set_previous_magnitudes(&mut self, previous: &[F]) -> Result<()> {
        if previous.len() != self.magnitudes.len() {
            return checked(Err(DescriptorError::PreviousLengthMismatch {
                expected: self.magnitudes.len(),
                found: previous.len(),
            }));
        }

        self.previous_magnitudes.clear();
        self.previous_magnitudes.extend_from_slice(previous);
        Ok(())
    }

    /// Evaluates the requested descriptor groups over the current state.
    ///
    /// A group whose input is missing (no buffer, fewer than
    /// [`MIN_SPECTRUM_BINS`] bins) is skipped and keeps its previous values.
    pub fn compute_descriptors(&mut self, compute_time: bool, compute_freq: bool) {
        if compute_time && self.has_buffer() {
            self.compute_time_group();
        }

        if compute_freq && self.has_spectrum() {
            self.compute_frequency_group();
        }
    }

    fn compute_time_group(&mut self) {
        trace!(samples = self.buffer.len(), "computing time descriptors");

        let buffer = &self.buffer;
        let mean = amplitude::mean(buffer);
        let variance = amplitude::variance(buffer);

        let time = &mut self.time;
        time.insert(TimeDescriptor::Peak, amplitude::peak(buffer));
        time.insert(TimeDescriptor::Rms, amplitude::rms(buffer));
        time.insert(TimeDescriptor::Variance, variance);
        time.insert(
            TimeDescriptor::Kurtosis,
            amplitude::kurtosis(buffer, Some(mean), Some(variance)),
        );
        time.insert(
            TimeDescriptor::Skewness,
            amplitude::skewness(buffer, Some(mean), Some(variance)),
        );
        time.insert(
            TimeDescriptor::ZeroCrossing,
            amplitude::zerocrossing(buffer),
        );
    }

    fn compute_frequency_group(&mut self) {
        self.sync_frequencies();
        trace!(bins = self.magnitudes.len(), "computing frequency descriptors");

        let magnitudes = &self.magnitudes;
        let sr = self.sample_rate;
        let table = Some(self.frequencies.as_slice());
        let out = &mut self.frequency;

        let centroid = out.insert(
            FrequencyDescriptor::Centroid,
            frequency::centroid(magnitudes, sr, table),
        );
        let spread = out.insert(
            FrequencyDescriptor::Spread,
            frequency::spread(magnitudes, sr, table, Some(centroid)),
        );
        out.insert(
            FrequencyDescriptor::CrestFactor,
            frequency::crestfactor(magnitudes),
        );
        out.insert(FrequencyDescriptor::Decrease, frequency::decrease(magnitudes));
        out.insert(FrequencyDescriptor::Entropy, frequency::entropy(magnitudes));
        out.insert(FrequencyDescriptor::Flatness, frequency::flatness(magnitudes));
        out.insert(
            FrequencyDescriptor::Flux,
            frequency::flux(magnitudes, &self.previous_magnitudes),
        );
        out.insert(
            FrequencyDescriptor::Irregularity,
            frequency::irregularity(magnitudes),
        );
        out.insert(
            FrequencyDescriptor::Kurtosis,
            frequency::kurtosis(magnitudes, sr, table, Some(centroid), Some(spread)),
        );
        out.insert(
            FrequencyDescriptor::Peak,
            frequency::peak(magnitudes, sr, table),
        );
        out.insert(
            FrequencyDescriptor::Rolloff,
            frequency::rolloff(magnitudes, sr, self.rolloff_point, table),
        );
        out.insert(
            FrequencyDescriptor::Skewness,
            frequency::skewness(magnitudes, sr, table, Some(centroid), Some(spread)),
        );
        out.insert(FrequencyDescriptor::Slope, frequency::slope(magnitudes, sr, table));
    }

    /// Computes and stores a single time domain descriptor.
    ///
    /// Returns zero and stores nothing when there is no buffer.
    pub fn compute_time_descriptor(&mut self, descriptor: TimeDescriptor) -> F {
        if !self.has_buffer() {
            return F::zero();
        }

        let buffer = &self.buffer;
        let value = match descriptor {
            TimeDescriptor::Peak => amplitude::peak(buffer),
            TimeDescriptor::Rms => amplitude::rms(buffer),
            TimeDescriptor::Variance => amplitude::variance(buffer),
            TimeDescriptor::Kurtosis => amplitude::kurtosis(buffer, None, None),
            TimeDescriptor::Skewness => amplitude::skewness(buffer, None, None),
            TimeDescriptor::ZeroCrossing => amplitude::zerocrossing(buffer),
        };
        self.time.insert(descriptor, value)
    }

    /// Computes and stores a single frequency domain descriptor.
    ///
    /// Dependencies (centroid, spread) are recomputed from the current
    /// spectrum. Returns zero and stores nothing when the spectrum has fewer
    /// than [`MIN_SPECTRUM_BINS`] bins.
    pub fn compute_frequency_descriptor(&mut self, descriptor: FrequencyDescriptor) -> F {
        if !self.has_spectrum() {
            return F::zero();
        }
        self.sync_frequencies();

        let magnitudes = &self.magnitudes;
        let sr = self.sample_rate;
        let table = Some(self.frequencies.as_slice());
        let value = match descriptor {
            FrequencyDescriptor::Centroid => frequency::centroid(magnitudes, sr, table),
            FrequencyDescriptor::Spread => frequency::spread(magnitudes, sr, table, None),
            FrequencyDescriptor::CrestFactor => frequency::crestfactor(magnitudes),
            FrequencyDescriptor::Decrease => frequency::decrease(magnitudes),
            FrequencyDescriptor::Entropy => frequency::entropy(magnitudes),
            FrequencyDescriptor::Flatness => frequency::flatness(magnitudes),
            FrequencyDescriptor::Flux => frequency::flux(magnitudes, &self.previous_magnitudes),
            FrequencyDescriptor::Irregularity => frequency::irregularity(magnitudes),
            FrequencyDescriptor::Kurtosis => frequency::kurtosis(magnitudes, sr, table, None, None),
            FrequencyDescriptor::Peak => frequency::peak(magnitudes, sr, table),
            FrequencyDescriptor::Rolloff => {
                frequency::rolloff(magnitudes, sr, self.rolloff_point, table)
            }
            FrequencyDescriptor::Skewness => frequency::skewness(magnitudes, sr, table, None, None),
            FrequencyDescriptor::Slope => frequency::slope(magnitudes, sr, table),
        };
        self.frequency.insert(descriptor, value)
    }

    /// Forgets every stored descriptor value.
    pub fn clear_descriptors(&mut self) {
        self.time.clear();
        self.frequency.clear();
    }

    /// Stored value for a time domain descriptor name, zero if unknown.
    pub fn get_time_descriptor(&self, name: &str) -> F {
        self.time.get_by_name(name)
    }

    /// Stored value for a frequency domain descriptor name, zero if unknown.
    pub fn get_frequency_descriptor(&self, name: &str) -> F {
        self.frequency.get_by_name(name)
    }

    pub fn time_descriptors(&self) -> &DescriptorMap<TimeDescriptor, F> {
        &self.time
    }

    pub fn frequency_descriptors(&self) -> &DescriptorMap<FrequencyDescriptor, F> {
        &self.frequency
    }

    /// Copies both result maps out of the engine.
    pub fn snapshot(&self) -> DescriptorSnapshot<F> {
        DescriptorSnapshot {
            time: self.time.clone(),
            frequency: self.frequency.clone(),
        }
    }

    pub fn buffer(&self) -> &[F] {
        &self.buffer
    }

    pub fn magnitudes(&self) -> &[F] {
        &self.magnitudes
    }

    pub fn previous_magnitudes(&self) -> &[F] {
        &self.previous_magnitudes
    }

    pub fn sample_rate(&self) -> F {
        self.sample_rate
    }

    pub fn stft_size(&self) -> usize {
        self.stft_size
    }

    pub fn rolloff_point(&self) -> F {
        self.rolloff_point
    }

    /// Bin frequencies in Hz, at least as long as the current spectrum.
    pub fn frequencies(&self) -> &[F] {
        self.frequencies.as_slice()
    }

    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            sample_rate: to_f64(self.sample_rate),
            stft_size: self.stft_size,
            rolloff_point: to_f64(self.rolloff_point),
        }
    }

    pub fn has_buffer(&self) -> bool {
        !self.buffer.is_empty()
    }

    pub fn has_spectrum(&self) -> bool {
        self.magnitudes.len() >= MIN_SPECTRUM_BINS
    }

    fn sync_frequencies(&mut self) {
        self.frequencies
            .ensure(self.stft_size, self.sample_rate, self.magnitudes.len());
    }
}

/// Logs rejected updates before handing the error back.
fn checked<T>(result: Result<T>) -> Result<T> {
    result.inspect_err(|err| debug!(%err, "rejected engine update"))
}

impl<F: Real> fmt::Debug for DescriptorEngine<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorEngine")
            .field("sample_rate", &self.sample_rate)
            .field("stft_size", &self.stft_size)
            .field("rolloff_point", &self.rolloff_point)
            .field("buffer", &self.buffer.len())
            .field("magnitudes", &self.magnitudes.len())
            .field("frequencies", &self.frequencies.len())
            .field("time", &self.time.len())
            .field("frequency", &self.frequency.len())
            .finish()
    }
}

use tracing::warn;

use crate::{
    numeric::{lit, Real},
    EngineConfig, Result,
};

use super::DescriptorEngine;

/// Builds a [`DescriptorEngine`] with optional initial data.
///
/// Values are applied through the engine's own setters. Anything a setter
/// rejects is skipped with a warning, so [`EngineBuilder::build`] always
/// returns a usable engine.
#[derive(Debug, Clone)]
pub struct EngineBuilder<F: Real> {
    buffer: Vec<F>,
    magnitudes: Vec<F>,
    previous_magnitudes: Vec<F>,
    sample_rate: Option<F>,
    stft_size: Option<usize>,
    rolloff_point: Option<F>,
    compute: bool,
}

impl<F: Real> Default for EngineBuilder<F> {
    fn default() -> Self {
        Self {
            buffer: Vec::new(),
            magnitudes: Vec::new(),
            previous_magnitudes: Vec::new(),
            sample_rate: None,
            stft_size: None,
            rolloff_point: None,
            compute: true,
        }
    }
}

impl<F: Real> EngineBuilder<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(mut self, buffer: impl Into<Vec<F>>) -> Self {
        self.buffer = buffer.into();
        self
    }

    /// Initial spectrum. Unless [`Self::stft_size`] is also given, the
    /// transform size is inferred from its length.
    pub fn magnitudes(mut self, magnitudes: impl Into<Vec<F>>) -> Self {
        self.magnitudes = magnitudes.into();
        self
    }

    pub fn previous_magnitudes(mut self, previous: impl Into<Vec<F>>) -> Self {
        self.previous_magnitudes = previous.into();
        self
    }

    pub fn sample_rate(mut self, sample_rate: F) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    pub fn stft_size(mut self, stft_size: usize) -> Self {
        self.stft_size = Some(stft_size);
        self
    }

    pub fn rolloff_point(mut self, rolloff_point: F) -> Self {
        self.rolloff_point = Some(rolloff_point);
        self
    }

    /// Takes sample rate, transform size and rolloff point from `config`.
    pub fn config(self, config: &EngineConfig) -> Self {
        self.sample_rate(lit(config.sample_rate))
            .stft_size(config.stft_size)
            .rolloff_point(lit(config.rolloff_point))
    }

    /// Whether `build` runs a first descriptor pass. Defaults to `true`.
    pub fn compute(mut self, compute: bool) -> Self {
        self.compute = compute;
        self
    }

    pub fn build(self) -> DescriptorEngine<F> {
        let mut engine = DescriptorEngine::new();

        if let Some(sample_rate) = self.sample_rate {
            skip_rejected("sample_rate", engine.set_sample_rate(sample_rate));
        }
        if let Some(stft_size) = self.stft_size {
            skip_rejected("stft_size", engine.set_stft_size(stft_size));
        }
        if let Some(rolloff_point) = self.rolloff_point {
            skip_rejected("rolloff_point", engine.set_rolloff_point(rolloff_point));
        }
        if !self.buffer.is_empty() {
            skip_rejected("buffer", engine.set_buffer(&self.buffer));
        }
        if !self.magnitudes.is_empty() {
            let infer_size = self.stft_size.is_none();
            skip_rejected(
                "magnitudes",
                engine.set_magnitudes(&self.magnitudes, infer_size),
            );
        }
        if !self.previous_magnitudes.is_empty() {
            skip_rejected(
                "previous_magnitudes",
                engine.set_previous_magnitudes(&self.previous_magnitudes),
            );
        }

        if self.compute {
            engine.compute_descriptors(true, true);
        }
        engine
    }
}

fn skip_rejected(field: &'static str, result: Result<()>) {
    if let Err(err) = result {
        warn!(field, %err, "ignoring invalid initial engine value");
    }
}

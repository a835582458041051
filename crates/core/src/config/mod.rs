use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{frequency::DEFAULT_ROLLOFF_POINT, DescriptorError, Result, WindowKind};

pub const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;
pub const DEFAULT_STFT_SIZE: usize = 4096;

/// Top-level configuration structure for the command line host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    /// Loads a JSON configuration file. Missing fields take their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.analysis.validate()
    }
}

/// Settings owned by [`crate::DescriptorEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sample_rate: f64,
    pub stft_size: usize,
    pub rolloff_point: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            stft_size: DEFAULT_STFT_SIZE,
            rolloff_point: DEFAULT_ROLLOFF_POINT,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        validate_sample_rate(self.sample_rate)?;
        validate_stft_size(self.stft_size)?;
        validate_rolloff_point(self.rolloff_point)
    }
}

/// Framing used by hosts that turn a long signal into engine frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub frame_size: usize,
    pub hop_size: usize,
    pub window: WindowKind,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_STFT_SIZE,
            hop_size: DEFAULT_STFT_SIZE / 2,
            window: WindowKind::Hann,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        validate_stft_size(self.frame_size)?;
        if self.hop_size == 0 {
            return Err(DescriptorError::InvalidConfig(
                "hop size must be at least one sample".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn validate_sample_rate(sample_rate: f64) -> Result<()> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(DescriptorError::InvalidSampleRate(sample_rate))
    }
}

pub(crate) fn validate_stft_size(stft_size: usize) -> Result<()> {
    if stft_size > 2 {
        Ok(())
    } else {
        Err(DescriptorError::InvalidStftSize(stft_size))
    }
}

pub(crate) fn validate_rolloff_point(rolloff_point: f64) -> Result<()> {
    if rolloff_point > 0.0 && rolloff_point < 1.0 {
        Ok(())
    } else {
        Err(DescriptorError::InvalidRolloffPoint(rolloff_point))
    }
}

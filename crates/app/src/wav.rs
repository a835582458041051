use std::{fmt, path::Path, str::FromStr};

use audio_descriptors_core::{DescriptorError, Result};

/// Which part of a multichannel file gets analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelSelection {
    /// Average of all channels.
    #[default]
    Downmix,
    /// A single zero-based channel.
    Channel(u16),
}

impl fmt::Display for ChannelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downmix => f.write_str("downmix"),
            Self::Channel(index) => write!(f, "{index}"),
        }
    }
}

impl FromStr for ChannelSelection {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("downmix") || trimmed.eq_ignore_ascii_case("mix") {
            return Ok(Self::Downmix);
        }
        trimmed
            .parse()
            .map(Self::Channel)
            .map_err(|_| DescriptorError::msg(format!("invalid channel selection '{s}'")))
    }
}

/// Mono signal decoded from a WAV file, scaled to [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    /// Channel count of the source file.
    pub channels: u16,
    pub samples: Vec<f64>,
}

impl DecodedAudio {
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

pub fn read_wav(path: &Path, selection: ChannelSelection) -> Result<DecodedAudio> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|err| DescriptorError::msg(format!("failed to open {}: {err}", path.display())))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(DescriptorError::msg(format!(
            "{} has zero channels",
            path.display()
        )));
    }
    if let ChannelSelection::Channel(index) = selection {
        if index >= spec.channels {
            return Err(DescriptorError::msg(format!(
                "channel {index} out of range, {} has {} channel(s)",
                path.display(),
                spec.channels
            )));
        }
    }

    let read_error =
        |err: hound::Error| DescriptorError::msg(format!("error reading {}: {err}", path.display()));
    let interleaved = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map(f64::from).map_err(read_error))
            .collect::<Result<Vec<f64>>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1_u64 << (spec.bits_per_sample.saturating_sub(1))) as f64;
            reader
                .samples::<i32>()
                .map(|sample| {
                    sample
                        .map(|value| f64::from(value) * scale)
                        .map_err(read_error)
                })
                .collect::<Result<Vec<f64>>>()?
        }
    };

    let samples = select_channel(&interleaved, spec.channels, selection);
    tracing::debug!(
        path = %path.display(),
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        frames = samples.len(),
        "decoded wav"
    );

    Ok(DecodedAudio {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        samples,
    })
}

fn select_channel(interleaved: &[f64], channels: u16, selection: ChannelSelection) -> Vec<f64> {
    let channels = usize::from(channels);
    match selection {
        ChannelSelection::Downmix if channels == 1 => interleaved.to_vec(),
        ChannelSelection::Downmix => interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f64>() / channels as f64)
            .collect(),
        ChannelSelection::Channel(index) => interleaved
            .chunks_exact(channels)
            .map(|frame| frame[usize::from(index)])
            .collect(),
    }
}

//! Core library for the audio descriptor engine.
//!
//! Given a block of samples and/or a one-sided magnitude spectrum the crate
//! computes a fixed catalogue of scalar descriptors. The [`amplitude`] and
//! [`frequency`] modules hold the pure functions; [`DescriptorEngine`] owns
//! the per-stream state (current and previous spectra, cached bin
//! frequencies) and evaluates everything in dependency order.
//!
//! Running the Fourier transform, framing long signals and shipping results
//! elsewhere are left to the host.

pub mod amplitude;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod frequency;
pub mod numeric;
pub mod transform;
pub mod window;

pub use config::{AnalysisConfig, AppConfig, EngineConfig};
pub use descriptor::{
    DescriptorKey, DescriptorMap, DescriptorSnapshot, FrequencyDescriptor, TimeDescriptor,
};
pub use engine::{DescriptorEngine, EngineBuilder, MIN_SPECTRUM_BINS};
pub use error::{DescriptorError, Result};
pub use frequency::{precompute_frequencies, FrequencyTable};
pub use numeric::Real;
pub use transform::TransformLayout;
pub use window::WindowKind;

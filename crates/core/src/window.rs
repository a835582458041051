use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    numeric::{from_usize, lit, Real},
    DescriptorError,
};

/// Tapering window applied to a frame before the forward transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    #[default]
    Hann,
    Hamming,
    Rectangular,
}

impl WindowKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Hann => "hann",
            Self::Hamming => "hamming",
            Self::Rectangular => "rectangular",
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowKind {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hann" | "hanning" => Ok(Self::Hann),
            "hamming" => Ok(Self::Hamming),
            "rectangular" | "rect" | "none" => Ok(Self::Rectangular),
            other => Err(DescriptorError::InvalidConfig(format!(
                "unknown window `{other}`"
            ))),
        }
    }
}

/// Symmetric window coefficients of length `len`.
pub fn coefficients<F: Real>(kind: WindowKind, len: usize) -> Vec<F> {
    (0..len).map(|index| value(kind, index, len)).collect()
}

fn value<F: Real>(kind: WindowKind, index: usize, len: usize) -> F {
    if len <= 1 {
        return F::one();
    }

    let phase = (lit::<F>(2.0) * F::PI() * from_usize(index)) / from_usize(len - 1);
    match kind {
        WindowKind::Hann => lit::<F>(0.5) - lit::<F>(0.5) * phase.cos(),
        WindowKind::Hamming => lit::<F>(0.54) - lit::<F>(0.46) * phase.cos(),
        WindowKind::Rectangular => F::one(),
    }
}

/// Result alias that carries the custom [`DescriptorError`] type.
pub type Result<T> = std::result::Result<T, DescriptorError>;

/// Common error type for the core crate.
///
/// Rejected engine updates are reported through this type. A rejection never
/// changes engine state, so callers that only care whether an update was
/// accepted can treat `is_ok()` as the success flag.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f64),
    #[error("rolloff point must lie strictly between 0 and 1, got {0}")]
    InvalidRolloffPoint(f64),
    #[error("stft size must be greater than 2, got {0}")]
    InvalidStftSize(usize),
    #[error("sample buffer is empty")]
    EmptyBuffer,
    #[error("magnitude spectrum is empty")]
    EmptyMagnitudes,
    /// Previous magnitudes must line up bin for bin with the current ones.
    #[error("previous magnitudes have {found} bins, current spectrum has {expected}")]
    PreviousLengthMismatch { expected: usize, found: usize },
    #[error("invalid transform data: {0}")]
    InvalidTransform(&'static str),
    #[error("unknown descriptor `{0}`")]
    UnknownDescriptor(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Free-form message, mostly used by host integrations.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl DescriptorError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for DescriptorError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for DescriptorError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

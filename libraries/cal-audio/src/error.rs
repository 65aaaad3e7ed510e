/// Decoding errors
use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
#[derive(Error, Debug)]
pub enum AudioError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Symphonia error
    #[error("Symphonia error: {0}")]
    Symphonia(String),
}

impl From<AudioError> for cal_core::CalError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::FileNotFound(path) => Self::FileNotFound(path),
            AudioError::UnsupportedFormat(msg) => Self::InvalidAudioType(msg),
            AudioError::DecodeError(msg) | AudioError::Symphonia(msg) => Self::Decode(msg),
            AudioError::Io(e) => Self::Io(e),
        }
    }
}

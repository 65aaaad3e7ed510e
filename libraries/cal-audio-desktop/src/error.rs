/// Audio output errors
use thiserror::Error;

/// Result type for output operations
pub type Result<T> = std::result::Result<T, OutputError>;

/// Output errors
#[derive(Debug, Error)]
pub enum OutputError {
    /// Device id does not name an output device
    #[error("Audio device not found: {0}")]
    DeviceNotFound(String),

    /// Failed to enumerate devices
    #[error("Failed to enumerate audio devices: {0}")]
    EnumerationFailed(String),

    /// Failed to query device information
    #[error("Failed to get device info: {0}")]
    DeviceInfoFailed(String),

    /// Failed to build output stream
    #[error("Failed to build output stream: {0}")]
    StreamBuildError(String),

    /// Failed to play stream
    #[error("Failed to play stream: {0}")]
    PlayError(String),

    /// Audio thread is gone
    #[error("Audio thread unavailable: {0}")]
    ThreadError(String),
}

impl From<cpal::BuildStreamError> for OutputError {
    fn from(err: cpal::BuildStreamError) -> Self {
        OutputError::StreamBuildError(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for OutputError {
    fn from(err: cpal::PlayStreamError) -> Self {
        OutputError::PlayError(err.to_string())
    }
}

impl From<cpal::DevicesError> for OutputError {
    fn from(err: cpal::DevicesError) -> Self {
        OutputError::EnumerationFailed(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for OutputError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        OutputError::DeviceInfoFailed(err.to_string())
    }
}

impl From<OutputError> for cal_core::CalError {
    fn from(err: OutputError) -> Self {
        match err {
            OutputError::DeviceNotFound(msg) => cal_core::CalError::InvalidAudioDevice(msg),
            other => cal_core::CalError::device(other.to_string()),
        }
    }
}

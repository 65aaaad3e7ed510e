/// Core error types for the presentation engine
use thiserror::Error;

/// Result type alias using `CalError`
pub type Result<T> = std::result::Result<T, CalError>;

/// Classified error type shared by every crate of the engine
///
/// The first six variants are the caller-visible taxonomy: each one maps to a
/// distinct recovery path (fix the path, re-select a device, fix the routing,
/// lower the level, ...). The remaining variants carry failures that do not
/// belong to a class.
#[derive(Error, Debug)]
pub enum CalError {
    /// Stimulus or calibration path does not resolve
    #[error("Audio file not found: {0}")]
    FileNotFound(String),

    /// Input is neither a recognized audio file nor a well-formed sample buffer
    #[error("Invalid audio type: {0}")]
    InvalidAudioType(String),

    /// In-memory buffer supplied without a sample rate
    #[error("No sampling rate was provided for the sample buffer")]
    MissingSamplingRate,

    /// Device id does not name a usable output device
    #[error("Invalid audio device: {0}")]
    InvalidAudioDevice(String),

    /// Routing text is unparsable or does not match the channel layout
    #[error("Invalid routing: {0}")]
    InvalidRouting(String),

    /// Post-gain signal exceeds full scale
    #[error("Clipping: peak {peak:.4} exceeds full scale at {level_db:.2} dB FS")]
    Clipping {
        /// Largest post-gain sample magnitude
        peak: f32,
        /// Gain that was applied
        level_db: f64,
    },

    /// Decoding failed after the file was found
    #[error("Decode error: {0}")]
    Decode(String),

    /// Output device failed while building or running the stream
    #[error("Device error: {0}")]
    Device(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

/// Error class, for callers that branch on the kind rather than the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`CalError::FileNotFound`]
    FileNotFound,
    /// See [`CalError::InvalidAudioType`]
    InvalidAudioType,
    /// See [`CalError::MissingSamplingRate`]
    MissingSamplingRate,
    /// See [`CalError::InvalidAudioDevice`]
    InvalidAudioDevice,
    /// See [`CalError::InvalidRouting`]
    InvalidRouting,
    /// See [`CalError::Clipping`]
    Clipping,
    /// Anything without a recovery class
    Other,
}

impl CalError {
    /// Create an invalid audio type error
    pub fn invalid_audio_type(msg: impl Into<String>) -> Self {
        Self::InvalidAudioType(msg.into())
    }

    /// Create an invalid audio device error
    pub fn invalid_device(msg: impl Into<String>) -> Self {
        Self::InvalidAudioDevice(msg.into())
    }

    /// Create an invalid routing error
    pub fn invalid_routing(msg: impl Into<String>) -> Self {
        Self::InvalidRouting(msg.into())
    }

    /// Create a device error
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Error class
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound(_) => ErrorKind::FileNotFound,
            Self::InvalidAudioType(_) => ErrorKind::InvalidAudioType,
            Self::MissingSamplingRate => ErrorKind::MissingSamplingRate,
            Self::InvalidAudioDevice(_) => ErrorKind::InvalidAudioDevice,
            Self::InvalidRouting(_) => ErrorKind::InvalidRouting,
            Self::Clipping { .. } => ErrorKind::Clipping,
            Self::Decode(_) | Self::Device(_) | Self::Config(_) | Self::Io(_) | Self::Other(_) => {
                ErrorKind::Other
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(
            CalError::FileNotFound("x.wav".into()).kind(),
            ErrorKind::FileNotFound
        );
        assert_eq!(
            CalError::MissingSamplingRate.kind(),
            ErrorKind::MissingSamplingRate
        );
        assert_eq!(
            CalError::invalid_routing("1 2").kind(),
            ErrorKind::InvalidRouting
        );
        assert_eq!(
            CalError::Clipping {
                peak: 1.2,
                level_db: 3.0
            }
            .kind(),
            ErrorKind::Clipping
        );
        assert_eq!(CalError::device("gone").kind(), ErrorKind::Other);
    }

    #[test]
    fn clipping_message_reports_peak_and_level() {
        let err = CalError::Clipping {
            peak: 1.5,
            level_db: 6.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("1.5000"));
        assert!(msg.contains("6.00 dB FS"));
    }
}

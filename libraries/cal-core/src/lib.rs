//! Calibrated Presenter Core
//!
//! Platform-agnostic types, traits, and error handling shared by every crate
//! of the calibrated presentation engine.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Audio Types**: `AudioBuffer`, `AudioFormat`, `SampleRate`
//! - **Calibration Types**: `CalibrationState`, `SessionParams`
//! - **Core Traits**: `AudioDecoder`, `AudioSink` (device submission seam)
//! - **Error Handling**: classified `CalError` / `ErrorKind` and `Result`
//!
//! # Example
//!
//! ```rust
//! use cal_core::{AudioBuffer, SampleRate};
//!
//! // One second of silent mono audio at 48 kHz
//! let frames = vec![vec![0.0_f32]; 48_000];
//! let buffer = AudioBuffer::from_frames(&frames, SampleRate::DVD_QUALITY).unwrap();
//!
//! assert_eq!(buffer.format.channels, 1);
//! assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod params;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{CalError, ErrorKind, Result};
pub use params::{CalibrationState, SessionParams};
pub use traits::{AudioDecoder, AudioSink, StopOutcome};
pub use types::{AudioBuffer, AudioFormat, DeviceInfo, SampleRate, FULL_SCALE};

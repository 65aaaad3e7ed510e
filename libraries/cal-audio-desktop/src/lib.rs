//! Desktop audio output for the calibrated presenter using CPAL
//!
//! This crate provides `CpalSink`, the `AudioSink` implementation that plays
//! routed, gain-applied buffers on a real output device, and device
//! enumeration for operators picking a device id.
//!
//! # Example
//!
//! ```no_run
//! use cal_audio_desktop::{list_devices, CpalSink};
//! use cal_core::{AudioBuffer, AudioSink, SampleRate};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! for device in list_devices()? {
//!     println!("{}: {} ({} ch)", device.id, device.name, device.channels);
//! }
//!
//! let mut sink = CpalSink::new()?;
//! let silence = AudioBuffer::from_interleaved(vec![0.0; 48_000 * 2], 2, SampleRate::DVD_QUALITY)?;
//! sink.submit(0, &silence)?;
//! sink.wait_until_finished();
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod device;
mod error;
mod output;

pub use device::{find_device, list_devices};
pub use error::{OutputError, Result};
pub use output::CpalSink;

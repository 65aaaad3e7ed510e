//! Stimulus loading, routing and presentation for the calibrated presenter
//!
//! This crate turns a stimulus (file or in-memory frames) into something that
//! can be presented at an exact level:
//! - **Decoder**: Symphonia-based, keeps every source channel
//! - **Routing**: `"1 2"`-style channel maps, validated before playback
//! - **Assets**: `FileAsset`, `BufferAsset` and the `AudioObject` that loads
//!   either from an `AudioDescriptor`
//! - **Waveform**: min/max plots of a gain-applied buffer
//!
//! # Example
//!
//! ```rust
//! use cal_audio::{parse_routing, AudioDescriptor, AudioObject, PresentableAsset};
//! use cal_core::testing::RecordingSink;
//!
//! let tone = (0..480).map(|i| vec![(i as f32 * 0.1).sin() * 0.5]).collect();
//! let mut object = AudioObject::load(&AudioDescriptor::buffer(tone, Some(48_000))).unwrap();
//!
//! let mut sink = RecordingSink::with_devices(&[2]);
//! let routing = parse_routing("1").unwrap();
//! object.play(&mut sink, -6.0, 0, &routing).unwrap();
//!
//! assert_eq!(sink.write_count(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod asset;
pub mod decoder;
pub mod error;
pub mod routing;
pub mod waveform;

pub use asset::{AudioDescriptor, AudioObject, BufferAsset, FileAsset, PresentableAsset};
pub use decoder::SymphoniaDecoder;
pub use error::{AudioError, Result};
pub use routing::{parse_routing, validate, RoutingSpec};
pub use waveform::{WaveformPlot, DEFAULT_COLUMNS};

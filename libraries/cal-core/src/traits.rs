/// Core traits for the presentation engine
use crate::error::Result;
use crate::types::{AudioBuffer, DeviceInfo};
use std::path::Path;

/// Audio decoder trait
///
/// Implementers decode a stimulus file into an `AudioBuffer`, keeping the
/// file's own channel layout and sample rate.
pub trait AudioDecoder: Send {
    /// Decode an audio file from the given path (loads entire file)
    ///
    /// # Errors
    /// `FileNotFound` if the path does not resolve, `InvalidAudioType` if the
    /// file is not a recognized audio format, `Decode` if decoding fails
    fn decode(&mut self, path: &Path) -> Result<AudioBuffer>;

    /// Check if the decoder supports the given file format
    fn supports_format(&self, path: &Path) -> bool;
}

/// What a stop request found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Playback was running and has been halted
    Stopped,
    /// Nothing was playing; the request was a no-op
    NothingPlaying,
}

/// Audio sink trait
///
/// Implementers own the physical output device. The engine never enumerates
/// devices itself: it hands the sink a `device_id` and lets the sink decide
/// whether that id is usable.
///
/// Implementations must serialize submissions: a new `submit` replaces any
/// playback in progress instead of mixing with it.
pub trait AudioSink: Send {
    /// Resolve a device id to the device it names
    ///
    /// # Errors
    /// `InvalidAudioDevice` if the id does not name an available output device
    fn device(&self, device_id: i32) -> Result<DeviceInfo>;

    /// Submit device-width interleaved frames for playback
    ///
    /// `buffer.format.channels` equals the device channel count; routing has
    /// already been applied by the caller. Playback continues after this
    /// returns.
    ///
    /// # Errors
    /// `InvalidAudioDevice` for an unusable id, `Device` if the stream fails
    fn submit(&mut self, device_id: i32, buffer: &AudioBuffer) -> Result<()>;

    /// Halt playback if any
    ///
    /// Must be safe to call at any time and idempotent.
    fn stop(&mut self) -> Result<StopOutcome>;

    /// Whether a submitted buffer is still being emitted
    fn is_playing(&self) -> bool;
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn device(&self, device_id: i32) -> Result<DeviceInfo> {
        (**self).device(device_id)
    }

    fn submit(&mut self, device_id: i32, buffer: &AudioBuffer) -> Result<()> {
        (**self).submit(device_id, buffer)
    }

    fn stop(&mut self) -> Result<StopOutcome> {
        (**self).stop()
    }

    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }
}

/// Audio and device types
use crate::error::{CalError, Result};
use serde::{Deserialize, Serialize};

/// Largest sample magnitude the output can represent without clipping.
pub const FULL_SCALE: f32 = 1.0;

/// Sample rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// Common sample rates
    pub const CD_QUALITY: Self = Self(44_100);
    pub const DVD_QUALITY: Self = Self(48_000);
    pub const HIGH_RES_96: Self = Self(96_000);

    /// Create a new sample rate
    #[must_use]
    pub fn new(hz: u32) -> Self {
        Self(hz)
    }

    /// Get the sample rate as Hz
    pub fn as_hz(&self) -> u32 {
        self.0
    }
}

/// Audio format information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Sample rate
    pub sample_rate: SampleRate,

    /// Number of channels (1 = mono, 2 = stereo, etc.)
    pub channels: u16,
}

impl AudioFormat {
    /// Create a new audio format
    pub fn new(sample_rate: SampleRate, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }
}

/// Audio buffer containing decoded samples
///
/// Samples are stored as f32, nominally in the range [-1.0, 1.0].
/// Interleaved format: [L, R, L, R, ...] for stereo.
///
/// Every frame holds exactly `format.channels` samples; the constructors that
/// take untrusted input enforce this.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Audio samples (f32, interleaved)
    pub samples: Vec<f32>,

    /// Audio format information
    pub format: AudioFormat,
}

impl AudioBuffer {
    /// Create a new audio buffer from already-validated interleaved samples
    pub fn new(samples: Vec<f32>, format: AudioFormat) -> Self {
        Self { samples, format }
    }

    /// Build a buffer from interleaved samples, checking the frame layout
    ///
    /// # Errors
    /// `InvalidAudioType` if there are no channels, no samples, a partial
    /// trailing frame or a non-finite sample. `MissingSamplingRate` if the
    /// rate is zero.
    pub fn from_interleaved(
        samples: Vec<f32>,
        channels: u16,
        sample_rate: SampleRate,
    ) -> Result<Self> {
        if sample_rate.as_hz() == 0 {
            return Err(CalError::MissingSamplingRate);
        }
        if channels == 0 {
            return Err(CalError::InvalidAudioType(
                "buffer has zero channels".to_string(),
            ));
        }
        if samples.is_empty() {
            return Err(CalError::InvalidAudioType("buffer is empty".to_string()));
        }
        if !samples.len().is_multiple_of(channels as usize) {
            return Err(CalError::InvalidAudioType(format!(
                "{} samples do not form whole {}-channel frames",
                samples.len(),
                channels
            )));
        }
        if let Some(idx) = samples.iter().position(|s| !s.is_finite()) {
            return Err(CalError::InvalidAudioType(format!(
                "sample {} is not a finite number",
                idx
            )));
        }

        Ok(Self::new(samples, AudioFormat::new(sample_rate, channels)))
    }

    /// Build a buffer from frames (one inner vector of channel samples per frame)
    ///
    /// # Errors
    /// `InvalidAudioType` if the frames are empty or ragged, see also
    /// [`AudioBuffer::from_interleaved`].
    pub fn from_frames(frames: &[Vec<f32>], sample_rate: SampleRate) -> Result<Self> {
        let first = frames
            .first()
            .ok_or_else(|| CalError::InvalidAudioType("buffer has no frames".to_string()))?;
        let channels = first.len();

        if let Some(idx) = frames.iter().position(|f| f.len() != channels) {
            return Err(CalError::InvalidAudioType(format!(
                "frame {} has {} channels, expected {}",
                idx,
                frames[idx].len(),
                channels
            )));
        }

        let channels = u16::try_from(channels).map_err(|_| {
            CalError::InvalidAudioType(format!("{} channels is not supported", channels))
        })?;

        let samples = frames.iter().flatten().copied().collect();
        Self::from_interleaved(samples, channels, sample_rate)
    }

    /// Get the number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.format.channels == 0 {
            return 0;
        }
        self.samples.len() / self.format.channels as usize
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.format.sample_rate.as_hz() == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.format.sample_rate.as_hz() as f64
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Iterate over the samples of one channel
    pub fn channel(&self, channel: usize) -> impl Iterator<Item = f32> + '_ {
        let stride = self.format.channels.max(1) as usize;
        self.samples.iter().skip(channel).step_by(stride).copied()
    }

    /// Largest absolute sample value (infinite if any sample is not finite)
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |max, &s| {
            if s.is_finite() {
                max.max(s.abs())
            } else {
                f32::INFINITY
            }
        })
    }
}

/// An output device as seen by the presentation engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Index of the device in the host's output device list
    pub id: i32,

    /// Device name (human-readable)
    pub name: String,

    /// Number of output channels
    pub channels: u16,

    /// Native sample rate (Hz)
    pub sample_rate: u32,

    /// Is this the system default output device?
    pub is_default: bool,
}

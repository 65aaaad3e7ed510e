//! Channel routing
//!
//! A routing is written as whitespace-separated output channel numbers, one
//! per source channel: `"1 2"` sends source channel 0 to device output 1 and
//! source channel 1 to device output 2. Output channels are numbered from 1,
//! the way they are labelled on audio interfaces.
//!
//! Validation happens in two steps, both before any sample reaches a device:
//! - [`RoutingSpec::validate`] against the loaded asset's channel count
//! - [`RoutingSpec::check_device`] against the selected device's outputs

use cal_core::{AudioBuffer, AudioFormat, CalError, Result};
use std::fmt;
use std::str::FromStr;

/// Output channel (1-based) for each source channel, in source order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutingSpec(Vec<usize>);

/// Parse a routing string such as `"1 2"`
///
/// # Errors
/// `InvalidRouting` if any token is not a non-negative integer
pub fn parse_routing(text: &str) -> Result<RoutingSpec> {
    text.split_whitespace()
        .map(|token| {
            token.parse::<usize>().map_err(|_| {
                CalError::invalid_routing(format!(
                    "'{}' in routing '{}' is not a channel number",
                    token,
                    text.trim()
                ))
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(RoutingSpec)
}

/// Check a routing against a channel count
///
/// # Errors
/// `InvalidRouting` unless there is exactly one entry per channel
pub fn validate(routing: &RoutingSpec, channel_count: u16) -> Result<()> {
    routing.validate(channel_count)
}

impl RoutingSpec {
    /// Create a routing from output channel numbers
    pub fn new(outputs: Vec<usize>) -> Self {
        Self(outputs)
    }

    /// Output channel numbers, one per source channel
    pub fn outputs(&self) -> &[usize] {
        &self.0
    }

    /// Number of routed source channels
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the routing has no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Require exactly one entry per channel of the loaded asset
    ///
    /// The count to compare with is the asset's channel count, never the
    /// device's: a mono stimulus takes one entry even on an 8-output device.
    ///
    /// # Errors
    /// `InvalidRouting` on a length mismatch
    pub fn validate(&self, channel_count: u16) -> Result<()> {
        if self.0.len() != channel_count as usize {
            return Err(CalError::invalid_routing(format!(
                "routing '{}' has {} entries but the audio has {} channel(s)",
                self,
                self.0.len(),
                channel_count
            )));
        }
        Ok(())
    }

    /// Require every entry to name a distinct output of the device
    ///
    /// # Errors
    /// `InvalidRouting` for channel 0, a channel above `device_channels`, or
    /// two source channels sent to the same output
    pub fn check_device(&self, device_channels: u16) -> Result<()> {
        let mut seen = Vec::with_capacity(self.0.len());

        for &output in &self.0 {
            if output == 0 || output > device_channels as usize {
                return Err(CalError::invalid_routing(format!(
                    "output channel {} does not exist on a {}-channel device (channels are numbered from 1)",
                    output, device_channels
                )));
            }
            if seen.contains(&output) {
                return Err(CalError::invalid_routing(format!(
                    "output channel {} is routed more than once in '{}'",
                    output, self
                )));
            }
            seen.push(output);
        }

        Ok(())
    }

    /// Expand a source buffer to the device's channel layout
    ///
    /// Source channel `i` lands on output `outputs[i]`; outputs no source is
    /// routed to carry silence.
    ///
    /// # Errors
    /// `InvalidAudioType` for a buffer without channels, `InvalidRouting` if
    /// the routing does not fit the buffer or the device
    pub fn map_to_device(&self, source: &AudioBuffer, device_channels: u16) -> Result<AudioBuffer> {
        if source.format.channels == 0 {
            return Err(CalError::InvalidAudioType(
                "buffer has no channels to route".to_string(),
            ));
        }
        self.validate(source.format.channels)?;
        self.check_device(device_channels)?;

        let src_channels = source.format.channels as usize;
        let dev_channels = device_channels as usize;
        let frames = source.frames();

        let mut samples = vec![0.0f32; frames * dev_channels];
        for (src_frame, dev_frame) in source
            .samples
            .chunks_exact(src_channels)
            .zip(samples.chunks_exact_mut(dev_channels))
        {
            for (&sample, &output) in src_frame.iter().zip(&self.0) {
                dev_frame[output - 1] = sample;
            }
        }

        Ok(AudioBuffer::new(
            samples,
            AudioFormat::new(source.format.sample_rate, device_channels),
        ))
    }
}

impl FromStr for RoutingSpec {
    type Err = CalError;

    fn from_str(s: &str) -> Result<Self> {
        parse_routing(s)
    }
}

impl fmt::Display for RoutingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for output in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}", output)?;
            first = false;
        }
        Ok(())
    }
}

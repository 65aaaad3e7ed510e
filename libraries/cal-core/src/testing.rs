//! In-memory sink for tests
//!
//! `RecordingSink` stands in for an output device: it knows a fixed list of
//! devices, records every buffer submitted to it and every stop request, and
//! never makes a sound.

use crate::error::{CalError, Result};
use crate::traits::{AudioSink, StopOutcome};
use crate::types::{AudioBuffer, DeviceInfo};

/// One recorded device submission
#[derive(Debug, Clone)]
pub struct Submission {
    /// Device the buffer was sent to
    pub device_id: i32,
    /// Device-width buffer as submitted
    pub buffer: AudioBuffer,
}

/// Sink that records instead of playing
#[derive(Debug, Default)]
pub struct RecordingSink {
    devices: Vec<DeviceInfo>,
    submissions: Vec<Submission>,
    stop_calls: usize,
    playing: bool,
}

impl RecordingSink {
    /// Sink with one device per entry of `channels`, ids counting from 0
    pub fn with_devices(channels: &[u16]) -> Self {
        let devices = channels
            .iter()
            .enumerate()
            .map(|(idx, &ch)| DeviceInfo {
                id: idx as i32,
                name: format!("Test Device {}", idx),
                channels: ch,
                sample_rate: 48_000,
                is_default: idx == 0,
            })
            .collect();

        Self {
            devices,
            ..Self::default()
        }
    }

    /// Every buffer submitted so far
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// Number of device writes
    pub fn write_count(&self) -> usize {
        self.submissions.len()
    }

    /// Most recent submission
    pub fn last_submission(&self) -> Option<&Submission> {
        self.submissions.last()
    }

    /// Number of stop requests, including no-op ones
    pub fn stop_calls(&self) -> usize {
        self.stop_calls
    }

    /// Mark the current playback as finished, as a device would at end of buffer
    pub fn finish_playback(&mut self) {
        self.playing = false;
    }
}

impl AudioSink for RecordingSink {
    fn device(&self, device_id: i32) -> Result<DeviceInfo> {
        self.devices
            .iter()
            .find(|d| d.id == device_id)
            .cloned()
            .ok_or_else(|| CalError::invalid_device(format!("no output device with id {}", device_id)))
    }

    fn submit(&mut self, device_id: i32, buffer: &AudioBuffer) -> Result<()> {
        let device = self.device(device_id)?;
        if buffer.format.channels != device.channels {
            return Err(CalError::device(format!(
                "buffer has {} channels, device {} has {}",
                buffer.format.channels, device.id, device.channels
            )));
        }

        self.submissions.push(Submission {
            device_id,
            buffer: buffer.clone(),
        });
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<StopOutcome> {
        self.stop_calls += 1;
        if self.playing {
            self.playing = false;
            Ok(StopOutcome::Stopped)
        } else {
            Ok(StopOutcome::NothingPlaying)
        }
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SampleRate;

    #[test]
    fn unknown_device_is_rejected_without_writes() {
        let mut sink = RecordingSink::with_devices(&[2]);
        let buffer = AudioBuffer::from_interleaved(vec![0.0; 4], 2, SampleRate::DVD_QUALITY).unwrap();

        let err = sink.submit(-1, &buffer).unwrap_err();
        assert!(matches!(err, CalError::InvalidAudioDevice(_)));
        assert_eq!(sink.write_count(), 0);
    }

    #[test]
    fn stop_reports_whether_anything_played() {
        let mut sink = RecordingSink::with_devices(&[1]);
        assert_eq!(sink.stop().unwrap(), StopOutcome::NothingPlaying);

        let buffer = AudioBuffer::from_interleaved(vec![0.0; 4], 1, SampleRate::DVD_QUALITY).unwrap();
        sink.submit(0, &buffer).unwrap();
        assert!(sink.is_playing());

        assert_eq!(sink.stop().unwrap(), StopOutcome::Stopped);
        assert_eq!(sink.stop().unwrap(), StopOutcome::NothingPlaying);
        assert_eq!(sink.stop_calls(), 3);
    }
}

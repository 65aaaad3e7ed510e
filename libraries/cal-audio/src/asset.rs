//! Presentable audio assets
//!
//! An asset wraps one loaded stimulus, either decoded from a file or handed
//! over as an in-memory buffer. It keeps the pristine buffer next to the
//! gain-applied one, so gain is always applied from the original samples and
//! the exact buffer that failed a clipping check can still be plotted.

use crate::decoder::SymphoniaDecoder;
use crate::routing::RoutingSpec;
use crate::waveform::{WaveformPlot, DEFAULT_COLUMNS};
use cal_core::{
    AudioBuffer, AudioDecoder, AudioFormat, AudioSink, CalError, DeviceInfo, Result, SampleRate,
    StopOutcome,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where a presentation's samples come from
#[derive(Debug, Clone, PartialEq)]
pub enum AudioDescriptor {
    /// Audio file decoded on load
    File(PathBuf),
    /// In-memory frames (one inner vector of channel samples per frame)
    Buffer {
        /// Frames × channels samples
        frames: Vec<Vec<f32>>,
        /// Sample rate in Hz; required
        sample_rate: Option<u32>,
    },
}

impl AudioDescriptor {
    /// Describe a file on disk
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Describe an in-memory buffer
    pub fn buffer(frames: Vec<Vec<f32>>, sample_rate: Option<u32>) -> Self {
        Self::Buffer {
            frames,
            sample_rate,
        }
    }
}

/// Capability shared by everything the presenter can play
///
/// Implementors supply the buffers; gain, clipping, playback and plotting
/// are provided on top of them.
pub trait PresentableAsset {
    /// Short human-readable name for logs
    fn label(&self) -> String;

    /// Samples as loaded, before any gain
    fn original(&self) -> &AudioBuffer;

    /// Samples after the most recent `apply_gain`, or the original if none
    fn buffer(&self) -> &AudioBuffer;

    /// Gain applied by the most recent `apply_gain`
    fn applied_gain_db(&self) -> Option<f64>;

    /// Scale the original samples by `level_db` dB FS
    ///
    /// Replaces any previously applied gain rather than adding to it.
    fn apply_gain(&mut self, level_db: f64);

    /// Channel layout and sample rate
    fn format(&self) -> AudioFormat {
        self.original().format
    }

    /// Number of source channels
    fn channel_count(&self) -> u16 {
        self.original().format.channels
    }

    /// Sample rate of the asset
    fn sample_rate(&self) -> SampleRate {
        self.original().format.sample_rate
    }

    /// Whether any gain-applied sample exceeds full scale
    ///
    /// Judged on the original samples and the applied gain at full precision,
    /// so a gain too small to survive f32 rounding still counts.
    fn check_clipping(&self) -> bool {
        cal_level::clips_with_gain(&self.original().samples, self.applied_gain_db().unwrap_or(0.0))
    }

    /// Apply gain, validate, then submit to the device
    ///
    /// Nothing reaches the sink unless the routing fits the asset, the
    /// gain-applied signal stays within full scale, the device exists and
    /// the routing fits the device.
    ///
    /// # Errors
    /// `InvalidRouting`, `Clipping` or `InvalidAudioDevice`; a failed stream
    /// surfaces as `Device` and a non-finite level as `Config`
    fn play(
        &mut self,
        sink: &mut dyn AudioSink,
        level_db: f64,
        device_id: i32,
        routing: &RoutingSpec,
    ) -> Result<()> {
        if !level_db.is_finite() {
            return Err(CalError::config(format!(
                "presentation level {} dB FS is not a finite number",
                level_db
            )));
        }
        self.apply_gain(level_db);
        routing.validate(self.channel_count())?;
        self.ensure_within_full_scale()?;
        self.submit(sink, device_id, routing).map(|_| ())
    }

    /// Turn a positive clipping check into an error
    ///
    /// # Errors
    /// `Clipping` with the peak and the applied gain
    fn ensure_within_full_scale(&self) -> Result<()> {
        if !self.check_clipping() {
            return Ok(());
        }

        let peak = self.buffer().peak();
        let level_db = self.applied_gain_db().unwrap_or(0.0);
        warn!(
            "{} clips at {:.2} dB FS (peak {:.4}); not presenting",
            self.label(),
            level_db,
            peak
        );
        Err(CalError::Clipping { peak, level_db })
    }

    /// Send the gain-applied buffer to a device, routed to its outputs
    ///
    /// Callers are expected to have checked routing and clipping already;
    /// this step only resolves the device and maps channels onto it.
    ///
    /// # Errors
    /// `InvalidAudioDevice`, `InvalidRouting` if the routing does not fit
    /// the device, or `Device`
    fn submit(
        &self,
        sink: &mut dyn AudioSink,
        device_id: i32,
        routing: &RoutingSpec,
    ) -> Result<DeviceInfo> {
        let device = sink.device(device_id)?;
        let frames = routing.map_to_device(self.buffer(), device.channels)?;
        sink.submit(device_id, &frames)?;

        info!(
            "Presenting {} at {:.2} dB FS on device {} ({}) via channels '{}'",
            self.label(),
            self.applied_gain_db().unwrap_or(0.0),
            device.id,
            device.name,
            routing
        );
        Ok(device)
    }

    /// Halt playback on the sink
    ///
    /// # Errors
    /// Only if the sink itself fails; stopping when idle is not an error
    fn stop(&self, sink: &mut dyn AudioSink) -> Result<StopOutcome> {
        let outcome = sink.stop()?;
        match outcome {
            StopOutcome::Stopped => info!("Stopped {}", self.label()),
            StopOutcome::NothingPlaying => debug!("Stop requested but {} is not playing", self.label()),
        }
        Ok(outcome)
    }

    /// Plot the gain-applied buffer
    fn plot_waveform(&self, title: &str) -> WaveformPlot {
        WaveformPlot::generate(title, self.buffer(), DEFAULT_COLUMNS)
    }
}

fn with_gain(original: &AudioBuffer, level_db: f64) -> AudioBuffer {
    let mut buffer = original.clone();
    cal_level::apply_gain(&mut buffer.samples, level_db);
    buffer
}

/// Asset decoded from a file
#[derive(Debug, Clone)]
pub struct FileAsset {
    path: PathBuf,
    original: AudioBuffer,
    gained: AudioBuffer,
    gain_db: Option<f64>,
}

impl FileAsset {
    /// Decode `path` with the default decoder
    ///
    /// # Errors
    /// `FileNotFound`, `InvalidAudioType` or `Decode`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, &mut SymphoniaDecoder::new())
    }

    /// Decode `path` with a specific decoder
    ///
    /// # Errors
    /// Whatever the decoder reports
    pub fn open_with(path: impl AsRef<Path>, decoder: &mut dyn AudioDecoder) -> Result<Self> {
        let path = path.as_ref();
        let original = decoder.decode(path)?;

        debug!(
            "Loaded {}: {} channel(s), {} Hz, {:.3} s",
            path.display(),
            original.format.channels,
            original.format.sample_rate.as_hz(),
            original.duration_secs()
        );

        Ok(Self {
            path: path.to_path_buf(),
            gained: original.clone(),
            original,
            gain_db: None,
        })
    }

    /// Path the asset was decoded from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PresentableAsset for FileAsset {
    fn label(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    fn original(&self) -> &AudioBuffer {
        &self.original
    }

    fn buffer(&self) -> &AudioBuffer {
        &self.gained
    }

    fn applied_gain_db(&self) -> Option<f64> {
        self.gain_db
    }

    fn apply_gain(&mut self, level_db: f64) {
        self.gained = with_gain(&self.original, level_db);
        self.gain_db = Some(level_db);
    }
}

/// Asset built from in-memory samples
#[derive(Debug, Clone)]
pub struct BufferAsset {
    original: AudioBuffer,
    gained: AudioBuffer,
    gain_db: Option<f64>,
}

impl BufferAsset {
    /// Build an asset from frames and an explicit sample rate
    ///
    /// # Errors
    /// `MissingSamplingRate` without a (non-zero) rate, `InvalidAudioType`
    /// for empty, ragged or non-finite frames
    pub fn from_frames(frames: &[Vec<f32>], sample_rate: Option<u32>) -> Result<Self> {
        let rate = sample_rate.ok_or(CalError::MissingSamplingRate)?;
        let original = AudioBuffer::from_frames(frames, SampleRate::new(rate))?;
        Ok(Self::from_buffer(original))
    }

    /// Wrap an already-built buffer
    pub fn from_buffer(original: AudioBuffer) -> Self {
        Self {
            gained: original.clone(),
            original,
            gain_db: None,
        }
    }
}

impl PresentableAsset for BufferAsset {
    fn label(&self) -> String {
        format!(
            "{}-channel buffer ({} frames)",
            self.original.format.channels,
            self.original.frames()
        )
    }

    fn original(&self) -> &AudioBuffer {
        &self.original
    }

    fn buffer(&self) -> &AudioBuffer {
        &self.gained
    }

    fn applied_gain_db(&self) -> Option<f64> {
        self.gain_db
    }

    fn apply_gain(&mut self, level_db: f64) {
        self.gained = with_gain(&self.original, level_db);
        self.gain_db = Some(level_db);
    }
}

/// Either kind of asset, as produced from a descriptor
#[derive(Debug, Clone)]
pub enum AudioObject {
    /// Decoded from a file
    File(FileAsset),
    /// Built from memory
    Buffer(BufferAsset),
}

impl AudioObject {
    /// Load whatever `descriptor` names
    ///
    /// # Errors
    /// `FileNotFound`, `InvalidAudioType`, `MissingSamplingRate` or `Decode`
    pub fn load(descriptor: &AudioDescriptor) -> Result<Self> {
        match descriptor {
            AudioDescriptor::File(path) => FileAsset::open(path).map(Self::File),
            AudioDescriptor::Buffer {
                frames,
                sample_rate,
            } => BufferAsset::from_frames(frames, *sample_rate).map(Self::Buffer),
        }
    }

    fn inner(&self) -> &dyn PresentableAsset {
        match self {
            Self::File(asset) => asset,
            Self::Buffer(asset) => asset,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn PresentableAsset {
        match self {
            Self::File(asset) => asset,
            Self::Buffer(asset) => asset,
        }
    }
}

impl PresentableAsset for AudioObject {
    fn label(&self) -> String {
        self.inner().label()
    }

    fn original(&self) -> &AudioBuffer {
        self.inner().original()
    }

    fn buffer(&self) -> &AudioBuffer {
        self.inner().buffer()
    }

    fn applied_gain_db(&self) -> Option<f64> {
        self.inner().applied_gain_db()
    }

    fn apply_gain(&mut self, level_db: f64) {
        self.inner_mut().apply_gain(level_db);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::parse_routing;
    use cal_core::testing::RecordingSink;

    fn mono_full_scale() -> BufferAsset {
        BufferAsset::from_frames(&[vec![1.0], vec![-1.0], vec![0.5]], Some(48_000)).unwrap()
    }

    #[test]
    fn buffer_without_rate_is_rejected() {
        let err = BufferAsset::from_frames(&[vec![0.1]], None).unwrap_err();
        assert!(matches!(err, CalError::MissingSamplingRate));
    }

    #[test]
    fn ragged_buffer_is_invalid_audio_type() {
        let err = BufferAsset::from_frames(&[vec![0.1, 0.2], vec![0.3]], Some(48_000)).unwrap_err();
        assert!(matches!(err, CalError::InvalidAudioType(_)));
    }

    #[test]
    fn gain_is_applied_from_the_original() {
        let mut asset = mono_full_scale();
        asset.apply_gain(-6.0);
        asset.apply_gain(-6.0);

        let expected = 10f32.powf(-6.0 / 20.0);
        assert!((asset.buffer().samples[0] - expected).abs() < 1e-6);
        assert_eq!(asset.original().samples, vec![1.0, -1.0, 0.5]);
        assert_eq!(asset.applied_gain_db(), Some(-6.0));
    }

    #[test]
    fn full_scale_at_zero_db_does_not_clip() {
        let mut asset = mono_full_scale();
        asset.apply_gain(0.0);
        assert!(!asset.check_clipping());
    }

    #[test]
    fn gain_below_f32_resolution_still_clips() {
        let mut asset = mono_full_scale();
        asset.apply_gain(1e-9);

        assert_eq!(asset.buffer().samples[0], 1.0);
        assert!(asset.check_clipping());
        let err = asset.ensure_within_full_scale().unwrap_err();
        assert!(matches!(err, CalError::Clipping { .. }));
    }

    #[test]
    fn play_rejects_non_finite_level() {
        let mut asset = mono_full_scale();
        let mut sink = RecordingSink::with_devices(&[1]);
        let routing = parse_routing("1").unwrap();

        let err = asset.play(&mut sink, f64::NAN, 0, &routing).unwrap_err();
        assert!(matches!(err, CalError::Config(_)));
        assert_eq!(sink.write_count(), 0);
    }

    #[test]
    fn full_scale_with_positive_gain_clips() {
        let mut asset = mono_full_scale();
        asset.apply_gain(0.1);
        assert!(asset.check_clipping());
    }

    #[test]
    fn clipping_blocks_submission() {
        let mut sink = RecordingSink::with_devices(&[2]);
        let mut asset = mono_full_scale();
        let routing = parse_routing("1").unwrap();

        let err = asset.play(&mut sink, 3.0, 0, &routing).unwrap_err();
        assert!(matches!(err, CalError::Clipping { level_db, .. } if (level_db - 3.0).abs() < 1e-12));
        assert_eq!(sink.write_count(), 0);

        let plot = asset.plot_waveform("Clipped");
        assert!(plot.is_clipped());
    }

    #[test]
    fn play_routes_onto_device_width() {
        let mut sink = RecordingSink::with_devices(&[2]);
        let mut asset = mono_full_scale();
        let routing = parse_routing("2").unwrap();

        asset.play(&mut sink, 0.0, 0, &routing).unwrap();

        let submission = sink.last_submission().unwrap();
        assert_eq!(submission.device_id, 0);
        assert_eq!(submission.buffer.samples, vec![0.0, 1.0, 0.0, -1.0, 0.0, 0.5]);
    }

    #[test]
    fn unknown_device_is_rejected_without_writes() {
        let mut sink = RecordingSink::with_devices(&[2]);
        let mut asset = mono_full_scale();
        let routing = parse_routing("1").unwrap();

        let err = asset.play(&mut sink, -10.0, -1, &routing).unwrap_err();
        assert!(matches!(err, CalError::InvalidAudioDevice(_)));
        assert_eq!(sink.write_count(), 0);
    }

    #[test]
    fn stop_when_idle_is_reported_not_fatal() {
        let mut sink = RecordingSink::with_devices(&[2]);
        let asset = mono_full_scale();
        assert_eq!(asset.stop(&mut sink).unwrap(), StopOutcome::NothingPlaying);
    }

    #[test]
    fn load_from_buffer_descriptor() {
        let descriptor = AudioDescriptor::buffer(vec![vec![0.1, 0.2]; 4], Some(44_100));
        let object = AudioObject::load(&descriptor).unwrap();
        assert!(matches!(object, AudioObject::Buffer(_)));
        assert_eq!(object.channel_count(), 2);
        assert_eq!(object.sample_rate(), SampleRate::CD_QUALITY);
    }
}

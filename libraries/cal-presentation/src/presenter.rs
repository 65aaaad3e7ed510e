//! Presentation orchestrator
//!
//! `Presenter` is the one place a presentation request is resolved:
//! load → level → routing → gain → clipping → device. Each step either
//! passes or ends the request with a classified `CalError`; the device only
//! sees samples once every check has passed.

use crate::state::SessionState;
use cal_audio::{parse_routing, AudioDescriptor, AudioObject, PresentableAsset, RoutingSpec, WaveformPlot};
use cal_core::{AudioSink, CalError, DeviceInfo, ErrorKind, Result, SessionParams, StopOutcome};
use cal_level::compute_adjusted_level;
use tracing::{debug, info, warn};

/// What a successful presentation did
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationReport {
    /// Asset that was presented
    pub label: String,
    /// Gain applied (dB FS)
    pub level_db: f64,
    /// Device the samples went to
    pub device: DeviceInfo,
    /// Routing that was applied
    pub routing: RoutingSpec,
    /// Largest post-gain sample magnitude
    pub peak: f32,
    /// Length of the stimulus
    pub duration_secs: f64,
}

/// Drives presentations on one sink, one at a time
pub struct Presenter<S: AudioSink> {
    sink: S,
    asset: Option<AudioObject>,
    state: SessionState,
}

impl<S: AudioSink> Presenter<S> {
    /// Create a presenter that plays through `sink`
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            asset: None,
            state: SessionState::Idle,
        }
    }

    /// The output sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The output sink, mutably
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Take the sink back
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Current session state
    ///
    /// A session whose buffer the device has finished reads as `Stopped`.
    pub fn state(&self) -> SessionState {
        if self.state == SessionState::Playing && !self.sink.is_playing() {
            SessionState::Stopped
        } else {
            self.state
        }
    }

    /// Asset of the current (or last) session
    pub fn asset(&self) -> Option<&AudioObject> {
        self.asset.as_ref()
    }

    fn transition(&mut self, next: SessionState) {
        advance(&mut self.state, next);
    }

    /// Present a stimulus at a desired level
    ///
    /// The playback gain is `desired_level_db + slm_offset_db`. Any failure
    /// short-circuits before the device is touched.
    ///
    /// # Errors
    /// `FileNotFound`, `InvalidAudioType`, `MissingSamplingRate`,
    /// `InvalidRouting`, `Clipping` or `InvalidAudioDevice`; `Config` if the
    /// resulting level is not a finite number
    pub fn present(
        &mut self,
        descriptor: &AudioDescriptor,
        desired_level_db: f64,
        slm_offset_db: f64,
        device_id: i32,
        routing_text: &str,
    ) -> Result<PresentationReport> {
        let level_db = compute_adjusted_level(desired_level_db, slm_offset_db);
        debug!(
            "Desired {:.2} dB SPL with offset {:+.2} dB -> {:.2} dB FS",
            desired_level_db, slm_offset_db, level_db
        );
        self.present_at(descriptor, level_db, device_id, routing_text)
    }

    /// Play the calibration signal named in `params`
    ///
    /// The signal is played at `cal_level_db` as given, without any offset,
    /// so the SLM reading taken during it yields the offset.
    ///
    /// # Errors
    /// As [`Presenter::present`]
    pub fn play_calibration(&mut self, params: &SessionParams) -> Result<PresentationReport> {
        info!(
            "Playing calibration signal {} at {:.2} dB FS",
            params.cal_file.display(),
            params.cal_level_db
        );
        self.present_at(
            &AudioDescriptor::file(&params.cal_file),
            params.cal_level_db,
            params.audio_device,
            &params.channel_routing,
        )
    }

    fn present_at(
        &mut self,
        descriptor: &AudioDescriptor,
        level_db: f64,
        device_id: i32,
        routing_text: &str,
    ) -> Result<PresentationReport> {
        if !level_db.is_finite() {
            warn!("Presentation rejected: level {} dB FS is not finite", level_db);
            return Err(CalError::config(format!(
                "presentation level {} dB FS is not a finite number",
                level_db
            )));
        }
        self.begin_session()?;

        let result = self.run_session(descriptor, level_db, device_id, routing_text);
        if let Err(e) = &result {
            if e.kind() == ErrorKind::Clipping {
                self.transition(SessionState::Clipped);
            } else {
                warn!("Presentation rejected: {}", e);
                self.asset = None;
                self.transition(SessionState::Idle);
            }
        }
        result
    }

    /// Stop whatever is playing and start from `Idle`
    fn begin_session(&mut self) -> Result<()> {
        if self.sink.is_playing() {
            self.sink.stop()?;
            debug!("Previous presentation stopped");
        }
        self.asset = None;
        self.transition(SessionState::Idle);
        Ok(())
    }

    fn run_session(
        &mut self,
        descriptor: &AudioDescriptor,
        level_db: f64,
        device_id: i32,
        routing_text: &str,
    ) -> Result<PresentationReport> {
        let asset = self.asset.insert(AudioObject::load(descriptor)?);
        advance(&mut self.state, SessionState::Loaded);

        let routing = parse_routing(routing_text)?;
        routing.validate(asset.channel_count())?;

        asset.apply_gain(level_db);
        advance(&mut self.state, SessionState::GainApplied);

        asset.ensure_within_full_scale()?;
        advance(&mut self.state, SessionState::Validated);

        let device = asset.submit(&mut self.sink, device_id, &routing)?;
        let report = PresentationReport {
            label: asset.label(),
            level_db,
            device,
            peak: asset.buffer().peak(),
            duration_secs: asset.buffer().duration_secs(),
            routing,
        };
        self.transition(SessionState::Playing);

        Ok(report)
    }

    /// Halt playback
    ///
    /// Safe at any time: with nothing loaded or nothing playing the request
    /// is logged and reported as `NothingPlaying`.
    ///
    /// # Errors
    /// Only if the sink fails to stop
    pub fn stop(&mut self) -> Result<StopOutcome> {
        let Some(asset) = &self.asset else {
            warn!("Stop requested but no audio object is loaded");
            return Ok(StopOutcome::NothingPlaying);
        };

        let outcome = asset.stop(&mut self.sink)?;
        if self.state == SessionState::Playing {
            self.transition(SessionState::Stopped);
        }
        Ok(outcome)
    }

    /// Plot the gain-applied buffer of the current session
    ///
    /// After a `Clipping` error this is the exact buffer that failed the
    /// check.
    pub fn plot_waveform(&self, title: &str) -> Option<WaveformPlot> {
        self.asset.as_ref().map(|asset| asset.plot_waveform(title))
    }
}

fn advance(state: &mut SessionState, next: SessionState) {
    debug_assert!(state.can_transition_to(next), "{} -> {}", state, next);
    debug!("Session {} -> {}", state, next);
    *state = next;
}

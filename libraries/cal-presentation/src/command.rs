//! Command dispatch
//!
//! Front ends (the CLI today) translate user actions into a `Command` and
//! hand it to [`Presenter::dispatch`] together with the parameter store.

use crate::presenter::{PresentationReport, Presenter};
use crate::session::{calibrate, prepare_level};
use cal_audio::AudioDescriptor;
use cal_core::{AudioSink, CalibrationState, Result, SessionParams, StopOutcome};
use tracing::info;

/// Operator actions
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Play the calibration signal at the stored calibration level
    PlayCalibration,

    /// Record the SLM reading taken during calibration
    SubmitCalibration {
        /// Meter reading (dB SPL)
        slm_reading_db: f64,
    },

    /// Present a stimulus at a desired level
    Present {
        /// Stimulus to present
        stimulus: AudioDescriptor,
        /// Desired level (dB SPL)
        desired_level_db: f64,
    },

    /// Halt playback
    Stop,
}

/// Result of a dispatched command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Something is playing
    Presented(PresentationReport),
    /// A calibration was recorded in the store
    Calibrated(CalibrationState),
    /// Stop was handled
    Stopped(StopOutcome),
}

impl<S: AudioSink> Presenter<S> {
    /// Run one command against the parameter store
    ///
    /// Values the command computes (offset, adjusted level) are written into
    /// `params`; saving the store is left to the caller.
    ///
    /// # Errors
    /// `Config` for an invalid store or a presentation before calibration,
    /// otherwise whatever the underlying operation reports
    pub fn dispatch(
        &mut self,
        command: Command,
        params: &mut SessionParams,
    ) -> Result<CommandOutcome> {
        match command {
            Command::PlayCalibration => {
                params.validate()?;
                self.play_calibration(params).map(CommandOutcome::Presented)
            }
            Command::SubmitCalibration { slm_reading_db } => {
                let state = calibrate(params, slm_reading_db)?;
                info!(
                    "Calibrated: played {:.2} dB FS, read {:.2} dB SPL, offset {:+.2} dB",
                    state.cal_level_db, state.slm_reading_db, state.slm_offset_db
                );
                Ok(CommandOutcome::Calibrated(state))
            }
            Command::Present {
                stimulus,
                desired_level_db,
            } => {
                params.desired_level_db = desired_level_db;
                params.validate()?;
                prepare_level(params)?;

                let offset = params.require_offset()?;
                self.present(
                    &stimulus,
                    params.desired_level_db,
                    offset,
                    params.audio_device,
                    &params.channel_routing,
                )
                .map(CommandOutcome::Presented)
            }
            Command::Stop => self.stop().map(CommandOutcome::Stopped),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cal_core::testing::RecordingSink;
    use cal_core::ErrorKind;

    #[test]
    fn present_before_calibration_is_rejected() {
        let mut presenter = Presenter::new(RecordingSink::with_devices(&[2]));
        let mut params = SessionParams::default();

        let err = presenter
            .dispatch(
                Command::Present {
                    stimulus: AudioDescriptor::buffer(vec![vec![0.01]; 8], Some(48_000)),
                    desired_level_db: 40.0,
                },
                &mut params,
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(presenter.sink().write_count(), 0);
    }

    #[test]
    fn submit_then_present_updates_the_store() {
        let mut presenter = Presenter::new(RecordingSink::with_devices(&[2]));
        let mut params = SessionParams {
            cal_level_db: -30.0,
            ..SessionParams::default()
        };

        let outcome = presenter
            .dispatch(Command::SubmitCalibration { slm_reading_db: 60.0 }, &mut params)
            .unwrap();
        assert!(matches!(outcome, CommandOutcome::Calibrated(s) if s.slm_offset_db == -90.0));

        let outcome = presenter
            .dispatch(
                Command::Present {
                    stimulus: AudioDescriptor::buffer(vec![vec![0.5]; 8], Some(48_000)),
                    desired_level_db: 70.0,
                },
                &mut params,
            )
            .unwrap();

        assert_eq!(params.desired_level_db, 70.0);
        assert_eq!(params.adjusted_level_db, Some(-20.0));
        let CommandOutcome::Presented(report) = outcome else {
            panic!("expected a presentation");
        };
        assert_eq!(report.level_db, -20.0);
    }

    #[test]
    fn stop_without_anything_loaded() {
        let mut presenter = Presenter::new(RecordingSink::with_devices(&[2]));
        let mut params = SessionParams::default();

        let outcome = presenter.dispatch(Command::Stop, &mut params).unwrap();
        assert_eq!(outcome, CommandOutcome::Stopped(StopOutcome::NothingPlaying));
    }
}

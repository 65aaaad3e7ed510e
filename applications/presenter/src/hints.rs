/// Operator-facing advice for classified errors
use cal_audio::WaveformPlot;
use cal_core::{AudioSink, CalError, ErrorKind};
use cal_presentation::Presenter;

/// What the operator should do about an error of this kind
pub fn corrective_hint(kind: ErrorKind) -> Option<&'static str> {
    match kind {
        ErrorKind::FileNotFound => {
            Some("Check the stimulus path, or cal_file in the parameter file.")
        }
        ErrorKind::InvalidAudioType => Some("Use a WAV, FLAC, MP3, OGG or M4A audio file."),
        ErrorKind::MissingSamplingRate => Some("Supply the sample rate of the sample buffer."),
        ErrorKind::InvalidAudioDevice => {
            Some("Select a device id listed by `cal-presenter devices` (audio_device).")
        }
        ErrorKind::InvalidRouting => Some(
            "Give one output channel per stimulus channel, numbered from 1 (e.g. \"1 2\" for stereo).",
        ),
        ErrorKind::Clipping => {
            Some("Lower the presentation level, or re-calibrate with a lower calibration level.")
        }
        ErrorKind::Other => None,
    }
}

/// Waveform of the buffer that failed, for `Clipping` errors only
pub fn clipping_plot<S: AudioSink>(
    error: &CalError,
    presenter: &Presenter<S>,
    title: &str,
) -> Option<WaveformPlot> {
    if error.kind() != ErrorKind::Clipping {
        return None;
    }
    presenter.plot_waveform(title)
}

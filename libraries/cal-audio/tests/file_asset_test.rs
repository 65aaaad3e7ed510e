//! File-backed asset tests
//!
//! WAV fixtures are written with hound into a temporary directory:
//! - decoding keeps the channel layout and sample values
//! - missing and non-audio files are classified
//! - a decoded asset plays through the full validation path

use cal_audio::{parse_routing, AudioDescriptor, AudioObject, FileAsset, PresentableAsset};
use cal_core::testing::RecordingSink;
use cal_core::{CalError, ErrorKind, SampleRate};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write interleaved 16-bit PCM frames to `dir/name`
fn write_wav(dir: &Path, name: &str, channels: u16, sample_rate: u32, samples: &[i16]) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
    for &s in samples {
        writer.write_sample(s).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
    path
}

/// Half-scale square wave, `frames` long, same on every channel
fn half_scale(frames: usize, channels: u16) -> Vec<i16> {
    (0..frames)
        .flat_map(|i| {
            let s = if i % 2 == 0 { 16_384 } else { -16_384 };
            std::iter::repeat_n(s, channels as usize)
        })
        .collect()
}

#[test]
fn decodes_mono_wav() {
    let dir = TempDir::new().unwrap();
    let path = write_wav(dir.path(), "mono.wav", 1, 44_100, &half_scale(441, 1));

    let asset = FileAsset::open(&path).unwrap();
    assert_eq!(asset.channel_count(), 1);
    assert_eq!(asset.sample_rate(), SampleRate::CD_QUALITY);
    assert_eq!(asset.original().frames(), 441);
    assert!((asset.original().samples[0] - 0.5).abs() < 1e-6);
    assert!((asset.original().samples[1] + 0.5).abs() < 1e-6);
    assert_eq!(asset.label(), "mono.wav");
}

#[test]
fn keeps_every_channel_of_a_four_channel_file() {
    let dir = TempDir::new().unwrap();
    // Distinct value per channel so a downmix would show
    let samples: Vec<i16> = (0..100).flat_map(|_| [8_192, -8_192, 16_384, 0]).collect();
    let path = write_wav(dir.path(), "quad.wav", 4, 48_000, &samples);

    let asset = FileAsset::open(&path).unwrap();
    assert_eq!(asset.channel_count(), 4);

    let buffer = asset.original();
    let first: Vec<f32> = (0..4).map(|c| buffer.channel(c).next().unwrap()).collect();
    assert_eq!(first, vec![0.25, -0.25, 0.5, 0.0]);
}

#[test]
fn missing_file_is_file_not_found() {
    let dir = TempDir::new().unwrap();
    let err = AudioObject::load(&AudioDescriptor::file(dir.path().join("nope.wav"))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileNotFound);
}

#[test]
fn text_file_is_invalid_audio_type() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "these are not samples\n").unwrap();

    let err = FileAsset::open(&path).unwrap_err();
    assert!(matches!(err, CalError::InvalidAudioType(_)), "{err}");
}

#[test]
fn directory_is_invalid_audio_type() {
    let dir = TempDir::new().unwrap();
    let err = FileAsset::open(dir.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAudioType);
}

#[test]
fn decoded_stereo_plays_through_routing() {
    let dir = TempDir::new().unwrap();
    let path = write_wav(dir.path(), "stereo.wav", 2, 48_000, &half_scale(480, 2));

    let mut object = AudioObject::load(&AudioDescriptor::file(&path)).unwrap();
    let mut sink = RecordingSink::with_devices(&[2, 4]);

    let routing = parse_routing("3 4").unwrap();
    object.play(&mut sink, -6.0, 1, &routing).unwrap();

    let submission = sink.last_submission().unwrap();
    assert_eq!(submission.device_id, 1);
    assert_eq!(submission.buffer.format.channels, 4);
    assert_eq!(submission.buffer.frames(), 480);
    // Outputs 1 and 2 are silent
    assert!(submission.buffer.channel(0).all(|s| s == 0.0));
    assert!(submission.buffer.channel(1).all(|s| s == 0.0));

    let expected = 0.5 * 10f32.powf(-6.0 / 20.0);
    assert!((submission.buffer.samples[2] - expected).abs() < 1e-6);
}

#[test]
fn stereo_file_with_mono_routing_never_reaches_the_device() {
    let dir = TempDir::new().unwrap();
    let path = write_wav(dir.path(), "stereo.wav", 2, 48_000, &half_scale(48, 2));

    let mut object = AudioObject::load(&AudioDescriptor::file(&path)).unwrap();
    let mut sink = RecordingSink::with_devices(&[2]);

    let err = object
        .play(&mut sink, 0.0, 0, &parse_routing("1").unwrap())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRouting);
    assert_eq!(sink.write_count(), 0);
}

#[test]
fn boosting_a_half_scale_file_past_full_scale_clips() {
    let dir = TempDir::new().unwrap();
    let path = write_wav(dir.path(), "half.wav", 1, 48_000, &half_scale(48, 1));

    let mut object = AudioObject::load(&AudioDescriptor::file(&path)).unwrap();
    let mut sink = RecordingSink::with_devices(&[2]);
    let routing = parse_routing("1").unwrap();

    // +6 dB leaves 0.5 just under full scale
    object.play(&mut sink, 6.0, 0, &routing).unwrap();
    assert_eq!(sink.write_count(), 1);

    let err = object.play(&mut sink, 6.5, 0, &routing).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Clipping);
    assert_eq!(sink.write_count(), 1);
    assert_eq!(object.plot_waveform("half.wav at 6.5 dB").clipped_samples, 48);
}

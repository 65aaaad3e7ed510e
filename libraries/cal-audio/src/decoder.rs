/// Audio decoder implementation using Symphonia
use crate::error::AudioError;
use cal_core::{AudioBuffer, AudioDecoder as AudioDecoderTrait, SampleRate};
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Audio decoder using Symphonia
///
/// Supports: WAV, FLAC, MP3, OGG/Vorbis, AAC/M4A
///
/// Unlike a music player decoder this one never downmixes or clamps: each
/// source channel is kept as its own channel so it can be routed to its own
/// output, and over-range float samples stay over-range so the clipping check
/// still sees them.
#[derive(Debug, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }

    /// Append one decoded packet to `out` as interleaved f32
    ///
    /// Signed integers are scaled symmetrically (divide by 2^(N-1)); unsigned
    /// integers are re-centred on their midpoint first.
    fn append_buffer(decoded: &AudioBufferRef<'_>, out: &mut Vec<f32>) {
        match decoded {
            AudioBufferRef::F32(buf) => Self::interleave(buf, out, |s| s),
            AudioBufferRef::F64(buf) => Self::interleave(buf, out, |s| s as f32),
            AudioBufferRef::S32(buf) => {
                Self::interleave(buf, out, |s| (f64::from(s) / 2_147_483_648.0) as f32)
            }
            AudioBufferRef::S24(buf) => {
                Self::interleave(buf, out, |s| s.inner() as f32 / 8_388_608.0)
            }
            AudioBufferRef::S16(buf) => Self::interleave(buf, out, |s| f32::from(s) / 32_768.0),
            AudioBufferRef::S8(buf) => Self::interleave(buf, out, |s| f32::from(s) / 128.0),
            AudioBufferRef::U32(buf) => Self::interleave(buf, out, |s| {
                ((f64::from(s) - 2_147_483_648.0) / 2_147_483_648.0) as f32
            }),
            AudioBufferRef::U24(buf) => Self::interleave(buf, out, |s| {
                (s.inner() as f32 - 8_388_608.0) / 8_388_608.0
            }),
            AudioBufferRef::U16(buf) => {
                Self::interleave(buf, out, |s| (f32::from(s) - 32_768.0) / 32_768.0)
            }
            AudioBufferRef::U8(buf) => {
                Self::interleave(buf, out, |s| (f32::from(s) - 128.0) / 128.0)
            }
        }
    }

    /// Interleave every channel of a planar Symphonia buffer
    fn interleave<T, F>(
        buf: &symphonia::core::audio::AudioBuffer<T>,
        out: &mut Vec<f32>,
        normalize: F,
    ) where
        T: symphonia::core::sample::Sample,
        F: Fn(T) -> f32,
    {
        let channels = buf.spec().channels.count();
        let frames = buf.frames();
        out.reserve(frames * channels);

        for frame in 0..frames {
            for ch in 0..channels {
                out.push(normalize(buf.chan(ch)[frame]));
            }
        }
    }
}

impl AudioDecoderTrait for SymphoniaDecoder {
    fn decode(&mut self, path: &Path) -> cal_core::Result<AudioBuffer> {
        // Check if file exists
        if !path.exists() {
            return Err(AudioError::FileNotFound(path.display().to_string()).into());
        }
        if !path.is_file() {
            return Err(AudioError::UnsupportedFormat(format!(
                "{} is not a file",
                path.display()
            ))
            .into());
        }

        let file = std::fs::File::open(path).map_err(AudioError::Io)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| match e {
                SymphoniaError::Unsupported(what) => AudioError::UnsupportedFormat(format!(
                    "{} is not a recognized audio file ({})",
                    path.display(),
                    what
                )),
                SymphoniaError::IoError(e) => AudioError::UnsupportedFormat(format!(
                    "{} could not be probed: {}",
                    path.display(),
                    e
                )),
                other => AudioError::Symphonia(format!("Failed to probe file: {}", other)),
            })?;

        let mut format = probed.format;

        // Find the default track
        let track = format
            .default_track()
            .ok_or_else(|| AudioError::UnsupportedFormat("No audio tracks found".to_string()))?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.ok_or_else(|| {
            AudioError::DecodeError(format!("{} does not declare a sample rate", path.display()))
        })?;
        let mut channels = track.codec_params.channels.map(|c| c.count());

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::UnsupportedFormat(format!("Failed to create decoder: {}", e)))?;

        let mut samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(e) => {
                    return Err(AudioError::Symphonia(format!("Error reading packet: {}", e)).into());
                }
            };

            // Skip packets that are not for the default track
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(msg)) => {
                    warn!("Skipping undecodable packet in {}: {}", path.display(), msg);
                    continue;
                }
                Err(e) => return Err(AudioError::DecodeError(e.to_string()).into()),
            };

            let packet_channels = decoded.spec().channels.count();
            match channels {
                Some(ch) if ch != packet_channels => {
                    return Err(AudioError::DecodeError(format!(
                        "channel count changed mid-stream ({} -> {})",
                        ch, packet_channels
                    ))
                    .into());
                }
                Some(_) => {}
                None => channels = Some(packet_channels),
            }

            Self::append_buffer(&decoded, &mut samples);
        }

        let channels = channels
            .ok_or_else(|| AudioError::DecodeError("no audio frames decoded".to_string()))?;
        let channels = u16::try_from(channels)
            .map_err(|_| AudioError::UnsupportedFormat(format!("{} channels", channels)))?;

        debug!(
            "Decoded {}: {} Hz, {} channel(s), {} samples",
            path.display(),
            sample_rate,
            channels,
            samples.len()
        );

        AudioBuffer::from_interleaved(samples, channels, SampleRate::new(sample_rate))
    }

    fn supports_format(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            matches!(
                ext.to_lowercase().as_str(),
                "wav" | "flac" | "mp3" | "ogg" | "m4a" | "aac"
            )
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cal_core::CalError;

    #[test]
    fn missing_file_is_file_not_found() {
        let mut decoder = SymphoniaDecoder::new();
        let err = decoder
            .decode(Path::new("/definitely/not/here/stim.wav"))
            .unwrap_err();
        assert!(matches!(err, CalError::FileNotFound(_)));
    }

    #[test]
    fn supported_extensions() {
        let decoder = SymphoniaDecoder::new();
        assert!(decoder.supports_format(Path::new("stim.WAV")));
        assert!(decoder.supports_format(Path::new("stim.flac")));
        assert!(!decoder.supports_format(Path::new("matrix.csv")));
        assert!(!decoder.supports_format(Path::new("noext")));
    }
}

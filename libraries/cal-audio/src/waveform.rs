//! Waveform plots of gain-applied buffers
//!
//! Computes per-channel min/max peak pairs at a fixed number of columns so an
//! operator can see where and on which channel a stimulus exceeded full
//! scale. The plot renders as text; it is a diagnostic, not a UI widget.

use cal_core::{AudioBuffer, FULL_SCALE};
use cal_level::{clipped_samples, linear_to_db};
use std::fmt;

/// Default number of peak columns per channel
pub const DEFAULT_COLUMNS: usize = 64;

/// Rows above (and below) the zero line in the text rendering
const HALF_HEIGHT: usize = 4;

/// Min/max summary of one buffer
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformPlot {
    /// Caption shown above the plot
    pub title: String,
    /// Sample rate of the plotted buffer
    pub sample_rate: u32,
    /// Frames summarized by each peak pair
    pub frames_per_peak: usize,
    /// `(min, max)` pairs, one vector per channel
    pub channels: Vec<Vec<(f32, f32)>>,
    /// Largest absolute sample value
    pub peak: f32,
    /// Samples above full scale (or non-finite)
    pub clipped_samples: usize,
}

impl WaveformPlot {
    /// Summarize `buffer` into at most `columns` peak pairs per channel
    pub fn generate(title: impl Into<String>, buffer: &AudioBuffer, columns: usize) -> Self {
        let ch = buffer.format.channels as usize;
        let total_frames = buffer.frames();
        let frames_per_peak = total_frames.div_ceil(columns.max(1)).max(1);

        let mut channels = vec![Vec::new(); ch];
        for chunk in buffer.samples.chunks(frames_per_peak * ch.max(1)) {
            for (c, peaks) in channels.iter_mut().enumerate() {
                let mut min_val = f32::MAX;
                let mut max_val = f32::MIN;
                for &s in chunk.iter().skip(c).step_by(ch.max(1)) {
                    min_val = min_val.min(s);
                    max_val = max_val.max(s);
                }
                peaks.push((min_val, max_val));
            }
        }

        Self {
            title: title.into(),
            sample_rate: buffer.format.sample_rate.as_hz(),
            frames_per_peak,
            channels,
            peak: buffer.peak(),
            clipped_samples: clipped_samples(&buffer.samples),
        }
    }

    /// Whether any plotted sample exceeds full scale
    pub fn is_clipped(&self) -> bool {
        self.clipped_samples > 0
    }

    /// Peak level in dB FS
    pub fn peak_dbfs(&self) -> f64 {
        linear_to_db(f64::from(self.peak))
    }

    /// Number of peak columns per channel
    pub fn columns(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    fn render_channel(f: &mut fmt::Formatter<'_>, peaks: &[(f32, f32)]) -> fmt::Result {
        // Row `HALF_HEIGHT` is the zero line; the outermost rows mark full scale.
        for row in 0..=(2 * HALF_HEIGHT) {
            let level = (HALF_HEIGHT as f32 - row as f32) / HALF_HEIGHT as f32 * FULL_SCALE;
            let top = row == 0;
            let bottom = row == 2 * HALF_HEIGHT;

            let line: String = peaks
                .iter()
                .map(|&(min, max)| {
                    if (top && max > FULL_SCALE) || (bottom && min < -FULL_SCALE) {
                        '!'
                    } else if row == HALF_HEIGHT {
                        if max >= 0.0 && min <= 0.0 { '-' } else { ' ' }
                    } else if (level > 0.0 && max >= level) || (level < 0.0 && min <= level) {
                        '#'
                    } else {
                        ' '
                    }
                })
                .collect();

            writeln!(f, "{:>5.2} |{}", level, line.trim_end())?;
        }
        Ok(())
    }
}

impl fmt::Display for WaveformPlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(
            f,
            "peak {:.4} ({:+.2} dB FS), {} sample(s) over full scale, {} frame(s) per column",
            self.peak,
            self.peak_dbfs(),
            self.clipped_samples,
            self.frames_per_peak
        )?;

        for (idx, peaks) in self.channels.iter().enumerate() {
            writeln!(f, "channel {}", idx + 1)?;
            Self::render_channel(f, peaks)?;
        }
        Ok(())
    }
}

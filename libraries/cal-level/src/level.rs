//! Desired level (dB SPL) to playback gain (dB FS)

use tracing::debug;

/// Playback gain for a desired level under the stored offset
///
/// Pure and not memoized: call it again whenever the desired level changes.
pub fn compute_adjusted_level(desired_level_db: f64, slm_offset_db: f64) -> f64 {
    let adjusted = desired_level_db + slm_offset_db;
    debug!(desired_level_db, slm_offset_db, adjusted, "Computed adjusted level");
    adjusted
}

/// A desired level together with the offset it should be corrected by
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelRequest {
    /// Desired presentation level (dB SPL)
    pub desired_level_db: f64,
    /// Offset from the last calibration (dB)
    pub slm_offset_db: f64,
}

impl LevelRequest {
    /// Create a new request
    pub fn new(desired_level_db: f64, slm_offset_db: f64) -> Self {
        Self {
            desired_level_db,
            slm_offset_db,
        }
    }

    /// Gain to apply at playback (dB FS)
    pub fn adjusted_level_db(&self) -> f64 {
        compute_adjusted_level(self.desired_level_db, self.slm_offset_db)
    }
}

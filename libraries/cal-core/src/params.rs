//! Calibration state and the caller-owned parameter store
//!
//! The engine never keeps these values between calls. Calibration and level
//! functions take plain numbers in and hand plain numbers back; the caller
//! decides when to write them into a `SessionParams` and when to persist it.

use crate::error::{CalError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of one calibration run
///
/// `slm_offset_db` is always `cal_level_db - slm_reading_db`; the only
/// constructor that produces one from a reading lives in `cal-level`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    /// Digital level the calibration signal was played at (dB FS)
    pub cal_level_db: f64,
    /// What the sound level meter showed (dB SPL)
    pub slm_reading_db: f64,
    /// Correction applied to every later level conversion
    pub slm_offset_db: f64,
}

/// Session parameters owned by the caller
///
/// Field names follow the parameter names used in trial records, so a store
/// can be dumped next to the data it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionParams {
    /// Output device index
    #[serde(default)]
    pub audio_device: i32,

    /// Whitespace-separated output channels, one per source channel
    #[serde(default = "default_channel_routing")]
    pub channel_routing: String,

    /// Calibration signal file
    #[serde(default = "default_cal_file")]
    pub cal_file: PathBuf,

    /// Level the calibration signal is played at (dB FS)
    #[serde(default = "default_cal_level_db")]
    pub cal_level_db: f64,

    /// Last sound level meter reading (dB SPL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slm_reading_db: Option<f64>,

    /// Offset from the last calibration; absent until one has run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slm_offset_db: Option<f64>,

    /// Desired presentation level (dB SPL)
    #[serde(default = "default_desired_level_db")]
    pub desired_level_db: f64,

    /// Gain derived from the desired level and offset (dB FS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_level_db: Option<f64>,
}

impl SessionParams {
    /// Record a calibration run
    pub fn apply_calibration(&mut self, state: &CalibrationState) {
        self.cal_level_db = state.cal_level_db;
        self.slm_reading_db = Some(state.slm_reading_db);
        self.slm_offset_db = Some(state.slm_offset_db);
    }

    /// Stored offset
    ///
    /// # Errors
    /// `Config` when no calibration has been recorded yet
    pub fn require_offset(&self) -> Result<f64> {
        self.slm_offset_db.ok_or_else(|| {
            CalError::config("no calibration offset stored; run a calibration first")
        })
    }

    /// Check the values a presentation will read
    ///
    /// # Errors
    /// `Config` for non-finite levels or an empty routing string
    pub fn validate(&self) -> Result<()> {
        let levels = [
            ("cal_level_db", Some(self.cal_level_db)),
            ("desired_level_db", Some(self.desired_level_db)),
            ("slm_reading_db", self.slm_reading_db),
            ("slm_offset_db", self.slm_offset_db),
            ("adjusted_level_db", self.adjusted_level_db),
        ];

        for (name, value) in levels {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(CalError::config(format!("{} must be finite, got {}", name, v)));
                }
            }
        }

        if self.channel_routing.trim().is_empty() {
            return Err(CalError::config("channel_routing is empty"));
        }

        Ok(())
    }
}

// Default values
fn default_channel_routing() -> String {
    "1".to_string()
}

fn default_cal_file() -> PathBuf {
    PathBuf::from("cal_stim.wav")
}

fn default_cal_level_db() -> f64 {
    -30.0
}

fn default_desired_level_db() -> f64 {
    65.0
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            audio_device: 0,
            channel_routing: default_channel_routing(),
            cal_file: default_cal_file(),
            cal_level_db: default_cal_level_db(),
            slm_reading_db: None,
            slm_offset_db: None,
            desired_level_db: default_desired_level_db(),
            adjusted_level_db: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_offset() {
        let params = SessionParams::default();
        assert!(params.slm_offset_db.is_none());
        assert!(params.require_offset().is_err());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn calibration_is_recorded() {
        let mut params = SessionParams::default();
        params.apply_calibration(&CalibrationState {
            cal_level_db: 70.0,
            slm_reading_db: 68.0,
            slm_offset_db: 2.0,
        });

        assert_eq!(params.cal_level_db, 70.0);
        assert_eq!(params.slm_reading_db, Some(68.0));
        assert_eq!(params.require_offset().unwrap(), 2.0);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut params = SessionParams::default();
        params.desired_level_db = f64::NAN;
        assert!(params.validate().is_err());

        let mut params = SessionParams::default();
        params.channel_routing = "   ".to_string();
        assert!(params.validate().is_err());

        let mut params = SessionParams::default();
        params.slm_offset_db = Some(f64::INFINITY);
        assert!(params.validate().is_err());
    }

    #[test]
    fn toml_round_trip_keeps_missing_offset_missing() {
        let params = SessionParams::default();
        let text = toml::to_string(&params).unwrap();
        assert!(!text.contains("slm_offset_db"));

        let parsed: SessionParams = toml::from_str(&text).unwrap();
        assert_eq!(parsed, params);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let parsed: SessionParams = toml::from_str("audio_device = 3\nslm_offset_db = -97.5\n").unwrap();
        assert_eq!(parsed.audio_device, 3);
        assert_eq!(parsed.slm_offset_db, Some(-97.5));
        assert_eq!(parsed.channel_routing, "1");
        assert_eq!(parsed.cal_level_db, -30.0);
    }
}

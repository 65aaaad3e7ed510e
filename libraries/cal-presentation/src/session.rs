//! Parameter-store updates
//!
//! The presenter never owns the session parameters. These helpers compute a
//! value with `cal-level` and write it into the store the caller passes in;
//! persisting the store is the caller's business.

use cal_core::{CalError, CalibrationState, Result, SessionParams};
use cal_level::{calibrate as calibrate_offset, compute_adjusted_level};
use tracing::debug;

/// Record an SLM reading taken while the calibration signal played
///
/// Uses the store's `cal_level_db` as the level the signal was played at and
/// writes reading and offset back.
///
/// # Errors
/// `Config` if the reading is not a finite number
pub fn calibrate(params: &mut SessionParams, slm_reading_db: f64) -> Result<CalibrationState> {
    if !slm_reading_db.is_finite() {
        return Err(CalError::config(format!(
            "SLM reading must be a finite number, got {}",
            slm_reading_db
        )));
    }

    let state = calibrate_offset(params.cal_level_db, slm_reading_db);
    params.apply_calibration(&state);
    Ok(state)
}

/// Derive the playback gain for the store's desired level
///
/// Writes `adjusted_level_db` back and returns it.
///
/// # Errors
/// `Config` if no calibration offset is stored
pub fn prepare_level(params: &mut SessionParams) -> Result<f64> {
    let offset = params.require_offset()?;
    let adjusted = compute_adjusted_level(params.desired_level_db, offset);
    params.adjusted_level_db = Some(adjusted);

    debug!(
        "Desired {:.2} dB SPL with offset {:+.2} dB -> {:.2} dB FS",
        params.desired_level_db, offset, adjusted
    );
    Ok(adjusted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cal_core::ErrorKind;

    #[test]
    fn calibrate_writes_reading_and_offset() {
        let mut params = SessionParams {
            cal_level_db: 70.0,
            ..SessionParams::default()
        };

        let state = calibrate(&mut params, 68.0).unwrap();
        assert_eq!(state.slm_offset_db, 2.0);
        assert_eq!(params.slm_reading_db, Some(68.0));
        assert_eq!(params.slm_offset_db, Some(2.0));
    }

    #[test]
    fn calibrate_rejects_nan_reading() {
        let mut params = SessionParams::default();
        let err = calibrate(&mut params, f64::NAN).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(params.slm_offset_db, None);
    }

    #[test]
    fn prepare_level_needs_an_offset() {
        let mut params = SessionParams::default();
        assert!(prepare_level(&mut params).is_err());
        assert_eq!(params.adjusted_level_db, None);
    }

    #[test]
    fn prepare_level_adds_the_offset() {
        let mut params = SessionParams {
            slm_offset_db: Some(2.0),
            desired_level_db: 65.0,
            ..SessionParams::default()
        };

        assert_eq!(prepare_level(&mut params).unwrap(), 67.0);
        assert_eq!(params.adjusted_level_db, Some(67.0));
    }
}

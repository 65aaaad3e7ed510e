//! Offset between requested and measured acoustic output

use cal_core::CalibrationState;
use tracing::{debug, info};

/// Offset (dB) between the calibration level and what the meter measured
///
/// Any finite inputs are accepted: meters on relative scales read negative,
/// and odd microphone setups produce odd numbers. No rounding is applied.
pub fn compute_offset(cal_level_db: f64, slm_reading_db: f64) -> f64 {
    let offset = cal_level_db - slm_reading_db;
    debug!(cal_level_db, slm_reading_db, offset, "Computed SLM offset");
    offset
}

/// Run the offset calculation and package the result for the caller's store
pub fn calibrate(cal_level_db: f64, slm_reading_db: f64) -> CalibrationState {
    let slm_offset_db = compute_offset(cal_level_db, slm_reading_db);
    info!(
        "Calibration: {:.2} dB played, {:.2} dB measured, offset {:.2} dB",
        cal_level_db, slm_reading_db, slm_offset_db
    );

    CalibrationState {
        cal_level_db,
        slm_reading_db,
        slm_offset_db,
    }
}

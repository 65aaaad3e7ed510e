//! Level arithmetic for calibrated presentation
//!
//! This crate provides:
//! - Offset calculation from a sound level meter reading
//! - Conversion of a desired level (dB SPL) into a playback gain (dB FS)
//! - dB/linear conversion and in-place gain application
//! - Full-scale clipping detection
//!
//! # Signal Flow
//!
//! ```text
//! Calibration (once per session):
//! ┌───────────────┐     ┌───────────────┐     ┌──────────────────┐
//! │ cal_level_db  │ ──► │ compute_offset│ ──► │ slm_offset_db    │ ──► caller's store
//! │ slm_reading_db│     └───────────────┘     └──────────────────┘
//! └───────────────┘
//!
//! Every trial:
//! ┌───────────────┐     ┌────────────────────────┐     ┌────────────┐     ┌──────────────┐
//! │ desired (SPL) │ ──► │ compute_adjusted_level │ ──► │ apply_gain │ ──► │ clipping test│
//! └───────────────┘     └────────────────────────┘     └────────────┘     └──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use cal_level::{calibrate, compute_adjusted_level};
//!
//! let state = calibrate(70.0, 68.0);
//! assert_eq!(state.slm_offset_db, 2.0);
//!
//! let adjusted = compute_adjusted_level(65.0, state.slm_offset_db);
//! assert_eq!(adjusted, 67.0);
//! ```

#![forbid(unsafe_code)]

pub mod gain;
mod level;
mod offset;

pub use gain::{
    apply_gain, clipped_samples, clips_with_gain, db_to_linear, is_clipping, linear_to_db,
    peak_level,
};
pub use level::{compute_adjusted_level, LevelRequest};
pub use offset::{calibrate, compute_offset};

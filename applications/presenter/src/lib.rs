//! Calibrated Presenter - command-line front end
//!
//! Parameter-store handling and operator messages shared by the
//! `cal-presenter` binary.

pub mod config;
pub mod hints;

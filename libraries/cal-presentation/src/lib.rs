//! Calibrated Presenter - Presentation Orchestration
//!
//! Resolves presentation requests against an output sink:
//!
//! ```text
//! desired dB SPL ──► + offset ──► dB FS gain
//!                                    │
//! stimulus ──► load ──► routing ──► gain ──► clip check ──► device
//! ```
//!
//! # Architecture
//!
//! `cal-presentation` never touches hardware or storage:
//! - Output goes through the `AudioSink` trait (`CpalSink` on desktop,
//!   `RecordingSink` in tests)
//! - Session parameters are passed in by reference and written back, never
//!   kept
//!
//! # Example
//!
//! ```rust
//! use cal_audio::AudioDescriptor;
//! use cal_core::testing::RecordingSink;
//! use cal_presentation::Presenter;
//!
//! let mut presenter = Presenter::new(RecordingSink::with_devices(&[2]));
//! let tone = AudioDescriptor::buffer(vec![vec![0.0001]; 480], Some(48_000));
//!
//! // 65 dB SPL with a +2 dB offset plays at 67 dB FS gain
//! let report = presenter.present(&tone, 65.0, 2.0, 0, "1").unwrap();
//! assert_eq!(report.level_db, 67.0);
//!
//! presenter.stop().unwrap();
//! ```

#![forbid(unsafe_code)]

mod command;
mod presenter;
mod session;
mod state;

pub use command::{Command, CommandOutcome};
pub use presenter::{PresentationReport, Presenter};
pub use session::{calibrate, prepare_level};
pub use state::SessionState;

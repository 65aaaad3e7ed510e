//! Presentation session state machine
//!
//! ```text
//! Idle -> Loaded -> GainApplied -> Clipped
//!                              \-> Validated -> Playing -> Stopped
//! ```
//!
//! Every presentation starts a fresh session from `Idle`; `Clipped` ends a
//! session without playback.

use std::fmt;

/// Where the current presentation is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No asset loaded
    #[default]
    Idle,
    /// Asset decoded or built
    Loaded,
    /// Gain applied to the asset
    GainApplied,
    /// Gain-applied signal exceeded full scale; nothing was played
    Clipped,
    /// Routing and clipping checks passed
    Validated,
    /// Samples submitted to the device
    Playing,
    /// Playback halted or finished
    Stopped,
}

impl SessionState {
    /// Whether `next` may follow this state
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (_, Self::Idle)
                | (Self::Idle, Self::Loaded)
                | (Self::Loaded, Self::GainApplied)
                | (Self::GainApplied, Self::Clipped | Self::Validated)
                | (Self::Validated, Self::Playing)
                | (Self::Playing, Self::Stopped)
        )
    }

    /// Whether stop has anything to act on
    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loaded => "loaded",
            Self::GainApplied => "gain applied",
            Self::Clipped => "clipped",
            Self::Validated => "validated",
            Self::Playing => "playing",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::SessionState::*;

    #[test]
    fn happy_path_is_allowed() {
        let path = [Idle, Loaded, GainApplied, Validated, Playing, Stopped];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn clipping_branch_is_allowed() {
        assert!(GainApplied.can_transition_to(Clipped));
        assert!(!Clipped.can_transition_to(Validated));
        assert!(!Clipped.can_transition_to(Playing));
    }

    #[test]
    fn checks_cannot_be_skipped() {
        assert!(!Loaded.can_transition_to(Playing));
        assert!(!GainApplied.can_transition_to(Playing));
        assert!(!Idle.can_transition_to(Validated));
    }

    #[test]
    fn every_state_can_restart() {
        for state in [Loaded, GainApplied, Clipped, Validated, Playing, Stopped] {
            assert!(state.can_transition_to(Idle));
        }
    }
}

//! Per-item pause state machine.
//!
//! Two sources can hold an item: an explicit user toggle (click or API call)
//! and the pointer hovering over it. `PausePolicy` decides how they combine.

use serde::{Deserialize, Serialize};

use crate::config::PausePolicy;
use crate::motion::PlayState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseStatus {
    #[default]
    Playing,
    PausedByUser,
    PausedByHover,
    PausedByBoth,
}

impl PauseStatus {
    fn from_sources(by_user: bool, by_hover: bool) -> Self {
        match (by_user, by_hover) {
            (false, false) => PauseStatus::Playing,
            (true, false) => PauseStatus::PausedByUser,
            (false, true) => PauseStatus::PausedByHover,
            (true, true) => PauseStatus::PausedByBoth,
        }
    }

    pub fn by_user(self) -> bool {
        matches!(self, PauseStatus::PausedByUser | PauseStatus::PausedByBoth)
    }

    pub fn by_hover(self) -> bool {
        matches!(self, PauseStatus::PausedByHover | PauseStatus::PausedByBoth)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseEvent {
    Click,
    HoverEnter,
    HoverLeave,
    /// `pause(Some(id))`
    Pause,
    /// `resume(Some(id))`
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PauseState {
    status: PauseStatus,
    play: PlayState,
}

impl PauseState {
    pub fn status(&self) -> PauseStatus {
        self.status
    }

    /// Play state this item asks its motion engine for
    pub fn play_state(&self) -> PlayState {
        self.play
    }

    pub fn paused_by_user(&self) -> bool {
        self.status.by_user()
    }

    pub fn paused_by_hover(&self) -> bool {
        self.status.by_hover()
    }

    /// Apply one toggle event. Returns true if the play state changed.
    pub fn apply(&mut self, event: PauseEvent, policy: PausePolicy) -> bool {
        let before = self.play;
        let mut by_user = self.status.by_user();
        let mut by_hover = self.status.by_hover();

        // Under LastToggleWins each event names the play state it leaves behind
        let direct = match event {
            PauseEvent::Click => {
                if self.play == PlayState::Paused && by_user {
                    by_user = false;
                    PlayState::Running
                } else {
                    by_user = true;
                    PlayState::Paused
                }
            }
            PauseEvent::HoverEnter => {
                by_hover = true;
                PlayState::Paused
            }
            PauseEvent::HoverLeave => {
                by_hover = false;
                PlayState::Running
            }
            PauseEvent::Pause => {
                by_user = true;
                PlayState::Paused
            }
            PauseEvent::Resume => {
                by_user = false;
                by_hover = false;
                PlayState::Running
            }
        };

        self.status = PauseStatus::from_sources(by_user, by_hover);
        self.play = match policy {
            PausePolicy::RequireAllClear => {
                if self.status == PauseStatus::Playing {
                    PlayState::Running
                } else {
                    PlayState::Paused
                }
            }
            PausePolicy::LastToggleWins => direct,
        };

        self.play != before
    }

    /// Force the observable play state to running without touching the sources.
    /// Used by a global resume under `LastToggleWins`.
    pub(crate) fn force_running(&mut self) {
        self.play = PlayState::Running;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRICT: PausePolicy = PausePolicy::RequireAllClear;
    const LAST: PausePolicy = PausePolicy::LastToggleWins;

    #[test]
    fn test_click_toggles() {
        let mut state = PauseState::default();
        assert!(state.apply(PauseEvent::Click, STRICT));
        assert_eq!(state.status(), PauseStatus::PausedByUser);
        assert_eq!(state.play_state(), PlayState::Paused);

        assert!(state.apply(PauseEvent::Click, STRICT));
        assert_eq!(state.status(), PauseStatus::Playing);
        assert_eq!(state.play_state(), PlayState::Running);
    }

    #[test]
    fn test_hover_out_keeps_click_pause_when_strict() {
        let mut state = PauseState::default();
        state.apply(PauseEvent::HoverEnter, STRICT);
        state.apply(PauseEvent::Click, STRICT);
        assert_eq!(state.status(), PauseStatus::PausedByBoth);

        state.apply(PauseEvent::HoverLeave, STRICT);
        assert_eq!(state.status(), PauseStatus::PausedByUser);
        assert_eq!(state.play_state(), PlayState::Paused);
    }

    #[test]
    fn test_hover_out_overrides_click_pause_when_last_toggle_wins() {
        let mut state = PauseState::default();
        state.apply(PauseEvent::HoverEnter, LAST);
        state.apply(PauseEvent::Click, LAST);
        assert_eq!(state.status(), PauseStatus::PausedByBoth);

        state.apply(PauseEvent::HoverLeave, LAST);
        assert_eq!(state.play_state(), PlayState::Running);
        assert!(state.paused_by_user());

        // user flag still set but motion is running, so the next click pauses
        state.apply(PauseEvent::Click, LAST);
        assert_eq!(state.play_state(), PlayState::Paused);
    }

    #[test]
    fn test_click_while_both_releases_user_only() {
        let mut state = PauseState::default();
        state.apply(PauseEvent::Click, STRICT);
        state.apply(PauseEvent::HoverEnter, STRICT);
        state.apply(PauseEvent::Click, STRICT);
        assert_eq!(state.status(), PauseStatus::PausedByHover);
        assert_eq!(state.play_state(), PlayState::Paused);

        let mut state = PauseState::default();
        state.apply(PauseEvent::Click, LAST);
        state.apply(PauseEvent::HoverEnter, LAST);
        state.apply(PauseEvent::Click, LAST);
        assert_eq!(state.status(), PauseStatus::PausedByHover);
        assert_eq!(state.play_state(), PlayState::Running);
    }

    #[test]
    fn test_resume_is_idempotent() {
        for policy in [STRICT, LAST] {
            let mut state = PauseState::default();
            assert!(!state.apply(PauseEvent::Resume, policy));
            assert_eq!(state, PauseState::default());
        }
    }

    #[test]
    fn test_explicit_pause_then_resume_clears_both() {
        let mut state = PauseState::default();
        state.apply(PauseEvent::HoverEnter, STRICT);
        state.apply(PauseEvent::Pause, STRICT);
        assert_eq!(state.status(), PauseStatus::PausedByBoth);
        state.apply(PauseEvent::Resume, STRICT);
        assert_eq!(state.status(), PauseStatus::Playing);
        assert_eq!(state.play_state(), PlayState::Running);
    }
}

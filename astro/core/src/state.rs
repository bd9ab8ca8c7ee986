//! Shared agent state.
//!
//! Written by the movement executor (position, visibility, phase) and by the
//! idle timers (typing, boredom); read lock-free or under short
//! `parking_lot` sections by the gaze loop, the blink scheduler and the
//! bridge. No lock here is ever held across an `.await`.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::geometry::{Position, Viewport};

/// Where a movement task currently is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovementPhase {
    /// No movement in flight
    #[default]
    Idle,
    /// Shrink animation playing
    Shrinking,
    /// Primary hidden, trail indicators shown
    Revealing,
    /// Indicators moving along the trajectory
    Traveling,
    /// Position committed, primary visual shown again
    Arrived,
    /// Gaze reset and end-state trigger
    Restoring,
}

impl MovementPhase {
    /// Whether a movement task is in flight
    #[must_use]
    pub fn is_moving(self) -> bool {
        self != Self::Idle
    }
}

impl std::fmt::Display for MovementPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Shrinking => "shrinking",
            Self::Revealing => "revealing",
            Self::Traveling => "traveling",
            Self::Arrived => "arrived",
            Self::Restoring => "restoring",
        };
        f.write_str(label)
    }
}

/// State shared between the executor, timers and loops
#[derive(Debug)]
pub struct AgentState {
    position: RwLock<Position>,
    viewport: RwLock<Viewport>,
    phase: RwLock<MovementPhase>,
    primary_visible: AtomicBool,
    typing: AtomicBool,
    bored: AtomicBool,
}

impl AgentState {
    /// Create state anchored at `position`
    #[must_use]
    pub fn new(position: Position, viewport: Viewport) -> Self {
        Self {
            position: RwLock::new(position),
            viewport: RwLock::new(viewport),
            phase: RwLock::new(MovementPhase::Idle),
            primary_visible: AtomicBool::new(true),
            typing: AtomicBool::new(false),
            bored: AtomicBool::new(false),
        }
    }

    /// Current anchor
    #[must_use]
    pub fn position(&self) -> Position {
        *self.position.read()
    }

    pub(crate) fn set_position(&self, position: Position) {
        *self.position.write() = position;
    }

    /// Current viewport
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        *self.viewport.read()
    }

    pub(crate) fn set_viewport(&self, viewport: Viewport) {
        *self.viewport.write() = viewport;
    }

    /// Current movement phase
    #[must_use]
    pub fn phase(&self) -> MovementPhase {
        *self.phase.read()
    }

    pub(crate) fn set_phase(&self, phase: MovementPhase) {
        *self.phase.write() = phase;
    }

    /// Whether the primary visual is shown
    #[must_use]
    pub fn primary_visible(&self) -> bool {
        self.primary_visible.load(Ordering::SeqCst)
    }

    pub(crate) fn set_primary_visible(&self, visible: bool) {
        self.primary_visible.store(visible, Ordering::SeqCst);
    }

    /// Whether the user is typing
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.typing.load(Ordering::SeqCst)
    }

    pub(crate) fn set_typing(&self, typing: bool) {
        self.typing.store(typing, Ordering::SeqCst);
    }

    /// Whether boredom is active
    #[must_use]
    pub fn is_bored(&self) -> bool {
        self.bored.load(Ordering::SeqCst)
    }

    /// Set boredom, returning the previous value
    pub(crate) fn swap_bored(&self, bored: bool) -> bool {
        self.bored.swap(bored, Ordering::SeqCst)
    }
}

impl Default for AgentState {
    fn default() -> Self {
        Self::new(Position::default(), Viewport::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_predicates() {
        assert!(!MovementPhase::Idle.is_moving());
        assert!(MovementPhase::Shrinking.is_moving());
        assert_eq!(MovementPhase::Revealing.to_string(), "revealing");
    }

    #[test]
    fn test_state_defaults() {
        let state = AgentState::default();
        assert_eq!(state.phase(), MovementPhase::Idle);
        assert!(state.primary_visible());
        assert!(!state.is_typing());
        assert!(!state.swap_bored(true));
        assert!(state.is_bored());
    }
}

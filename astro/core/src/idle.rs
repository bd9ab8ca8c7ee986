//! Idle timers
//!
//! [`BoredomTimer`] flips the agent into boredom after a stretch without user
//! interaction; [`TypingTimer`] keeps the typing flag raised until the user
//! pauses. Both own their tokio task and abort it on stop and on drop.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::character::{CharacterLink, BOREDOM_INPUT};
use crate::gaze::GazeTracker;
use crate::state::AgentState;

#[derive(Debug)]
struct BoredomCore {
    agent: Arc<AgentState>,
    gaze: GazeTracker,
    character: CharacterLink,
}

impl BoredomCore {
    fn activate(&self) -> bool {
        if self.agent.swap_bored(true) {
            return false;
        }
        tracing::debug!("Boredom on");
        self.gaze.set_boredom(true);
        self.character.set_boolean(BOREDOM_INPUT, true);
        true
    }

    fn deactivate(&self) -> bool {
        if !self.agent.swap_bored(false) {
            return false;
        }
        tracing::debug!("Boredom off");
        self.gaze.set_boredom(false);
        self.character.set_boolean(BOREDOM_INPUT, false);
        true
    }
}

/// Inactivity countdown that drives the boredom state
#[derive(Debug)]
pub struct BoredomTimer {
    timeout: Duration,
    core: Arc<BoredomCore>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl BoredomTimer {
    /// Create a disarmed timer
    #[must_use]
    pub fn new(
        timeout: Duration,
        agent: Arc<AgentState>,
        gaze: GazeTracker,
        character: CharacterLink,
    ) -> Self {
        Self {
            timeout,
            core: Arc::new(BoredomCore {
                agent,
                gaze,
                character,
            }),
            handle: Mutex::new(None),
        }
    }

    /// Restart the countdown
    ///
    /// When it elapses boredom is switched on, unless the user is typing at
    /// that moment; the typing timer re-arms the countdown once typing ends.
    pub fn arm(&self) {
        let core = Arc::clone(&self.core);
        let timeout = self.timeout;
        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if core.agent.is_typing() {
                tracing::trace!("Boredom deferred while typing");
                return;
            }
            core.activate();
        });
        if let Some(previous) = self.handle.lock().replace(task) {
            previous.abort();
        }
    }

    /// User interaction: leave boredom and restart the countdown
    pub fn reset(&self) {
        self.core.deactivate();
        self.arm();
    }

    /// Enter boredom now; returns whether the state changed
    pub fn activate(&self) -> bool {
        self.disarm();
        self.core.activate()
    }

    /// Flip the boredom state, returning the new value
    pub fn toggle(&self) -> bool {
        if self.core.agent.is_bored() {
            self.reset();
            false
        } else {
            self.activate();
            true
        }
    }

    fn disarm(&self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
    }

    /// Stop the countdown
    pub fn stop(&self) {
        self.disarm();
    }

    /// Whether a countdown is pending
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for BoredomTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// Trailing timer that clears the typing flag after a pause
#[derive(Debug)]
pub struct TypingTimer {
    timeout: Duration,
    agent: Arc<AgentState>,
    boredom: Arc<BoredomTimer>,
    last_activity: Mutex<Option<Instant>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TypingTimer {
    /// Create an idle timer
    #[must_use]
    pub fn new(timeout: Duration, agent: Arc<AgentState>, boredom: Arc<BoredomTimer>) -> Self {
        Self {
            timeout,
            agent,
            boredom,
            last_activity: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    /// Record a keystroke; typing stays on until `timeout` passes without one
    pub fn touch(&self) {
        self.agent.set_typing(true);
        *self.last_activity.lock() = Some(Instant::now());

        let agent = Arc::clone(&self.agent);
        let boredom = Arc::clone(&self.boredom);
        let timeout = self.timeout;
        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            agent.set_typing(false);
            tracing::trace!("Typing ended");
            boredom.arm();
        });
        if let Some(previous) = self.handle.lock().replace(task) {
            previous.abort();
        }
    }

    /// When the last keystroke was recorded
    #[must_use]
    pub fn last_activity(&self) -> Option<Instant> {
        *self.last_activity.lock()
    }

    /// Stop the trailing timer without clearing the flag
    pub fn stop(&self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for TypingTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

//! Gaze tracking
//!
//! Keeps a smoothed 2-D look direction in normalized 0-100 space. The
//! `target` is driven by the most recent of three channels (pointer, typing
//! caret, boredom fallback); `current` chases it by a fixed fraction each
//! tick and never overshoots.
//!
//! Pointer and caret targets land after a short latency, debounced so only
//! the last request inside the window applies. Boredom and explicit resets
//! take effect immediately and discard whatever is still in flight.
//!
//! [`GazeLoop`] runs the tick on a fixed interval and forwards changed values
//! to the character's `xAxis`/`yAxis` inputs.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::character::CharacterLink;
use crate::config::GazeConfig;
use crate::geometry::{GazePoint, Position, GAZE_CENTER};
use crate::state::AgentState;

#[derive(Debug, Default)]
struct GazeState {
    current: GazePoint,
    target: GazePoint,
    /// Bumped whenever a delayed target must be discarded
    generation: u64,
}

#[derive(Debug)]
struct GazeInner {
    config: GazeConfig,
    agent: Arc<AgentState>,
    gaze: Mutex<GazeState>,
}

/// Smoothed gaze target/current pair
///
/// Cheap to clone; clones share the same state.
#[derive(Clone, Debug)]
pub struct GazeTracker {
    inner: Arc<GazeInner>,
}

impl GazeTracker {
    /// Create a tracker looking straight ahead
    #[must_use]
    pub fn new(config: GazeConfig, agent: Arc<AgentState>) -> Self {
        Self {
            inner: Arc::new(GazeInner {
                config,
                agent,
                gaze: Mutex::new(GazeState::default()),
            }),
        }
    }

    /// Rendered look direction
    #[must_use]
    pub fn current(&self) -> GazePoint {
        self.inner.gaze.lock().current
    }

    /// Desired look direction
    #[must_use]
    pub fn target(&self) -> GazePoint {
        self.inner.gaze.lock().target
    }

    /// Advance `current` one step toward `target`
    ///
    /// Each axis moves by `smoothing` of its remaining distance, and only
    /// while that distance exceeds `epsilon`. Returns the new value if it
    /// changed.
    pub fn tick(&self) -> Option<GazePoint> {
        let smoothing = self.inner.config.smoothing;
        let epsilon = self.inner.config.epsilon;
        let mut gaze = self.inner.gaze.lock();
        let target = gaze.target;

        let step = |current: f64, target: f64| {
            let remaining = target - current;
            if remaining.abs() > epsilon {
                current + remaining * smoothing
            } else {
                current
            }
        };
        let next = GazePoint {
            x: step(gaze.current.x, target.x),
            y: step(gaze.current.y, target.y),
        };

        if next == gaze.current {
            return None;
        }
        gaze.current = next;
        Some(next)
    }

    /// Convert a screen point into a gaze target relative to the agent
    ///
    /// A point `look_range` pixels to the right of the agent maps to 100,
    /// the same distance to the left maps to 0.
    #[must_use]
    pub fn target_from_point(&self, point: Position) -> GazePoint {
        let origin = self.inner.agent.position();
        let range = self.inner.config.look_range;
        GazePoint::new(
            GAZE_CENTER + (point.x - origin.x) / range * GAZE_CENTER,
            GAZE_CENTER + (point.y - origin.y) / range * GAZE_CENTER,
        )
    }

    /// Look toward the pointer after the input latency
    ///
    /// Ignored while the user is typing.
    pub fn pointer_moved(&self, point: Position) {
        if self.inner.agent.is_typing() {
            tracing::trace!(%point, "Pointer gaze suppressed while typing");
            return;
        }
        self.schedule(self.target_from_point(point));
    }

    /// Look toward the typing caret after the input latency
    pub fn caret_moved(&self, caret: Position) {
        self.schedule(self.target_from_point(caret));
    }

    fn schedule(&self, target: GazePoint) {
        let generation = {
            let mut gaze = self.inner.gaze.lock();
            gaze.generation += 1;
            gaze.generation
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.config.input_delay).await;
            if inner.agent.is_bored() {
                return;
            }
            let mut gaze = inner.gaze.lock();
            if gaze.generation == generation {
                gaze.target = target;
            }
        });
    }

    /// Set the target immediately, discarding delayed targets
    pub fn set_target(&self, target: GazePoint) {
        let mut gaze = self.inner.gaze.lock();
        gaze.generation += 1;
        gaze.target = target;
    }

    /// Recenter the target
    pub fn look_straight_ahead(&self) {
        self.set_target(GazePoint::center());
    }

    /// Switch between the boredom target and center
    pub fn set_boredom(&self, bored: bool) {
        if bored {
            self.set_target(self.inner.config.boredom_target);
        } else {
            self.look_straight_ahead();
        }
    }
}

/// Owned interval driving [`GazeTracker::tick`]
///
/// Aborted on [`GazeLoop::stop`] and on drop.
#[derive(Debug, Default)]
pub struct GazeLoop {
    handle: Option<JoinHandle<()>>,
}

impl GazeLoop {
    /// Create a stopped loop
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking every `frame_interval`; restarts if already running
    pub fn start(&mut self, tracker: GazeTracker, character: CharacterLink, frame_interval: Duration) {
        self.stop();
        tracing::debug!(
            frame_ms = frame_interval.as_millis() as u64,
            "Gaze loop started"
        );
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(frame_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if let Some(gaze) = tracker.tick() {
                    tracing::trace!(x = gaze.x, y = gaze.y, "Gaze tick");
                    character.set_gaze(gaze);
                }
            }
        }));
    }

    /// Stop ticking
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Gaze loop stopped");
        }
    }

    /// Whether the loop is running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for GazeLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

//! Movement Executor
//!
//! Runs one [`MovementTask`] through its phases:
//!
//! ```text
//! Idle -> Shrinking -> Revealing -> Traveling -> Arrived -> Restoring -> Idle
//! ```
//!
//! The shrink phase is skippable. While revealing and traveling the primary
//! visual is hidden and the trail indicators replay the planned trajectory;
//! on arrival the position is committed exactly and the primary visual comes
//! back. Restoring recenters the gaze and requests the task's end state.
//!
//! # Cancellation
//!
//! The task's [`CancelToken`](crate::queue::CancelToken) is checked after
//! every wait. A cancelled task skips straight to arrival: indicators are
//! hidden, the position is set to the target, the primary visual is shown,
//! and the end-state trigger is replaced by `Idle`. A task cancelled while
//! still waiting for the character leaves everything untouched.
//!
//! A task carrying a start position is placed there instantly just before
//! it animates. Because tasks run one at a time, the placement always lands
//! after any cancelled predecessor has committed its own target.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::animation::EasingFunction;
use crate::character::{CharacterLink, EndState, Trigger};
use crate::config::{AstroConfig, MovementConfig};
use crate::error::{EngineError, EngineResult};
use crate::gaze::GazeTracker;
use crate::geometry::Position;
use crate::path::PathPlanner;
use crate::queue::{CancelToken, MovementTask, TaskRunner};
use crate::render::{IndicatorMotion, PrimaryVisual, RenderSurface};
use crate::state::{AgentState, MovementPhase};

/// Restores a presentable state if a task unwinds mid-flight
struct PhaseGuard {
    agent: Arc<AgentState>,
    surface: Arc<dyn RenderSurface>,
    armed: bool,
}

impl PhaseGuard {
    fn new(agent: Arc<AgentState>, surface: Arc<dyn RenderSurface>) -> Self {
        Self {
            agent,
            surface,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!(
            phase = %self.agent.phase(),
            "Movement aborted, restoring primary visual"
        );
        self.surface.hide_indicators();
        self.agent.set_primary_visible(true);
        self.surface.set_primary(PrimaryVisual {
            position: self.agent.position(),
            visible: true,
        });
        self.agent.set_phase(MovementPhase::Idle);
    }
}

/// Drives movement tasks against the render surface and character
pub struct MovementExecutor {
    timing: MovementConfig,
    easing: EasingFunction,
    planner: PathPlanner,
    agent: Arc<AgentState>,
    gaze: GazeTracker,
    character: CharacterLink,
    surface: Arc<dyn RenderSurface>,
}

impl std::fmt::Debug for MovementExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovementExecutor")
            .field("timing", &self.timing)
            .field("easing", &self.easing)
            .field("phase", &self.agent.phase())
            .finish_non_exhaustive()
    }
}

impl MovementExecutor {
    /// Create an executor
    #[must_use]
    pub fn new(
        config: &AstroConfig,
        agent: Arc<AgentState>,
        gaze: GazeTracker,
        character: CharacterLink,
        surface: Arc<dyn RenderSurface>,
    ) -> Self {
        Self {
            timing: config.movement.clone(),
            easing: config.curve.easing,
            planner: PathPlanner::from_config(config),
            agent,
            gaze,
            character,
            surface,
        }
    }

    /// Shared agent state
    #[must_use]
    pub fn agent(&self) -> &Arc<AgentState> {
        &self.agent
    }

    /// Move the primary visual instantly, without animation
    fn place_at(&self, position: Position) {
        tracing::debug!(%position, "Placing agent");
        self.agent.set_position(position);
        self.agent.set_primary_visible(true);
        self.surface.set_primary(PrimaryVisual {
            position,
            visible: true,
        });
    }

    fn enter(&self, task: &MovementTask, phase: MovementPhase) {
        tracing::debug!(task_id = %task.id, %phase, "Movement phase");
        self.agent.set_phase(phase);
    }

    /// Wait, then report whether the task was cancelled meanwhile
    async fn pause(&self, duration: Duration, token: &CancelToken) -> bool {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
        token.is_cancelled()
    }

    /// Run a task to completion or cancellation
    pub async fn execute(&self, task: MovementTask) -> EngineResult<()> {
        let target = task.target;
        for point in std::iter::once(target).chain(task.start) {
            if !(point.x.is_finite() && point.y.is_finite()) {
                return Err(EngineError::InvalidTarget {
                    x: point.x,
                    y: point.y,
                });
            }
        }

        self.character
            .wait_ready(self.timing.ready_timeout, self.timing.ready_poll_interval)
            .await;
        if task.is_cancelled() {
            tracing::debug!(task_id = %task.id, "Movement cancelled before start");
            return Ok(());
        }

        if let Some(start) = task.start {
            self.place_at(start);
        }

        let guard = PhaseGuard::new(Arc::clone(&self.agent), Arc::clone(&self.surface));
        let start = self.agent.position();
        let trajectory = Arc::new(self.planner.build_trajectory(start, target));
        tracing::debug!(
            task_id = %task.id,
            from = %start,
            to = %target,
            sway = trajectory.sway,
            indicators = trajectory.indicator_count(),
            "Movement started"
        );

        let mut cancelled = false;

        if !task.skip_shrink {
            self.enter(&task, MovementPhase::Shrinking);
            self.character.fire(Trigger::Shrink);
            cancelled = self.pause(self.timing.shrink_duration, &task.token).await;
        }

        if !cancelled {
            self.enter(&task, MovementPhase::Revealing);
            self.agent.set_primary_visible(false);
            self.surface.set_primary(PrimaryVisual {
                position: start,
                visible: false,
            });
            self.surface.reveal_indicators(start, &trajectory.styles);
            self.surface.start_lead_fade(self.planner.lead_fade());
            cancelled = self.pause(self.timing.pre_travel_delay, &task.token).await;
        }

        if !cancelled {
            self.enter(&task, MovementPhase::Traveling);
            for (style, delay) in trajectory.styles.iter().zip(&trajectory.delays) {
                self.surface.start_motion(IndicatorMotion {
                    style: *style,
                    trajectory: Arc::clone(&trajectory),
                    start_delay: *delay,
                    duration: self.timing.travel_duration,
                    easing: self.easing,
                });
            }
            // Trailing indicators finish later; only the lead is awaited
            cancelled = self.pause(self.timing.travel_duration, &task.token).await;
        }

        self.enter(&task, MovementPhase::Arrived);
        self.surface.hide_indicators();
        self.agent.set_position(target);
        self.agent.set_primary_visible(true);
        self.surface.set_primary(PrimaryVisual {
            position: target,
            visible: true,
        });
        self.surface.next_frame().await;

        self.enter(&task, MovementPhase::Restoring);
        self.gaze.look_straight_ahead();
        let end_state = if cancelled || task.is_cancelled() {
            tracing::debug!(task_id = %task.id, "Movement cancelled, finalized at target");
            EndState::Idle
        } else {
            task.end_state
        };
        self.character.fire(end_state.trigger());

        if !cancelled {
            self.pause(self.timing.return_duration, &task.token).await;
        }

        self.agent.set_phase(MovementPhase::Idle);
        guard.disarm();
        tracing::debug!(task_id = %task.id, end_state = ?end_state, "Movement complete");
        Ok(())
    }
}

#[async_trait]
impl TaskRunner for MovementExecutor {
    async fn run(&self, task: MovementTask) -> EngineResult<()> {
        self.execute(task).await
    }
}

//! Lifecycle Bridge
//!
//! The engine's public surface. The host application reports what happened
//! (chat opened, message sent, user typing, pointer moved) and the bridge
//! turns it into queued movements, gaze targets and character triggers.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use astro_core::{AstroConfig, CharacterLink, LifecycleBridge, NullSurface};
//!
//! # async fn demo() -> astro_core::EngineResult<()> {
//! let bridge = LifecycleBridge::new(
//!     AstroConfig::default(),
//!     Arc::new(NullSurface::default()),
//!     CharacterLink::new(),
//! );
//! bridge.start();
//! bridge.on_chat_open();
//! bridge.on_user_sends_message(320.0, 700.0)?;
//! bridge.wait_idle().await;
//! bridge.shutdown();
//! # Ok(())
//! # }
//! ```
//!
//! Every method that schedules work must be called from within a tokio
//! runtime.
//!
//! All character calls are best-effort: a missing or unready character is
//! logged and skipped, and movement proceeds without accompaniment.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::blink::BlinkScheduler;
use crate::character::{CharacterLink, CharacterStateMachine, EndState, Trigger};
use crate::config::AstroConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::LifecycleEvent;
use crate::executor::MovementExecutor;
use crate::gaze::{GazeLoop, GazeTracker};
use crate::geometry::{GazePoint, Position, Viewport};
use crate::idle::{BoredomTimer, TypingTimer};
use crate::queue::{AnimationQueue, EnqueueOptions, MovementTask};
use crate::render::RenderSurface;
use crate::state::{AgentState, MovementPhase};

fn checked(operation: &'static str, x: f64, y: f64) -> EngineResult<Position> {
    Position::checked(x, y).inspect_err(|e| {
        tracing::warn!(operation, error = %e, "Request skipped");
    })
}

/// Point-in-time view of the engine for diagnostics
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Committed anchor
    pub position: Position,
    /// Current movement phase
    pub phase: MovementPhase,
    /// Whether the primary visual is shown
    pub primary_visible: bool,
    /// Rendered gaze
    pub gaze: GazePoint,
    /// Desired gaze
    pub gaze_target: GazePoint,
    /// Typing flag
    pub typing: bool,
    /// Boredom flag
    pub bored: bool,
    /// Last character state requested
    pub character_state: Option<String>,
    /// Whether a movement is executing
    pub animating: bool,
    /// Movements waiting to run
    pub pending: usize,
}

/// Host-facing engine entry point
pub struct LifecycleBridge {
    config: AstroConfig,
    agent: Arc<AgentState>,
    character: CharacterLink,
    gaze: GazeTracker,
    queue: AnimationQueue,
    boredom: Arc<BoredomTimer>,
    typing: TypingTimer,
    gaze_loop: Mutex<GazeLoop>,
    blink: Mutex<BlinkScheduler>,
    first_focus_seen: AtomicBool,
}

impl std::fmt::Debug for LifecycleBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleBridge")
            .field("agent", &self.agent)
            .field("queue", &self.queue)
            .field("character", &self.character)
            .finish_non_exhaustive()
    }
}

impl LifecycleBridge {
    /// Wire up the engine
    ///
    /// The agent starts at the off-screen anchor. Timers and loops stay idle
    /// until [`start`](Self::start).
    #[must_use]
    pub fn new(config: AstroConfig, surface: Arc<dyn RenderSurface>, character: CharacterLink) -> Self {
        let viewport = config.viewport;
        let start = Position::new(viewport.center_x(), config.anchors.offscreen_y);
        let agent = Arc::new(AgentState::new(start, viewport));
        let gaze = GazeTracker::new(config.gaze.clone(), Arc::clone(&agent));
        let executor = Arc::new(MovementExecutor::new(
            &config,
            Arc::clone(&agent),
            gaze.clone(),
            character.clone(),
            surface,
        ));
        let queue = AnimationQueue::new(executor);
        let boredom = Arc::new(BoredomTimer::new(
            config.idle.boredom_timeout,
            Arc::clone(&agent),
            gaze.clone(),
            character.clone(),
        ));
        let typing = TypingTimer::new(
            config.idle.typing_timeout,
            Arc::clone(&agent),
            Arc::clone(&boredom),
        );
        let blink = BlinkScheduler::new(config.blink.clone());

        Self {
            config,
            agent,
            character,
            gaze,
            queue,
            boredom,
            typing,
            gaze_loop: Mutex::new(GazeLoop::new()),
            blink: Mutex::new(blink),
            first_focus_seen: AtomicBool::new(false),
        }
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &AstroConfig {
        &self.config
    }

    /// Shared agent state
    #[must_use]
    pub fn agent(&self) -> &Arc<AgentState> {
        &self.agent
    }

    /// Gaze tracker
    #[must_use]
    pub fn gaze(&self) -> &GazeTracker {
        &self.gaze
    }

    /// Start the gaze loop, blink scheduler and boredom countdown
    pub fn start(&self) {
        self.gaze_loop.lock().start(
            self.gaze.clone(),
            self.character.clone(),
            self.config.movement.frame_interval,
        );
        self.blink
            .lock()
            .start(Arc::clone(&self.agent), self.character.clone());
        self.boredom.arm();
        tracing::info!(position = %self.agent.position(), "Astro started");
    }

    /// Stop all timers and cancel movement
    pub fn shutdown(&self) {
        self.queue.cancel_all();
        self.gaze_loop.lock().stop();
        self.blink.lock().stop();
        self.boredom.stop();
        self.typing.stop();
        tracing::info!("Astro stopped");
    }

    /// Attach (or replace) the character once it has loaded
    pub fn attach_character(&self, machine: Arc<dyn CharacterStateMachine>) {
        self.character.attach(machine);
    }

    // ============================================
    // Anchors
    // ============================================

    /// Where the agent waits before the chat opens
    #[must_use]
    pub fn offscreen_anchor(&self) -> Position {
        let viewport = self.agent.viewport();
        Position::new(viewport.center_x(), self.config.anchors.offscreen_y)
    }

    /// Resting point at the top middle of the viewport
    #[must_use]
    pub fn top_anchor(&self) -> Position {
        let viewport = self.agent.viewport();
        Position::new(viewport.center_x(), self.config.anchors.top_y)
    }

    /// Point above `at`, kept inside the viewport
    #[must_use]
    pub fn above_anchor(&self, at: Position) -> Position {
        let anchors = &self.config.anchors;
        self.agent
            .viewport()
            .clamp(at.offset(0.0, -anchors.above_offset), anchors.edge_margin)
    }

    /// Point beside `at`, kept inside the viewport
    #[must_use]
    pub fn near_anchor(&self, at: Position) -> Position {
        let anchors = &self.config.anchors;
        self.agent.viewport().clamp(
            at.offset(anchors.near_offset_x, anchors.near_offset_y),
            anchors.edge_margin,
        )
    }

    fn debounced(&self) -> EnqueueOptions {
        EnqueueOptions::debounced(self.config.movement.debounce)
    }

    // ============================================
    // Chat lifecycle
    // ============================================

    /// Chat panel opened: drop in from off-screen to the top anchor
    pub fn on_chat_open(&self) {
        tracing::debug!("Chat opened");
        self.queue.cancel_all();
        self.boredom.reset();
        self.queue.enqueue(
            MovementTask::new(self.top_anchor())
                .with_start(self.offscreen_anchor())
                .with_end_state(EndState::Idle),
            EnqueueOptions::immediate(),
        );
    }

    /// First input focus: hop above the field; later calls do nothing
    pub fn on_first_input_focus(&self, x: f64, y: f64) -> EngineResult<()> {
        let point = checked("first_input_focus", x, y)?;
        if self.first_focus_seen.swap(true, Ordering::SeqCst) {
            tracing::trace!("First input focus already handled");
            return Ok(());
        }
        self.boredom.reset();
        self.queue.enqueue(
            MovementTask::new(self.above_anchor(point)).with_end_state(EndState::Idle),
            self.debounced(),
        );
        Ok(())
    }

    /// User sent a message: move beside it and show the small loader
    pub fn on_user_sends_message(&self, x: f64, y: f64) -> EngineResult<()> {
        let point = checked("user_sends_message", x, y)?;
        self.boredom.reset();
        self.queue.enqueue(
            MovementTask::new(self.near_anchor(point)).with_end_state(EndState::SmallLoader),
            self.debounced(),
        );
        Ok(())
    }

    /// AI response ready
    pub fn on_ai_message_ready(&self) -> bool {
        self.character.fire(Trigger::Pulse)
    }

    /// AI response rendered: after the settle delay, glide above it
    pub fn on_ai_message_shown(&self, x: f64, y: f64) -> EngineResult<()> {
        let point = checked("ai_message_shown", x, y)?;
        self.queue.enqueue_after(
            self.config.movement.settle_delay,
            MovementTask::new(self.above_anchor(point))
                .with_skip_shrink(true)
                .with_end_state(EndState::Idle),
            self.debounced(),
        );
        Ok(())
    }

    // ============================================
    // Input
    // ============================================

    /// Keystroke: mark typing and look at the caret
    pub fn on_user_typing(&self, caret_x: f64, caret_y: f64) -> EngineResult<()> {
        let caret = checked("user_typing", caret_x, caret_y)?;
        self.typing.touch();
        self.boredom.reset();
        self.gaze.caret_moved(caret);
        Ok(())
    }

    /// Pointer moved: wake up and look toward it unless typing
    pub fn on_pointer_move(&self, x: f64, y: f64) -> EngineResult<()> {
        let point = checked("pointer_move", x, y)?;
        self.boredom.reset();
        self.gaze.pointer_moved(point);
        Ok(())
    }

    /// Host viewport resized
    pub fn on_resize(&self, width: f64, height: f64) -> EngineResult<()> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            tracing::warn!(width, height, "Resize ignored");
            return Err(EngineError::InvalidTarget { x: width, y: height });
        }
        self.agent.set_viewport(Viewport::new(width, height));
        tracing::debug!(width, height, "Viewport resized");
        Ok(())
    }

    /// Recenter the gaze
    pub fn look_straight_ahead(&self) {
        self.boredom.reset();
        self.gaze.look_straight_ahead();
    }

    // ============================================
    // Direct control
    // ============================================

    /// Fire any character trigger
    pub fn trigger(&self, trigger: Trigger) -> bool {
        self.character.fire(trigger)
    }

    /// Fire `Idle`
    pub fn trigger_idle(&self) -> bool {
        self.trigger(Trigger::Idle)
    }

    /// Fire `Undo`
    pub fn trigger_undo(&self) -> bool {
        self.trigger(Trigger::Undo)
    }

    /// Fire `Idea_Spark`
    pub fn trigger_idea_spark(&self) -> bool {
        self.trigger(Trigger::IdeaSpark)
    }

    /// Fire `Big_Loader`
    pub fn trigger_big_loader(&self) -> bool {
        self.trigger(Trigger::BigLoader)
    }

    /// Fire `Small_Loader`
    pub fn trigger_small_loader(&self) -> bool {
        self.trigger(Trigger::SmallLoader)
    }

    /// Fire `Shrink`
    pub fn trigger_shrink(&self) -> bool {
        self.trigger(Trigger::Shrink)
    }

    /// Fire `Pulse`
    pub fn trigger_pulse(&self) -> bool {
        self.trigger(Trigger::Pulse)
    }

    /// Fire `Publish`
    pub fn trigger_publish(&self) -> bool {
        self.trigger(Trigger::Publish)
    }

    /// Fire `Blink`
    pub fn trigger_blink(&self) -> bool {
        self.trigger(Trigger::Blink)
    }

    /// Toggle boredom, returning the new state
    pub fn trigger_boredom(&self) -> bool {
        self.boredom.toggle()
    }

    /// Queue a move to an absolute point
    pub fn move_to(&self, x: f64, y: f64) -> EngineResult<()> {
        let target = checked("move_to", x, y)?;
        self.queue
            .enqueue(MovementTask::new(target), EnqueueOptions::immediate());
        Ok(())
    }

    /// Drop queued movement and cancel the one in flight
    pub fn cancel_animations(&self) {
        self.queue.cancel_all();
    }

    /// Tint the character with a named preset; unknown names are ignored
    pub fn change_astro_color(&self, name: &str) -> bool {
        match self.config.colors.get(name) {
            Some(rgb) => {
                tracing::debug!(name, color = %rgb, "Changing color");
                self.character.set_color(rgb)
            }
            None => {
                let error = EngineError::UnknownColor(name.to_string());
                tracing::warn!(error = %error, "Color change skipped");
                false
            }
        }
    }

    // ============================================
    // Queue and diagnostics
    // ============================================

    /// Whether a movement is executing
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.queue.is_animating()
    }

    /// Resolve once all queued, debounced and delayed movement has finished
    pub async fn wait_idle(&self) {
        self.queue.wait_idle().await;
    }

    /// Diagnostics view
    #[must_use]
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            position: self.agent.position(),
            phase: self.agent.phase(),
            primary_visible: self.agent.primary_visible(),
            gaze: self.gaze.current(),
            gaze_target: self.gaze.target(),
            typing: self.agent.is_typing(),
            bored: self.agent.is_bored(),
            character_state: self.character.last_state().map(str::to_string),
            animating: self.queue.is_animating(),
            pending: self.queue.pending_len(),
        }
    }

    /// Dispatch a [`LifecycleEvent`]
    pub async fn handle_event(&self, event: LifecycleEvent) -> EngineResult<()> {
        tracing::debug!(event = event.name(), "Lifecycle event");
        match event {
            LifecycleEvent::ChatOpen => self.on_chat_open(),
            LifecycleEvent::FirstInputFocus { x, y } => self.on_first_input_focus(x, y)?,
            LifecycleEvent::UserSendsMessage { x, y } => self.on_user_sends_message(x, y)?,
            LifecycleEvent::AiMessageReady => {
                self.on_ai_message_ready();
            }
            LifecycleEvent::AiMessageShown { x, y } => self.on_ai_message_shown(x, y)?,
            LifecycleEvent::UserTyping { caret_x, caret_y } => {
                self.on_user_typing(caret_x, caret_y)?;
            }
            LifecycleEvent::PointerMove { x, y } => self.on_pointer_move(x, y)?,
            LifecycleEvent::Resize { width, height } => self.on_resize(width, height)?,
            LifecycleEvent::Trigger { trigger } => {
                self.trigger(trigger);
            }
            LifecycleEvent::ToggleBoredom => {
                self.trigger_boredom();
            }
            LifecycleEvent::MoveTo { x, y } => self.move_to(x, y)?,
            LifecycleEvent::CancelAnimations => self.cancel_animations(),
            LifecycleEvent::ChangeColor { name } => {
                self.change_astro_color(&name);
            }
            LifecycleEvent::LookStraightAhead => self.look_straight_ahead(),
            LifecycleEvent::WaitIdle => self.wait_idle().await,
            LifecycleEvent::Sleep { ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
            }
        }
        Ok(())
    }
}

impl Drop for LifecycleBridge {
    fn drop(&mut self) {
        self.queue.cancel_all();
    }
}

//! Astro Core - Headless Movement & Animation Orchestration
//!
//! This crate drives a floating companion character ("Astro") around a chat
//! interface. It decides *when* and *where* the character moves, sequences
//! each move through shrink, trail, travel and arrival phases, keeps a
//! smoothed gaze pointed at what the user is doing, blinks, and gets bored.
//!
//! It does not draw anything. Rendering and the character's own state
//! machine are injected collaborators.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Host application                       │
//! │        chat open · focus · send · AI reply · typing · pointer │
//! └───────────────────────────────┬──────────────────────────────┘
//!                                 │  LifecycleEvent / method calls
//! ┌───────────────────────────────┼──────────────────────────────┐
//! │                         ASTRO CORE                            │
//! │  ┌────────────────────────────┴───────────────────────────┐  │
//! │  │                    LifecycleBridge                       │  │
//! │  └──────┬──────────────────┬───────────────┬──────────────┘  │
//! │         │                  │               │                 │
//! │  ┌──────┴───────┐   ┌──────┴──────┐  ┌─────┴──────────────┐  │
//! │  │AnimationQueue│   │ GazeTracker │  │ Blink / Idle timers│  │
//! │  └──────┬───────┘   └─────────────┘  └────────────────────┘  │
//! │  ┌──────┴──────────┐  ┌─────────────┐                        │
//! │  │MovementExecutor │──│ PathPlanner │                        │
//! │  └──────┬──────────┘  └─────────────┘                        │
//! └─────────┼────────────────────────────────────────────────────┘
//!           │
//!   RenderSurface  +  CharacterStateMachine   (injected)
//! ```
//!
//! # Key Types
//!
//! - [`LifecycleBridge`]: host-facing entry point
//! - [`LifecycleEvent`]: message form of the bridge API
//! - [`AnimationQueue`]: one-at-a-time movement queue with cancel and debounce
//! - [`MovementExecutor`]: runs a single movement through its phases
//! - [`PathPlanner`]: curved trajectories and trail staggering
//! - [`GazeTracker`]: smoothed look direction
//! - [`CharacterStateMachine`] / [`RenderSurface`]: collaborator seams
//!
//! # Module Overview
//!
//! - [`animation`]: easing curves and indicator styling
//! - [`blink`]: randomized blink scheduling
//! - [`bridge`]: lifecycle bridge and diagnostics snapshot
//! - [`character`]: character collaborator trait and best-effort link
//! - [`color`]: RGB values and named presets
//! - [`config`]: layered configuration (defaults, TOML, env, CLI)
//! - [`error`]: engine error types
//! - [`events`]: lifecycle events
//! - [`executor`]: movement phase sequencing
//! - [`gaze`]: gaze tracking and the gaze tick loop
//! - [`geometry`]: positions, viewport and gaze space
//! - [`idle`]: boredom and typing timers
//! - [`path`]: trajectory planning
//! - [`queue`]: movement queue
//! - [`render`]: rendering collaborator trait
//! - [`state`]: shared agent state

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

pub mod animation;
pub mod blink;
pub mod bridge;
pub mod character;
pub mod color;
pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod gaze;
pub mod geometry;
pub mod idle;
pub mod path;
pub mod queue;
pub mod render;
pub mod state;

// Re-exports for convenience
pub use animation::{ColorFade, EasingFunction, IndicatorStyle};
pub use blink::BlinkScheduler;
pub use bridge::{AgentSnapshot, LifecycleBridge};
pub use character::{CharacterLink, CharacterStateMachine, EndState, NumericInput, Trigger};
pub use color::{ColorPresets, Rgb};
pub use error::{CharacterError, EngineError, EngineResult};
pub use events::LifecycleEvent;
pub use executor::MovementExecutor;
pub use gaze::{GazeLoop, GazeTracker};
pub use geometry::{GazePoint, Position, Viewport};
pub use idle::{BoredomTimer, TypingTimer};
pub use path::{CubicCurve, PathPlanner, Trajectory};
pub use queue::{AnimationQueue, CancelToken, EnqueueOptions, MovementTask, TaskId, TaskRunner};
pub use render::{IndicatorMotion, NullSurface, PrimaryVisual, RenderSurface};
pub use state::{AgentState, MovementPhase};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, AstroConfig, AstroToml,
    ConfigError, ConfigOverrides, ConfigSource,
};

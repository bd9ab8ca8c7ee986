//! Character State Machine Capability
//!
//! Astro's expressive animation graph lives outside the engine. The engine
//! only knows it as a sink for named triggers and numeric/boolean inputs,
//! modeled by the [`CharacterStateMachine`] trait. Hosts inject an
//! implementation; tests inject a recording stub.
//!
//! [`CharacterLink`] wraps the injected capability with the engine's
//! tolerance rules: calls made before a collaborator is attached and ready
//! are swallowed, and collaborator failures are logged, never propagated. A
//! missing expressive cue must not break movement.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::{CharacterError, EngineError};
use crate::geometry::GazePoint;

/// Name of the boolean boredom input
pub const BOREDOM_INPUT: &str = "Boredom";

/// Capability exposed by the external character state machine
pub trait CharacterStateMachine: Send + Sync {
    /// Whether the underlying graph has finished loading
    fn is_ready(&self) -> bool {
        true
    }

    /// Fire a named one-shot trigger
    ///
    /// # Errors
    ///
    /// Returns an error if the trigger does not exist or the call is rejected.
    fn fire(&self, trigger: &str) -> Result<(), CharacterError>;

    /// Set a named numeric input
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not exist or the call is rejected.
    fn set_numeric(&self, input: &str, value: f64) -> Result<(), CharacterError>;

    /// Set a named boolean input (defaults to a 0/1 numeric write)
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not exist or the call is rejected.
    fn set_boolean(&self, input: &str, value: bool) -> Result<(), CharacterError> {
        self.set_numeric(input, if value { 1.0 } else { 0.0 })
    }
}

/// Named one-shot triggers understood by the character graph
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trigger {
    /// Return to the resting pose
    Idle,
    /// Undo gesture
    Undo,
    /// Light-bulb moment
    IdeaSpark,
    /// Full-size loading loop
    BigLoader,
    /// Compact loading loop
    SmallLoader,
    /// Shrink before travel
    Shrink,
    /// Attention pulse
    Pulse,
    /// Publish celebration
    Publish,
    /// Eye blink
    Blink,
}

impl Trigger {
    /// Every trigger
    pub const ALL: [Trigger; 9] = [
        Self::Idle,
        Self::Undo,
        Self::IdeaSpark,
        Self::BigLoader,
        Self::SmallLoader,
        Self::Shrink,
        Self::Pulse,
        Self::Publish,
        Self::Blink,
    ];

    /// Look up a trigger by its input name
    #[must_use]
    pub fn from_input_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.input_name() == name)
    }

    /// Input name in the character asset
    #[must_use]
    pub fn input_name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Undo => "Undo",
            Self::IdeaSpark => "Idea_Spark",
            Self::BigLoader => "Big_Loader",
            Self::SmallLoader => "Small_Loader",
            Self::Shrink => "Shrink",
            Self::Pulse => "Pulse",
            Self::Publish => "Publish",
            Self::Blink => "Blink",
        }
    }

    /// Diagnostic state label recorded after the trigger fires
    #[must_use]
    pub fn state_label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Undo => "undo",
            Self::IdeaSpark => "idea-spark",
            Self::BigLoader => "big-loader",
            Self::SmallLoader => "small-loader",
            Self::Shrink => "shrinking",
            Self::Pulse => "pulse",
            Self::Publish => "publish",
            Self::Blink => "blink",
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.input_name())
    }
}

/// Numeric inputs driven by the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumericInput {
    /// Horizontal look (0-100)
    XAxis,
    /// Vertical look (0-100)
    YAxis,
    /// Red tint channel (0-255)
    Red,
    /// Green tint channel (0-255)
    Green,
    /// Blue tint channel (0-255)
    Blue,
}

impl NumericInput {
    /// Input name in the character asset
    #[must_use]
    pub fn input_name(self) -> &'static str {
        match self {
            Self::XAxis => "xAxis",
            Self::YAxis => "yAxis",
            Self::Red => "Red",
            Self::Green => "Green",
            Self::Blue => "Blue",
        }
    }
}

/// Character state requested once a movement completes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndState {
    /// Resting pose
    #[default]
    Idle,
    /// Attention pulse
    Pulse,
    /// Compact loading loop while a reply is pending
    SmallLoader,
}

impl EndState {
    /// Trigger that realizes this end state
    #[must_use]
    pub fn trigger(self) -> Trigger {
        match self {
            Self::Idle => Trigger::Idle,
            Self::Pulse => Trigger::Pulse,
            Self::SmallLoader => Trigger::SmallLoader,
        }
    }
}

#[derive(Default)]
struct LinkInner {
    machine: RwLock<Option<Arc<dyn CharacterStateMachine>>>,
    last_state: Mutex<Option<&'static str>>,
}

/// Best-effort handle to the character collaborator
///
/// Cheap to clone; all clones share the same attachment.
#[derive(Clone, Default)]
pub struct CharacterLink {
    inner: Arc<LinkInner>,
}

impl std::fmt::Debug for CharacterLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterLink")
            .field("attached", &self.inner.machine.read().is_some())
            .field("last_state", &*self.inner.last_state.lock())
            .finish()
    }
}

impl CharacterLink {
    /// Create a link with nothing attached
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a link with a collaborator already attached
    #[must_use]
    pub fn with_machine(machine: Arc<dyn CharacterStateMachine>) -> Self {
        let link = Self::new();
        link.attach(machine);
        link
    }

    /// Attach (or replace) the collaborator
    pub fn attach(&self, machine: Arc<dyn CharacterStateMachine>) {
        *self.inner.machine.write() = Some(machine);
        tracing::debug!("Character collaborator attached");
    }

    /// Whether a collaborator is attached and ready
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready_machine().is_some()
    }

    /// Last trigger label successfully delivered
    #[must_use]
    pub fn last_state(&self) -> Option<&'static str> {
        *self.inner.last_state.lock()
    }

    fn ready_machine(&self) -> Option<Arc<dyn CharacterStateMachine>> {
        let machine = self.inner.machine.read().clone()?;
        let ready = catch_unwind(AssertUnwindSafe(|| machine.is_ready())).unwrap_or(false);
        ready.then_some(machine)
    }

    /// Run a collaborator call, swallowing errors and panics
    fn call(
        &self,
        name: &str,
        op: impl FnOnce(&dyn CharacterStateMachine) -> Result<(), CharacterError>,
    ) -> bool {
        let Some(machine) = self.ready_machine() else {
            tracing::trace!(input = name, "Character not ready, call skipped");
            return false;
        };

        match catch_unwind(AssertUnwindSafe(|| op(machine.as_ref()))) {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                let error = EngineError::TriggerFailed {
                    trigger: name.to_string(),
                    reason: e.to_string(),
                };
                tracing::warn!(%error, "Character call failed");
                false
            }
            Err(_) => {
                let error = EngineError::TriggerFailed {
                    trigger: name.to_string(),
                    reason: "panicked".to_string(),
                };
                tracing::warn!(%error, "Character call failed");
                false
            }
        }
    }

    /// Fire a trigger; returns whether it was delivered
    pub fn fire(&self, trigger: Trigger) -> bool {
        let name = trigger.input_name();
        let delivered = self.call(name, |m| m.fire(name));
        if delivered {
            *self.inner.last_state.lock() = Some(trigger.state_label());
            tracing::debug!(trigger = name, "Trigger fired");
        }
        delivered
    }

    /// Set a numeric input; returns whether it was delivered
    pub fn set_numeric(&self, input: NumericInput, value: f64) -> bool {
        let name = input.input_name();
        self.call(name, |m| m.set_numeric(name, value))
    }

    /// Set a boolean input; returns whether it was delivered
    pub fn set_boolean(&self, input: &str, value: bool) -> bool {
        self.call(input, |m| m.set_boolean(input, value))
    }

    /// Forward a look direction to the `xAxis`/`yAxis` inputs
    pub fn set_gaze(&self, gaze: GazePoint) -> bool {
        let x = self.set_numeric(NumericInput::XAxis, gaze.x);
        let y = self.set_numeric(NumericInput::YAxis, gaze.y);
        x && y
    }

    /// Forward a tint to the `Red`/`Green`/`Blue` inputs
    pub fn set_color(&self, rgb: Rgb) -> bool {
        let [r, g, b] = rgb.channels();
        let delivered = [
            self.set_numeric(NumericInput::Red, r),
            self.set_numeric(NumericInput::Green, g),
            self.set_numeric(NumericInput::Blue, b),
        ];
        delivered.iter().all(|d| *d)
    }

    /// Poll until the collaborator is ready or `timeout` elapses
    ///
    /// Returns whether the collaborator became ready. Callers proceed either
    /// way; this only bounds how long expressive accompaniment is awaited.
    pub async fn wait_ready(&self, timeout: Duration, poll_interval: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.is_ready() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::debug!(
                    timeout_ms = timeout.as_millis() as u64,
                    error = %EngineError::CollaboratorNotReady,
                    "Continuing without character"
                );
                return false;
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

//! Lifecycle Events
//!
//! Message form of the [`LifecycleBridge`](crate::bridge::LifecycleBridge)
//! API. Hosts that prefer pushing events over calling methods (and the
//! `astro-sim` script runner) send these through
//! [`LifecycleBridge::handle_event`](crate::bridge::LifecycleBridge::handle_event).
//!
//! Serialized as internally tagged JSON, e.g.
//! `{"event": "user_sends_message", "x": 320.0, "y": 700.0}`.

use serde::{Deserialize, Serialize};

use crate::character::Trigger;

/// Events from the host application to the engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    // ============================================
    // Chat lifecycle
    // ============================================
    /// Chat panel opened
    ChatOpen,

    /// Input field focused for the first time
    FirstInputFocus {
        /// Focus point x
        x: f64,
        /// Focus point y
        y: f64,
    },

    /// User sent a message from near this point
    UserSendsMessage {
        /// Send point x
        x: f64,
        /// Send point y
        y: f64,
    },

    /// AI response is ready to show
    AiMessageReady,

    /// AI response rendered at this point
    AiMessageShown {
        /// Message anchor x
        x: f64,
        /// Message anchor y
        y: f64,
    },

    // ============================================
    // Input
    // ============================================
    /// Keystroke with the caret at this point
    UserTyping {
        /// Caret x
        caret_x: f64,
        /// Caret y
        caret_y: f64,
    },

    /// Pointer moved
    PointerMove {
        /// Pointer x
        x: f64,
        /// Pointer y
        y: f64,
    },

    /// Host viewport resized
    Resize {
        /// New width
        width: f64,
        /// New height
        height: f64,
    },

    // ============================================
    // Direct control
    // ============================================
    /// Fire a character trigger directly
    Trigger {
        /// Which trigger
        trigger: Trigger,
    },

    /// Toggle boredom
    ToggleBoredom,

    /// Move to an absolute point
    MoveTo {
        /// Target x
        x: f64,
        /// Target y
        y: f64,
    },

    /// Cancel queued and in-flight movement
    CancelAnimations,

    /// Tint the character with a named preset
    ChangeColor {
        /// Preset name
        name: String,
    },

    /// Recenter the gaze
    LookStraightAhead,

    /// Pause until the movement queue drains (scripted hosts)
    WaitIdle,

    /// Pause for a number of milliseconds (scripted hosts)
    Sleep {
        /// Milliseconds to wait
        ms: u64,
    },
}

impl LifecycleEvent {
    /// Short name for logging
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChatOpen => "chat_open",
            Self::FirstInputFocus { .. } => "first_input_focus",
            Self::UserSendsMessage { .. } => "user_sends_message",
            Self::AiMessageReady => "ai_message_ready",
            Self::AiMessageShown { .. } => "ai_message_shown",
            Self::UserTyping { .. } => "user_typing",
            Self::PointerMove { .. } => "pointer_move",
            Self::Resize { .. } => "resize",
            Self::Trigger { .. } => "trigger",
            Self::ToggleBoredom => "toggle_boredom",
            Self::MoveTo { .. } => "move_to",
            Self::CancelAnimations => "cancel_animations",
            Self::ChangeColor { .. } => "change_color",
            Self::LookStraightAhead => "look_straight_ahead",
            Self::WaitIdle => "wait_idle",
            Self::Sleep { .. } => "sleep",
        }
    }
}

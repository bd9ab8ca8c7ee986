//! Engine Error Types
//!
//! Nothing in the engine is fatal to the host application. These errors are
//! returned where a caller can act on them (e.g. a rejected move target) and
//! otherwise logged and swallowed at the boundary that produced them.

use thiserror::Error;

/// Errors produced by the orchestration engine
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A movement was requested with a missing or non-finite coordinate
    #[error("Invalid movement target ({x}, {y})")]
    InvalidTarget {
        /// Requested x coordinate
        x: f64,
        /// Requested y coordinate
        y: f64,
    },

    /// The character collaborator has not been attached or is not ready
    #[error("Character collaborator not ready")]
    CollaboratorNotReady,

    /// A call into the character collaborator failed
    #[error("Trigger '{trigger}' failed: {reason}")]
    TriggerFailed {
        /// Trigger or input name
        trigger: String,
        /// Failure description from the collaborator
        reason: String,
    },

    /// A queued task failed while running
    #[error("Movement task failed: {0}")]
    TaskFailed(String),

    /// A color preset name was not found
    #[error("Unknown color preset '{0}'")]
    UnknownColor(String),
}

/// Result alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Error type returned by character collaborator implementations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CharacterError {
    /// The named trigger or input does not exist in the loaded asset
    #[error("Unknown input '{0}'")]
    UnknownInput(String),

    /// The collaborator rejected the call
    #[error("{0}")]
    Rejected(String),
}

//! Screen-space geometry shared by the planner, executor and gaze tracker.
//!
//! Positions are in host pixels. Gaze values live in a normalized 0-100
//! space per axis where 50 means "straight ahead".

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Center of the normalized gaze range
pub const GAZE_CENTER: f64 = 50.0;

/// Upper bound of the normalized gaze range
pub const GAZE_MAX: f64 = 100.0;

/// An on-screen anchor point in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal pixel coordinate
    pub x: f64,
    /// Vertical pixel coordinate (grows downward)
    pub y: f64,
}

impl Position {
    /// Create a new position
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build a position from host-supplied coordinates, rejecting NaN and infinities
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTarget`] if either coordinate is not finite.
    pub fn checked(x: f64, y: f64) -> EngineResult<Self> {
        if x.is_finite() && y.is_finite() {
            Ok(Self { x, y })
        } else {
            Err(EngineError::InvalidTarget { x, y })
        }
    }

    /// Euclidean distance to another point
    #[must_use]
    pub fn distance_to(&self, other: Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Offset by a delta
    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Linear interpolation toward `other` (t = 0 is self, t = 1 is other)
    #[must_use]
    pub fn lerp(&self, other: Position, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Host viewport dimensions in pixels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

impl Viewport {
    /// Create a viewport
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Horizontal center line
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.width / 2.0
    }

    /// Clamp a point so it stays at least `margin` pixels inside the viewport
    ///
    /// When the viewport is smaller than twice the margin the point is pinned
    /// to the center on that axis.
    #[must_use]
    pub fn clamp(&self, point: Position, margin: f64) -> Position {
        let clamp_axis = |value: f64, extent: f64| {
            if extent <= margin * 2.0 {
                extent / 2.0
            } else {
                value.clamp(margin, extent - margin)
            }
        };
        Position::new(
            clamp_axis(point.x, self.width),
            clamp_axis(point.y, self.height),
        )
    }
}

/// A look direction in normalized 0-100 space
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GazePoint {
    /// Horizontal look value (0 = far left, 100 = far right)
    pub x: f64,
    /// Vertical look value (0 = up, 100 = down)
    pub y: f64,
}

impl Default for GazePoint {
    fn default() -> Self {
        Self::center()
    }
}

impl GazePoint {
    /// Create a gaze point, clamped into the normalized range
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: x.clamp(0.0, GAZE_MAX),
            y: y.clamp(0.0, GAZE_MAX),
        }
    }

    /// Straight ahead
    #[must_use]
    pub const fn center() -> Self {
        Self {
            x: GAZE_CENTER,
            y: GAZE_CENTER,
        }
    }
}

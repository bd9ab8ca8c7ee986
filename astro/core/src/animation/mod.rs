//! Animation Primitives
//!
//! Surface-agnostic descriptions of how trail indicators look and move. The
//! engine decides WHAT is shown; the render surface decides HOW to paint it.

mod timing;

pub use timing::EasingFunction;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Visual style of a single trail indicator
///
/// Index 0 is the lead indicator. Opacity and scale decay monotonically from
/// the lead toward the tail; blur grows.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndicatorStyle {
    /// Position in the trail (0 = lead)
    pub index: usize,
    /// Opacity (0.0-1.0)
    pub opacity: f64,
    /// Scale relative to the configured dot size
    pub scale: f64,
    /// Blur radius in pixels
    pub blur: f64,
    /// Dot diameter in pixels before scaling
    pub size: f64,
    /// Dot fill color
    pub color: Rgb,
}

impl IndicatorStyle {
    /// Whether this is the lead indicator
    #[must_use]
    pub fn is_lead(&self) -> bool {
        self.index == 0
    }
}

/// One-shot color transition played by the lead indicator
///
/// Purely cosmetic: the executor never waits on it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorFade {
    /// Starting color
    pub from: Rgb,
    /// Final color
    pub to: Rgb,
    /// Fade duration
    pub duration: Duration,
}

impl ColorFade {
    /// Color at a given progress (0.0-1.0)
    #[must_use]
    pub fn color_at(&self, t: f64) -> Rgb {
        self.from.mix(self.to, t)
    }
}

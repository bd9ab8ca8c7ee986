//! Render Surface Capability
//!
//! The engine never paints anything. It tells the host's render surface
//! where the primary visual sits, which trail indicators are visible and how
//! they should move; the surface turns that into pixels however it likes
//! (DOM nodes, canvas, a terminal grid).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::animation::{ColorFade, EasingFunction, IndicatorStyle};
use crate::geometry::Position;
use crate::path::Trajectory;

/// Position and visibility of Astro's primary visual
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrimaryVisual {
    /// Anchor position
    pub position: Position,
    /// Whether the primary visual is shown
    pub visible: bool,
}

/// Motion instruction for one trail indicator
#[derive(Clone, Debug)]
pub struct IndicatorMotion {
    /// Indicator style (index 0 is the lead)
    pub style: IndicatorStyle,
    /// Shared path every indicator follows
    pub trajectory: Arc<Trajectory>,
    /// Delay before this indicator starts moving
    pub start_delay: Duration,
    /// Time to traverse the path once started
    pub duration: Duration,
    /// Timing curve
    pub easing: EasingFunction,
}

/// Host rendering collaborator
#[async_trait]
pub trait RenderSurface: Send + Sync {
    /// Place and show or hide the primary visual
    fn set_primary(&self, visual: PrimaryVisual);

    /// Show trail indicators parked at `at`
    fn reveal_indicators(&self, at: Position, styles: &[IndicatorStyle]);

    /// Start the lead indicator's one-shot color fade
    fn start_lead_fade(&self, fade: ColorFade);

    /// Start an indicator moving along its trajectory (fire-and-forget)
    fn start_motion(&self, motion: IndicatorMotion);

    /// Hide every trail indicator
    fn hide_indicators(&self);

    /// Resolve after the next rendering refresh has been painted
    async fn next_frame(&self);
}

/// Surface that renders nothing; frames advance on a fixed interval
#[derive(Clone, Debug)]
pub struct NullSurface {
    frame_interval: Duration,
}

impl NullSurface {
    /// Create a null surface with the given frame interval
    #[must_use]
    pub fn new(frame_interval: Duration) -> Self {
        Self { frame_interval }
    }
}

impl Default for NullSurface {
    fn default() -> Self {
        Self::new(Duration::from_millis(16))
    }
}

#[async_trait]
impl RenderSurface for NullSurface {
    fn set_primary(&self, _visual: PrimaryVisual) {}

    fn reveal_indicators(&self, _at: Position, _styles: &[IndicatorStyle]) {}

    fn start_lead_fade(&self, _fade: ColorFade) {}

    fn start_motion(&self, _motion: IndicatorMotion) {}

    fn hide_indicators(&self) {}

    async fn next_frame(&self) {
        tokio::time::sleep(self.frame_interval).await;
    }
}

//! Logging collaborators
//!
//! Stand-ins for the real character runtime and renderer: every call is
//! written to the log so a scripted run can be read back as a timeline.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, trace};

use astro_core::{
    CharacterError, CharacterStateMachine, ColorFade, IndicatorMotion, IndicatorStyle, Position,
    PrimaryVisual, RenderSurface, Trigger,
};

/// Character that logs inputs and becomes ready after a delay
#[derive(Debug)]
pub struct LoggingCharacter {
    ready_at: Instant,
    fired: AtomicUsize,
}

impl LoggingCharacter {
    /// Create a character that reports ready once `load_time` has passed
    pub fn new(load_time: Duration) -> Self {
        Self {
            ready_at: Instant::now() + load_time,
            fired: AtomicUsize::new(0),
        }
    }

    /// Number of triggers received
    pub fn fired(&self) -> usize {
        self.fired.load(Ordering::Relaxed)
    }
}

impl CharacterStateMachine for LoggingCharacter {
    fn is_ready(&self) -> bool {
        Instant::now() >= self.ready_at
    }

    fn fire(&self, trigger: &str) -> Result<(), CharacterError> {
        let known = Trigger::from_input_name(trigger).is_some();
        if !known {
            return Err(CharacterError::UnknownInput(trigger.to_string()));
        }
        self.fired.fetch_add(1, Ordering::Relaxed);
        info!(target: "astro_sim::character", trigger, "fire");
        Ok(())
    }

    fn set_numeric(&self, input: &str, value: f64) -> Result<(), CharacterError> {
        trace!(target: "astro_sim::character", input, value, "numeric");
        Ok(())
    }

    fn set_boolean(&self, input: &str, value: bool) -> Result<(), CharacterError> {
        info!(target: "astro_sim::character", input, value, "boolean");
        Ok(())
    }
}

/// Renderer that logs what it would draw
#[derive(Debug)]
pub struct LoggingSurface {
    frame_interval: Duration,
}

impl LoggingSurface {
    /// Create a surface refreshing every `frame_interval`
    pub fn new(frame_interval: Duration) -> Self {
        Self { frame_interval }
    }
}

#[async_trait]
impl RenderSurface for LoggingSurface {
    fn set_primary(&self, visual: PrimaryVisual) {
        info!(
            target: "astro_sim::render",
            position = %visual.position,
            visible = visual.visible,
            "primary"
        );
    }

    fn reveal_indicators(&self, at: Position, styles: &[IndicatorStyle]) {
        info!(target: "astro_sim::render", %at, count = styles.len(), "reveal trail");
    }

    fn start_lead_fade(&self, fade: ColorFade) {
        debug!(
            target: "astro_sim::render",
            from = %fade.from,
            to = %fade.to,
            ms = fade.duration.as_millis() as u64,
            "lead fade"
        );
    }

    fn start_motion(&self, motion: IndicatorMotion) {
        if motion.style.is_lead() {
            info!(
                target: "astro_sim::render",
                path = %motion.trajectory.svg_path(),
                ms = motion.duration.as_millis() as u64,
                easing = motion.easing.css_timing(),
                "lead motion"
            );
        } else {
            debug!(
                target: "astro_sim::render",
                index = motion.style.index,
                delay_ms = motion.start_delay.as_millis() as u64,
                opacity = motion.style.opacity,
                "trail motion"
            );
        }
    }

    fn hide_indicators(&self) {
        info!(target: "astro_sim::render", "hide trail");
    }

    async fn next_frame(&self) {
        tokio::time::sleep(self.frame_interval).await;
    }
}

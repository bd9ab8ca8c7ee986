//! Blink scheduling
//!
//! Fires the `Blink` trigger at randomized intervals. A blink is skipped
//! while a movement is in flight, while the primary visual is hidden, and
//! while the agent is bored; the schedule keeps running either way.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;

use crate::character::{CharacterLink, Trigger};
use crate::config::BlinkConfig;
use crate::state::{AgentState, MovementPhase};

/// Next wait: `base` plus a uniform offset in `[-variation, +variation]`,
/// never shorter than `min_interval`
pub fn next_interval<R: Rng + ?Sized>(config: &BlinkConfig, rng: &mut R) -> Duration {
    let base = config.base_interval.as_secs_f64();
    let spread = config.variation.as_secs_f64();
    let offset = if spread > 0.0 {
        rng.gen_range(-spread..=spread)
    } else {
        0.0
    };
    let secs = (base + offset).max(config.min_interval.as_secs_f64());
    Duration::from_secs_f64(secs)
}

/// Whether the agent is in a state where blinking reads naturally
#[must_use]
pub fn can_blink(phase: MovementPhase, primary_visible: bool, bored: bool) -> bool {
    !phase.is_moving() && primary_visible && !bored
}

/// Owned self-rescheduling blink timer
#[derive(Debug)]
pub struct BlinkScheduler {
    config: BlinkConfig,
    handle: Option<JoinHandle<()>>,
}

impl BlinkScheduler {
    /// Create a stopped scheduler
    #[must_use]
    pub fn new(config: BlinkConfig) -> Self {
        Self {
            config,
            handle: None,
        }
    }

    /// Start blinking; restarts if already running
    pub fn start(&mut self, agent: Arc<AgentState>, character: CharacterLink) {
        self.start_with_rng(agent, character, StdRng::from_entropy());
    }

    /// Start blinking with a caller-supplied random source
    pub fn start_with_rng(&mut self, agent: Arc<AgentState>, character: CharacterLink, mut rng: StdRng) {
        self.stop();
        let config = self.config.clone();
        tracing::debug!(
            base_ms = config.base_interval.as_millis() as u64,
            variation_ms = config.variation.as_millis() as u64,
            "Blink scheduler started"
        );
        self.handle = Some(tokio::spawn(async move {
            loop {
                let wait = next_interval(&config, &mut rng);
                tokio::time::sleep(wait).await;

                let phase = agent.phase();
                if can_blink(phase, agent.primary_visible(), agent.is_bored()) {
                    character.fire(Trigger::Blink);
                } else {
                    tracing::trace!(%phase, bored = agent.is_bored(), "Blink skipped");
                }
            }
        }));
    }

    /// Stop blinking
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Blink scheduler stopped");
        }
    }

    /// Whether the scheduler is running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for BlinkScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterStateMachine;
    use crate::error::CharacterError;
    use crate::geometry::{Position, Viewport};
    use parking_lot::Mutex;

    #[test]
    fn test_interval_within_bounds() {
        let config = BlinkConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let low = config.base_interval.saturating_sub(config.variation).max(config.min_interval);
        let high = config.base_interval + config.variation;
        for _ in 0..500 {
            let wait = next_interval(&config, &mut rng);
            assert!(wait >= low && wait <= high, "{wait:?} outside {low:?}..={high:?}");
        }
    }

    #[test]
    fn test_interval_floor() {
        let config = BlinkConfig {
            base_interval: Duration::from_millis(100),
            variation: Duration::from_millis(100),
            min_interval: Duration::from_millis(250),
        };
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert!(next_interval(&config, &mut rng) >= Duration::from_millis(250));
        }
    }

    #[test]
    fn test_zero_variation_is_fixed() {
        let config = BlinkConfig {
            variation: Duration::ZERO,
            ..BlinkConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(next_interval(&config, &mut rng), config.base_interval);
    }

    #[test]
    fn test_can_blink() {
        assert!(can_blink(MovementPhase::Idle, true, false));
        assert!(!can_blink(MovementPhase::Idle, false, false));
        assert!(!can_blink(MovementPhase::Idle, true, true));
        for phase in [
            MovementPhase::Shrinking,
            MovementPhase::Revealing,
            MovementPhase::Traveling,
            MovementPhase::Arrived,
            MovementPhase::Restoring,
        ] {
            assert!(!can_blink(phase, true, false), "blinked during {phase}");
        }
    }

    #[derive(Default)]
    struct Blinks {
        count: Mutex<usize>,
    }

    impl CharacterStateMachine for Blinks {
        fn fire(&self, trigger: &str) -> Result<(), CharacterError> {
            if trigger == "Blink" {
                *self.count.lock() += 1;
            }
            Ok(())
        }

        fn set_numeric(&self, _input: &str, _value: f64) -> Result<(), CharacterError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_blinks_and_suppresses() {
        let agent = Arc::new(AgentState::new(Position::default(), Viewport::default()));
        let blinks = Arc::new(Blinks::default());
        let mut scheduler = BlinkScheduler::new(BlinkConfig::default());
        scheduler.start_with_rng(
            Arc::clone(&agent),
            CharacterLink::with_machine(blinks.clone()),
            StdRng::seed_from_u64(11),
        );
        assert!(scheduler.is_running());

        // Longest possible interval is base + variation
        tokio::time::sleep(Duration::from_millis(7900)).await;
        let idle_blinks = *blinks.count.lock();
        assert!(idle_blinks >= 1);

        agent.set_phase(MovementPhase::Traveling);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(*blinks.count.lock(), idle_blinks);

        agent.set_phase(MovementPhase::Idle);
        scheduler.stop();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(*blinks.count.lock(), idle_blinks);
    }
}

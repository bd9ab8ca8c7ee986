//! Recording collaborators shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use astro_core::{
    AgentState, AstroConfig, CharacterError, CharacterLink, CharacterStateMachine, ColorFade,
    IndicatorMotion, IndicatorStyle, LifecycleBridge, MovementPhase, Position, PrimaryVisual,
    RenderSurface,
};

/// Character stub that records every call
pub struct RecordingCharacter {
    ready: AtomicBool,
    agent: OnceLock<Arc<AgentState>>,
    pub fired: Mutex<Vec<String>>,
    pub numerics: Mutex<Vec<(String, f64)>>,
    pub booleans: Mutex<Vec<(String, bool)>>,
    /// Movement phase observed at each `Blink`
    pub blink_phases: Mutex<Vec<MovementPhase>>,
}

impl RecordingCharacter {
    pub fn new(ready: bool) -> Arc<Self> {
        Arc::new(Self {
            ready: AtomicBool::new(ready),
            agent: OnceLock::new(),
            fired: Mutex::new(Vec::new()),
            numerics: Mutex::new(Vec::new()),
            booleans: Mutex::new(Vec::new()),
            blink_phases: Mutex::new(Vec::new()),
        })
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn observe(&self, agent: Arc<AgentState>) {
        let _ = self.agent.set(agent);
    }

    pub fn fired(&self) -> Vec<String> {
        self.fired.lock().clone()
    }

    pub fn count(&self, trigger: &str) -> usize {
        self.fired.lock().iter().filter(|t| *t == trigger).count()
    }

    pub fn numeric(&self, input: &str) -> Vec<f64> {
        self.numerics
            .lock()
            .iter()
            .filter(|(name, _)| name == input)
            .map(|(_, v)| *v)
            .collect()
    }
}

impl CharacterStateMachine for RecordingCharacter {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn fire(&self, trigger: &str) -> Result<(), CharacterError> {
        if trigger == "Blink" {
            if let Some(agent) = self.agent.get() {
                self.blink_phases.lock().push(agent.phase());
            }
        }
        self.fired.lock().push(trigger.to_string());
        Ok(())
    }

    fn set_numeric(&self, input: &str, value: f64) -> Result<(), CharacterError> {
        self.numerics.lock().push((input.to_string(), value));
        Ok(())
    }

    fn set_boolean(&self, input: &str, value: bool) -> Result<(), CharacterError> {
        self.booleans.lock().push((input.to_string(), value));
        Ok(())
    }
}

/// What the renderer was asked to do
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceCall {
    Primary { position: Position, visible: bool },
    Reveal { at: Position, count: usize },
    LeadFade,
    Motion { index: usize, start_delay: Duration },
    Hide,
}

/// Render surface stub that records every call
#[derive(Default)]
pub struct RecordingSurface {
    pub calls: Mutex<Vec<SurfaceCall>>,
}

impl RecordingSurface {
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().clone()
    }

    /// Whether indicators were hidden after the last motion started
    pub fn indicators_hidden(&self) -> bool {
        let calls = self.calls.lock();
        let last_show = calls.iter().rposition(|c| {
            matches!(c, SurfaceCall::Motion { .. } | SurfaceCall::Reveal { .. })
        });
        let last_hide = calls.iter().rposition(|c| *c == SurfaceCall::Hide);
        match (last_show, last_hide) {
            (None, _) => true,
            (Some(show), Some(hide)) => hide > show,
            (Some(_), None) => false,
        }
    }
}

#[async_trait]
impl RenderSurface for RecordingSurface {
    fn set_primary(&self, visual: PrimaryVisual) {
        self.calls.lock().push(SurfaceCall::Primary {
            position: visual.position,
            visible: visual.visible,
        });
    }

    fn reveal_indicators(&self, at: Position, styles: &[IndicatorStyle]) {
        self.calls.lock().push(SurfaceCall::Reveal {
            at,
            count: styles.len(),
        });
    }

    fn start_lead_fade(&self, _fade: ColorFade) {
        self.calls.lock().push(SurfaceCall::LeadFade);
    }

    fn start_motion(&self, motion: IndicatorMotion) {
        self.calls.lock().push(SurfaceCall::Motion {
            index: motion.style.index,
            start_delay: motion.start_delay,
        });
    }

    fn hide_indicators(&self) {
        self.calls.lock().push(SurfaceCall::Hide);
    }

    async fn next_frame(&self) {
        tokio::time::sleep(Duration::from_millis(16)).await;
    }
}

pub struct Harness {
    pub bridge: LifecycleBridge,
    pub character: Arc<RecordingCharacter>,
    pub surface: Arc<RecordingSurface>,
}

pub fn harness_with(config: AstroConfig, ready: bool) -> Harness {
    let character = RecordingCharacter::new(ready);
    let surface = Arc::new(RecordingSurface::default());
    let bridge = LifecycleBridge::new(
        config,
        surface.clone(),
        CharacterLink::with_machine(character.clone()),
    );
    character.observe(Arc::clone(bridge.agent()));
    Harness {
        bridge,
        character,
        surface,
    }
}

pub fn harness() -> Harness {
    harness_with(AstroConfig::for_testing(), true)
}

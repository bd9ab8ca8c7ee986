//! TOML Configuration File Support
//!
//! Every tunable of the engine lives here: phase durations, curve shape,
//! trail styling, gaze smoothing, idle timers, blink cadence, anchor offsets
//! and color presets. Nothing here is persisted at runtime.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables (`ASTRO_*`)
//! 3. TOML configuration file (`$XDG_CONFIG_HOME/astro/astro.toml`)
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [movement]
//! shrink_ms = 300
//! travel_ms = 700
//! debounce_ms = 150
//!
//! [curve]
//! sway = 60.0
//! easing = "ease-in-out-cubic"
//!
//! [trail]
//! count = 8
//! stagger_ms = 25
//! accent_color = "#7c5cff"
//!
//! [blink]
//! interval_ms = 4000
//! variation_ms = 3800
//!
//! [anchors]
//! top_y = 90.0
//! edge_margin = 24.0
//!
//! [colors]
//! teal = "#008080"
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::EasingFunction;
use crate::color::{ColorPresets, Rgb};
use crate::geometry::{GazePoint, Viewport};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Phase timing for movement tasks
#[derive(Clone, Debug, PartialEq)]
pub struct MovementConfig {
    /// Time the shrink animation is given before the trail takes over
    pub shrink_duration: Duration,
    /// Settle time between trail reveal and travel
    pub pre_travel_delay: Duration,
    /// Time the lead indicator takes to traverse the trajectory
    pub travel_duration: Duration,
    /// Hold after the end-state trigger before the next queued move may start
    pub return_duration: Duration,
    /// Debounce window for lifecycle-driven moves
    pub debounce: Duration,
    /// Settle delay before following a freshly shown response
    pub settle_delay: Duration,
    /// Rendering refresh interval used by the gaze loop
    pub frame_interval: Duration,
    /// Upper bound on waiting for the character collaborator
    pub ready_timeout: Duration,
    /// Poll interval while waiting for the character collaborator
    pub ready_poll_interval: Duration,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            shrink_duration: Duration::from_millis(300),
            pre_travel_delay: Duration::from_millis(50),
            travel_duration: Duration::from_millis(700),
            return_duration: Duration::from_millis(250),
            debounce: Duration::from_millis(150),
            settle_delay: Duration::from_millis(300),
            frame_interval: Duration::from_millis(16),
            ready_timeout: Duration::from_secs(3),
            ready_poll_interval: Duration::from_millis(50),
        }
    }
}

/// Shape of the travel curve
#[derive(Clone, Debug, PartialEq)]
pub struct CurveConfig {
    /// Base perpendicular offset of the first control point, in pixels
    pub sway: f64,
    /// Random variation applied to the sway (0.15 = +/-15%)
    pub sway_jitter: f64,
    /// Fraction along the line where the first control point sits
    pub first_control: f64,
    /// Fraction along the line where the second control point sits
    pub second_control: f64,
    /// Second control point offset relative to the first
    pub second_sway_ratio: f64,
    /// Sway is capped at this fraction of the travel distance
    pub max_sway_fraction: f64,
    /// Timing curve for the travel phase
    pub easing: EasingFunction,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            sway: 60.0,
            sway_jitter: 0.15,
            first_control: 0.33,
            second_control: 0.66,
            second_sway_ratio: 0.65,
            max_sway_fraction: 0.5,
            easing: EasingFunction::EaseInOutCubic,
        }
    }
}

/// Trail indicator styling and choreography
#[derive(Clone, Debug, PartialEq)]
pub struct TrailConfig {
    /// Number of trailing indicators behind the lead
    pub count: usize,
    /// Start delay added per trail index
    pub stagger: Duration,
    /// Opacity lost per trail index
    pub opacity_falloff: f64,
    /// Scale lost per trail index
    pub scale_falloff: f64,
    /// Floor for indicator opacity
    pub min_opacity: f64,
    /// Floor for indicator scale
    pub min_scale: f64,
    /// Blur added per trail index, in pixels
    pub blur_step: f64,
    /// Dot diameter in pixels
    pub dot_size: f64,
    /// Dot fill color
    pub dot_color: Rgb,
    /// Neutral tone the lead fades from
    pub lead_fade_from: Rgb,
    /// Theme accent the lead fades to
    pub accent_color: Rgb,
    /// Duration of the lead color fade
    pub lead_fade_duration: Duration,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            count: 8,
            stagger: Duration::from_millis(25),
            opacity_falloff: 0.1,
            scale_falloff: 0.08,
            min_opacity: 0.1,
            min_scale: 0.2,
            blur_step: 0.5,
            dot_size: 12.0,
            dot_color: Rgb::new(124, 92, 255),
            lead_fade_from: Rgb::new(26, 26, 26),
            accent_color: Rgb::new(124, 92, 255),
            lead_fade_duration: Duration::from_millis(400),
        }
    }
}

/// Gaze smoothing and input latency
#[derive(Clone, Debug, PartialEq)]
pub struct GazeConfig {
    /// Fraction of the remaining distance covered per tick (0, 1]
    pub smoothing: f64,
    /// Latency applied to pointer and caret targets
    pub input_delay: Duration,
    /// Pixel distance from the agent that maps to the edge of the gaze range
    pub look_range: f64,
    /// Remaining distance below which ticks stop updating
    pub epsilon: f64,
    /// Look direction while bored
    pub boredom_target: GazePoint,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.12,
            input_delay: Duration::from_millis(60),
            look_range: 400.0,
            epsilon: 0.05,
            boredom_target: GazePoint::new(80.0, 20.0),
        }
    }
}

/// Inactivity windows for typing and boredom
#[derive(Clone, Debug, PartialEq)]
pub struct IdleConfig {
    /// Inactivity before boredom kicks in
    pub boredom_timeout: Duration,
    /// Inactivity after the last keystroke before typing is considered over
    pub typing_timeout: Duration,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            boredom_timeout: Duration::from_secs(15),
            typing_timeout: Duration::from_millis(1500),
        }
    }
}

/// Blink cadence
#[derive(Clone, Debug, PartialEq)]
pub struct BlinkConfig {
    /// Base interval between blinks
    pub base_interval: Duration,
    /// Uniform variation applied in both directions
    pub variation: Duration,
    /// Interval floor
    pub min_interval: Duration,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(4000),
            variation: Duration::from_millis(3800),
            min_interval: Duration::from_millis(250),
        }
    }
}

/// Anchor placement relative to UI elements
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorConfig {
    /// Vertical position of the off-screen parking spot (negative = above the top edge)
    pub offscreen_y: f64,
    /// Vertical position of the top-middle anchor
    pub top_y: f64,
    /// Distance above a focused element
    pub above_offset: f64,
    /// Horizontal offset when resting near a sent message
    pub near_offset_x: f64,
    /// Vertical offset when resting near a sent message
    pub near_offset_y: f64,
    /// Derived anchors stay at least this far inside the viewport
    pub edge_margin: f64,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            offscreen_y: -120.0,
            top_y: 90.0,
            above_offset: 70.0,
            near_offset_x: 36.0,
            near_offset_y: -48.0,
            edge_margin: 24.0,
        }
    }
}

/// Centralized configuration for the engine
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct AstroConfig {
    /// Movement phase timing
    pub movement: MovementConfig,
    /// Curve shape
    pub curve: CurveConfig,
    /// Trail styling
    pub trail: TrailConfig,
    /// Gaze smoothing
    pub gaze: GazeConfig,
    /// Typing and boredom windows
    pub idle: IdleConfig,
    /// Blink cadence
    pub blink: BlinkConfig,
    /// Anchor offsets
    pub anchors: AnchorConfig,
    /// Named color presets
    pub colors: ColorPresets,
    /// Initial viewport
    pub viewport: Viewport,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    source: ConfigSource,
}

impl Default for AstroConfig {
    fn default() -> Self {
        Self {
            movement: MovementConfig::default(),
            curve: CurveConfig::default(),
            trail: TrailConfig::default(),
            gaze: GazeConfig::default(),
            idle: IdleConfig::default(),
            blink: BlinkConfig::default(),
            anchors: AnchorConfig::default(),
            colors: ColorPresets::default(),
            viewport: Viewport::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl AstroConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Short, deterministic timings for tests
    #[must_use]
    pub fn for_testing() -> Self {
        let mut config = Self::default();
        config.movement.ready_timeout = Duration::from_millis(200);
        config.movement.ready_poll_interval = Duration::from_millis(10);
        config.curve.sway_jitter = 0.0;
        config
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check value ranges that would otherwise produce degenerate motion
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: String| Err(ConfigError::ValidationError(msg));

        if !(self.gaze.smoothing > 0.0 && self.gaze.smoothing <= 1.0) {
            return fail(format!(
                "gaze.smoothing must be in (0, 1], got {}",
                self.gaze.smoothing
            ));
        }
        if self.gaze.look_range <= 0.0 {
            return fail(format!(
                "gaze.look_range must be positive, got {}",
                self.gaze.look_range
            ));
        }
        if self.gaze.epsilon <= 0.0 {
            return fail(format!(
                "gaze.epsilon must be positive, got {}",
                self.gaze.epsilon
            ));
        }
        for (name, fraction) in [
            ("curve.first_control", self.curve.first_control),
            ("curve.second_control", self.curve.second_control),
            ("curve.max_sway_fraction", self.curve.max_sway_fraction),
            ("curve.sway_jitter", self.curve.sway_jitter),
            ("curve.second_sway_ratio", self.curve.second_sway_ratio),
            ("trail.opacity_falloff", self.trail.opacity_falloff),
            ("trail.scale_falloff", self.trail.scale_falloff),
            ("trail.min_opacity", self.trail.min_opacity),
            ("trail.min_scale", self.trail.min_scale),
        ] {
            if !(0.0..=1.0).contains(&fraction) {
                return fail(format!("{name} must be in [0, 1], got {fraction}"));
            }
        }
        if self.anchors.edge_margin < 0.0 {
            return fail(format!(
                "anchors.edge_margin must not be negative, got {}",
                self.anchors.edge_margin
            ));
        }
        if self.curve.sway < 0.0 {
            return fail(format!("curve.sway must not be negative, got {}", self.curve.sway));
        }
        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return fail(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            ));
        }
        if self.movement.frame_interval.is_zero() {
            return fail("movement.frame_interval must be non-zero".to_string());
        }
        if self.movement.ready_poll_interval.is_zero() {
            return fail("movement.ready_poll_interval must be non-zero".to_string());
        }
        if self.blink.min_interval.is_zero() {
            return fail("blink.min_interval must be non-zero".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Movement section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementToml {
    /// Shrink phase duration in milliseconds
    pub shrink_ms: Option<u64>,
    /// Pre-travel settle delay in milliseconds
    pub pre_travel_ms: Option<u64>,
    /// Travel duration in milliseconds
    pub travel_ms: Option<u64>,
    /// Post-arrival hold in milliseconds
    pub return_ms: Option<u64>,
    /// Debounce window in milliseconds
    pub debounce_ms: Option<u64>,
    /// Response settle delay in milliseconds
    pub settle_ms: Option<u64>,
    /// Frame interval in milliseconds
    pub frame_ms: Option<u64>,
    /// Collaborator ready timeout in milliseconds
    pub ready_timeout_ms: Option<u64>,
    /// Collaborator ready poll interval in milliseconds
    pub ready_poll_ms: Option<u64>,
}

/// Curve section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveToml {
    /// Base sway in pixels
    pub sway: Option<f64>,
    /// Sway jitter fraction
    pub sway_jitter: Option<f64>,
    /// First control point fraction
    pub first_control: Option<f64>,
    /// Second control point fraction
    pub second_control: Option<f64>,
    /// Second sway ratio
    pub second_sway_ratio: Option<f64>,
    /// Sway cap as a fraction of the travel distance
    pub max_sway_fraction: Option<f64>,
    /// Easing name (e.g. "ease-in-out-cubic")
    pub easing: Option<String>,
}

/// Trail section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailToml {
    /// Trailing indicator count
    pub count: Option<usize>,
    /// Stagger per index in milliseconds
    pub stagger_ms: Option<u64>,
    /// Opacity falloff per index
    pub fade: Option<f64>,
    /// Scale falloff per index
    pub scale: Option<f64>,
    /// Opacity floor
    pub min_opacity: Option<f64>,
    /// Scale floor
    pub min_scale: Option<f64>,
    /// Blur per index in pixels
    pub blur: Option<f64>,
    /// Dot size in pixels
    pub dot_size: Option<f64>,
    /// Dot color as `#rrggbb`
    pub dot_color: Option<String>,
    /// Accent color as `#rrggbb`
    pub accent_color: Option<String>,
    /// Lead fade start color as `#rrggbb`
    pub lead_fade_from: Option<String>,
    /// Lead fade duration in milliseconds
    pub lead_fade_ms: Option<u64>,
}

/// Gaze section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeToml {
    /// Smoothing factor
    pub smoothing: Option<f64>,
    /// Input delay in milliseconds
    pub delay_ms: Option<u64>,
    /// Look range in pixels
    pub look_range: Option<f64>,
    /// Settling threshold in 0-100 space
    pub epsilon: Option<f64>,
    /// Boredom look target `[x, y]` in 0-100 space
    pub boredom_target: Option<[f64; 2]>,
}

/// Idle section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleToml {
    /// Boredom timeout in milliseconds
    pub boredom_timeout_ms: Option<u64>,
    /// Typing inactivity window in milliseconds
    pub typing_timeout_ms: Option<u64>,
}

/// Blink section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkToml {
    /// Base interval in milliseconds
    pub interval_ms: Option<u64>,
    /// Variation in milliseconds
    pub variation_ms: Option<u64>,
    /// Minimum interval in milliseconds
    pub min_ms: Option<u64>,
}

/// Anchors section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorToml {
    /// Off-screen parking height
    pub offscreen_y: Option<f64>,
    /// Top-middle anchor height
    pub top_y: Option<f64>,
    /// Distance above a focused element
    pub above_offset: Option<f64>,
    /// Horizontal offset beside a sent message
    pub near_offset_x: Option<f64>,
    /// Vertical offset beside a sent message
    pub near_offset_y: Option<f64>,
    /// Minimum distance from the viewport edges
    pub edge_margin: Option<f64>,
}

/// Viewport section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportToml {
    /// Width in pixels
    pub width: Option<f64>,
    /// Height in pixels
    pub height: Option<f64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AstroToml {
    /// Movement section
    pub movement: MovementToml,
    /// Curve section
    pub curve: CurveToml,
    /// Trail section
    pub trail: TrailToml,
    /// Gaze section
    pub gaze: GazeToml,
    /// Idle section
    pub idle: IdleToml,
    /// Blink section
    pub blink: BlinkToml,
    /// Anchors section
    pub anchors: AnchorToml,
    /// Viewport section
    pub viewport: ViewportToml,
    /// Extra or replacement color presets (`name = "#rrggbb"`)
    pub colors: BTreeMap<String, String>,
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/astro/astro.toml` or
/// `~/.config/astro/astro.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("astro").join("astro.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// merged result fails validation. A missing config file is not an error.
pub fn load_config() -> Result<AstroConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed, or
/// if the merged configuration is invalid.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<AstroConfig, ConfigError> {
    let mut config = AstroConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: AstroToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, |key| std::env::var(key).ok());

    config.validate()?;
    Ok(config)
}

fn parse_color(field: &str, value: &str) -> Result<Rgb, ConfigError> {
    value
        .parse::<Rgb>()
        .map_err(|e| ConfigError::ValidationError(format!("{field}: {e}")))
}

fn parse_easing(value: &str) -> Result<EasingFunction, ConfigError> {
    value
        .parse::<EasingFunction>()
        .map_err(|e| ConfigError::ValidationError(format!("curve.easing: {e}")))
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut AstroConfig, toml: &AstroToml) -> Result<(), ConfigError> {
    let ms = Duration::from_millis;

    // Movement
    let movement = &mut config.movement;
    if let Some(v) = toml.movement.shrink_ms {
        movement.shrink_duration = ms(v);
    }
    if let Some(v) = toml.movement.pre_travel_ms {
        movement.pre_travel_delay = ms(v);
    }
    if let Some(v) = toml.movement.travel_ms {
        movement.travel_duration = ms(v);
    }
    if let Some(v) = toml.movement.return_ms {
        movement.return_duration = ms(v);
    }
    if let Some(v) = toml.movement.debounce_ms {
        movement.debounce = ms(v);
    }
    if let Some(v) = toml.movement.settle_ms {
        movement.settle_delay = ms(v);
    }
    if let Some(v) = toml.movement.frame_ms {
        movement.frame_interval = ms(v);
    }
    if let Some(v) = toml.movement.ready_timeout_ms {
        movement.ready_timeout = ms(v);
    }
    if let Some(v) = toml.movement.ready_poll_ms {
        movement.ready_poll_interval = ms(v);
    }

    // Curve
    let curve = &mut config.curve;
    if let Some(v) = toml.curve.sway {
        curve.sway = v;
    }
    if let Some(v) = toml.curve.sway_jitter {
        curve.sway_jitter = v;
    }
    if let Some(v) = toml.curve.first_control {
        curve.first_control = v;
    }
    if let Some(v) = toml.curve.second_control {
        curve.second_control = v;
    }
    if let Some(v) = toml.curve.second_sway_ratio {
        curve.second_sway_ratio = v;
    }
    if let Some(v) = toml.curve.max_sway_fraction {
        curve.max_sway_fraction = v;
    }
    if let Some(ref name) = toml.curve.easing {
        curve.easing = parse_easing(name)?;
    }

    // Trail
    let trail = &mut config.trail;
    if let Some(v) = toml.trail.count {
        trail.count = v;
    }
    if let Some(v) = toml.trail.stagger_ms {
        trail.stagger = ms(v);
    }
    if let Some(v) = toml.trail.fade {
        trail.opacity_falloff = v;
    }
    if let Some(v) = toml.trail.scale {
        trail.scale_falloff = v;
    }
    if let Some(v) = toml.trail.min_opacity {
        trail.min_opacity = v;
    }
    if let Some(v) = toml.trail.min_scale {
        trail.min_scale = v;
    }
    if let Some(v) = toml.trail.blur {
        trail.blur_step = v;
    }
    if let Some(v) = toml.trail.dot_size {
        trail.dot_size = v;
    }
    if let Some(ref v) = toml.trail.dot_color {
        trail.dot_color = parse_color("trail.dot_color", v)?;
    }
    if let Some(ref v) = toml.trail.accent_color {
        trail.accent_color = parse_color("trail.accent_color", v)?;
    }
    if let Some(ref v) = toml.trail.lead_fade_from {
        trail.lead_fade_from = parse_color("trail.lead_fade_from", v)?;
    }
    if let Some(v) = toml.trail.lead_fade_ms {
        trail.lead_fade_duration = ms(v);
    }

    // Gaze
    if let Some(v) = toml.gaze.smoothing {
        config.gaze.smoothing = v;
    }
    if let Some(v) = toml.gaze.delay_ms {
        config.gaze.input_delay = ms(v);
    }
    if let Some(v) = toml.gaze.look_range {
        config.gaze.look_range = v;
    }
    if let Some(v) = toml.gaze.epsilon {
        config.gaze.epsilon = v;
    }
    if let Some([x, y]) = toml.gaze.boredom_target {
        config.gaze.boredom_target = GazePoint::new(x, y);
    }

    // Idle
    if let Some(v) = toml.idle.boredom_timeout_ms {
        config.idle.boredom_timeout = ms(v);
    }
    if let Some(v) = toml.idle.typing_timeout_ms {
        config.idle.typing_timeout = ms(v);
    }

    // Blink
    if let Some(v) = toml.blink.interval_ms {
        config.blink.base_interval = ms(v);
    }
    if let Some(v) = toml.blink.variation_ms {
        config.blink.variation = ms(v);
    }
    if let Some(v) = toml.blink.min_ms {
        config.blink.min_interval = ms(v);
    }

    // Anchors
    let anchors = &mut config.anchors;
    if let Some(v) = toml.anchors.offscreen_y {
        anchors.offscreen_y = v;
    }
    if let Some(v) = toml.anchors.top_y {
        anchors.top_y = v;
    }
    if let Some(v) = toml.anchors.above_offset {
        anchors.above_offset = v;
    }
    if let Some(v) = toml.anchors.near_offset_x {
        anchors.near_offset_x = v;
    }
    if let Some(v) = toml.anchors.near_offset_y {
        anchors.near_offset_y = v;
    }
    if let Some(v) = toml.anchors.edge_margin {
        anchors.edge_margin = v;
    }

    // Viewport
    if let Some(v) = toml.viewport.width {
        config.viewport.width = v;
    }
    if let Some(v) = toml.viewport.height {
        config.viewport.height = v;
    }

    for (name, hex) in &toml.colors {
        let rgb = parse_color(&format!("colors.{name}"), hex)?;
        config.colors.insert(name.clone(), rgb);
    }

    Ok(())
}

/// Apply environment variable overrides to the config
///
/// `lookup` abstracts `std::env::var` so tests do not race on process state.
fn apply_env_config(config: &mut AstroConfig, lookup: impl Fn(&str) -> Option<String>) {
    let env_ms = |key: &str, slot: &mut Duration| {
        if let Some(ms) = lookup(key).and_then(|v| v.parse::<u64>().ok()) {
            *slot = Duration::from_millis(ms);
            true
        } else {
            false
        }
    };

    let mut touched = false;
    touched |= env_ms("ASTRO_SHRINK_MS", &mut config.movement.shrink_duration);
    touched |= env_ms("ASTRO_TRAVEL_MS", &mut config.movement.travel_duration);
    touched |= env_ms("ASTRO_DEBOUNCE_MS", &mut config.movement.debounce);
    touched |= env_ms("ASTRO_BOREDOM_TIMEOUT_MS", &mut config.idle.boredom_timeout);
    touched |= env_ms("ASTRO_BLINK_INTERVAL_MS", &mut config.blink.base_interval);

    if let Some(count) = lookup("ASTRO_TRAIL_COUNT").and_then(|v| v.parse::<usize>().ok()) {
        config.trail.count = count;
        touched = true;
    }
    if let Some(easing) = lookup("ASTRO_EASING").and_then(|v| v.parse::<EasingFunction>().ok()) {
        config.curve.easing = easing;
        touched = true;
    }

    if touched {
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Viewport override
    pub viewport: Option<Viewport>,

    /// Travel duration override (milliseconds)
    pub travel_ms: Option<u64>,

    /// Trail count override
    pub trail_count: Option<usize>,

    /// Easing override
    pub easing: Option<EasingFunction>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set viewport override
    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Set travel duration override
    #[must_use]
    pub fn with_travel_ms(mut self, ms: u64) -> Self {
        self.travel_ms = Some(ms);
        self
    }

    /// Set trail count override
    #[must_use]
    pub fn with_trail_count(mut self, count: usize) -> Self {
        self.trail_count = Some(count);
        self
    }

    /// Set easing override
    #[must_use]
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut AstroConfig) {
        if self.viewport.is_some()
            || self.travel_ms.is_some()
            || self.trail_count.is_some()
            || self.easing.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(viewport) = self.viewport {
            config.viewport = viewport;
        }
        if let Some(ms) = self.travel_ms {
            config.movement.travel_duration = Duration::from_millis(ms);
        }
        if let Some(count) = self.trail_count {
            config.trail.count = count;
        }
        if let Some(easing) = self.easing {
            config.curve.easing = easing;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // =========================================================================
    // Default Configuration Tests
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = AstroConfig::default();

        assert_eq!(config.movement.travel_duration, Duration::from_millis(700));
        assert_eq!(config.trail.count, 8);
        assert_eq!(config.curve.first_control, 0.33);
        assert_eq!(config.curve.second_control, 0.66);
        assert_eq!(config.curve.second_sway_ratio, 0.65);
        assert_eq!(config.curve.sway_jitter, 0.15);
        assert_eq!(config.idle.typing_timeout, Duration::from_millis(1500));
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config =
            load_config_from_path(Some(PathBuf::from("/nonexistent/astro/astro.toml"))).unwrap();
        assert!(config.config_file_path.is_none());
    }

    // =========================================================================
    // File Loading Tests
    // =========================================================================

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r##"
[movement]
travel_ms = 900
debounce_ms = 80

[curve]
sway = 42.0
easing = "ease-out-back"

[trail]
count = 4
accent_color = "#ff0000"

[gaze]
boredom_target = [10.0, 90.0]

[colors]
teal = "#008080"
"##
        )
        .unwrap();

        let mut config = AstroConfig::default();
        let toml: AstroToml =
            toml::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        apply_toml_config(&mut config, &toml).unwrap();

        assert_eq!(config.movement.travel_duration, Duration::from_millis(900));
        assert_eq!(config.movement.debounce, Duration::from_millis(80));
        assert_eq!(config.curve.sway, 42.0);
        assert_eq!(config.curve.easing, EasingFunction::EaseOutBack);
        assert_eq!(config.trail.count, 4);
        assert_eq!(config.trail.accent_color, Rgb::new(255, 0, 0));
        assert_eq!(config.gaze.boredom_target, GazePoint::new(10.0, 90.0));
        assert_eq!(config.colors.get("teal"), Some(Rgb::new(0, 128, 128)));
        // Untouched values keep their defaults
        assert_eq!(config.movement.shrink_duration, Duration::from_millis(300));
    }

    #[test]
    fn test_toml_sets_fine_tuning_and_anchors() {
        let toml: AstroToml = toml::from_str(
            r##"
[movement]
ready_poll_ms = 20

[curve]
max_sway_fraction = 0.25

[trail]
min_opacity = 0.3
min_scale = 0.4
lead_fade_from = "#000000"

[gaze]
epsilon = 0.5

[anchors]
offscreen_y = -200.0
top_y = 64.0
edge_margin = 8.0
"##,
        )
        .unwrap();
        let mut config = AstroConfig::default();
        apply_toml_config(&mut config, &toml).unwrap();

        assert_eq!(config.movement.ready_poll_interval, Duration::from_millis(20));
        assert_eq!(config.curve.max_sway_fraction, 0.25);
        assert_eq!(config.trail.min_opacity, 0.3);
        assert_eq!(config.trail.min_scale, 0.4);
        assert_eq!(config.trail.lead_fade_from, Rgb::new(0, 0, 0));
        assert_eq!(config.gaze.epsilon, 0.5);
        assert_eq!(config.anchors.offscreen_y, -200.0);
        assert_eq!(config.anchors.top_y, 64.0);
        assert_eq!(config.anchors.edge_margin, 8.0);
        assert_eq!(config.anchors.above_offset, AnchorConfig::default().above_offset);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_from_path_sets_source() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[blink]\ninterval_ms = 5000").unwrap();

        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.blink.base_interval, Duration::from_millis(5000));
        assert_eq!(config.config_file_path, Some(file.path().to_path_buf()));
        assert!(matches!(
            config.source(),
            ConfigSource::File | ConfigSource::Env
        ));
    }

    #[test]
    fn test_bad_color_is_rejected() {
        let toml: AstroToml = toml::from_str("[trail]\ndot_color = \"blue\"").unwrap();
        let err = apply_toml_config(&mut AstroConfig::default(), &toml).unwrap_err();
        assert!(err.to_string().contains("trail.dot_color"));
    }

    #[test]
    fn test_bad_easing_is_rejected() {
        let toml: AstroToml = toml::from_str("[curve]\neasing = \"wobble\"").unwrap();
        assert!(apply_toml_config(&mut AstroConfig::default(), &toml).is_err());
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[movement\ntravel_ms = ").unwrap();
        let err = load_config_from_path(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    // =========================================================================
    // Environment Tests
    // =========================================================================

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("ASTRO_TRAVEL_MS", "1200"),
            ("ASTRO_TRAIL_COUNT", "3"),
            ("ASTRO_EASING", "linear"),
            ("ASTRO_SHRINK_MS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = AstroConfig::default();
        apply_env_config(&mut config, |key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.movement.travel_duration, Duration::from_millis(1200));
        assert_eq!(config.trail.count, 3);
        assert_eq!(config.curve.easing, EasingFunction::Linear);
        assert_eq!(config.movement.shrink_duration, Duration::from_millis(300));
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_env_untouched_keeps_source() {
        let mut config = AstroConfig::default();
        apply_env_config(&mut config, |_| None);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    // =========================================================================
    // ConfigOverrides Tests
    // =========================================================================

    #[test]
    fn test_cli_overrides_env() {
        let mut config = AstroConfig::default();
        config.movement.travel_duration = Duration::from_millis(1200);
        config.set_source(ConfigSource::Env);

        ConfigOverrides::new()
            .with_travel_ms(500)
            .with_viewport(Viewport::new(800.0, 600.0))
            .apply(&mut config);

        assert_eq!(config.movement.travel_duration, Duration::from_millis(500));
        assert_eq!(config.viewport, Viewport::new(800.0, 600.0));
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_config_overrides_empty_no_change() {
        let mut config = AstroConfig::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    // =========================================================================
    // Validation Tests
    // =========================================================================

    #[test]
    fn test_validation_failures() {
        let mut config = AstroConfig::default();
        config.gaze.smoothing = 0.0;
        assert!(config.validate().is_err());

        let mut config = AstroConfig::default();
        config.curve.first_control = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("curve.first_control"));

        let mut config = AstroConfig::default();
        config.viewport = Viewport::new(0.0, 100.0);
        assert!(config.validate().is_err());

        let mut config = AstroConfig::default();
        config.curve.second_sway_ratio = 1.2;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("curve.second_sway_ratio"));

        let mut config = AstroConfig::default();
        config.trail.min_scale = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("trail.min_scale"));

        let mut config = AstroConfig::default();
        config.anchors.edge_margin = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::Cli), "CLI");
        assert_eq!(format!("{}", ConfigSource::Env), "environment");
        assert_eq!(format!("{}", ConfigSource::File), "config file");
        assert_eq!(format!("{}", ConfigSource::Default), "default");
    }
}

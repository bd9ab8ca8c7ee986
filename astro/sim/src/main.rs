//! Astro Sim - Headless Lifecycle Driver
//!
//! Loads the engine configuration, wires the engine to logging collaborators
//! and replays a script of lifecycle events, so movement timing and
//! character triggers can be inspected without a UI.
//!
//! # Usage
//!
//! ```bash
//! # Built-in demo conversation
//! astro-sim
//!
//! # Replay a JSON-lines script
//! astro-sim --script session.jsonl
//!
//! # Custom config file and viewport
//! astro-sim --config ./astro.toml --width 1920 --height 1080
//!
//! # Verbose logging
//! RUST_LOG=astro_core=debug astro-sim
//! ```

mod collaborators;
mod script;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use astro_core::{
    load_config_from_path, default_config_path, AstroConfig, CharacterLink, ConfigOverrides,
    EasingFunction, LifecycleBridge, LifecycleEvent, Viewport,
};

use collaborators::{LoggingCharacter, LoggingSurface};

/// Astro Sim - replay lifecycle events through the movement engine
#[derive(Parser, Debug)]
#[command(name = "astro-sim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "ASTRO_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON-lines event script (built-in demo when omitted)
    #[arg(short = 's', long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, requires = "height")]
    width: Option<f64>,

    /// Viewport height in pixels
    #[arg(long, requires = "width")]
    height: Option<f64>,

    /// Travel duration override (milliseconds)
    #[arg(long, value_name = "MS")]
    travel_ms: Option<u64>,

    /// Trail indicator count override
    #[arg(long, value_name = "N")]
    trail_count: Option<usize>,

    /// Easing override (e.g. ease-in-out-cubic)
    #[arg(long)]
    easing: Option<EasingFunction>,

    /// Simulated character load time (milliseconds)
    #[arg(long, default_value_t = 250, value_name = "MS")]
    character_load_ms: u64,

    /// Print the final engine snapshot as JSON
    #[arg(long)]
    snapshot: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "ASTRO_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let (Some(width), Some(height)) = (self.width, self.height) {
            overrides = overrides.with_viewport(Viewport::new(width, height));
        }
        if let Some(ms) = self.travel_ms {
            overrides = overrides.with_travel_ms(ms);
        }
        if let Some(count) = self.trail_count {
            overrides = overrides.with_trail_count(count);
        }
        if let Some(easing) = self.easing {
            overrides = overrides.with_easing(easing);
        }
        overrides
    }
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("astro_sim={level},astro_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn load(args: &Args) -> Result<AstroConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config
        .validate()
        .context("Invalid configuration after CLI overrides")?;
    Ok(config)
}

async fn load_events(args: &Args) -> Result<Vec<LifecycleEvent>> {
    match &args.script {
        Some(path) => {
            let source = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read script: {}", path.display()))?;
            script::parse_script(&source)
                .with_context(|| format!("Failed to parse script: {}", path.display()))
        }
        None => Ok(script::demo_script()),
    }
}

async fn replay(bridge: &LifecycleBridge, events: Vec<LifecycleEvent>) {
    for event in events {
        let name = event.name();
        if let Err(e) = bridge.handle_event(event).await {
            warn!(event = name, error = %e, "Event rejected");
        }
    }
    bridge.wait_idle().await;
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("Astro sim starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = load(&args)?;
    info!(source = %config.source(), viewport = ?config.viewport, "Configuration loaded");

    let events = load_events(&args).await?;
    info!(events = events.len(), "Script loaded");

    let character = Arc::new(LoggingCharacter::new(Duration::from_millis(
        args.character_load_ms,
    )));
    let surface = Arc::new(LoggingSurface::new(config.movement.frame_interval));
    let bridge = LifecycleBridge::new(config, surface, CharacterLink::with_machine(character.clone()));
    bridge.start();

    tokio::select! {
        () = replay(&bridge, events) => {
            info!(triggers = character.fired(), "Script finished");
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for Ctrl-C");
            }
            info!("Interrupted, shutting down");
        }
    }

    bridge.shutdown();

    if args.snapshot {
        let snapshot = serde_json::to_string_pretty(&bridge.snapshot())?;
        println!("{snapshot}");
    }

    Ok(())
}

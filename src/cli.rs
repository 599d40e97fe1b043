use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::core::config::{LoopConfig, ManagerConfig};
use crate::core::engine::Engine;
use crate::core::manager::ManagerSlot;
use crate::scene::Scene;

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(about = "Runs a scripted scene through the state manager")]
#[command(version)]
pub struct Cli {
    /// JSON manager config (states and dispatch table)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ticks to run; 0 runs until Ctrl-C
    #[arg(short, long, default_value_t = 40)]
    pub ticks: u64,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = 16)]
    pub tick_rate_ms: u64,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ManagerConfig::load(path)?,
        None => ManagerConfig::default(),
    };

    let mut slot = ManagerSlot::new();
    let manager = slot.activate(&config)?;

    let scene = Scene::demo();
    scene.register_all(manager);

    let loop_config = LoopConfig {
        tick_rate_ms: cli.tick_rate_ms,
        max_ticks: cli.ticks,
    };
    let ran = Engine::new(manager, loop_config).run().await?;

    for (i, spinner) in scene.spinners.iter().enumerate() {
        info!(spinner = i, angle = spinner.borrow().angle, "final angle");
    }
    info!(
        ticks = ran,
        director_cues = scene.director.borrow().played(),
        overlay_alpha = scene.overlay.borrow().alpha(),
        "scene finished"
    );
    Ok(())
}

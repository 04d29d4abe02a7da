//! Host runner: drives the engine against a simulated ILI9341 on an
//! emulated SPI bus and optionally dumps the final frame as a PPM image.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use ili9341::{Config, protocol};
use log::info;
use pocketplay_core::{
    Engine, EngineConfig, Restartable, StopSignal, Surface, gfx::EmulatedPanel,
    input::ScriptedInput,
};
use pocketplay_hal::TftDisplay;

use demo::{Budget, Table};
use sim::{SimBus, SimController, SimPin, StdClock, StdDelay};

#[path = "main/demo.rs"]
mod demo;
#[path = "main/sim.rs"]
mod sim;

static STOP: StopSignal = StopSignal::new();

#[derive(Parser)]
#[command(name = "pocketplay")]
#[command(version)]
#[command(about = "Runs the card-table demo on a simulated 240x320 ILI9341")]
struct Cli {
    /// Ticks to run before stopping
    #[arg(short, long, default_value_t = 90)]
    frames: u32,

    /// Target frame rate
    #[arg(long, default_value_t = 30)]
    fps: u16,

    /// Write the last frame to this PPM file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log draw failures and keep running instead of aborting
    #[arg(long)]
    isolate_errors: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let controller = SimController::shared(protocol::WIDTH, protocol::HEIGHT);
    let mut delay = StdDelay;
    let mut display = TftDisplay::new(
        SimBus(controller.clone()),
        SimPin::Dc(controller.clone()),
        SimPin::Idle,
        SimPin::Idle,
        Config::default(),
    );
    display
        .init(&mut delay)
        .map_err(|err| anyhow!("display init failed: {err:?}"))?;
    info!("sim: {} controller commands during init", controller.borrow().commands());

    let script = demo::script();
    let config = EngineConfig::default()
        .with_target_fps(cli.fps)
        .with_isolate_frame_errors(cli.isolate_errors);
    let mut engine = Engine::new(
        Surface::new(display),
        ScriptedInput::new(&script),
        StdClock::new(),
        delay,
        config,
    );

    let budget = Budget::new(cli.frames, &STOP);
    let mut game = Restartable::new(|| Table::new(&budget));
    let stats = engine
        .run(&mut game, &STOP)
        .map_err(|err| anyhow!("engine stopped: {err:?}"))?;

    info!(
        "ran {} ticks: {} drawn, {} resets, {} overruns, {} dropped frames",
        stats.ticks, stats.frames_drawn, stats.resets, stats.overruns, stats.frame_errors
    );
    info!("text cache: {:?}", engine.surface().cache_stats());

    if let Some(path) = cli.output {
        let controller = controller.borrow();
        write_ppm(&path, controller.panel())
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("frame written to {}", path.display());
    }

    Ok(())
}

fn write_ppm(path: &Path, panel: &EmulatedPanel) -> Result<()> {
    let (width, height) = pocketplay_core::Panel::size(panel);
    let mut out = BufWriter::new(File::create(path)?);

    write!(out, "P6\n{width} {height}\n255\n")?;
    for color in panel.pixels() {
        let (r, g, b) = color.to_rgb888();
        out.write_all(&[r, g, b])?;
    }
    out.flush()?;
    Ok(())
}

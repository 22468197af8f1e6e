use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use grid_snake::config::{FRAME_PERIOD, Settings, settings_path};
use grid_snake::frame_loop::GameLoop;
use grid_snake::game::{GameEngine, GameStatus};
use grid_snake::input::{GameInput, map_event};
use grid_snake::logging;
use grid_snake::terminal_runtime::{FramePacer, TerminalSession, install_panic_hook};
use tracing::info;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Board width in cells.
    #[arg(long)]
    width: Option<u16>,

    /// Board height in cells.
    #[arg(long)]
    height: Option<u16>,

    /// Milliseconds between rule evaluations.
    #[arg(long = "tick-ms")]
    tick_ms: Option<u64>,

    /// Seed for fruit placement, for reproducible rounds.
    #[arg(long)]
    seed: Option<u64>,

    /// Settings file; defaults to the platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append tracing output to this file.
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        logging::init(path)?;
    }

    let engine = build_engine(&cli)?;

    install_panic_hook();
    let mut session = TerminalSession::enter().context("failed to prepare terminal")?;
    run(&mut session, engine)?;

    Ok(())
}

fn build_engine(cli: &Cli) -> anyhow::Result<GameEngine> {
    let path = cli.config.clone().unwrap_or_else(settings_path);
    let file_settings = Settings::load(&path)?;
    let config = file_settings
        .merged_with(Settings {
            grid_width: cli.width,
            grid_height: cli.height,
            tick_interval_ms: cli.tick_ms,
        })
        .into_engine_config();
    config.validate()?;

    info!(
        settings = %path.display(),
        width = config.grid.width,
        height = config.grid.height,
        tick = ?config.tick_interval,
        "configuration loaded"
    );

    Ok(match cli.seed {
        Some(seed) => GameEngine::with_seed(config, seed),
        None => GameEngine::new(config),
    })
}

fn run(session: &mut TerminalSession, engine: GameEngine) -> anyhow::Result<()> {
    let mut game = GameLoop::new(engine, FramePacer::new(FRAME_PERIOD));
    let mut snapshot = game.snapshot();
    let mut dirty = true;

    loop {
        let now = Instant::now();
        if let Some(id) = game.scheduler_mut().take_due(now) {
            if let Some(next) = game.on_frame(id, now) {
                snapshot = next;
                dirty = true;
            }
        }

        if dirty {
            session.draw(&snapshot)?;
            dirty = false;
        }

        let Some(event) = session.next_event(game.scheduler())? else {
            continue;
        };

        // Resizes and ignored keys still need a redraw.
        dirty = true;
        match map_event(&event) {
            Some(GameInput::Quit) => break,
            Some(GameInput::Confirm) => {
                game.start();
                snapshot = game.snapshot();
            }
            Some(GameInput::Direction(direction)) => game.request_turn(direction),
            None => {}
        }
    }

    if game.engine().status() == GameStatus::Running {
        info!(score = game.snapshot().score, "quit during a running round");
    }
    game.stop();

    Ok(())
}

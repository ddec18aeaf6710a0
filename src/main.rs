//! CLI for walking the maze

use std::{
    fs::File,
    path::{Path, PathBuf},
    thread,
    time::Instant,
};

use anyhow::Context;
use clap::Parser;
use env_logger::{Env, Target};
use maze_walker::{
    game::{GameConfig, GameState},
    screen::Screen,
    terminal::{Keyboard, Terminal},
};

/// Find the way out of a maze, seen in first person
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze width in cells
    #[arg(long, default_value_t = 10)]
    width: usize,

    /// Maze height in cells
    #[arg(long, default_value_t = 10)]
    height: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Screen width in characters
    #[arg(long, default_value_t = 120)]
    screen_width: usize,

    /// Screen height in characters
    #[arg(long, default_value_t = 40)]
    screen_height: usize,

    /// Field of view in degrees
    #[arg(long, default_value_t = 45.0)]
    fov: f32,

    /// Frame rate limit; unlimited if not given
    #[arg(long)]
    max_fps: Option<u32>,

    /// File, where to write the log. Without it, log only when `RUST_LOG` is set.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Set up logging so that it does not draw over the game
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Could not create log file {}", path.display()))?;
            let env = Env::default().default_filter_or("info");
            let mut builder = env_logger::Builder::from_env(env);
            builder.target(Target::Pipe(Box::new(file)));
            builder
        }
        None => env_logger::Builder::from_env(Env::default().default_filter_or("off")),
    };
    builder.init();
    Ok(())
}

/// Run frames until the player quits
fn run(state: &mut GameState, screen: &mut Screen, terminal: &mut Terminal) -> anyhow::Result<()> {
    let mut keyboard = Keyboard::new(terminal.reports_key_release());
    let frame_budget = state.config().frame_budget();
    let mut last_frame = Instant::now();

    while state.is_running() {
        let frame_start = Instant::now();
        let elapsed = frame_start.duration_since(last_frame).as_secs_f32();
        last_frame = frame_start;

        let controls = keyboard.poll().context("Could not read keyboard")?;
        state.update(&controls, elapsed)?;
        state.render(screen);
        terminal.present(screen).context("Could not draw frame")?;

        if let Some(budget) = frame_budget {
            if let Some(rest) = budget.checked_sub(frame_start.elapsed()) {
                thread::sleep(rest);
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = GameConfig {
        maze_width: args.width,
        maze_height: args.height,
        screen_width: args.screen_width,
        screen_height: args.screen_height,
        fov: args.fov.to_radians(),
        seed: args.seed,
        max_fps: args.max_fps,
        ..GameConfig::default()
    };
    let mut state = GameState::new(config)?;
    let mut screen = Screen::new(args.screen_width, args.screen_height)?;

    // Restored on drop, also when the loop fails
    let mut terminal = Terminal::enter().context("Could not set up terminal")?;
    run(&mut state, &mut screen, &mut terminal)
}

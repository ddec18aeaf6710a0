//! CLI for maze generation

use clap::Parser;
use itertools::Itertools;
use maze_walker::maze_generator::MazeGenerator;

/// Print a randomly generated perfect maze
///
/// `#` is a wall, `.` open floor, `S` the start and `E` the exit.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze height in cells
    #[arg(long, default_value_t = 10)]
    height: usize,

    /// Maze width in cells
    #[arg(long, default_value_t = 10)]
    width: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Also print the cells in the order they were visited
    #[arg(long)]
    path: bool,
}

/// Generate maze, print output
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut gen = MazeGenerator::new(args.seed);
    let maze = gen.generate(args.width, args.height)?;
    println!("{maze}");
    if args.path {
        println!(
            "{}",
            maze.path()
                .iter()
                .map(|cell| format!("({}, {})", cell.x, cell.y))
                .join(" ")
        );
    }
    Ok(())
}

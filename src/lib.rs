//! Walk out of a randomly generated maze, seen in first person
//!
//! A perfect maze is carved with a randomized depth-first backtracker,
//! then drawn column by column with a ray caster into a grid of shading
//! characters.
//!
//! # Examples
//! ## Generate a maze
//! ```
//! use maze_walker::maze_generator::MazeGenerator;
//!
//! let mut gen = MazeGenerator::new(Some(7));
//! let maze = gen.generate(4, 3).unwrap();
//! assert_eq!((maze.map_width(), maze.map_height()), (9, 7));
//! assert_eq!(maze.path().len(), 12);
//! println!("{maze}");
//! ```
//!
//! ## Cast a ray through a hand-written layout
//! ```
//! use maze_walker::{geometry::Vector2f, raycast::RayCaster, Maze};
//!
//! let maze = Maze::parse_layout("#######\n#S....E\n#######").unwrap();
//! let caster = RayCaster::new(16.0);
//! // Looking left from x=3.5 hits the wall column at x=0
//! let d = caster.cast_distance(&maze, Vector2f::new(3.5, 1.5), std::f32::consts::PI);
//! assert!((d - 2.6).abs() < 1e-3);
//! ```

use std::fmt;

use itertools::Itertools;

pub mod error;
pub mod game;
pub mod geometry;
pub mod maze_generator;
pub mod raycast;
pub mod render;
pub mod screen;
pub mod terminal;

pub use error::{Error, Result};
use geometry::{Vector2f, Vector2n};

/// Content of one map grid cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Open,
}

/// Walled map of a maze, with start and exit positions
///
/// Map space has twice the resolution of maze space plus a border, so
/// maze cell `(c, r)` sits at map position `(2c + 1, 2r + 1)`.
#[derive(Clone, Debug)]
pub struct Maze {
    /// Number of maze cells on each axis
    maze_size: Vector2n,
    /// Number of map cells on each axis, always odd
    map_size: Vector2n,
    /// Map cells in row-major order
    tiles: Vec<Tile>,
    /// Maze cells in the order the generator visited them
    ///
    /// Empty for mazes read with [Self::parse_layout].
    path: Vec<Vector2n>,
    /// Player spawn, map space
    start: Vector2n,
    /// Opening in the outer wall, map space
    exit: Vector2n,
}

impl Maze {
    const S_WALL: char = '#';
    const S_OPEN: char = '.';
    const S_START: char = 'S';
    const S_EXIT: char = 'E';

    pub(crate) fn from_parts(
        maze_size: Vector2n,
        tiles: Vec<Tile>,
        path: Vec<Vector2n>,
        start: Vector2n,
        exit: Vector2n,
    ) -> Self {
        Self {
            maze_size,
            map_size: Vector2n::new(maze_size.x * 2 + 1, maze_size.y * 2 + 1),
            tiles,
            path,
            start,
            exit,
        }
    }

    /// Parse map from its text representation
    ///
    /// - `layout`: Rows separated by newlines. `#` is a wall, `.` open
    ///   floor, `S` the start and `E` the exit.
    ///
    /// Returns error, if layout contains unknown characters, rows differ
    /// in length, either dimension is even or smaller than three, or
    /// start and exit do not appear exactly once.
    ///
    /// # Examples
    /// ```
    /// use maze_walker::Maze;
    /// let layout = ["#####", "#S..#", "###.#", "#...#", "#E###"].join("\n");
    /// let maze = Maze::parse_layout(&layout).unwrap();
    /// assert_eq!(maze.maze_width(), 2);
    /// ```
    pub fn parse_layout(layout: &str) -> Result<Self> {
        let rows: Vec<Vec<char>> = layout
            .split('\n')
            .map(|row| row.trim_end_matches('\r').chars().collect())
            .collect();

        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width < 3 || height < 3 || width % 2 == 0 || height % 2 == 0 {
            return Err(Error::InvalidLayout {
                reason: format!("map must be odd-sized and at least 3x3, got {width}x{height}"),
            });
        }
        if i32::try_from(width * height).is_err() {
            return Err(Error::InvalidLayout {
                reason: format!("map of {width}x{height} cells is too large"),
            });
        }
        if let Some(y) = rows.iter().position(|row| row.len() != width) {
            return Err(Error::InvalidLayout {
                reason: format!("row {y} has {} cells, expected {width}", rows[y].len()),
            });
        }

        let mut start = None;
        let mut exit = None;
        let mut tiles = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.iter().enumerate() {
                let pos = Vector2n::new(x as i32, y as i32);
                let tile = match *c {
                    Self::S_WALL => Tile::Wall,
                    Self::S_OPEN => Tile::Open,
                    Self::S_START => {
                        Self::place_once(&mut start, pos, "start")?;
                        Tile::Open
                    }
                    Self::S_EXIT => {
                        Self::place_once(&mut exit, pos, "exit")?;
                        Tile::Open
                    }
                    glyph => return Err(Error::UnexpectedGlyph { glyph, y, x }),
                };
                tiles.push(tile);
            }
        }

        let missing = |what: &str| Error::InvalidLayout {
            reason: format!("{what} not found in layout"),
        };
        Ok(Self::from_parts(
            Vector2n::new((width as i32 - 1) / 2, (height as i32 - 1) / 2),
            tiles,
            Vec::new(),
            start.ok_or_else(|| missing("start"))?,
            exit.ok_or_else(|| missing("exit"))?,
        ))
    }

    fn place_once(slot: &mut Option<Vector2n>, pos: Vector2n, what: &str) -> Result<()> {
        if slot.replace(pos).is_some() {
            return Err(Error::InvalidLayout {
                reason: format!("more than one {what} in layout"),
            });
        }
        Ok(())
    }

    pub fn maze_width(&self) -> usize {
        self.maze_size.x as usize
    }

    pub fn maze_height(&self) -> usize {
        self.maze_size.y as usize
    }

    pub fn map_width(&self) -> usize {
        self.map_size.x as usize
    }

    pub fn map_height(&self) -> usize {
        self.map_size.y as usize
    }

    /// Maze cells in generation order
    pub fn path(&self) -> &[Vector2n] {
        &self.path
    }

    pub fn start(&self) -> Vector2n {
        self.start
    }

    pub fn exit(&self) -> Vector2n {
        self.exit
    }

    /// Whether `pos` is inside the map grid
    pub fn contains(&self, pos: Vector2n) -> bool {
        0 <= pos.x && pos.x < self.map_size.x && 0 <= pos.y && pos.y < self.map_size.y
    }

    /// Tile at map position, `None` outside the grid
    pub fn tile(&self, pos: Vector2n) -> Option<Tile> {
        if self.contains(pos) {
            Some(self.tiles[(pos.y * self.map_size.x + pos.x) as usize])
        } else {
            None
        }
    }

    /// Whether a continuous position lies on a wall cell
    ///
    /// Positions outside the grid are not walls.
    pub fn is_wall(&self, pos: Vector2f) -> bool {
        self.tile(pos.cell()) == Some(Tile::Wall)
    }

    /// Whether a continuous position is off limits for the player
    ///
    /// Unlike [Self::is_wall], positions outside the grid block movement.
    pub fn blocks(&self, pos: Vector2f) -> bool {
        self.tile(pos.cell()) != Some(Tile::Open)
    }

    /// Manhattan distance from the cell holding `pos` to the exit,
    /// normalised by the largest distance possible inside the border walls
    pub fn exit_distance(&self, pos: Vector2f) -> f32 {
        let span = (self.map_size.x - 2) + (self.map_size.y - 2);
        pos.cell().manhattan(self.exit) as f32 / span as f32
    }

    pub(crate) fn set_tile(&mut self, pos: Vector2n, tile: Tile) {
        if self.contains(pos) {
            self.tiles[(pos.y * self.map_size.x + pos.x) as usize] = tile;
        }
    }

    fn glyph(&self, pos: Vector2n) -> char {
        if pos == self.start {
            Self::S_START
        } else if pos == self.exit {
            Self::S_EXIT
        } else {
            match self.tile(pos) {
                Some(Tile::Open) => Self::S_OPEN,
                _ => Self::S_WALL,
            }
        }
    }
}

impl fmt::Display for Maze {
    /// Text layout, readable by [Maze::parse_layout]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = (0..self.map_size.y).map(|y| {
            (0..self.map_size.x)
                .map(|x| self.glyph(Vector2n::new(x, y)))
                .join("")
        });
        write!(f, "{}", rows.format("\n"))
    }
}

//! Map generation

use log::info;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::geometry::{Direction, Vector2n};
use crate::{Error, Maze, Result, Tile};

/// Perfect maze generator.
///
/// Owns the random number generator, so a seeded generator reproduces the
/// same sequence of mazes.
pub struct MazeGenerator {
    random: StdRng,
}

impl MazeGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            random: if let Some(state) = seed {
                StdRng::seed_from_u64(state)
            } else {
                StdRng::from_entropy()
            },
        }
    }

    /// Generate perfect maze (exactly one route between any two cells)
    ///
    /// - `width`, `height`: Size in maze cells. The map is
    ///   `(2 * width + 1) x (2 * height + 1)`.
    ///
    /// Returns error, if either dimension is zero or the map would not
    /// fit in `i32` coordinates.
    pub fn generate(&mut self, width: usize, height: usize) -> Result<Maze> {
        let size = checked_size(width, height)?;

        let path = self.generate_path(size);
        let tiles = carve_map(size, &path);
        let exit = exit_position(size, path[0]);
        let start = self.start_position(size, path[0]);

        let mut maze = Maze::from_parts(size, tiles, path, start, exit);
        maze.set_tile(exit, Tile::Open);

        info!(
            "Generated {}x{} maze, start ({}, {}), exit ({}, {})",
            width, height, start.x, start.y, exit.x, exit.y
        );
        Ok(maze)
    }

    /// Visit every maze cell with a randomized depth-first backtracker
    ///
    /// The walk begins on a random border cell. Returned cells are in
    /// visiting order; consecutive entries are not adjacent where the walk
    /// backtracked in between.
    fn generate_path(&mut self, size: Vector2n) -> Vec<Vector2n> {
        let total = (size.x * size.y) as usize;
        let start = if self.random.gen_bool(0.5) {
            Vector2n::new(
                self.random.gen_range(0..size.x),
                self.random.gen_range(0..2) * (size.y - 1),
            )
        } else {
            Vector2n::new(
                self.random.gen_range(0..2) * (size.x - 1),
                self.random.gen_range(0..size.y),
            )
        };

        let mut visited = vec![false; total];
        visited[cell_index(size, start)] = true;
        let mut path = Vec::with_capacity(total);
        path.push(start);
        let mut breadcrumbs = vec![start];

        while path.len() < total {
            let Some(&current) = breadcrumbs.last() else {
                break;
            };
            let available: Vec<Vector2n> = Direction::ALL
                .iter()
                .map(|dir| current + dir.to_vector())
                .filter(|next| in_bounds(size, *next) && !visited[cell_index(size, *next)])
                .collect();

            match available.choose(&mut self.random) {
                Some(&next) => {
                    visited[cell_index(size, next)] = true;
                    path.push(next);
                    breadcrumbs.push(next);
                }
                None => {
                    breadcrumbs.pop();
                }
            }
        }
        path
    }

    /// Pick a spawn cell in the half of each axis away from the exit
    fn start_position(&mut self, size: Vector2n, first: Vector2n) -> Vector2n {
        let mut pick = |len: i32, exit_at: i32| {
            let half = len / 2;
            if exit_at < half {
                self.random.gen_range(half..len)
            } else {
                self.random.gen_range(0..(len + 1) / 2)
            }
        };
        let cell = Vector2n::new(pick(size.x, first.x), pick(size.y, first.y));
        to_map(cell)
    }
}

/// Maze size in cells, if both dimensions are positive and the whole
/// `(2w + 1) x (2h + 1)` map can be indexed with `i32`
pub(crate) fn checked_size(width: usize, height: usize) -> Result<Vector2n> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    let too_large = || Error::TooLarge { width, height };
    let map_extent = |len: usize| {
        i32::try_from(len)
            .ok()
            .and_then(|n| n.checked_mul(2))
            .and_then(|n| n.checked_add(1))
            .ok_or_else(too_large)
    };
    let (map_w, map_h) = (map_extent(width)?, map_extent(height)?);
    map_w.checked_mul(map_h).ok_or_else(too_large)?;
    Ok(Vector2n::new(width as i32, height as i32))
}

fn in_bounds(size: Vector2n, pos: Vector2n) -> bool {
    0 <= pos.x && pos.x < size.x && 0 <= pos.y && pos.y < size.y
}

fn cell_index(size: Vector2n, pos: Vector2n) -> usize {
    (pos.y * size.x + pos.x) as usize
}

/// Map position of a maze cell
fn to_map(cell: Vector2n) -> Vector2n {
    Vector2n::new(cell.x * 2 + 1, cell.y * 2 + 1)
}

/// Open the cells and corridors along the generation path
///
/// A draw cursor replays the walk: when the next path cell is not next to
/// the cursor, the cursor backs up its own stack until it is, so only
/// edges of the depth-first tree are carved.
fn carve_map(size: Vector2n, path: &[Vector2n]) -> Vec<Tile> {
    let map_w = size.x * 2 + 1;
    let map_h = size.y * 2 + 1;
    let mut tiles = vec![Tile::Wall; (map_w * map_h) as usize];
    let Some(&first) = path.first() else {
        return tiles;
    };

    let mut open = |pos: Vector2n| tiles[(pos.y * map_w + pos.x) as usize] = Tile::Open;
    open(to_map(first));
    let mut cursor = vec![first];

    let mut i = 1;
    while i < path.len() {
        let Some(&this) = cursor.last() else {
            break;
        };
        let next = path[i];
        if this.manhattan(next) > 1 {
            cursor.pop();
            continue;
        }
        let (a, b) = (to_map(this), to_map(next));
        open(Vector2n::new((a.x + b.x) / 2, (a.y + b.y) / 2));
        open(b);
        cursor.push(next);
        i += 1;
    }
    tiles
}

/// Opening in the outer wall next to the first visited cell
fn exit_position(size: Vector2n, first: Vector2n) -> Vector2n {
    let dir = if first.x == 0 {
        Direction::Left
    } else if first.y == 0 {
        Direction::Up
    } else if first.x == size.x - 1 {
        Direction::Right
    } else {
        Direction::Down
    };
    to_map(first) + dir.to_vector()
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use itertools::Itertools;
    use proptest::prelude::*;

    use super::{checked_size, MazeGenerator};
    use crate::geometry::{Direction, Vector2n};
    use crate::{Error, Maze, Tile};

    fn border_openings(maze: &Maze) -> Vec<Vector2n> {
        let (w, h) = (maze.map_width() as i32, maze.map_height() as i32);
        (0..h)
            .flat_map(|y| (0..w).map(move |x| Vector2n::new(x, y)))
            .filter(|p| p.x == 0 || p.y == 0 || p.x == w - 1 || p.y == h - 1)
            .filter(|p| maze.tile(*p) == Some(Tile::Open))
            .collect()
    }

    /// Open cells reachable from `from`, and number of open-open adjacencies
    fn flood(maze: &Maze, from: Vector2n) -> (HashSet<Vector2n>, usize) {
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(pos) = queue.pop_front() {
            for dir in Direction::ALL {
                let next = pos + dir.to_vector();
                if maze.tile(next) == Some(Tile::Open) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        let edges = seen
            .iter()
            .flat_map(|p| [*p + Vector2n::new(1, 0), *p + Vector2n::new(0, 1)])
            .filter(|p| seen.contains(p))
            .count();
        (seen, edges)
    }

    #[test]
    fn reject_zero_dimensions() {
        let mut gen = MazeGenerator::new(Some(0));
        assert_eq!(
            gen.generate(0, 5).unwrap_err(),
            Error::InvalidDimensions {
                width: 0,
                height: 5
            }
        );
        assert!(gen.generate(3, 0).is_err());
    }

    #[test]
    fn reject_oversized_dimensions() {
        let mut gen = MazeGenerator::new(Some(0));
        assert_eq!(
            gen.generate(50_000, 50_000).unwrap_err(),
            Error::TooLarge {
                width: 50_000,
                height: 50_000
            }
        );
        assert!(matches!(
            gen.generate(3_000_000_000, 1),
            Err(Error::TooLarge { .. })
        ));
        // map of 2^31 - 1 cells or fewer is accepted by the size check
        assert_eq!(checked_size(1, 1), Ok(Vector2n::new(1, 1)));
        assert!(checked_size(23_169, 23_169).is_ok());
        assert!(checked_size(23_170, 23_170).is_err());
    }

    #[test]
    fn single_cell_maze() {
        let maze = MazeGenerator::new(Some(1)).generate(1, 1).unwrap();

        assert_eq!(maze.path(), &[Vector2n::new(0, 0)]);
        assert_eq!(maze.start(), Vector2n::new(1, 1));
        assert_eq!(border_openings(&maze), vec![maze.exit()]);
        assert_eq!(maze.exit().manhattan(Vector2n::new(1, 1)), 1);
    }

    #[test]
    fn same_seed_same_maze() {
        let a = MazeGenerator::new(Some(42)).generate(12, 9).unwrap();
        let b = MazeGenerator::new(Some(42)).generate(12, 9).unwrap();

        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.path(), b.path());
    }

    #[test]
    fn successive_mazes_are_all_valid() {
        let mut gen = MazeGenerator::new(Some(3));
        let mazes = (0..5).map(|_| gen.generate(8, 8).unwrap()).collect_vec();

        for maze in &mazes {
            let (reached, _) = flood(maze, maze.start());
            assert_eq!(reached.len(), 2 * 64);
        }
        assert!(mazes.iter().map(|m| m.to_string()).unique().count() > 1);
    }

    #[test]
    fn generate_parseable_layout() {
        let maze = MazeGenerator::new(Some(0)).generate(6, 4).unwrap();
        let parsed = Maze::parse_layout(&maze.to_string()).unwrap();

        assert_eq!(parsed.start(), maze.start());
        assert_eq!(parsed.exit(), maze.exit());
        assert_eq!(parsed.to_string(), maze.to_string());
    }

    proptest! {
        #[test]
        fn path_visits_every_cell_once(w in 1usize..14, h in 1usize..14, seed in any::<u64>()) {
            let maze = MazeGenerator::new(Some(seed)).generate(w, h).unwrap();
            let path = maze.path();

            prop_assert_eq!(path.len(), w * h);
            prop_assert_eq!(path.iter().unique().count(), w * h);
            let inside = path
                .iter()
                .all(|c| 0 <= c.x && (c.x as usize) < w && 0 <= c.y && (c.y as usize) < h);
            prop_assert!(inside);
        }

        #[test]
        fn carved_map_is_a_tree(w in 1usize..14, h in 1usize..14, seed in any::<u64>()) {
            let maze = MazeGenerator::new(Some(seed)).generate(w, h).unwrap();
            let first = maze.path()[0];
            let (reached, edges) = flood(&maze, Vector2n::new(first.x * 2 + 1, first.y * 2 + 1));

            // cells + corridors + exit, all connected without cycles
            let open = w * h + (w * h - 1) + 1;
            prop_assert_eq!(reached.len(), open);
            prop_assert_eq!(edges, open - 1);
        }

        #[test]
        fn map_is_enclosed_except_exit(w in 1usize..14, h in 1usize..14, seed in any::<u64>()) {
            let maze = MazeGenerator::new(Some(seed)).generate(w, h).unwrap();

            prop_assert_eq!(maze.map_width() % 2, 1);
            prop_assert_eq!(maze.map_height() % 2, 1);
            prop_assert_eq!(border_openings(&maze), vec![maze.exit()]);
        }

        #[test]
        fn exit_touches_first_cell(w in 1usize..14, h in 1usize..14, seed in any::<u64>()) {
            let maze = MazeGenerator::new(Some(seed)).generate(w, h).unwrap();
            let first = maze.path()[0];
            let first_on_map = Vector2n::new(first.x * 2 + 1, first.y * 2 + 1);

            prop_assert_eq!(maze.exit().manhattan(first_on_map), 1);
            prop_assert_ne!(maze.start(), maze.exit());
            prop_assert_eq!(maze.tile(maze.start()), Some(Tile::Open));
            prop_assert_eq!(maze.tile(maze.exit()), Some(Tile::Open));
        }
    }
}

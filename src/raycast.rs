//! Distance to the nearest wall along a ray

use crate::geometry::Vector2f;
use crate::Maze;

/// How rays behave once they leave the map grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutOfBounds {
    /// Keep marching; positions outside the grid are open space
    #[default]
    PassThrough,
    /// Stop at once and report the maximum distance
    Escape,
}

/// Fixed-step ray marcher over a maze map
#[derive(Clone, Copy, Debug)]
pub struct RayCaster {
    step: f32,
    max_distance: f32,
    out_of_bounds: OutOfBounds,
}

impl RayCaster {
    pub const DEFAULT_STEP: f32 = 0.1;

    pub fn new(max_distance: f32) -> Self {
        Self {
            step: Self::DEFAULT_STEP,
            max_distance,
            out_of_bounds: OutOfBounds::default(),
        }
    }

    pub fn with_out_of_bounds(mut self, policy: OutOfBounds) -> Self {
        self.out_of_bounds = policy;
        self
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// March from `origin` towards `angle` until a wall is hit
    ///
    /// The direction is `(cos(angle), sin(angle))`. Returns the distance
    /// travelled, clamped to the maximum render distance; a ray that never
    /// meets a wall reports exactly the maximum.
    pub fn cast_distance(&self, maze: &Maze, origin: Vector2f, angle: f32) -> f32 {
        let dir = Vector2f::from_angle(angle);
        let mut steps: u32 = 0;
        let mut distance = 0.0;

        while distance < self.max_distance {
            steps += 1;
            distance = steps as f32 * self.step;

            let probe = origin + dir * distance;
            if !maze.contains(probe.cell()) {
                if self.out_of_bounds == OutOfBounds::Escape {
                    return self.max_distance;
                }
            } else if maze.is_wall(probe) {
                break;
            }
        }
        distance.min(self.max_distance)
    }
}

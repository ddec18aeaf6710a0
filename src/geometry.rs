//! Integer and floating point vectors in map and maze space

use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// Integer position or offset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Vector2n {
    pub x: i32,
    pub y: i32,
}

impl Vector2n {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise absolute value
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    /// Manhattan distance between two positions
    pub fn manhattan(self, other: Self) -> i32 {
        let d = (self - other).abs();
        d.x + d.y
    }

    /// Centre of the cell in continuous coordinates
    pub fn center(self) -> Vector2f {
        Vector2f::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }
}

impl Add for Vector2n {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2n {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl AddAssign for Vector2n {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Continuous position or offset
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2f {
    pub x: f32,
    pub y: f32,
}

impl Vector2f {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians
    pub fn from_angle(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin)
    }

    /// Grid cell containing this point
    pub fn cell(self) -> Vector2n {
        Vector2n::new(self.x.floor() as i32, self.y.floor() as i32)
    }
}

impl Add for Vector2f {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2f {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vector2f {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl AddAssign for Vector2f {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vector2f {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

/// Axis-aligned step in maze or map space
///
/// The `y` axis grows downwards, so `Up` points to row 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];

    pub const fn to_vector(self) -> Vector2n {
        match self {
            Direction::Left => Vector2n::new(-1, 0),
            Direction::Up => Vector2n::new(0, -1),
            Direction::Right => Vector2n::new(1, 0),
            Direction::Down => Vector2n::new(0, 1),
        }
    }
}

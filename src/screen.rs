//! Fixed-size character grid drawn into every frame

use crate::{Error, Result};

/// Character buffer of `width x height` cells, row-major
///
/// Writes outside the grid are clipped, so overlays can be placed without
/// checking the screen size first.
#[derive(Clone, Debug)]
pub struct Screen {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl Screen {
    /// Written into the last cell by [Self::seal] to mark the end of a frame
    pub const TERMINATOR: char = '\0';

    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidScreen { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![' '; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, col: usize, row: usize) -> Option<char> {
        (col < self.width && row < self.height).then(|| self.cells[row * self.width + col])
    }

    pub fn set(&mut self, col: usize, row: usize, c: char) {
        if col < self.width && row < self.height {
            self.cells[row * self.width + col] = c;
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(' ');
    }

    /// Write `text` left to right starting at `(col, row)`
    pub fn write_str(&mut self, col: usize, row: usize, text: &str) {
        for (i, c) in text.chars().enumerate() {
            self.set(col + i, row, c);
        }
    }

    /// Write `text` centred on `row`
    pub fn write_centered(&mut self, row: usize, text: &str) {
        let len = text.chars().count();
        self.write_str(self.width.saturating_sub(len) / 2, row, text);
    }

    /// Fill a rectangle with `c`
    pub fn fill_rect(&mut self, col: usize, row: usize, width: usize, height: usize, c: char) {
        for y in row..row + height {
            for x in col..col + width {
                self.set(x, y, c);
            }
        }
    }

    /// Mark the final cell as the end of the frame
    pub fn seal(&mut self) {
        if let Some(last) = self.cells.last_mut() {
            *last = Self::TERMINATOR;
        }
    }

    /// Flat buffer as handed to the presentation sink
    pub fn cells(&self) -> &[char] {
        &self.cells
    }

    /// Rows of text, stopping at the terminator
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells.chunks(self.width).map(|row| {
            row.iter()
                .take_while(|c| **c != Self::TERMINATOR)
                .collect()
        })
    }
}

//! Library errors

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("maze dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("maze of {width}x{height} cells is too large")]
    TooLarge { width: usize, height: usize },

    #[error("frame rate limit must be positive")]
    InvalidFrameRate,

    #[error("screen dimensions must be positive, got {width}x{height}")]
    InvalidScreen { width: usize, height: usize },

    #[error("unexpected character `{glyph}` at y={y}, x={x}")]
    UnexpectedGlyph { glyph: char, y: usize, x: usize },

    #[error("invalid layout: {reason}")]
    InvalidLayout { reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

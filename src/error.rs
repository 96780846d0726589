//! Error types for the raster engine.

use std::fmt;
use std::io;

/// Errors raised by surface, compositor and collaborator operations.
///
/// Precondition violations are reported before any pixel is touched, so a
/// failed call never leaves a half-drawn result behind.
#[derive(Debug)]
pub enum RasterError {
    /// Operation not legal in the current draw mode (or mode is locked)
    WrongMode(&'static str),
    /// Binary operation between surfaces of different sizes
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    /// Pixel coordinate outside `[0, width) x [0, height)`
    OutOfBounds { x: i32, y: i32 },
    /// Argument rejected before any work was done
    InvalidArgument(String),
    /// Geometry that cannot define the requested shape (zero-length line, ...)
    DegenerateGeometry(&'static str),
    /// Sprite index not present on this surface
    NoSuchSprite(usize),
    /// Image decoder failure, passed through unchanged
    Decode(String),
    /// Underlying I/O failure
    Io(io::Error),
    /// Configuration file could not be parsed or written
    Config(String),
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::WrongMode(what) => write!(f, "wrong draw mode: {}", what),
            RasterError::DimensionMismatch { expected, actual } => write!(
                f,
                "dimension mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            RasterError::OutOfBounds { x, y } => {
                write!(f, "pixel coordinate ({}, {}) out of bounds", x, y)
            },
            RasterError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            RasterError::DegenerateGeometry(what) => write!(f, "degenerate geometry: {}", what),
            RasterError::NoSuchSprite(index) => write!(f, "no sprite at index {}", index),
            RasterError::Decode(msg) => write!(f, "decode error: {}", msg),
            RasterError::Io(err) => write!(f, "i/o error: {}", err),
            RasterError::Config(msg) => write!(f, "config error: {}", msg),
        }
    }
}

impl std::error::Error for RasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RasterError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for RasterError {
    fn from(err: io::Error) -> Self {
        RasterError::Io(err)
    }
}

impl From<serde_json::Error> for RasterError {
    fn from(err: serde_json::Error) -> Self {
        RasterError::Config(err.to_string())
    }
}

impl From<image::ImageError> for RasterError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io) => RasterError::Io(io),
            other => RasterError::Decode(other.to_string()),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RasterError>;

impl RasterError {
    /// True for the draw-mode family of precondition failures.
    pub fn is_wrong_mode(&self) -> bool {
        matches!(self, RasterError::WrongMode(_))
    }
}

//! Error types for terrapix-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Each variant captures enough context for diagnostics without exposing
//! internal implementation details.

use thiserror::Error;

/// terrapix core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid raster dimensions
    #[error("invalid raster dimensions: {width}x{height}")]
    InvalidDimension { width: usize, height: usize },

    /// Invalid band count
    #[error("invalid band count: {0}")]
    InvalidBandCount(usize),

    /// Band index beyond the raster's band count
    #[error("band index out of range: {band} >= {count}")]
    BandIndexOutOfRange { band: usize, count: usize },

    /// Pixel coordinates outside the raster
    #[error("pixel index out of bounds: ({x}, {y}) in {width}x{height}")]
    IndexOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Supplied data length does not match the declared shape
    #[error("dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Empty input where at least one element is required
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

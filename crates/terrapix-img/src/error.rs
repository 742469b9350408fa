//! Error types for terrapix-img
//!
//! Traversal and analysis errors are detected eagerly: a driver checks
//! its inputs before the scan starts and fails without touching any
//! output buffer.

use thiserror::Error;

/// Errors that can occur during traversal and analysis operations
#[derive(Debug, Error)]
pub enum ImgError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] terrapix_core::Error),

    /// I/O error while writing results
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Histogram range is empty or inverted
    #[error("invalid range: min {min} must be less than max {max}")]
    InvalidRange {
        /// Lower bound of the requested range
        min: f64,
        /// Upper bound of the requested range
        max: f64,
    },

    /// Bin width is zero, negative or not finite
    #[error("invalid bin width: {0}")]
    InvalidBinWidth(f64),

    /// Output buffer does not have the required size
    #[error("dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch {
        /// Required number of values
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// Inputs do not share a pixel grid
    #[error("geometry mismatch: {0}")]
    GeometryMismatch(String),

    /// Band index outside the bands of a dataset
    #[error("band index {band} out of range for {count} bands")]
    BandIndexOutOfRange {
        /// Requested band index
        band: usize,
        /// Number of bands available
        count: usize,
    },

    /// Output raster band layout does not match the callback
    #[error("band count mismatch: callback produces {produced}, output has {output}")]
    BandCountMismatch {
        /// Values produced per pixel by the callback
        produced: usize,
        /// Bands available in the output raster
        output: usize,
    },

    /// Operation list was empty
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// Invalid parameters
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Callback does not implement the requested pass
    #[error("operation not supported: {0}")]
    NotSupported(&'static str),
}

/// Result type for traversal and analysis operations
pub type ImgResult<T> = Result<T, ImgError>;

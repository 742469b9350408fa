//! terrapix-img - Raster traversal and per-pixel analysis
//!
//! This crate provides the scan engine and the analysis drivers built
//! on it:
//!
//! - Synchronized traversal of co-registered rasters ([`RasterCursor`]
//!   driving a caller-supplied [`PixelCalc`])
//! - Band histograms with fixed-width bins, optional masking and
//!   tab-separated text output
//! - Joint histograms of two bands with per-axis affine binning and an
//!   optional squared Pearson correlation
//! - Uniform and Gaussian-percent noise injection with seedable RNGs

pub mod calc;
mod error;
pub mod histogram;
pub mod histogram2d;
pub mod noise;

pub use error::{ImgError, ImgResult};

// Re-export commonly used types and functions
pub use calc::{PixelCalc, RasterCursor};
pub use histogram::{
    Histogram, HistogramOptions, accumulate_band_histogram, band_histogram, write_band_histogram,
};
pub use histogram2d::{JointHistogram, JointHistogramOptions, joint_histogram};
pub use noise::{GaussianPercentNoise, NoiseMode, NoiseOptions, UniformNoise, add_noise};

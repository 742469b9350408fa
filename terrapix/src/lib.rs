//! Terrapix - Raster analysis library for Rust
//!
//! # Overview
//!
//! Terrapix traverses one or more co-registered multi-band rasters
//! pixel by pixel and runs per-pixel computations over them:
//!
//! - Synchronized traversal with caller-supplied callbacks
//! - Band histograms (fixed-width bins, masking, text output)
//! - Joint histograms of two bands with optional correlation
//! - Uniform and Gaussian-percent noise injection
//!
//! Raster file formats are out of scope; callers load pixel data
//! themselves and build [`Raster`] values from it.
//!
//! # Example
//!
//! ```
//! use terrapix::Raster;
//! use terrapix::img::band_histogram;
//!
//! let data: Vec<f64> = (0..16).map(f64::from).collect();
//! let raster = Raster::from_band_data(4, 4, data).unwrap();
//!
//! let hist = band_histogram(&raster, 0, 0.0, 16.0, 4.0).unwrap();
//! assert_eq!(hist.counts(), &[4, 4, 4, 4]);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use terrapix_core::*;

// Re-export the analysis crate as a module to avoid name conflicts
pub use terrapix_img as img;

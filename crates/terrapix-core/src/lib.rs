//! Terrapix Core - Basic data structures for raster analysis
//!
//! This crate provides the fundamental data structures used throughout
//! the Terrapix raster analysis library:
//!
//! - [`Raster`] - In-memory multi-band raster with f64 samples
//! - [`RasterGeometry`] - Spatial registration of a pixel grid
//! - [`GeoExtent`] - Axis-aligned rectangle in map coordinates
//!
//! Rasters can be purely pixel-space or carry a [`RasterGeometry`] that
//! pins the grid to map coordinates. The analysis crates use the
//! registration to traverse several rasters over their common footprint.

pub mod error;
pub mod geometry;
pub mod raster;

pub use error::{Error, Result};
pub use geometry::{GeoExtent, RasterGeometry};
pub use raster::Raster;

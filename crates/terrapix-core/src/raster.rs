//! Raster - In-memory multi-band raster
//!
//! `Raster` is the value container the analysis drivers operate on: a
//! stack of equally sized f64 bands over one pixel grid. Opening,
//! decoding and format handling live outside this library; callers load
//! band data however they like and hand it over with [`Raster::from_data`]
//! or build rasters band by band.
//!
//! # Examples
//!
//! ```
//! use terrapix_core::Raster;
//!
//! // A 64x48 raster with three bands, zero-filled
//! let mut raster = Raster::new(64, 48, 3).unwrap();
//!
//! raster.set_value(1, 10, 20, 0.25).unwrap();
//! assert_eq!(raster.value(1, 10, 20).unwrap(), 0.25);
//! ```

use crate::error::{Error, Result};
use crate::geometry::{GeoExtent, RasterGeometry};

/// In-memory multi-band raster
///
/// Bands are stored as planes, one after another; within a band the data
/// is row-major with no padding, so band `b` holds pixel (x, y) at index
/// `b * width * height + y * width + x`. All bands share the grid and
/// the optional spatial registration.
#[derive(Debug, Clone)]
pub struct Raster {
    /// Width in pixels
    width: usize,
    /// Height in pixels
    height: usize,
    /// Number of bands
    bands: usize,
    /// Band-sequential pixel data
    data: Vec<f64>,
    /// Spatial registration, if the raster is georeferenced
    geometry: Option<RasterGeometry>,
}

impl Raster {
    /// Create a raster with all values set to zero
    ///
    /// # Arguments
    ///
    /// * `width` - Width in pixels (must be > 0)
    /// * `height` - Height in pixels (must be > 0)
    /// * `bands` - Number of bands (must be > 0)
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0, and
    /// `Error::InvalidBandCount` if bands is 0.
    pub fn new(width: usize, height: usize, bands: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        if bands == 0 {
            return Err(Error::InvalidBandCount(bands));
        }

        let data = vec![0.0f64; width * height * bands];

        Ok(Raster {
            width,
            height,
            bands,
            data,
            geometry: None,
        })
    }

    /// Create a raster with all values set to `value`
    pub fn new_with_value(width: usize, height: usize, bands: usize, value: f64) -> Result<Self> {
        let mut raster = Self::new(width, height, bands)?;
        raster.data.fill(value);
        Ok(raster)
    }

    /// Create a raster from band-sequential data
    ///
    /// # Arguments
    ///
    /// * `width` - Width in pixels
    /// * `height` - Height in pixels
    /// * `bands` - Number of bands
    /// * `data` - Pixel data: `bands` planes of `width * height` values,
    ///   row-major within each plane
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are invalid or the data length
    /// doesn't match `width * height * bands`.
    pub fn from_data(width: usize, height: usize, bands: usize, data: Vec<f64>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        if bands == 0 {
            return Err(Error::InvalidBandCount(bands));
        }

        let expected = width * height * bands;
        if data.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Raster {
            width,
            height,
            bands,
            data,
            geometry: None,
        })
    }

    /// Create a single-band raster from row-major data
    pub fn from_band_data(width: usize, height: usize, data: Vec<f64>) -> Result<Self> {
        Self::from_data(width, height, 1, data)
    }

    /// Attach a spatial registration, builder style
    pub fn with_geometry(mut self, geometry: RasterGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Get the raster width in pixels
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the raster height in pixels
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the raster dimensions as (width, height)
    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Get the number of bands
    #[inline]
    pub fn band_count(&self) -> usize {
        self.bands
    }

    /// Get the spatial registration, if any
    #[inline]
    pub fn geometry(&self) -> Option<RasterGeometry> {
        self.geometry
    }

    /// Set or clear the spatial registration
    #[inline]
    pub fn set_geometry(&mut self, geometry: Option<RasterGeometry>) {
        self.geometry = geometry;
    }

    /// Map footprint of the raster, if it is georeferenced
    pub fn extent(&self) -> Option<GeoExtent> {
        self.geometry.map(|g| g.extent(self.width, self.height))
    }

    /// Get the value of `band` at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::BandIndexOutOfRange` for a bad band index and
    /// `Error::IndexOutOfBounds` for coordinates outside the raster.
    #[inline]
    pub fn value(&self, band: usize, x: usize, y: usize) -> Result<f64> {
        self.check_access(band, x, y)?;
        Ok(self.data[self.index(band, x, y)])
    }

    /// Set the value of `band` at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::BandIndexOutOfRange` for a bad band index and
    /// `Error::IndexOutOfBounds` for coordinates outside the raster.
    #[inline]
    pub fn set_value(&mut self, band: usize, x: usize, y: usize, value: f64) -> Result<()> {
        self.check_access(band, x, y)?;
        let idx = self.index(band, x, y);
        self.data[idx] = value;
        Ok(())
    }

    /// Get the value of `band` at (x, y) without bounds checking
    ///
    /// # Panics
    ///
    /// Panics if the band index or coordinates are out of range.
    #[inline]
    pub fn value_unchecked(&self, band: usize, x: usize, y: usize) -> f64 {
        self.data[self.index(band, x, y)]
    }

    /// Set the value of `band` at (x, y) without bounds checking
    ///
    /// # Panics
    ///
    /// Panics if the band index or coordinates are out of range.
    #[inline]
    pub fn set_value_unchecked(&mut self, band: usize, x: usize, y: usize, value: f64) {
        let idx = self.index(band, x, y);
        self.data[idx] = value;
    }

    /// Get one band as a row-major slice
    ///
    /// # Errors
    ///
    /// Returns `Error::BandIndexOutOfRange` for a bad band index.
    pub fn band(&self, band: usize) -> Result<&[f64]> {
        self.check_band(band)?;
        let plane = self.width * self.height;
        Ok(&self.data[band * plane..(band + 1) * plane])
    }

    /// Get one band as a mutable row-major slice
    ///
    /// # Errors
    ///
    /// Returns `Error::BandIndexOutOfRange` for a bad band index.
    pub fn band_mut(&mut self, band: usize) -> Result<&mut [f64]> {
        self.check_band(band)?;
        let plane = self.width * self.height;
        Ok(&mut self.data[band * plane..(band + 1) * plane])
    }

    /// Get one row of one band
    ///
    /// # Panics
    ///
    /// Panics if `band >= band_count` or `y >= height`.
    #[inline]
    pub fn band_row(&self, band: usize, y: usize) -> &[f64] {
        let start = self.index(band, 0, y);
        &self.data[start..start + self.width]
    }

    /// Get one mutable row of one band
    ///
    /// # Panics
    ///
    /// Panics if `band >= band_count` or `y >= height`.
    #[inline]
    pub fn band_row_mut(&mut self, band: usize, y: usize) -> &mut [f64] {
        let start = self.index(band, 0, y);
        &mut self.data[start..start + self.width]
    }

    /// Set every value of one band
    pub fn fill_band(&mut self, band: usize, value: f64) -> Result<()> {
        self.band_mut(band)?.fill(value);
        Ok(())
    }

    /// Set every value of every band
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Raw access to the band-sequential data
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Raw mutable access to the band-sequential data
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[inline]
    fn index(&self, band: usize, x: usize, y: usize) -> usize {
        (band * self.height + y) * self.width + x
    }

    #[inline]
    fn check_band(&self, band: usize) -> Result<()> {
        if band >= self.bands {
            return Err(Error::BandIndexOutOfRange {
                band,
                count: self.bands,
            });
        }
        Ok(())
    }

    #[inline]
    fn check_access(&self, band: usize, x: usize, y: usize) -> Result<()> {
        self.check_band(band)?;
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

//! Raster cursor - synchronized per-pixel traversal
//!
//! [`RasterCursor`] walks one or more co-registered rasters in row-major
//! order and hands a caller-supplied [`PixelCalc`] one aligned band
//! vector per pixel. All geometry resolution happens up front in
//! [`RasterCursor::new`]; the scan itself cannot fail except through the
//! callback.
//!
//! Two scan shapes exist. [`RasterCursor::run`] is read-only and feeds
//! an accumulator (histograms, statistics). [`RasterCursor::run_into`]
//! additionally hands the callback an output slice per pixel and writes
//! it back to an output raster (per-pixel transforms such as noise
//! injection).
//!
//! # Examples
//!
//! ```
//! use terrapix_core::Raster;
//! use terrapix_img::{ImgResult, PixelCalc, RasterCursor};
//!
//! struct SumCalc {
//!     total: f64,
//! }
//!
//! impl PixelCalc for SumCalc {
//!     fn process_pixel(&mut self, bands: &[f64]) -> ImgResult<()> {
//!         self.total += bands.iter().sum::<f64>();
//!         Ok(())
//!     }
//! }
//!
//! let raster = Raster::from_band_data(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
//! let cursor = RasterCursor::new(&[&raster]).unwrap();
//!
//! let mut calc = SumCalc { total: 0.0 };
//! cursor.run(&mut calc).unwrap();
//! assert_eq!(calc.total, 10.0);
//! ```

use terrapix_core::{Raster, RasterGeometry};

use crate::error::{ImgError, ImgResult};

/// Per-pixel computation invoked by a [`RasterCursor`]
///
/// A calc implements only the pass shape it supports; the default
/// bodies reject the other pass with [`ImgError::NotSupported`].
///
/// The band slice holds one value per band per source, sources in the
/// order given to the cursor, and is only valid for the duration of the
/// call. An error returned from either method aborts the scan and
/// propagates to the driver.
pub trait PixelCalc {
    /// Consume one aligned pixel, read-only pass
    fn process_pixel(&mut self, _bands: &[f64]) -> ImgResult<()> {
        Err(ImgError::NotSupported("process_pixel"))
    }

    /// Consume one aligned pixel and produce output band values
    ///
    /// `output` contents are unspecified on entry; the calc is expected
    /// to write every slot it is responsible for.
    fn process_pixel_into(&mut self, _bands: &[f64], _output: &mut [f64]) -> ImgResult<()> {
        Err(ImgError::NotSupported("process_pixel_into"))
    }
}

/// Synchronous row-major scan over co-registered rasters
///
/// The cursor resolves the common scan window when it is built:
///
/// - All sources pixel-space: the pixel extents must be identical and
///   the window is that extent.
/// - All sources georeferenced: the grids must share a resolution and
///   align on cell boundaries, and the window is the intersection of
///   the map extents. Each source is scanned at its own pixel offset.
/// - A mix of the two is rejected.
///
/// The cursor holds no scan state, so one cursor can drive any number
/// of consecutive scans. A scan that aborts through a callback error
/// leaves the callback's accumulator wherever it got to; restart the
/// scan from the top with a fresh accumulator if that matters.
pub struct RasterCursor<'a> {
    /// Sources in caller order
    sources: Vec<&'a Raster>,
    /// Per-source pixel offset of the scan window's top-left corner
    offsets: Vec<(usize, usize)>,
    /// Scan window width in pixels
    width: usize,
    /// Scan window height in pixels
    height: usize,
    /// Width of the aligned band vector
    band_total: usize,
    /// Registration of the scan window, when sources are georeferenced
    geometry: Option<RasterGeometry>,
}

impl<'a> RasterCursor<'a> {
    /// Build a cursor over `sources`, resolving the scan window
    ///
    /// # Errors
    ///
    /// Returns `ImgError::EmptyInput` for an empty source list and
    /// `ImgError::GeometryMismatch` when the sources do not resolve to
    /// a common window (differing pixel extents, mixed registration,
    /// misaligned grids, disjoint map extents).
    pub fn new(sources: &[&'a Raster]) -> ImgResult<Self> {
        if sources.is_empty() {
            return Err(ImgError::EmptyInput("no source rasters"));
        }

        let band_total = sources.iter().map(|s| s.band_count()).sum();

        if sources.iter().all(|s| s.geometry().is_none()) {
            return Self::new_pixel_space(sources, band_total);
        }

        let geoms: Option<Vec<RasterGeometry>> =
            sources.iter().map(|s| s.geometry()).collect();
        match geoms {
            Some(geoms) => Self::new_georeferenced(sources, &geoms, band_total),
            None => Err(ImgError::GeometryMismatch(
                "cannot mix georeferenced and pixel-space sources".into(),
            )),
        }
    }

    fn new_pixel_space(sources: &[&'a Raster], band_total: usize) -> ImgResult<Self> {
        let (width, height) = sources[0].size();
        for source in &sources[1..] {
            if source.size() != (width, height) {
                return Err(ImgError::GeometryMismatch(format!(
                    "pixel extents differ: {}x{} vs {}x{}",
                    width,
                    height,
                    source.width(),
                    source.height()
                )));
            }
        }

        Ok(RasterCursor {
            sources: sources.to_vec(),
            offsets: vec![(0, 0); sources.len()],
            width,
            height,
            band_total,
            geometry: None,
        })
    }

    fn new_georeferenced(
        sources: &[&'a Raster],
        geoms: &[RasterGeometry],
        band_total: usize,
    ) -> ImgResult<Self> {
        let first = geoms[0];

        let mut window = first.extent(sources[0].width(), sources[0].height());
        for (source, geom) in sources.iter().zip(geoms).skip(1) {
            if !first.aligns_with(geom) {
                return Err(ImgError::GeometryMismatch(
                    "source grids do not align".into(),
                ));
            }

            let extent = geom.extent(source.width(), source.height());
            window = window.intersect(&extent).ok_or_else(|| {
                ImgError::GeometryMismatch("source extents do not intersect".into())
            })?;
        }

        let mut offsets = Vec::with_capacity(sources.len());
        for geom in geoms {
            let offset = geom.cell_offset(&window).ok_or_else(|| {
                ImgError::GeometryMismatch("intersection is off the cell grid".into())
            })?;
            offsets.push(offset);
        }

        let (width, height) = first.cell_span(&window).ok_or_else(|| {
            ImgError::GeometryMismatch("intersection does not span whole cells".into())
        })?;

        let geometry = RasterGeometry::new(window.west, window.north, first.x_res, first.y_res)?;

        Ok(RasterCursor {
            sources: sources.to_vec(),
            offsets,
            width,
            height,
            band_total,
            geometry: Some(geometry),
        })
    }

    /// Scan window dimensions as (width, height)
    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Width of the aligned band vector handed to the callback
    ///
    /// This is the sum of the band counts of all sources.
    #[inline]
    pub fn band_total(&self) -> usize {
        self.band_total
    }

    /// Registration of the scan window, when sources are georeferenced
    #[inline]
    pub fn geometry(&self) -> Option<RasterGeometry> {
        self.geometry
    }

    /// Scan every pixel of the window through `calc`
    ///
    /// Pixels are visited row by row, left to right. The first error
    /// returned by the callback aborts the scan.
    pub fn run(&self, calc: &mut dyn PixelCalc) -> ImgResult<()> {
        let mut bands = vec![0.0f64; self.band_total];

        for y in 0..self.height {
            for x in 0..self.width {
                self.fill_bands(x, y, &mut bands);
                calc.process_pixel(&bands)?;
            }
        }

        Ok(())
    }

    /// Scan every pixel, writing the callback's output to `out`
    ///
    /// `out` must cover exactly the scan window and carry one band per
    /// aligned input value.
    ///
    /// # Errors
    ///
    /// Returns `ImgError::DimensionMismatch` when `out`'s pixel extent
    /// differs from the scan window and `ImgError::BandCountMismatch`
    /// when its band count differs from [`band_total`](Self::band_total),
    /// both before any pixel is visited.
    pub fn run_into(&self, calc: &mut dyn PixelCalc, out: &mut Raster) -> ImgResult<()> {
        if out.size() != (self.width, self.height) {
            return Err(ImgError::DimensionMismatch {
                expected: self.width * self.height,
                actual: out.width() * out.height(),
            });
        }
        if out.band_count() != self.band_total {
            return Err(ImgError::BandCountMismatch {
                produced: self.band_total,
                output: out.band_count(),
            });
        }

        let mut bands = vec![0.0f64; self.band_total];
        let mut result = vec![0.0f64; self.band_total];

        for y in 0..self.height {
            for x in 0..self.width {
                self.fill_bands(x, y, &mut bands);
                calc.process_pixel_into(&bands, &mut result)?;
                for (band, &value) in result.iter().enumerate() {
                    out.set_value_unchecked(band, x, y, value);
                }
            }
        }

        Ok(())
    }

    /// Gather the aligned band vector for window pixel (x, y)
    #[inline]
    fn fill_bands(&self, x: usize, y: usize, bands: &mut [f64]) {
        let mut slot = 0;
        for (source, &(ox, oy)) in self.sources.iter().zip(&self.offsets) {
            for band in 0..source.band_count() {
                bands[slot] = source.value_unchecked(band, ox + x, oy + y);
                slot += 1;
            }
        }
    }
}

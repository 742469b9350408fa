//! Joint histograms - co-occurrence binning of two bands
//!
//! A [`JointHistogram`] counts pairs of values from two bands into a
//! square matrix. Each axis maps values to bin indices through an
//! affine transform, `index = floor(value * scale + offset)`, so the
//! caller controls the binned range by choosing scale and offset. A
//! pixel whose pair falls outside the matrix on either axis is skipped
//! whole; there are no partial increments and no clamping.
//!
//! The driver can also report how linearly related the two bands are,
//! as the squared Pearson correlation over every scanned pair.
//!
//! # Examples
//!
//! ```
//! use terrapix_core::Raster;
//! use terrapix_img::{JointHistogram, JointHistogramOptions, joint_histogram};
//!
//! let b1 = Raster::from_band_data(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
//! let b2 = Raster::from_band_data(2, 2, vec![2.0, 4.0, 6.0, 8.0]).unwrap();
//!
//! let options = JointHistogramOptions::new(10)
//!     .with_axis2(0.5, 0.0)
//!     .with_bands(0, 1);
//! let mut hist = JointHistogram::new(10).unwrap();
//!
//! joint_histogram(&[&b1, &b2], &options, &mut hist).unwrap();
//! assert_eq!(hist.get(1, 1), Some(1.0));
//! assert_eq!(hist.get(4, 4), Some(1.0));
//! assert_eq!(hist.total(), 4.0);
//! ```

use terrapix_core::Raster;

use crate::calc::{PixelCalc, RasterCursor};
use crate::error::{ImgError, ImgResult};

/// Options for joint histogram accumulation
#[derive(Debug, Clone)]
pub struct JointHistogramOptions {
    /// Aligned band index for the first axis (rows)
    pub band1: usize,
    /// Aligned band index for the second axis (columns)
    pub band2: usize,
    /// Bins per axis; must match the supplied matrix
    pub bins: usize,
    /// First-axis scale: bin index is `floor(value * scale + offset)`
    pub scale1: f64,
    /// First-axis offset
    pub offset1: f64,
    /// Second-axis scale
    pub scale2: f64,
    /// Second-axis offset
    pub offset2: f64,
    /// Also compute the squared Pearson correlation of the two bands
    pub r_squared: bool,
}

impl Default for JointHistogramOptions {
    fn default() -> Self {
        Self {
            band1: 0,
            band2: 1,
            bins: 10,
            scale1: 1.0,
            offset1: 0.0,
            scale2: 1.0,
            offset2: 0.0,
            r_squared: false,
        }
    }
}

impl JointHistogramOptions {
    /// Create options for a `bins` by `bins` matrix
    pub fn new(bins: usize) -> Self {
        Self {
            bins,
            ..Default::default()
        }
    }

    /// Set the aligned band indices for the two axes
    pub fn with_bands(mut self, band1: usize, band2: usize) -> Self {
        self.band1 = band1;
        self.band2 = band2;
        self
    }

    /// Set scale and offset of the first axis
    pub fn with_axis1(mut self, scale: f64, offset: f64) -> Self {
        self.scale1 = scale;
        self.offset1 = offset;
        self
    }

    /// Set scale and offset of the second axis
    pub fn with_axis2(mut self, scale: f64, offset: f64) -> Self {
        self.scale2 = scale;
        self.offset2 = offset;
        self
    }

    /// Request the squared Pearson correlation alongside the counts
    pub fn with_r_squared(mut self) -> Self {
        self.r_squared = true;
        self
    }
}

/// Square co-occurrence matrix with per-axis bin edges
///
/// The matrix is row-major, `bins * bins` f64 counters, rows indexed by
/// the first band and columns by the second. Counts accumulate across
/// driver calls until [`reset`](Self::reset); the driver never clears
/// caller storage on its own.
#[derive(Debug, Clone)]
pub struct JointHistogram {
    /// Bins per axis
    bins: usize,
    /// Row-major counter matrix
    matrix: Vec<f64>,
    /// First-axis bin edges (`bins + 1` values)
    edges1: Vec<f64>,
    /// Second-axis bin edges (`bins + 1` values)
    edges2: Vec<f64>,
}

impl JointHistogram {
    /// Create a zeroed `bins` by `bins` histogram
    ///
    /// Edges are all zero until a driver writes its axis transforms.
    ///
    /// # Errors
    ///
    /// Returns `ImgError::InvalidParameter` when `bins` is 0.
    pub fn new(bins: usize) -> ImgResult<Self> {
        if bins == 0 {
            return Err(ImgError::InvalidParameter(
                "joint histogram needs at least one bin per axis".into(),
            ));
        }

        Ok(JointHistogram {
            bins,
            matrix: vec![0.0; bins * bins],
            edges1: vec![0.0; bins + 1],
            edges2: vec![0.0; bins + 1],
        })
    }

    /// Bins per axis
    #[inline]
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Count at (row, col), or None when out of range
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.bins && col < self.bins {
            Some(self.matrix[row * self.bins + col])
        } else {
            None
        }
    }

    /// Row-major counter matrix
    #[inline]
    pub fn matrix(&self) -> &[f64] {
        &self.matrix
    }

    /// First-axis bin edges
    #[inline]
    pub fn edges1(&self) -> &[f64] {
        &self.edges1
    }

    /// Second-axis bin edges
    #[inline]
    pub fn edges2(&self) -> &[f64] {
        &self.edges2
    }

    /// Sum of all counters
    pub fn total(&self) -> f64 {
        self.matrix.iter().sum()
    }

    /// Zero every counter, keeping the edges
    pub fn reset(&mut self) {
        self.matrix.fill(0.0);
    }

    #[inline]
    fn increment(&mut self, row: usize, col: usize) {
        self.matrix[row * self.bins + col] += 1.0;
    }
}

/// Running sums for the squared Pearson correlation
#[derive(Debug, Default)]
struct CorrelationSums {
    n: u64,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
}

impl CorrelationSums {
    #[inline]
    fn push(&mut self, x: f64, y: f64) {
        self.n += 1;
        self.sum_x += x;
        self.sum_y += y;
        self.sum_xx += x * x;
        self.sum_yy += y * y;
        self.sum_xy += x * y;
    }

    /// Squared Pearson coefficient; degenerate series yield 0.0
    fn r_squared(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let n = self.n as f64;
        let var_x = self.sum_xx - self.sum_x * self.sum_x / n;
        let var_y = self.sum_yy - self.sum_y * self.sum_y / n;
        if !(var_x > 0.0) || !(var_y > 0.0) {
            return 0.0;
        }
        let cov = self.sum_xy - self.sum_x * self.sum_y / n;
        (cov * cov) / (var_x * var_y)
    }
}

/// Bins one pair of bands per pixel into a joint histogram
struct JointCalc<'h> {
    histogram: &'h mut JointHistogram,
    band1: usize,
    band2: usize,
    scale1: f64,
    offset1: f64,
    scale2: f64,
    offset2: f64,
    sums: Option<CorrelationSums>,
}

impl PixelCalc for JointCalc<'_> {
    fn process_pixel(&mut self, bands: &[f64]) -> ImgResult<()> {
        let v1 = bands[self.band1];
        let v2 = bands[self.band2];

        // The correlation runs over every scanned pair, counted or not.
        if let Some(sums) = &mut self.sums {
            sums.push(v1, v2);
        }

        let bins = self.histogram.bins() as f64;
        let row = (v1 * self.scale1 + self.offset1).floor();
        let col = (v2 * self.scale2 + self.offset2).floor();
        if row >= 0.0 && row < bins && col >= 0.0 && col < bins {
            self.histogram.increment(row as usize, col as usize);
        }

        Ok(())
    }
}

/// Accumulate a joint histogram of two bands over co-registered datasets
///
/// All datasets are scanned in one aligned pass; `band1` and `band2`
/// index the aligned band vector, so the two axes may come from the
/// same dataset or different ones. Bin indices are
/// `floor(value * scale + offset)` per axis and a pixel is skipped
/// whole when either index falls outside the matrix. The axis edges
/// (`edge[i] = (i - offset) / scale`) are written into `histogram`
/// before the scan; counts add to whatever the matrix already holds.
///
/// Returns `Some(r_squared)` when `options.r_squared` is set, `None`
/// otherwise. The correlation covers every scanned pair, including
/// pairs whose bin indices were rejected; a series with no pixels or
/// zero variance on either axis yields 0.0.
///
/// # Errors
///
/// All checks run before any pixel is read:
/// `ImgError::DimensionMismatch` when `histogram` does not have
/// `options.bins` bins per axis, `ImgError::InvalidBinWidth` when a
/// scale does not imply a positive finite bin width,
/// `ImgError::InvalidParameter` for non-finite offsets,
/// `ImgError::BandIndexOutOfRange` when a band index falls outside the
/// aligned band vector, and cursor construction errors for empty or
/// mis-registered dataset lists.
pub fn joint_histogram(
    sources: &[&Raster],
    options: &JointHistogramOptions,
    histogram: &mut JointHistogram,
) -> ImgResult<Option<f64>> {
    if histogram.bins() != options.bins {
        return Err(ImgError::DimensionMismatch {
            expected: options.bins * options.bins,
            actual: histogram.matrix().len(),
        });
    }
    for scale in [options.scale1, options.scale2] {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ImgError::InvalidBinWidth(1.0 / scale));
        }
    }
    for offset in [options.offset1, options.offset2] {
        if !offset.is_finite() {
            return Err(ImgError::InvalidParameter(format!(
                "axis offset must be finite, got {offset}"
            )));
        }
    }

    let cursor = RasterCursor::new(sources)?;
    for band in [options.band1, options.band2] {
        if band >= cursor.band_total() {
            return Err(ImgError::BandIndexOutOfRange {
                band,
                count: cursor.band_total(),
            });
        }
    }

    for i in 0..=options.bins {
        histogram.edges1[i] = (i as f64 - options.offset1) / options.scale1;
        histogram.edges2[i] = (i as f64 - options.offset2) / options.scale2;
    }

    let mut calc = JointCalc {
        histogram,
        band1: options.band1,
        band2: options.band2,
        scale1: options.scale1,
        offset1: options.offset1,
        scale2: options.scale2,
        offset2: options.offset2,
        sums: options.r_squared.then(CorrelationSums::default),
    };
    cursor.run(&mut calc)?;

    Ok(calc.sums.map(|s| s.r_squared()))
}

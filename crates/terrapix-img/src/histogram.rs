//! Band histograms - fixed-width binning of raster values
//!
//! A [`Histogram`] covers a half-open value range `[min, max)` with bins
//! of equal width. Values outside the range are dropped silently, never
//! clamped into the edge bins, so the bin counts only describe the
//! requested range. Accumulation drivers scan one band of one or more
//! datasets through a [`RasterCursor`](crate::RasterCursor) and can skip
//! pixels flagged by a mask band.
//!
//! # Examples
//!
//! ```
//! use terrapix_core::Raster;
//! use terrapix_img::band_histogram;
//!
//! let data: Vec<f64> = (0..16).map(f64::from).collect();
//! let raster = Raster::from_band_data(4, 4, data).unwrap();
//!
//! let hist = band_histogram(&raster, 0, 0.0, 16.0, 4.0).unwrap();
//! assert_eq!(hist.counts(), &[4, 4, 4, 4]);
//! assert_eq!(hist.edges(), &[0.0, 4.0, 8.0, 12.0, 16.0]);
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use terrapix_core::Raster;

use crate::calc::{PixelCalc, RasterCursor};
use crate::error::{ImgError, ImgResult};

/// Most bins a single histogram will allocate
const MAX_BINS: usize = 1 << 24;

/// Options for band histogram accumulation
#[derive(Debug, Clone)]
pub struct HistogramOptions {
    /// Band to read from each dataset
    pub band: usize,
    /// Lower bound of the binned range (inclusive)
    pub min: f64,
    /// Upper bound of the binned range (exclusive)
    pub max: f64,
    /// Width of each bin (must be positive)
    pub bin_width: f64,
    /// Mask sentinel: a pixel whose band 0 equals this value is skipped
    pub mask: Option<f64>,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        Self {
            band: 0,
            min: 0.0,
            max: 1.0,
            bin_width: 1.0,
            mask: None,
        }
    }
}

impl HistogramOptions {
    /// Create options for the given range and bin width
    pub fn new(min: f64, max: f64, bin_width: f64) -> Self {
        Self {
            min,
            max,
            bin_width,
            ..Default::default()
        }
    }

    /// Set the band to read
    pub fn with_band(mut self, band: usize) -> Self {
        self.band = band;
        self
    }

    /// Skip pixels whose band 0 equals `value`
    pub fn with_mask(mut self, value: f64) -> Self {
        self.mask = Some(value);
        self
    }
}

/// Fixed-width bin counts over a half-open value range
///
/// Bin `i` covers `[min + i * bin_width, min + (i + 1) * bin_width)`.
/// The number of bins is `ceil((max - min) / bin_width)`, so the last
/// bin may extend past `max`.
#[derive(Debug, Clone)]
pub struct Histogram {
    /// Lower bound of the binned range
    min: f64,
    /// Bin width
    bin_width: f64,
    /// Per-bin counts
    counts: Vec<u64>,
    /// Bin edges, one more than the number of bins
    edges: Vec<f64>,
}

impl Histogram {
    /// Create an empty histogram over `[min, max)`
    ///
    /// # Errors
    ///
    /// Returns `ImgError::InvalidRange` unless `min < max` with both
    /// finite, `ImgError::InvalidBinWidth` unless `bin_width` is
    /// positive and finite, and `ImgError::InvalidParameter` when the
    /// range and width together ask for more than 2^24 bins.
    pub fn new(min: f64, max: f64, bin_width: f64) -> ImgResult<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ImgError::InvalidRange { min, max });
        }
        if !bin_width.is_finite() || bin_width <= 0.0 {
            return Err(ImgError::InvalidBinWidth(bin_width));
        }

        // Bound the count while it is still a float; (max - min) alone
        // can reach infinity
        let bins = ((max - min) / bin_width).ceil();
        if bins > MAX_BINS as f64 {
            return Err(ImgError::InvalidParameter(format!(
                "range {min}..{max} at width {bin_width} needs {bins} bins, limit is {MAX_BINS}"
            )));
        }

        let num_bins = bins as usize;
        let edges = (0..=num_bins).map(|i| min + i as f64 * bin_width).collect();

        Ok(Histogram {
            min,
            bin_width,
            counts: vec![0; num_bins],
            edges,
        })
    }

    /// Count one value, returning whether it landed in a bin
    ///
    /// Values outside the range, including NaN, are dropped.
    #[inline]
    pub fn record(&mut self, value: f64) -> bool {
        let bin = ((value - self.min) / self.bin_width).floor();
        if bin >= 0.0 && bin < self.counts.len() as f64 {
            self.counts[bin as usize] += 1;
            true
        } else {
            false
        }
    }

    /// Number of bins
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.counts.len()
    }

    /// Per-bin counts
    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Bin edges (`num_bins + 1` values, ascending)
    #[inline]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Count of one bin
    pub fn count(&self, bin: usize) -> Option<u64> {
        self.counts.get(bin).copied()
    }

    /// Total number of values counted
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Feeds one band of each pixel into a histogram
struct HistogramCalc<'h> {
    histogram: &'h mut Histogram,
    band: usize,
    mask: Option<f64>,
}

impl PixelCalc for HistogramCalc<'_> {
    fn process_pixel(&mut self, bands: &[f64]) -> ImgResult<()> {
        if let Some(sentinel) = self.mask {
            if bands[0] == sentinel {
                return Ok(());
            }
        }
        self.histogram.record(bands[self.band]);
        Ok(())
    }
}

/// Histogram one band of a single dataset
///
/// Every pixel of `source` contributes its `band` value; there is no
/// masking. Use [`accumulate_band_histogram`] for masks or multiple
/// datasets.
///
/// # Errors
///
/// Range and width errors as for [`Histogram::new`], plus
/// `ImgError::BandIndexOutOfRange` when `band` is not a band of
/// `source`.
pub fn band_histogram(
    source: &Raster,
    band: usize,
    min: f64,
    max: f64,
    bin_width: f64,
) -> ImgResult<Histogram> {
    let options = HistogramOptions::new(min, max, bin_width).with_band(band);
    accumulate_band_histogram(&[source], &options)
}

/// Accumulate one histogram over the same band of several datasets
///
/// Datasets are scanned sequentially in the order given, each over its
/// own full extent, all counting into a single histogram. When
/// `options.mask` is set, band 0 of each dataset is treated as its mask
/// band and pixels whose mask value equals the sentinel are skipped.
///
/// All parameters are validated before the first pixel is read.
///
/// # Errors
///
/// Range and width errors as for [`Histogram::new`];
/// `ImgError::EmptyInput` for an empty dataset list;
/// `ImgError::BandIndexOutOfRange` when `options.band` is not a band of
/// every dataset.
pub fn accumulate_band_histogram(
    sources: &[&Raster],
    options: &HistogramOptions,
) -> ImgResult<Histogram> {
    if sources.is_empty() {
        return Err(ImgError::EmptyInput("no source rasters"));
    }
    for source in sources {
        if options.band >= source.band_count() {
            return Err(ImgError::BandIndexOutOfRange {
                band: options.band,
                count: source.band_count(),
            });
        }
    }

    let mut histogram = Histogram::new(options.min, options.max, options.bin_width)?;

    for source in sources {
        let cursor = RasterCursor::new(&[source])?;
        let mut calc = HistogramCalc {
            histogram: &mut histogram,
            band: options.band,
            mask: options.mask,
        };
        cursor.run(&mut calc)?;
    }

    Ok(histogram)
}

/// Accumulate a histogram and write it as tab-separated text
///
/// The output has one line per bin, `<bin-lower-edge>\t<count>`, in
/// ascending bin order. An existing file at `path` is overwritten.
///
/// # Errors
///
/// Accumulation errors as for [`accumulate_band_histogram`], and
/// `ImgError::Io` for file creation or write failures.
pub fn write_band_histogram(
    sources: &[&Raster],
    options: &HistogramOptions,
    path: impl AsRef<Path>,
) -> ImgResult<()> {
    let histogram = accumulate_band_histogram(sources, options)?;

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for (edge, count) in histogram.edges().iter().zip(histogram.counts()) {
        writeln!(writer, "{edge}\t{count}")?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp16() -> Raster {
        let data: Vec<f64> = (0..16).map(f64::from).collect();
        Raster::from_band_data(4, 4, data).unwrap()
    }

    #[test]
    fn test_new_validates_range() {
        assert!(matches!(
            Histogram::new(5.0, 5.0, 1.0),
            Err(ImgError::InvalidRange { .. })
        ));
        assert!(matches!(
            Histogram::new(5.0, 1.0, 1.0),
            Err(ImgError::InvalidRange { .. })
        ));
        assert!(matches!(
            Histogram::new(f64::NAN, 1.0, 1.0),
            Err(ImgError::InvalidRange { .. })
        ));
        assert!(matches!(
            Histogram::new(0.0, f64::INFINITY, 1.0),
            Err(ImgError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_new_validates_width() {
        assert!(matches!(
            Histogram::new(0.0, 1.0, 0.0),
            Err(ImgError::InvalidBinWidth(_))
        ));
        assert!(matches!(
            Histogram::new(0.0, 1.0, -0.5),
            Err(ImgError::InvalidBinWidth(_))
        ));
        assert!(matches!(
            Histogram::new(0.0, 1.0, f64::NAN),
            Err(ImgError::InvalidBinWidth(_))
        ));
    }

    #[test]
    fn test_new_bounds_bin_count() {
        // A wide range over a narrow width must fail instead of trying
        // to allocate the counts.
        assert!(matches!(
            Histogram::new(0.0, 1e18, 1e-18),
            Err(ImgError::InvalidParameter(_))
        ));
        // The difference max - min itself can overflow to infinity
        assert!(matches!(
            Histogram::new(-f64::MAX, f64::MAX, 1.0),
            Err(ImgError::InvalidParameter(_))
        ));
        // One bin past the cap is still rejected before allocation
        assert!(matches!(
            Histogram::new(0.0, ((1 << 24) + 1) as f64, 1.0),
            Err(ImgError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_partial_final_bin() {
        // Range 0..10 at width 3 needs ceil(10/3) = 4 bins; the last
        // edge runs past max.
        let hist = Histogram::new(0.0, 10.0, 3.0).unwrap();
        assert_eq!(hist.num_bins(), 4);
        assert_eq!(hist.edges(), &[0.0, 3.0, 6.0, 9.0, 12.0]);
    }

    #[test]
    fn test_record_boundaries() {
        let mut hist = Histogram::new(0.0, 8.0, 2.0).unwrap();
        assert!(hist.record(0.0));
        assert!(hist.record(1.999));
        assert!(hist.record(2.0));
        assert!(hist.record(7.999));
        assert!(!hist.record(8.0));
        assert!(!hist.record(-0.001));
        assert!(!hist.record(f64::NAN));
        assert_eq!(hist.counts(), &[2, 1, 0, 1]);
        assert_eq!(hist.total(), 4);
    }

    #[test]
    fn test_band_histogram_ramp() {
        let hist = band_histogram(&ramp16(), 0, 0.0, 16.0, 4.0).unwrap();
        assert_eq!(hist.counts(), &[4, 4, 4, 4]);
        assert_eq!(hist.edges(), &[0.0, 4.0, 8.0, 12.0, 16.0]);
        assert_eq!(hist.total(), 16);
    }

    #[test]
    fn test_band_index_checked() {
        assert!(matches!(
            band_histogram(&ramp16(), 3, 0.0, 16.0, 4.0),
            Err(ImgError::BandIndexOutOfRange { band: 3, count: 1 })
        ));
    }

    #[test]
    fn test_multi_dataset_accumulation() {
        let a = ramp16();
        let b = ramp16();
        let options = HistogramOptions::new(0.0, 16.0, 4.0);
        let hist = accumulate_band_histogram(&[&a, &b], &options).unwrap();
        assert_eq!(hist.counts(), &[8, 8, 8, 8]);
    }

    #[test]
    fn test_empty_dataset_list() {
        let options = HistogramOptions::new(0.0, 16.0, 4.0);
        assert!(matches!(
            accumulate_band_histogram(&[], &options),
            Err(ImgError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_mask_excludes_pixels() {
        // Band 0 is the mask, band 1 the values. Pixels masked with 1.0
        // are dropped before binning.
        let mask = vec![1.0, 0.0, 0.0, 1.0];
        let values = vec![0.5, 1.5, 2.5, 3.5];
        let data: Vec<f64> = mask.into_iter().chain(values).collect();
        let raster = Raster::from_data(2, 2, 2, data).unwrap();

        let options = HistogramOptions::new(0.0, 4.0, 1.0)
            .with_band(1)
            .with_mask(1.0);
        let hist = accumulate_band_histogram(&[&raster], &options).unwrap();
        assert_eq!(hist.counts(), &[0, 1, 1, 0]);
    }

    #[test]
    fn test_fully_masked_is_empty() {
        let data = vec![7.0, 7.0, 7.0, 7.0, 1.0, 2.0, 3.0, 4.0];
        let raster = Raster::from_data(2, 2, 2, data).unwrap();
        let options = HistogramOptions::new(0.0, 8.0, 2.0)
            .with_band(1)
            .with_mask(7.0);
        let hist = accumulate_band_histogram(&[&raster], &options).unwrap();
        assert_eq!(hist.total(), 0);
        assert_eq!(hist.counts(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_out_of_range_values_dropped() {
        let data = vec![-5.0, 0.0, 15.9, 16.0, 100.0, f64::NAN, 8.0, 12.0];
        let raster = Raster::from_band_data(4, 2, data).unwrap();
        let hist = band_histogram(&raster, 0, 0.0, 16.0, 4.0).unwrap();
        assert_eq!(hist.counts(), &[1, 0, 1, 2]);
        assert_eq!(hist.total(), 4);
    }

    #[test]
    fn test_write_format() {
        let path = std::env::temp_dir().join("terrapix_hist_unit.txt");
        let options = HistogramOptions::new(0.0, 16.0, 4.0);
        write_band_histogram(&[&ramp16()], &options, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "0\t4\n4\t4\n8\t4\n12\t4\n");

        // Overwrites rather than appends
        write_band_histogram(&[&ramp16()], &options, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "0\t4\n4\t4\n8\t4\n12\t4\n");

        std::fs::remove_file(&path).ok();
    }
}

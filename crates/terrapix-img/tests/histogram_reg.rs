//! Band histogram regression test
//!
//! Tests bin arithmetic, the silent out-of-range drop policy, masked
//! and multi-dataset accumulation, and the tab-separated text output.

use terrapix_core::Raster;
use terrapix_img::{
    HistogramOptions, accumulate_band_histogram, band_histogram, write_band_histogram,
};
use terrapix_test::{RegParams, checker_raster, ramp_raster, regout_dir};

// ==========================================================================
// Test 1: Bin arithmetic on known fixtures
// ==========================================================================

#[test]
fn histogram_reg_basic() {
    let mut rp = RegParams::new("histogram_basic");

    // 16 distinct values 0..15 into 4 bins of width 4
    let ramp = ramp_raster(4, 4).expect("ramp fixture");
    let hist = band_histogram(&ramp, 0, 0.0, 16.0, 4.0).expect("histogram");

    rp.compare_values(4.0, hist.num_bins() as f64, 0.0);
    for bin in 0..4 {
        rp.compare_values(4.0, hist.count(bin).unwrap() as f64, 0.0);
    }
    for (i, &edge) in hist.edges().iter().enumerate() {
        rp.compare_values((i * 4) as f64, edge, 0.0);
    }
    rp.compare_values(16.0, hist.total() as f64, 0.0);

    // A width that doesn't divide the range rounds the bin count up,
    // and the last bin then runs past max: values 10 and 11 still land
    // in bin 3, only 12..=15 fall off the end.
    let uneven = band_histogram(&ramp, 0, 0.0, 10.0, 3.0).expect("uneven histogram");
    rp.compare_values(4.0, uneven.num_bins() as f64, 0.0);
    rp.compare_values(12.0, *uneven.edges().last().unwrap(), 0.0);
    rp.compare_values(12.0, uneven.total() as f64, 0.0);
    rp.compare_values(3.0, uneven.count(3).unwrap() as f64, 0.0);

    // A two-valued checkerboard lands in exactly two bins
    let checker = checker_raster(4, 4, 0.5, 2.5).expect("checker fixture");
    let bimodal = band_histogram(&checker, 0, 0.0, 4.0, 1.0).expect("checker histogram");
    rp.compare_values(8.0, bimodal.count(0).unwrap() as f64, 0.0);
    rp.compare_values(0.0, bimodal.count(1).unwrap() as f64, 0.0);
    rp.compare_values(8.0, bimodal.count(2).unwrap() as f64, 0.0);
    rp.compare_values(16.0, bimodal.total() as f64, 0.0);

    assert!(rp.cleanup(), "histogram basic tests failed");
}

// ==========================================================================
// Test 2: Drop policy and scan-order invariance
// ==========================================================================

#[test]
fn histogram_reg_policies() {
    let mut rp = RegParams::new("histogram_policies");

    // Out-of-range and NaN values never land in a bin
    let data = vec![-5.0, 0.0, 15.9, 16.0, 100.0, f64::NAN, 8.0, 12.0];
    let raster = Raster::from_band_data(4, 2, data).unwrap();
    let hist = band_histogram(&raster, 0, 0.0, 16.0, 4.0).expect("histogram");
    rp.compare_values(4.0, hist.total() as f64, 0.0);
    rp.compare_values(1.0, hist.count(0).unwrap() as f64, 0.0);
    rp.compare_values(0.0, hist.count(1).unwrap() as f64, 0.0);
    rp.compare_values(1.0, hist.count(2).unwrap() as f64, 0.0);
    rp.compare_values(2.0, hist.count(3).unwrap() as f64, 0.0);

    // The same values in any scan order produce the same histogram
    let forward: Vec<f64> = (0..16).map(f64::from).collect();
    let mut reversed = forward.clone();
    reversed.reverse();
    let a = Raster::from_band_data(4, 4, forward).unwrap();
    let b = Raster::from_band_data(4, 4, reversed).unwrap();
    let hist_a = band_histogram(&a, 0, 0.0, 16.0, 4.0).unwrap();
    let hist_b = band_histogram(&b, 0, 0.0, 16.0, 4.0).unwrap();
    for bin in 0..hist_a.num_bins() {
        rp.compare_values(
            hist_a.count(bin).unwrap() as f64,
            hist_b.count(bin).unwrap() as f64,
            0.0,
        );
    }

    assert!(rp.cleanup(), "histogram policy tests failed");
}

// ==========================================================================
// Test 3: Masked and multi-dataset accumulation
// ==========================================================================

#[test]
fn histogram_reg_mask_and_multi() {
    let mut rp = RegParams::new("histogram_mask");

    // Band 0 is the mask, band 1 carries the values
    let mask = vec![1.0, 0.0, 0.0, 1.0];
    let values = vec![0.5, 1.5, 2.5, 3.5];
    let data: Vec<f64> = mask.into_iter().chain(values).collect();
    let masked = Raster::from_data(2, 2, 2, data).unwrap();

    let options = HistogramOptions::new(0.0, 4.0, 1.0)
        .with_band(1)
        .with_mask(1.0);
    let hist = accumulate_band_histogram(&[&masked], &options).expect("masked histogram");
    rp.compare_values(2.0, hist.total() as f64, 0.0);
    rp.compare_values(0.0, hist.count(0).unwrap() as f64, 0.0);
    rp.compare_values(1.0, hist.count(1).unwrap() as f64, 0.0);
    rp.compare_values(1.0, hist.count(2).unwrap() as f64, 0.0);

    // A fully masked dataset contributes nothing
    let all_masked_data = vec![9.0, 9.0, 9.0, 9.0, 1.0, 2.0, 3.0, 4.0];
    let all_masked = Raster::from_data(2, 2, 2, all_masked_data).unwrap();
    let all_options = HistogramOptions::new(0.0, 8.0, 2.0)
        .with_band(1)
        .with_mask(9.0);
    let empty = accumulate_band_histogram(&[&all_masked], &all_options).expect("empty histogram");
    rp.compare_values(0.0, empty.total() as f64, 0.0);

    // Several datasets accumulate into one histogram
    let r1 = ramp_raster(4, 4).unwrap();
    let r2 = ramp_raster(4, 4).unwrap();
    let multi_options = HistogramOptions::new(0.0, 16.0, 4.0);
    let multi = accumulate_band_histogram(&[&r1, &r2], &multi_options).expect("multi histogram");
    rp.compare_values(32.0, multi.total() as f64, 0.0);
    for bin in 0..4 {
        rp.compare_values(8.0, multi.count(bin).unwrap() as f64, 0.0);
    }

    assert!(rp.cleanup(), "histogram mask tests failed");
}

// ==========================================================================
// Test 4: Text output and driver validation
// ==========================================================================

#[test]
fn histogram_reg_file_and_errors() {
    let mut rp = RegParams::new("histogram_file");

    let ramp = ramp_raster(4, 4).unwrap();
    let options = HistogramOptions::new(0.0, 16.0, 4.0);
    let path = format!("{}/histogram_file.txt", regout_dir());

    write_band_histogram(&[&ramp], &options, &path).expect("write histogram");
    let text = std::fs::read_to_string(&path).expect("read back");
    rp.compare_strings(text.as_bytes(), b"0\t4\n4\t4\n8\t4\n12\t4\n");

    // A second write overwrites rather than appends
    write_band_histogram(&[&ramp], &options, &path).expect("rewrite histogram");
    let text = std::fs::read_to_string(&path).expect("read back again");
    rp.compare_strings(text.as_bytes(), b"0\t4\n4\t4\n8\t4\n12\t4\n");

    // The same text also tracks the committed golden copy
    rp.write_data_and_check(text.as_bytes(), "txt").expect("golden check");

    // Eager validation fires before anything is written
    let inverted = band_histogram(&ramp, 0, 16.0, 0.0, 4.0);
    rp.compare_values(1.0, if inverted.is_err() { 1.0 } else { 0.0 }, 0.0);
    let zero_width = band_histogram(&ramp, 0, 0.0, 16.0, 0.0);
    rp.compare_values(1.0, if zero_width.is_err() { 1.0 } else { 0.0 }, 0.0);
    let absurd_bins = band_histogram(&ramp, 0, 0.0, 1e18, 1e-18);
    rp.compare_values(1.0, if absurd_bins.is_err() { 1.0 } else { 0.0 }, 0.0);
    let bad_band = band_histogram(&ramp, 2, 0.0, 16.0, 4.0);
    rp.compare_values(1.0, if bad_band.is_err() { 1.0 } else { 0.0 }, 0.0);
    let no_sources = accumulate_band_histogram(&[], &options);
    rp.compare_values(1.0, if no_sources.is_err() { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "histogram file tests failed");
}

//! terrapix-test - Regression test framework for Terrapix
//!
//! This crate provides a regression test framework supporting three
//! modes:
//!
//! - **Generate**: Create golden files for comparison
//! - **Compare**: Compare results with golden files
//! - **Display**: Run tests without comparison (visual inspection)
//!
//! # Usage
//!
//! ```ignore
//! use terrapix_test::{RegParams, RegTestMode};
//!
//! let mut rp = RegParams::new("histogram");
//! rp.compare_values(16.0, hist.total() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "generate", "compare", or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use terrapix_core::Raster;

/// Build a single-band ramp raster
///
/// Values run 0, 1, 2, ... in row-major order, so every pixel is
/// distinct and scan order is observable.
pub fn ramp_raster(width: usize, height: usize) -> TestResult<Raster> {
    let data = (0..width * height).map(|i| i as f64).collect();
    Ok(Raster::from_band_data(width, height, data)?)
}

/// Build a multi-band ramp raster
///
/// The ramp continues across bands: band `b` starts where band `b - 1`
/// ended.
pub fn ramp_raster_bands(width: usize, height: usize, bands: usize) -> TestResult<Raster> {
    let data = (0..width * height * bands).map(|i| i as f64).collect();
    Ok(Raster::from_data(width, height, bands, data)?)
}

/// Build a raster with every value set to `value`
pub fn constant_raster(
    width: usize,
    height: usize,
    bands: usize,
    value: f64,
) -> TestResult<Raster> {
    Ok(Raster::new_with_value(width, height, bands, value)?)
}

/// Build a single-band checkerboard raster
///
/// Pixels alternate between `a` (even x + y) and `b` (odd x + y).
pub fn checker_raster(width: usize, height: usize, a: f64, b: f64) -> TestResult<Raster> {
    let mut raster = Raster::new(width, height, 1)?;
    for y in 0..height {
        for x in 0..width {
            let value = if (x + y) % 2 == 0 { a } else { b };
            raster.set_value_unchecked(0, x, y, value);
        }
    }
    Ok(raster)
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // terrapix-test is at crates/terrapix-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the golden files directory
pub fn golden_dir() -> String {
    format!("{}/tests/golden", workspace_root())
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}

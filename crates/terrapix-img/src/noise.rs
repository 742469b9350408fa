//! Noise injection - per-pixel synthetic perturbation
//!
//! Two synthesizers perturb every band of every pixel. [`UniformNoise`]
//! adds an absolute offset drawn uniformly from `[-scale, scale]`;
//! [`GaussianPercentNoise`] adds a normally distributed fraction of the
//! pixel value itself, so bright pixels move further than dark ones.
//!
//! Each synthesizer owns its RNG. Seeded instances replay the same
//! stream on every run; unseeded instances draw from the OS. Both are
//! [`PixelCalc`] callbacks for [`RasterCursor::run_into`], or can be
//! driven through the [`add_noise`] convenience driver.
//!
//! # Examples
//!
//! ```
//! use terrapix_core::Raster;
//! use terrapix_img::{NoiseMode, NoiseOptions, add_noise};
//!
//! let raster = Raster::from_band_data(4, 4, vec![100.0; 16]).unwrap();
//! let options = NoiseOptions::new(NoiseMode::Uniform, 5.0).with_seed(42);
//!
//! let noisy = add_noise(&raster, &options).unwrap();
//! for (&out, &v) in noisy.data().iter().zip(raster.data()) {
//!     assert!((out - v).abs() <= 5.0);
//! }
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use terrapix_core::Raster;

use crate::calc::{PixelCalc, RasterCursor};
use crate::error::{ImgError, ImgResult};

/// Noise model applied per pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseMode {
    /// Add a uniform draw from `[-scale, scale]`
    #[default]
    Uniform,
    /// Add `value * z * scale` with `z` standard normal
    GaussianPercent,
}

/// Options for noise injection
#[derive(Debug, Clone)]
pub struct NoiseOptions {
    /// Noise model
    pub mode: NoiseMode,
    /// Noise magnitude; 0 is an exact identity
    pub scale: f64,
    /// RNG seed; None draws a fresh stream from the OS
    pub seed: Option<u64>,
}

impl Default for NoiseOptions {
    fn default() -> Self {
        Self {
            mode: NoiseMode::Uniform,
            scale: 1.0,
            seed: None,
        }
    }
}

impl NoiseOptions {
    /// Create options for the given model and magnitude
    pub fn new(mode: NoiseMode, scale: f64) -> Self {
        Self {
            mode,
            scale,
            ..Default::default()
        }
    }

    /// Fix the RNG seed for a reproducible stream
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn check_scale(scale: f64) -> ImgResult<()> {
    if !scale.is_finite() || scale < 0.0 {
        return Err(ImgError::InvalidParameter(format!(
            "noise scale must be finite and non-negative, got {scale}"
        )));
    }
    Ok(())
}

/// Adds a uniform draw from `[-scale, scale]` to every band value
#[derive(Debug)]
pub struct UniformNoise {
    scale: f64,
    rng: StdRng,
}

impl UniformNoise {
    /// Create a synthesizer, seeded when `seed` is Some
    ///
    /// # Errors
    ///
    /// Returns `ImgError::InvalidParameter` when `scale` is negative or
    /// not finite.
    pub fn new(scale: f64, seed: Option<u64>) -> ImgResult<Self> {
        check_scale(scale)?;
        Ok(UniformNoise {
            scale,
            rng: make_rng(seed),
        })
    }
}

impl PixelCalc for UniformNoise {
    fn process_pixel_into(&mut self, bands: &[f64], output: &mut [f64]) -> ImgResult<()> {
        for (out, &value) in output.iter_mut().zip(bands) {
            *out = value + self.rng.random_range(-self.scale..=self.scale);
        }
        Ok(())
    }
}

/// Adds a normally distributed fraction of each band value
///
/// The perturbation is `value * z * scale` with `z` drawn from the
/// standard normal distribution, so a zero-valued pixel stays zero.
#[derive(Debug)]
pub struct GaussianPercentNoise {
    scale: f64,
    rng: StdRng,
}

impl GaussianPercentNoise {
    /// Create a synthesizer, seeded when `seed` is Some
    ///
    /// # Errors
    ///
    /// Returns `ImgError::InvalidParameter` when `scale` is negative or
    /// not finite.
    pub fn new(scale: f64, seed: Option<u64>) -> ImgResult<Self> {
        check_scale(scale)?;
        Ok(GaussianPercentNoise {
            scale,
            rng: make_rng(seed),
        })
    }
}

impl PixelCalc for GaussianPercentNoise {
    fn process_pixel_into(&mut self, bands: &[f64], output: &mut [f64]) -> ImgResult<()> {
        for (out, &value) in output.iter_mut().zip(bands) {
            let z: f64 = self.rng.sample(StandardNormal);
            // z * scale first: value * z alone overflows for values
            // near f64::MAX
            *out = value + value * (z * self.scale);
        }
        Ok(())
    }
}

/// Produce a noisy copy of `source`
///
/// The output raster matches the source's size and band count and
/// carries its spatial registration when present. The source itself is
/// never modified.
///
/// # Errors
///
/// Returns `ImgError::InvalidParameter` for a negative or non-finite
/// `options.scale`.
pub fn add_noise(source: &Raster, options: &NoiseOptions) -> ImgResult<Raster> {
    let cursor = RasterCursor::new(&[source])?;
    let (width, height) = cursor.size();
    let mut out = Raster::new(width, height, cursor.band_total())?;
    out.set_geometry(cursor.geometry());

    match options.mode {
        NoiseMode::Uniform => {
            let mut calc = UniformNoise::new(options.scale, options.seed)?;
            cursor.run_into(&mut calc, &mut out)?;
        }
        NoiseMode::GaussianPercent => {
            let mut calc = GaussianPercentNoise::new(options.scale, options.seed)?;
            cursor.run_into(&mut calc, &mut out)?;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> Raster {
        let data = (0..width * height).map(|i| i as f64).collect();
        Raster::from_band_data(width, height, data).unwrap()
    }

    #[test]
    fn test_scale_validated() {
        assert!(matches!(
            UniformNoise::new(-1.0, None),
            Err(ImgError::InvalidParameter(_))
        ));
        assert!(matches!(
            GaussianPercentNoise::new(f64::NAN, Some(1)),
            Err(ImgError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_zero_scale_is_identity() {
        let source = ramp(4, 4);
        for mode in [NoiseMode::Uniform, NoiseMode::GaussianPercent] {
            let options = NoiseOptions::new(mode, 0.0).with_seed(7);
            let out = add_noise(&source, &options).unwrap();
            assert_eq!(out.data(), source.data(), "{mode:?} moved values");
        }
    }

    #[test]
    fn test_zero_scale_identity_at_extreme_magnitudes() {
        let data: Vec<f64> = (0..16)
            .map(|i| if i % 2 == 0 { f64::MAX } else { -1e308 })
            .collect();
        let source = Raster::from_band_data(4, 4, data).unwrap();
        for mode in [NoiseMode::Uniform, NoiseMode::GaussianPercent] {
            let options = NoiseOptions::new(mode, 0.0).with_seed(7);
            let out = add_noise(&source, &options).unwrap();
            assert_eq!(out.data(), source.data(), "{mode:?} moved values");
        }
    }

    #[test]
    fn test_gaussian_percent_extreme_magnitudes_stay_finite() {
        let source = Raster::from_band_data(4, 4, vec![1e308; 16]).unwrap();
        let options = NoiseOptions::new(NoiseMode::GaussianPercent, 1e-3).with_seed(13);
        let out = add_noise(&source, &options).unwrap();
        assert!(out.data().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_uniform_stays_within_scale() {
        let source = ramp(8, 8);
        let options = NoiseOptions::new(NoiseMode::Uniform, 2.5).with_seed(11);
        let out = add_noise(&source, &options).unwrap();

        let mut moved = false;
        for (&noisy, &clean) in out.data().iter().zip(source.data()) {
            assert!((noisy - clean).abs() <= 2.5);
            moved |= noisy != clean;
        }
        assert!(moved);
    }

    #[test]
    fn test_seed_reproducible() {
        let source = ramp(6, 6);
        let options = NoiseOptions::new(NoiseMode::GaussianPercent, 0.1).with_seed(99);
        let a = add_noise(&source, &options).unwrap();
        let b = add_noise(&source, &options).unwrap();
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn test_seeds_are_independent_streams() {
        let source = ramp(6, 6);
        let a = add_noise(
            &source,
            &NoiseOptions::new(NoiseMode::Uniform, 1.0).with_seed(1),
        )
        .unwrap();
        let b = add_noise(
            &source,
            &NoiseOptions::new(NoiseMode::Uniform, 1.0).with_seed(2),
        )
        .unwrap();
        assert_ne!(a.data(), b.data());
    }

    #[test]
    fn test_gaussian_percent_of_zero_is_zero() {
        let source = Raster::from_band_data(4, 4, vec![0.0; 16]).unwrap();
        let options = NoiseOptions::new(NoiseMode::GaussianPercent, 10.0).with_seed(3);
        let out = add_noise(&source, &options).unwrap();
        assert!(out.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_output_keeps_shape_and_geometry() {
        use terrapix_core::RasterGeometry;

        let geom = RasterGeometry::square(500.0, 4000.0, 30.0).unwrap();
        let data: Vec<f64> = (0..32).map(|i| i as f64).collect();
        let source = Raster::from_data(4, 4, 2, data).unwrap().with_geometry(geom);

        let options = NoiseOptions::new(NoiseMode::Uniform, 1.0).with_seed(5);
        let out = add_noise(&source, &options).unwrap();
        assert_eq!(out.size(), (4, 4));
        assert_eq!(out.band_count(), 2);
        assert_eq!(out.geometry(), Some(geom));
    }
}

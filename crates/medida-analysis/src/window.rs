//! Window functions applied before transformation.

use crate::error::{Error, Result};
use std::f32::consts::PI;

/// Window function types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Rectangular (no windowing). Used for the deconvolution path, where
    /// the sweep stimulus is already self-windowed by its edge fades.
    Rectangular,
    /// Hann window (raised cosine). Coherent gain 0.5: consumers converting
    /// magnitude to dBFS divide by `fft_size / 4` to recover
    /// full-scale-equivalent amplitude.
    Hann,
}

impl Window {
    /// Apply the window to a buffer in place.
    ///
    /// Hann requires at least 2 samples; the single-sample case would
    /// divide by zero in the denominator.
    pub fn apply(&self, buffer: &mut [f32]) -> Result<()> {
        let n = buffer.len();
        match self {
            Window::Rectangular => {}
            Window::Hann => {
                if n < 2 {
                    return Err(Error::InvalidSize(n));
                }
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let w = 0.5 * (1.0 - (2.0 * PI * i as f32 / (n - 1) as f32).cos());
                    *sample *= w;
                }
            }
        }
        Ok(())
    }

    /// Get window coefficients.
    pub fn coefficients(&self, size: usize) -> Result<Vec<f32>> {
        let mut coeffs = vec![1.0; size];
        self.apply(&mut coeffs)?;
        Ok(coeffs)
    }

    /// Coherent gain: mean of the window coefficients.
    pub fn coherent_gain(&self) -> f32 {
        match self {
            Window::Rectangular => 1.0,
            Window::Hann => 0.5,
        }
    }
}

//! FFT wrapper around the external complex-FFT primitive.

use rustfft::{FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// FFT processor with a cached plan for one transform size.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f32>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given size.
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);

        Self { fft, size }
    }

    /// Get FFT size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Perform forward FFT on real input.
    ///
    /// Input shorter than the FFT size is zero-padded; longer input is
    /// truncated. Returns the positive-frequency half of the spectrum
    /// (size/2 + 1 bins, DC through Nyquist).
    pub fn forward(&self, input: &[f32]) -> Vec<Complex<f32>> {
        let mut buffer: Vec<Complex<f32>> =
            input.iter().map(|&x| Complex::new(x, 0.0)).collect();
        buffer.resize(self.size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer.truncate(self.size / 2 + 1);
        buffer
    }

    /// Perform forward FFT on complex input (in-place, full spectrum).
    pub fn forward_complex(&self, buffer: &mut [Complex<f32>]) {
        self.fft.process(buffer);
    }
}

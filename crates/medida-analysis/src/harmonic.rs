//! Harmonic peak search and Total Harmonic Distortion.

use crate::buffer::SampleBuffer;
use crate::error::{Error, Result};
use crate::fft::Fft;
use crate::level::linear_to_db;
use crate::window::Window;

/// Measured level of one harmonic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HarmonicLevel {
    /// Peak found inside the search window.
    Measured {
        /// Frequency of the peak bin in Hz.
        frequency_hz: f32,
        /// Linear magnitude, normalized to full scale.
        magnitude: f32,
    },
    /// The harmonic's target frequency sits at or above Nyquist; it is
    /// excluded from the distortion sum.
    AboveNyquist,
}

impl HarmonicLevel {
    /// Linear magnitude contributed to the distortion sum.
    pub fn magnitude(&self) -> f32 {
        match self {
            HarmonicLevel::Measured { magnitude, .. } => *magnitude,
            HarmonicLevel::AboveNyquist => 0.0,
        }
    }
}

/// One harmonic entry in the table.
#[derive(Debug, Clone, Copy)]
pub struct HarmonicEntry {
    /// Harmonic order (2 = first overtone).
    pub order: usize,
    /// Nominal frequency, `order * fundamental_hz`.
    pub target_hz: f32,
    /// What the peak search found.
    pub level: HarmonicLevel,
}

/// The located fundamental.
#[derive(Debug, Clone, Copy)]
pub struct Fundamental {
    /// Frequency the caller asked for.
    pub expected_hz: f32,
    /// Frequency of the peak bin actually found.
    pub measured_hz: f32,
    /// Linear magnitude, normalized to full scale.
    pub magnitude: f32,
}

/// Fundamental plus harmonics, as located in the spectrum.
#[derive(Debug, Clone)]
pub struct HarmonicTable {
    /// The located fundamental (H1).
    pub fundamental: Fundamental,
    /// Harmonics in ascending order, starting at order 2.
    pub harmonics: Vec<HarmonicEntry>,
}

/// Result of a THD measurement.
#[derive(Debug, Clone)]
pub struct ThdAnalysis {
    /// The harmonic table the ratios were derived from.
    pub table: HarmonicTable,
    /// THD as a ratio (0.0 to 1.0+).
    pub thd_ratio: f32,
    /// THD in percent.
    pub thd_percent: f32,
    /// THD in dB.
    pub thd_db: f32,
}

/// THD analyzer: locates a fundamental and its harmonics in a single
/// Hann-windowed spectrum.
pub struct HarmonicAnalyzer {
    fft: Fft,
    window: Vec<f32>,
    harmonic_count: usize,
    search_range_hz: f32,
}

impl HarmonicAnalyzer {
    /// Create an analyzer.
    ///
    /// `harmonic_count` is the highest harmonic order analyzed; 1 means
    /// fundamental only (THD of 0 by construction).
    pub fn new(fft_size: usize, harmonic_count: usize) -> Result<Self> {
        if fft_size == 0 {
            return Err(Error::InvalidParameter("fft_size must be positive"));
        }
        if harmonic_count < 1 {
            return Err(Error::InvalidParameter(
                "harmonic_count must be at least 1",
            ));
        }
        Ok(Self {
            fft: Fft::new(fft_size),
            window: Window::Hann.coefficients(fft_size)?,
            harmonic_count,
            search_range_hz: 50.0,
        })
    }

    /// Override the peak-search tolerance (default 50 Hz).
    pub fn with_search_range(mut self, range_hz: f32) -> Self {
        self.search_range_hz = range_hz;
        self
    }

    /// Analyze THD of a signal with a known nominal fundamental.
    pub fn analyze(&self, signal: &SampleBuffer, fundamental_hz: f32) -> Result<ThdAnalysis> {
        let sample_rate = signal.sample_rate() as f32;
        let nyquist = sample_rate / 2.0;
        if !fundamental_hz.is_finite() || fundamental_hz <= 0.0 || fundamental_hz >= nyquist {
            return Err(Error::InvalidParameter(
                "fundamental_hz must be positive and below Nyquist",
            ));
        }

        let fft_size = self.fft.size();
        let samples = signal.samples();

        let mut frame = vec![0.0f32; fft_size];
        let available = samples.len().min(fft_size);
        frame[..available].copy_from_slice(&samples[..available]);
        for (s, w) in frame.iter_mut().zip(self.window.iter()) {
            *s *= w;
        }

        // Same dBFS normalization as the spectrum estimator: FFT scaling
        // times the Hann coherent gain.
        let scale = fft_size as f32 / 4.0;
        let magnitudes: Vec<f32> = self
            .fft
            .forward(&frame)
            .iter()
            .map(|c| c.norm() / scale)
            .collect();

        let bin_width = sample_rate / fft_size as f32;

        let (fund_bin, fund_mag) = find_peak(&magnitudes, fundamental_hz, bin_width, self.search_range_hz);
        let fundamental = Fundamental {
            expected_hz: fundamental_hz,
            measured_hz: fund_bin as f32 * bin_width,
            magnitude: fund_mag,
        };

        let mut harmonics = Vec::with_capacity(self.harmonic_count.saturating_sub(1));
        for order in 2..=self.harmonic_count {
            let target_hz = fundamental_hz * order as f32;
            let level = if target_hz >= nyquist {
                HarmonicLevel::AboveNyquist
            } else {
                let (bin, magnitude) =
                    find_peak(&magnitudes, target_hz, bin_width, self.search_range_hz);
                HarmonicLevel::Measured {
                    frequency_hz: bin as f32 * bin_width,
                    magnitude,
                }
            };
            harmonics.push(HarmonicEntry {
                order,
                target_hz,
                level,
            });
        }

        let harmonic_power: f32 = harmonics.iter().map(|h| h.level.magnitude().powi(2)).sum();
        // Near-zero fundamental is regularized rather than divided by.
        let thd_ratio = harmonic_power.sqrt() / (fundamental.magnitude + 1e-10);
        let thd_db = 20.0 * thd_ratio.max(1e-10).log10();

        Ok(ThdAnalysis {
            table: HarmonicTable {
                fundamental,
                harmonics,
            },
            thd_ratio,
            thd_percent: 100.0 * thd_ratio,
            thd_db,
        })
    }
}

impl ThdAnalysis {
    /// Level of a harmonic relative to the fundamental, in dB.
    pub fn relative_db(&self, entry: &HarmonicEntry) -> f32 {
        linear_to_db(entry.level.magnitude()) - linear_to_db(self.table.fundamental.magnitude)
    }
}

/// Locate the strongest bin within `search_range_hz` of `target_hz`.
///
/// The scan window is clamped to the spectrum; on an exact magnitude tie
/// the first (lowest-index) bin wins, which keeps the result deterministic.
fn find_peak(magnitudes: &[f32], target_hz: f32, bin_width: f32, search_range_hz: f32) -> (usize, f32) {
    let expected = (target_hz / bin_width).round() as usize;
    let span = (search_range_hz / bin_width).round() as usize;

    let lo = expected.saturating_sub(span);
    let hi = (expected + span).min(magnitudes.len() - 1);

    let mut best_bin = lo;
    let mut best_mag = magnitudes[lo];
    for (i, &mag) in magnitudes.iter().enumerate().take(hi + 1).skip(lo) {
        if mag > best_mag {
            best_bin = i;
            best_mag = mag;
        }
    }
    (best_bin, best_mag)
}

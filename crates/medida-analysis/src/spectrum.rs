//! Windowed, overlap-averaged power-spectrum estimation.

use crate::buffer::SampleBuffer;
use crate::error::{Error, Result};
use crate::fft::Fft;
use crate::window::Window;

/// One discrete frequency sample of an FFT output.
#[derive(Debug, Clone, Copy)]
pub struct SpectrumBin {
    /// Bin center frequency in Hz.
    pub frequency_hz: f32,
    /// Magnitude in dB (dBFS for estimator output, dB re unity gain for
    /// transfer functions).
    pub magnitude_db: f32,
    /// Phase in degrees, in (-180, 180].
    pub phase_deg: f32,
}

/// An ordered sequence of bins, DC through Nyquist.
///
/// Invariant: `bins[i].frequency_hz == i * sample_rate / fft_size` for
/// estimator output; band-restricted spectra keep the spacing but start
/// above DC.
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// The bins, in strictly increasing frequency order.
    pub bins: Vec<SpectrumBin>,
    /// Sample rate of the analyzed signal in Hz.
    pub sample_rate: u32,
    /// FFT size the bins were computed at.
    pub fft_size: usize,
}

impl Spectrum {
    /// Frequency spacing between adjacent bins in Hz.
    pub fn bin_width(&self) -> f32 {
        self.sample_rate as f32 / self.fft_size as f32
    }

    /// The bin with the highest magnitude, if any.
    pub fn peak(&self) -> Option<&SpectrumBin> {
        self.bins
            .iter()
            .max_by(|a, b| a.magnitude_db.partial_cmp(&b.magnitude_db).unwrap())
    }
}

/// Fold a phase angle into the half-open interval (-180, 180].
///
/// `atan2` can land on exactly -180 (negative real axis approached from a
/// signed-zero imaginary part), which the bin invariant excludes.
pub(crate) fn wrap_phase_deg(deg: f32) -> f32 {
    if deg <= -180.0 { deg + 360.0 } else { deg }
}

/// Power-spectrum estimator with Hann windowing and overlap averaging.
///
/// Magnitudes are normalized to dBFS: the per-bin averaged magnitude is
/// divided by `fft_size / 4` (FFT scaling times the Hann coherent gain of
/// 0.5) so a full-scale sine reads 0 dBFS, then offset by the source
/// format's noise-floor epsilon before the log.
pub struct SpectrumEstimator {
    fft: Fft,
    window: Vec<f32>,
}

impl SpectrumEstimator {
    /// Create an estimator for one FFT size.
    pub fn new(fft_size: usize) -> Result<Self> {
        if fft_size == 0 {
            return Err(Error::InvalidParameter("fft_size must be positive"));
        }
        Ok(Self {
            fft: Fft::new(fft_size),
            window: Window::Hann.coefficients(fft_size)?,
        })
    }

    /// FFT size this estimator was built for.
    pub fn fft_size(&self) -> usize {
        self.fft.size()
    }

    /// Estimate the power spectrum over `num_windows` frames.
    ///
    /// Frame `w` starts at `start_offset + w * hop_size`. Frames running
    /// past the end of the signal are zero-padded; that is not an error,
    /// but a warning is logged because the estimate degrades below one
    /// full window of real data.
    pub fn estimate(
        &self,
        signal: &SampleBuffer,
        hop_size: usize,
        num_windows: usize,
        start_offset: usize,
    ) -> Result<Spectrum> {
        if num_windows == 0 {
            return Err(Error::InvalidParameter("num_windows must be at least 1"));
        }

        let fft_size = self.fft.size();
        let samples = signal.samples();
        let spectrum_size = fft_size / 2 + 1;

        let mut power = vec![0.0f32; spectrum_size];
        let mut last = Vec::new();
        let mut padded_windows = 0usize;

        let mut frame = vec![0.0f32; fft_size];
        for w in 0..num_windows {
            let start = start_offset + w * hop_size;
            let available = samples.len().saturating_sub(start).min(fft_size);

            if available > 0 {
                frame[..available].copy_from_slice(&samples[start..start + available]);
            }
            frame[available..].fill(0.0);
            if available < fft_size {
                padded_windows += 1;
            }

            for (s, coeff) in frame.iter_mut().zip(self.window.iter()) {
                *s *= coeff;
            }

            let spectrum = self.fft.forward(&frame);
            for (acc, c) in power.iter_mut().zip(spectrum.iter()) {
                *acc += c.norm_sqr();
            }
            last = spectrum;
        }

        if padded_windows > 0 {
            tracing::warn!(
                padded_windows,
                num_windows,
                fft_size,
                signal_len = samples.len(),
                "analysis span exceeds signal length, frames zero-padded; results may be unreliable"
            );
        }

        let epsilon = signal.bit_depth().epsilon();
        let scale = fft_size as f32 / 4.0;
        let bin_width = signal.sample_rate() as f32 / fft_size as f32;

        // Averaging is done on power; phase comes from the final frame,
        // since power averaging discards it.
        let bins = (0..spectrum_size)
            .map(|i| {
                let avg_power = power[i] / num_windows as f32;
                let magnitude = avg_power.sqrt() / scale;
                SpectrumBin {
                    frequency_hz: i as f32 * bin_width,
                    magnitude_db: 20.0 * (magnitude + epsilon).log10(),
                    phase_deg: wrap_phase_deg(last[i].arg().to_degrees()),
                }
            })
            .collect();

        Ok(Spectrum {
            bins,
            sample_rate: signal.sample_rate(),
            fft_size,
        })
    }

    /// Single-window spectrum of the start of the signal.
    pub fn single_shot(&self, signal: &SampleBuffer) -> Result<Spectrum> {
        self.estimate(signal, 0, 1, 0)
    }

    /// Multi-window average at 50% overlap, covering the whole signal.
    pub fn averaged(&self, signal: &SampleBuffer) -> Result<Spectrum> {
        let fft_size = self.fft.size();
        let hop_size = fft_size / 2;
        let num_windows = if signal.len() > fft_size && hop_size > 0 {
            (signal.len() - fft_size) / hop_size + 1
        } else {
            1
        };
        self.estimate(signal, hop_size, num_windows, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::BitDepth;
    use std::f32::consts::PI;

    fn sine_buffer(freq_hz: f32, sample_rate: u32, num_samples: usize, amplitude: f32) -> SampleBuffer {
        let samples = (0..num_samples)
            .map(|i| amplitude * (2.0 * PI * freq_hz * i as f32 / sample_rate as f32).sin())
            .collect();
        SampleBuffer::from_mono(samples, sample_rate, BitDepth::Float32)
    }

    #[test]
    fn rejects_zero_fft_size() {
        assert!(matches!(
            SpectrumEstimator::new(0),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_zero_windows() {
        let estimator = SpectrumEstimator::new(256).unwrap();
        let signal = sine_buffer(1000.0, 48000, 256, 1.0);
        assert!(matches!(
            estimator.estimate(&signal, 0, 0, 0),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn bin_frequencies_strictly_increasing() {
        let estimator = SpectrumEstimator::new(1024).unwrap();
        let signal = sine_buffer(440.0, 48000, 1024, 0.5);
        let spectrum = estimator.single_shot(&signal).unwrap();

        assert_eq!(spectrum.bins.len(), 513);
        for pair in spectrum.bins.windows(2) {
            assert!(pair[1].frequency_hz > pair[0].frequency_hz);
        }
        assert!((spectrum.bins[1].frequency_hz - spectrum.bin_width()).abs() < 1e-3);
    }

    #[test]
    fn peak_matches_tone_within_half_db() {
        // Bin-centered tone: 48000/4096 * 100 = 1171.875 Hz
        let sample_rate = 48000;
        let fft_size = 4096;
        let freq = 100.0 * sample_rate as f32 / fft_size as f32;
        let amplitude = 0.25;

        let signal = sine_buffer(freq, sample_rate, fft_size, amplitude);
        let estimator = SpectrumEstimator::new(fft_size).unwrap();
        let spectrum = estimator.single_shot(&signal).unwrap();

        let peak = spectrum.peak().unwrap();
        assert!(
            (peak.frequency_hz - freq).abs() <= spectrum.bin_width(),
            "Peak at {} Hz, expected near {} Hz",
            peak.frequency_hz,
            freq
        );

        let expected_db = 20.0 * amplitude.log10();
        assert!(
            (peak.magnitude_db - expected_db).abs() < 0.5,
            "Peak magnitude {} dB, expected {} dB",
            peak.magnitude_db,
            expected_db
        );
    }

    #[test]
    fn phase_stays_in_half_open_degree_range() {
        let estimator = SpectrumEstimator::new(512).unwrap();
        let signal = sine_buffer(997.0, 48000, 512, 0.9);
        let spectrum = estimator.single_shot(&signal).unwrap();

        for bin in &spectrum.bins {
            assert!(bin.phase_deg > -180.0 && bin.phase_deg <= 180.0);
        }
    }

    #[test]
    fn short_signal_zero_pads() {
        let estimator = SpectrumEstimator::new(2048).unwrap();
        let signal = sine_buffer(1000.0, 48000, 100, 0.5);
        let spectrum = estimator.single_shot(&signal).unwrap();

        assert_eq!(spectrum.bins.len(), 1025);
        assert!(spectrum.bins.iter().all(|b| b.magnitude_db.is_finite()));
    }

    #[test]
    fn averaging_matches_single_window_level() {
        // A stationary tone should read the same level whether estimated
        // from one window or averaged over many.
        let sample_rate = 48000;
        let fft_size = 1024;
        let freq = 64.0 * sample_rate as f32 / fft_size as f32;

        let signal = sine_buffer(freq, sample_rate, fft_size * 8, 0.5);
        let estimator = SpectrumEstimator::new(fft_size).unwrap();

        let single = estimator.single_shot(&signal).unwrap();
        let averaged = estimator.averaged(&signal).unwrap();

        let peak_single = single.peak().unwrap().magnitude_db;
        let peak_avg = averaged.peak().unwrap().magnitude_db;
        assert!(
            (peak_single - peak_avg).abs() < 0.2,
            "Single {peak_single} dB vs averaged {peak_avg} dB"
        );
    }

    #[test]
    fn epsilon_floors_silent_bins() {
        let silence = SampleBuffer::from_mono(vec![0.0; 1024], 48000, BitDepth::Pcm16);
        let estimator = SpectrumEstimator::new(1024).unwrap();
        let spectrum = estimator.single_shot(&silence).unwrap();

        // All-zero input: every bin sits exactly at the 16-bit floor.
        for bin in &spectrum.bins {
            assert!((bin.magnitude_db - (-96.0)).abs() < 0.1);
        }
    }
}

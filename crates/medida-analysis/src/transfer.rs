//! Frequency-response estimation via regularized spectral deconvolution.

use crate::buffer::SampleBuffer;
use crate::error::{Error, Result};
use crate::fft::Fft;
use crate::level::{linear_to_db, rms};
use crate::spectrum::{Spectrum, SpectrumBin};
use rustfft::num_complex::Complex;

/// Magnitude floor for unmeasurable bins, dB re unity gain.
const MAGNITUDE_FLOOR_DB: f32 = -120.0;

/// Fraction of the reference DC-bin magnitude below which a denominator
/// bin is treated as noise and the quotient forced to zero.
const REGULARIZATION: f32 = 1e-10;

/// Result of a frequency-response measurement.
#[derive(Debug, Clone)]
pub struct FrequencyResponse {
    /// Response bins restricted to the requested band. Magnitude is dB
    /// relative to unity gain, phase in degrees.
    pub spectrum: Spectrum,
    /// RMS level of the reference signal in dB, for diagnostics.
    pub reference_rms_db: f32,
    /// RMS level of the recorded signal in dB (before any level
    /// normalization), for diagnostics.
    pub recorded_rms_db: f32,
}

/// Estimates H(f) = Y(f)/X(f) between a recorded and a reference signal.
///
/// Both signals are zero-padded to the next power of two and transformed
/// once, without windowing: the sweep stimulus is already self-windowed by
/// its edge fades. Per bin the quotient is computed as
/// `Y * conj(X) / |X|^2`, with bins whose reference energy falls below a
/// small fraction of the reference DC magnitude forced to zero instead of
/// divided.
pub struct TransferFunctionEstimator {
    f_lo: f32,
    f_hi: f32,
}

impl TransferFunctionEstimator {
    /// Create an estimator emitting only bins inside `[f_lo, f_hi]`.
    pub fn new(f_lo: f32, f_hi: f32) -> Result<Self> {
        if !f_lo.is_finite() || f_lo < 0.0 {
            return Err(Error::InvalidParameter("f_lo must be non-negative"));
        }
        if !f_hi.is_finite() || f_hi <= f_lo {
            return Err(Error::InvalidParameter("f_hi must be above f_lo"));
        }
        Ok(Self { f_lo, f_hi })
    }

    /// Estimate the frequency response of `recorded` against `reference`.
    ///
    /// With `normalize_levels` the recorded signal is scaled to the
    /// reference RMS first, so the response shows only frequency-dependent
    /// gain; without it, any overall level offset stays visible in the
    /// magnitude. Both RMS levels are reported either way.
    pub fn estimate(
        &self,
        reference: &SampleBuffer,
        recorded: &SampleBuffer,
        normalize_levels: bool,
    ) -> Result<FrequencyResponse> {
        if reference.sample_rate() != recorded.sample_rate() {
            return Err(Error::SampleRateMismatch {
                reference: reference.sample_rate(),
                recorded: recorded.sample_rate(),
            });
        }

        let reference_rms = rms(reference.samples());
        let recorded_rms = rms(recorded.samples());

        let fft_size = reference
            .len()
            .max(recorded.len())
            .max(2)
            .next_power_of_two();
        let fft = Fft::new(fft_size);

        let x = fft.forward(reference.samples());
        let y = if normalize_levels && recorded_rms > 1e-10 {
            let scale = reference_rms / recorded_rms;
            let scaled: Vec<f32> = recorded.samples().iter().map(|&s| s * scale).collect();
            fft.forward(&scaled)
        } else {
            fft.forward(recorded.samples())
        };

        let threshold = REGULARIZATION * x[0].norm();
        let floor = 10.0_f32.powf(MAGNITUDE_FLOOR_DB / 20.0);
        let bin_width = reference.sample_rate() as f32 / fft_size as f32;

        let mut bins = Vec::new();
        for i in 0..x.len() {
            let frequency_hz = i as f32 * bin_width;
            if frequency_hz < self.f_lo || frequency_hz > self.f_hi {
                continue;
            }

            let denom = x[i].norm_sqr();
            let h = if denom <= threshold {
                Complex::new(0.0, 0.0)
            } else {
                y[i] * x[i].conj() / denom
            };

            bins.push(SpectrumBin {
                frequency_hz,
                magnitude_db: (20.0 * h.norm().max(floor).log10()).max(MAGNITUDE_FLOOR_DB),
                phase_deg: crate::spectrum::wrap_phase_deg(h.arg().to_degrees()),
            });
        }

        Ok(FrequencyResponse {
            spectrum: Spectrum {
                bins,
                sample_rate: reference.sample_rate(),
                fft_size,
            },
            reference_rms_db: linear_to_db(reference_rms),
            recorded_rms_db: linear_to_db(recorded_rms),
        })
    }
}

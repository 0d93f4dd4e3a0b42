//! Logarithmic sine sweep stimulus synthesis.
//!
//! Uses the Farina exponential sweep, preceded by lead-in silence (no
//! transient at stream start) and shaped with raised-cosine edge fades
//! (no discontinuity clicks at the sweep boundaries).

use crate::buffer::SampleBuffer;
use crate::error::{Error, Result};
use crate::level::{BitDepth, db_to_linear};
use std::f32::consts::PI;

/// Parameters of a sweep stimulus.
#[derive(Debug, Clone, Copy)]
pub struct SweepSpec {
    /// Sweep start frequency in Hz.
    pub start_freq: f32,
    /// Sweep end frequency in Hz.
    pub end_freq: f32,
    /// Sweep length in samples; always a power of two so the later
    /// deconvolution FFT stays friendly.
    pub duration_samples: usize,
    /// Silence prepended before the sweep, in samples.
    pub lead_in_samples: usize,
    /// Peak level of the sweep in dBFS; keep below 0 to leave headroom on
    /// playback hardware.
    pub level_db: f32,
}

impl SweepSpec {
    /// Build a spec from a requested duration in seconds.
    ///
    /// The sample count is snapped to the nearest power of two, ties
    /// toward the smaller.
    pub fn from_duration_secs(
        start_freq: f32,
        end_freq: f32,
        duration_secs: f32,
        lead_in_samples: usize,
        level_db: f32,
        sample_rate: u32,
    ) -> Self {
        let requested = (duration_secs * sample_rate as f32).round() as usize;
        Self {
            start_freq,
            end_freq,
            duration_samples: nearest_power_of_two(requested),
            lead_in_samples,
            level_db,
        }
    }

    /// Validate the spec against a sample rate.
    pub fn validate(&self, sample_rate: u32) -> Result<()> {
        if !self.start_freq.is_finite() || self.start_freq <= 0.0 {
            return Err(Error::InvalidParameter("start_freq must be positive"));
        }
        if !self.end_freq.is_finite() {
            return Err(Error::InvalidParameter("end_freq must be finite"));
        }
        if self.start_freq >= self.end_freq {
            return Err(Error::InvalidParameter(
                "start_freq must be below end_freq",
            ));
        }
        if self.end_freq >= sample_rate as f32 / 2.0 {
            return Err(Error::InvalidParameter("end_freq must be below Nyquist"));
        }
        if self.duration_samples == 0 || !self.duration_samples.is_power_of_two() {
            return Err(Error::InvalidParameter(
                "duration_samples must be a power of two",
            ));
        }
        Ok(())
    }

    /// Generate the stimulus: lead-in silence followed by the sweep.
    pub fn generate(&self, sample_rate: u32) -> Result<SampleBuffer> {
        self.validate(sample_rate)?;

        let sr = sample_rate as f32;
        let duration = self.duration_samples;
        let duration_secs = duration as f32 / sr;

        // phase(t) = 2*pi * f0 * L * (e^(t/L) - 1), L = T / ln(f1/f0)
        let l = duration_secs / (self.end_freq / self.start_freq).ln();
        let amplitude = db_to_linear(self.level_db);
        let fade_len = ((0.05 * sr) as usize).min(duration / 4);

        let mut samples = vec![0.0f32; self.lead_in_samples + duration];
        for i in 0..duration {
            let t = i as f32 / sr;
            let phase = 2.0 * PI * self.start_freq * l * ((t / l).exp() - 1.0);
            let mut s = amplitude * phase.sin();

            if fade_len > 0 {
                if i < fade_len {
                    s *= 0.5 * (1.0 - (PI * i as f32 / fade_len as f32).cos());
                }
                if i >= duration - fade_len {
                    let j = duration - 1 - i;
                    s *= 0.5 * (1.0 - (PI * j as f32 / fade_len as f32).cos());
                }
            }

            samples[self.lead_in_samples + i] = s;
        }

        Ok(SampleBuffer::from_mono(samples, sample_rate, BitDepth::Float32))
    }
}

/// Snap to the nearest power of two, ties toward the smaller.
pub fn nearest_power_of_two(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    if n.is_power_of_two() {
        return n;
    }
    let upper = n.next_power_of_two();
    let lower = upper / 2;
    if n - lower <= upper - n { lower } else { upper }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> SweepSpec {
        SweepSpec {
            start_freq: 20.0,
            end_freq: 20000.0,
            duration_samples: 65536,
            lead_in_samples: 4800,
            level_db: -6.0,
        }
    }

    #[test]
    fn total_length_is_lead_in_plus_duration() {
        let buffer = spec().generate(48000).unwrap();
        assert_eq!(buffer.len(), 4800 + 65536);
    }

    #[test]
    fn lead_in_is_silent() {
        let buffer = spec().generate(48000).unwrap();
        assert!(buffer.samples()[..4800].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn samples_bounded_by_level() {
        let buffer = spec().generate(48000).unwrap();
        let ceiling = db_to_linear(-6.0) + 1e-6;

        for &s in buffer.samples() {
            assert!(s.is_finite());
            assert!(s.abs() <= ceiling, "sample {s} exceeds {ceiling}");
        }
    }

    #[test]
    fn edges_are_faded() {
        let buffer = spec().generate(48000).unwrap();
        let sweep = &buffer.samples()[4800..];

        // First and last samples of the sweep portion are fully faded.
        assert!(sweep[0].abs() < 1e-6);
        assert!(sweep[sweep.len() - 1].abs() < 1e-4);
    }

    #[test]
    fn sweep_reaches_near_peak_level() {
        let buffer = spec().generate(48000).unwrap();
        let peak = buffer
            .samples()
            .iter()
            .map(|s| s.abs())
            .fold(0.0f32, f32::max);

        assert!(peak > db_to_linear(-6.0) * 0.95);
    }

    #[test]
    fn rejects_inverted_band() {
        let mut bad = spec();
        bad.start_freq = 20000.0;
        bad.end_freq = 20.0;
        assert!(matches!(
            bad.generate(48000),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_end_above_nyquist() {
        let mut bad = spec();
        bad.end_freq = 30000.0;
        assert!(matches!(
            bad.generate(48000),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_non_power_of_two_duration() {
        let mut bad = spec();
        bad.duration_samples = 60000;
        assert!(matches!(
            bad.generate(48000),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn duration_snaps_to_nearest_power_of_two() {
        // 1.0 s at 48 kHz = 48000 samples; 32768 is 15232 away, 65536 is
        // 17536 away, so the smaller power wins.
        let spec = SweepSpec::from_duration_secs(20.0, 20000.0, 1.0, 0, -6.0, 48000);
        assert_eq!(spec.duration_samples, 32768);

        // 1.5 s = 72000 samples; 65536 is nearer than 131072.
        let spec = SweepSpec::from_duration_secs(20.0, 20000.0, 1.5, 0, -6.0, 48000);
        assert_eq!(spec.duration_samples, 65536);
    }

    #[test]
    fn nearest_power_of_two_ties_break_low() {
        // 96 is equidistant between 64 and 128.
        assert_eq!(nearest_power_of_two(96), 64);
        assert_eq!(nearest_power_of_two(64), 64);
        assert_eq!(nearest_power_of_two(65), 64);
        assert_eq!(nearest_power_of_two(97), 128);
        assert_eq!(nearest_power_of_two(0), 1);
    }
}

//! Sample buffers handed to the engine by I/O collaborators.

use crate::level::{self, BitDepth};

/// An immutable mono signal with provenance.
///
/// Multi-channel input is downmixed to mono on construction; the original
/// channel count is kept for provenance only. The bit depth records the
/// source format so dB conversion can pick the right noise-floor epsilon.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
    bit_depth: BitDepth,
}

impl SampleBuffer {
    /// Wrap an already-mono signal.
    pub fn from_mono(samples: Vec<f32>, sample_rate: u32, bit_depth: BitDepth) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
            bit_depth,
        }
    }

    /// Downmix interleaved multi-channel frames by unweighted averaging.
    ///
    /// A trailing partial frame is averaged over the samples it has.
    pub fn from_interleaved(
        interleaved: &[f32],
        channels: u16,
        sample_rate: u32,
        bit_depth: BitDepth,
    ) -> Self {
        let channels = channels.max(1);
        let samples = if channels == 1 {
            interleaved.to_vec()
        } else {
            interleaved
                .chunks(channels as usize)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect()
        };

        Self {
            samples,
            sample_rate,
            channels,
            bit_depth,
        }
    }

    /// The mono sample data.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of mono samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count of the source signal before downmix.
    pub fn source_channels(&self) -> u16 {
        self.channels
    }

    /// Bit depth of the source format.
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// RMS level of the signal, linear.
    pub fn rms(&self) -> f32 {
        level::rms(&self.samples)
    }
}

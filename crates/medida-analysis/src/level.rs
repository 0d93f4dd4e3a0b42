//! Level conversion and per-format noise-floor selection.
//!
//! The epsilon added before `log10` keeps exact-zero bins out of `-inf`
//! territory. It tracks the bit depth of the *source file*, not the FFT
//! size or the processing precision: an 8-bit recording has a real noise
//! floor around -48 dBFS, so anything below that is reported at the floor
//! rather than as spurious precision.

/// Source sample format of an analyzed signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    /// 8-bit integer PCM.
    Pcm8,
    /// 16-bit integer PCM.
    Pcm16,
    /// 24-bit integer PCM.
    Pcm24,
    /// 32-bit integer PCM.
    Pcm32,
    /// 32-bit IEEE float.
    Float32,
}

impl BitDepth {
    /// Map a WAV header (bits per sample, float flag) to a bit depth.
    ///
    /// Unusual integer depths round up to the nearest supported format.
    pub fn from_wav(bits_per_sample: u16, is_float: bool) -> Self {
        if is_float {
            return BitDepth::Float32;
        }
        match bits_per_sample {
            0..=8 => BitDepth::Pcm8,
            9..=16 => BitDepth::Pcm16,
            17..=24 => BitDepth::Pcm24,
            _ => BitDepth::Pcm32,
        }
    }

    /// Noise-floor offset added before `20*log10`.
    pub fn epsilon(self) -> f32 {
        match self {
            BitDepth::Pcm8 => db_to_linear(-48.0),
            BitDepth::Pcm16 => db_to_linear(-96.0),
            BitDepth::Pcm24 => db_to_linear(-144.0),
            BitDepth::Pcm32 => db_to_linear(-192.0),
            BitDepth::Float32 => 1e-10,
        }
    }
}

/// Convert decibels to linear amplitude.
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels, floored at -200 dB.
pub fn linear_to_db(amplitude: f32) -> f32 {
    if amplitude > 1e-10 {
        20.0 * amplitude.log10()
    } else {
        -200.0
    }
}

/// Compute RMS (Root Mean Square) level of a signal.
///
/// Returns RMS value in linear scale (not dB).
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }

    let sum_sq: f32 = signal.iter().map(|&x| x * x).sum();
    (sum_sq / signal.len() as f32).sqrt()
}

/// Compute RMS level in dB.
pub fn rms_db(signal: &[f32]) -> f32 {
    linear_to_db(rms(signal))
}

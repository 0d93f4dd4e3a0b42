//! Audio acquisition layer for the medida measurement toolkit.
//!
//! This crate provides the engine's external collaborators:
//!
//! - **WAV file I/O**: [`read_wav`] and [`write_wav`] for loading signals
//!   (with bit-depth provenance and mono downmix) and saving stimuli
//! - **Live capture**: [`CaptureSession`] for playing a stimulus while
//!   recording the response through real hardware
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use medida_io::{read_wav, write_wav, WavSpec};
//!
//! let (buffer, info) = read_wav("response.wav")?;
//! println!("{} samples at {} Hz, {} bit", buffer.len(), buffer.sample_rate(), info.bits_per_sample);
//! ```

mod capture;
mod devices;
mod wav;

pub use capture::{CaptureConfig, CaptureSession};
pub use devices::{AudioDevice, default_device, list_devices};
pub use wav::{WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The capture did not signal completion within the expected time.
    #[error("Capture timed out after {0:.1} s")]
    CaptureTimeout(f32),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Medida Analysis - spectral measurement engine for electro-acoustic testing
//!
//! This crate estimates the frequency-domain behavior of an audio signal
//! path from time-domain samples:
//!
//! - [`sweep`] - deterministic test-signal synthesis (logarithmic sine sweep)
//! - [`spectrum`] - windowed, overlap-averaged power-spectrum estimation
//! - [`transfer`] - frequency response via regularized spectral deconvolution
//! - [`harmonic`] - harmonic peak search and THD computation
//! - [`window`] - Hann windowing applied before transformation
//! - [`level`] - bit-depth-aware dB conversion and noise-floor selection
//! - [`export`] - CSV and report output for downstream tooling
//!
//! The engine is single-threaded and purely functional over immutable
//! [`SampleBuffer`]s: acquisition (file or live hardware) happens in a
//! collaborator crate, and every analysis call runs synchronously
//! start-to-finish over already-captured data.
//!
//! ## Example Workflow
//!
//! ```rust,ignore
//! use medida_analysis::{SweepSpec, TransferFunctionEstimator};
//!
//! // 1. Generate the stimulus
//! let spec = SweepSpec::from_duration_secs(20.0, 20000.0, 2.0, 4800, -6.0, 48000);
//! let stimulus = spec.generate(48000)?;
//!
//! // 2. Play and record through the device under test (external)
//!
//! // 3. Estimate the response
//! let estimator = TransferFunctionEstimator::new(20.0, 20000.0)?;
//! let response = estimator.estimate(&stimulus, &recorded, true)?;
//! ```
//!
//! ## THD
//!
//! ```rust,ignore
//! use medida_analysis::HarmonicAnalyzer;
//!
//! let analyzer = HarmonicAnalyzer::new(8192, 5)?;
//! let result = analyzer.analyze(&signal, 1000.0)?;
//! println!("THD: {:.4}% ({:.1} dB)", result.thd_percent, result.thd_db);
//! ```

pub mod buffer;
pub mod error;
pub mod export;
pub mod fft;
pub mod harmonic;
pub mod level;
pub mod spectrum;
pub mod sweep;
pub mod transfer;
pub mod window;

// Re-export main types
pub use buffer::SampleBuffer;
pub use error::{Error, Result};
pub use fft::Fft;
pub use harmonic::{HarmonicAnalyzer, HarmonicEntry, HarmonicLevel, HarmonicTable, ThdAnalysis};
pub use level::{BitDepth, db_to_linear, linear_to_db, rms, rms_db};
pub use spectrum::{Spectrum, SpectrumBin, SpectrumEstimator};
pub use sweep::{SweepSpec, nearest_power_of_two};
pub use transfer::{FrequencyResponse, TransferFunctionEstimator};
pub use window::Window;

//! Error types for the measurement engine.

/// Errors surfaced by the spectral measurement engine.
///
/// Degenerate numeric conditions (a near-zero reference bin, a vanishing
/// fundamental) are regularized locally and never reach this enum. An input
/// shorter than one FFT window is also not an error: frames are zero-padded
/// and a warning is emitted so results can be flagged unreliable.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A parameter was rejected before any computation began.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// A window function was requested for a buffer too short to shape.
    #[error("window requires at least 2 samples, got {0}")]
    InvalidSize(usize),

    /// Reference and recorded signals disagree on sample rate.
    #[error("sample rate mismatch: reference {reference} Hz, recorded {recorded} Hz")]
    SampleRateMismatch {
        /// Sample rate of the reference signal in Hz.
        reference: u32,
        /// Sample rate of the recorded signal in Hz.
        recorded: u32,
    },
}

/// Convenience result type for analysis operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Live sweep measurement against audio hardware.

use clap::Args;
use medida_analysis::{SweepSpec, TransferFunctionEstimator, export};
use medida_io::{CaptureConfig, CaptureSession, WavSpec, write_wav};
use std::path::PathBuf;

#[derive(Args)]
pub struct MeasureArgs {
    /// Output CSV file for the measured response
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Start frequency in Hz
    #[arg(long, default_value = "20.0")]
    start: f32,

    /// End frequency in Hz
    #[arg(long, default_value = "20000.0")]
    end: f32,

    /// Requested sweep duration in seconds (snapped to a power of two)
    #[arg(long, default_value = "2.0")]
    duration: f32,

    /// Lead-in silence in milliseconds
    #[arg(long, default_value = "250.0")]
    lead_in_ms: f32,

    /// Stimulus level in dBFS
    #[arg(long, default_value = "-12.0", allow_hyphen_values = true)]
    level: f32,

    /// Sample rate
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Input device name or index
    #[arg(long)]
    input_device: Option<String>,

    /// Output device name or index
    #[arg(long)]
    output_device: Option<String>,

    /// Extra capture time after the sweep ends, in seconds
    #[arg(long, default_value = "0.5")]
    tail: f32,

    /// Normalize recorded level to the stimulus RMS
    #[arg(long)]
    normalize: bool,

    /// Also save the raw recording to a WAV file
    #[arg(long)]
    save_recording: Option<PathBuf>,
}

pub fn run(args: MeasureArgs) -> anyhow::Result<()> {
    let lead_in = (args.lead_in_ms / 1000.0 * args.sample_rate as f32).round() as usize;
    let spec = SweepSpec::from_duration_secs(
        args.start,
        args.end,
        args.duration,
        lead_in,
        args.level,
        args.sample_rate,
    );
    let stimulus = spec.generate(args.sample_rate)?;

    let session = CaptureSession::new(CaptureConfig {
        sample_rate: args.sample_rate,
        input_device: args.input_device.clone(),
        output_device: args.output_device.clone(),
        tail_secs: args.tail,
    })?;

    println!("Live sweep measurement");
    println!("  Output device: {}", session.output_name());
    println!("  Input device:  {}", session.input_name());
    println!(
        "  {} Hz to {} Hz over {:.2}s at {} dBFS",
        args.start,
        args.end,
        spec.duration_samples as f32 / args.sample_rate as f32,
        args.level
    );
    println!("\nPlaying and recording...");

    let recorded = session.run(&stimulus)?;
    println!("Captured {} samples", recorded.len());

    if let Some(rec_path) = &args.save_recording {
        let wav_spec = WavSpec {
            channels: 1,
            sample_rate: args.sample_rate,
            bits_per_sample: 32,
        };
        write_wav(rec_path, recorded.samples(), wav_spec)?;
        println!("Saved recording to {}", rec_path.display());
    }

    let estimator = TransferFunctionEstimator::new(args.start, args.end)?;
    let response = estimator.estimate(&stimulus, &recorded, args.normalize)?;

    println!("\nResponse summary:");
    println!("  Bins: {}", response.spectrum.bins.len());
    println!("  Stimulus RMS: {:>6.1} dB", response.reference_rms_db);
    println!("  Recorded RMS: {:>6.1} dB", response.recorded_rms_db);

    export::write_response_csv(&response, &args.output)?;
    println!("\nWrote response to {}", args.output.display());

    Ok(())
}

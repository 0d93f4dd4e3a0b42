//! Sweep stimulus generation command.

use clap::Args;
use medida_analysis::SweepSpec;
use medida_io::{WavSpec, write_wav};
use std::path::PathBuf;

#[derive(Args)]
pub struct SweepArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Start frequency in Hz
    #[arg(long, default_value = "20.0")]
    start: f32,

    /// End frequency in Hz
    #[arg(long, default_value = "20000.0")]
    end: f32,

    /// Requested duration in seconds (snapped to a power-of-two sample count)
    #[arg(long, default_value = "2.0")]
    duration: f32,

    /// Lead-in silence in milliseconds
    #[arg(long, default_value = "100.0")]
    lead_in_ms: f32,

    /// Peak level in dBFS
    #[arg(long, default_value = "-6.0", allow_hyphen_values = true)]
    level: f32,

    /// Sample rate
    #[arg(long, default_value = "48000")]
    sample_rate: u32,
}

pub fn run(args: SweepArgs) -> anyhow::Result<()> {
    let lead_in = (args.lead_in_ms / 1000.0 * args.sample_rate as f32).round() as usize;
    let spec = SweepSpec::from_duration_secs(
        args.start,
        args.end,
        args.duration,
        lead_in,
        args.level,
        args.sample_rate,
    );

    println!("Generating sweep stimulus...");
    println!(
        "  {} Hz to {} Hz at {} dBFS, {} samples ({:.2}s) + {} lead-in",
        args.start,
        args.end,
        args.level,
        spec.duration_samples,
        spec.duration_samples as f32 / args.sample_rate as f32,
        lead_in,
    );

    let buffer = spec.generate(args.sample_rate)?;

    let wav_spec = WavSpec {
        channels: 1,
        sample_rate: args.sample_rate,
        bits_per_sample: 32,
    };
    write_wav(&args.output, buffer.samples(), wav_spec)?;
    println!("Wrote {} samples to {}", buffer.len(), args.output.display());

    Ok(())
}

//! Power spectrum command.

use clap::Args;
use medida_analysis::{SpectrumEstimator, export};
use medida_io::read_wav;
use std::path::PathBuf;

#[derive(Args)]
pub struct SpectrumArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// FFT size
    #[arg(long, default_value = "8192")]
    fft_size: usize,

    /// Use a single window instead of 50%-overlap averaging
    #[arg(long)]
    single_shot: bool,

    /// Skip this many samples before the first window
    #[arg(long, default_value = "0")]
    start_offset: usize,

    /// Output CSV file (optional)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show top N peaks
    #[arg(long, default_value = "10")]
    peaks: usize,
}

pub fn run(args: SpectrumArgs) -> anyhow::Result<()> {
    println!("Analyzing spectrum of {}...", args.input.display());

    let (buffer, info) = read_wav(&args.input)?;
    println!(
        "  {} samples, {} Hz, {} bit, {:.2}s",
        buffer.len(),
        buffer.sample_rate(),
        info.bits_per_sample,
        buffer.duration_secs()
    );

    let estimator = SpectrumEstimator::new(args.fft_size)?;
    let spectrum = if args.single_shot {
        estimator.estimate(&buffer, 0, 1, args.start_offset)?
    } else if args.start_offset > 0 {
        let hop = args.fft_size / 2;
        let remaining = buffer.len().saturating_sub(args.start_offset);
        let num_windows = if remaining > args.fft_size && hop > 0 {
            (remaining - args.fft_size) / hop + 1
        } else {
            1
        };
        estimator.estimate(&buffer, hop, num_windows, args.start_offset)?
    } else {
        estimator.averaged(&buffer)?
    };

    let mut ranked: Vec<_> = spectrum.bins.iter().collect();
    ranked.sort_by(|a, b| b.magnitude_db.partial_cmp(&a.magnitude_db).unwrap());

    println!("\nTop {} frequency peaks:", args.peaks);
    println!("  {:>10}  {:>10}", "Freq (Hz)", "Level (dBFS)");
    println!("  {:>10}  {:>10}", "---------", "------------");
    for bin in ranked.iter().take(args.peaks) {
        println!("  {:>10.1}  {:>10.1}", bin.frequency_hz, bin.magnitude_db);
    }

    if let Some(output_path) = args.output {
        export::write_spectrum_csv(&spectrum, &output_path)?;
        println!("\nWrote spectrum to {}", output_path.display());
    }

    Ok(())
}

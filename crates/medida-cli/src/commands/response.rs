//! Frequency response estimation command.

use clap::Args;
use medida_analysis::{FrequencyResponse, TransferFunctionEstimator, export};
use medida_io::read_wav;
use std::path::PathBuf;

#[derive(Args)]
pub struct ResponseArgs {
    /// Reference (stimulus) WAV file
    #[arg(value_name = "REFERENCE")]
    reference: PathBuf,

    /// Recorded (response) WAV file
    #[arg(value_name = "RECORDED")]
    recorded: PathBuf,

    /// Lower band edge in Hz
    #[arg(long, default_value = "20.0")]
    f_lo: f32,

    /// Upper band edge in Hz
    #[arg(long, default_value = "20000.0")]
    f_hi: f32,

    /// Scale the recording to the reference RMS before estimating, so only
    /// frequency-dependent gain remains
    #[arg(long)]
    normalize: bool,

    /// Output CSV file (optional)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output JSON file (optional)
    #[arg(long)]
    json: Option<PathBuf>,
}

pub fn run(args: ResponseArgs) -> anyhow::Result<()> {
    println!("Computing frequency response...");
    println!("  Reference: {}", args.reference.display());
    println!("  Recorded:  {}", args.recorded.display());

    let (reference, _) = read_wav(&args.reference)?;
    let (recorded, _) = read_wav(&args.recorded)?;

    let estimator = TransferFunctionEstimator::new(args.f_lo, args.f_hi)?;
    let response = estimator.estimate(&reference, &recorded, args.normalize)?;

    println!("\nResponse summary:");
    println!("  Bins: {}", response.spectrum.bins.len());
    println!("  Reference RMS: {:>6.1} dB", response.reference_rms_db);
    println!("  Recorded RMS:  {:>6.1} dB", response.recorded_rms_db);

    print_band_summary(&response);

    if let Some(output_path) = &args.output {
        export::write_response_csv(&response, output_path)?;
        println!("\nWrote response to {}", output_path.display());
    }

    if let Some(json_path) = &args.json {
        write_json(&response, json_path)?;
        println!("Wrote response to {}", json_path.display());
    }

    Ok(())
}

/// Average gain per octave-ish band, the quick sanity view.
fn print_band_summary(response: &FrequencyResponse) {
    let mut low = (0.0f32, 0usize);
    let mut mid = (0.0f32, 0usize);
    let mut high = (0.0f32, 0usize);

    for bin in &response.spectrum.bins {
        if bin.frequency_hz < 300.0 {
            low.0 += bin.magnitude_db;
            low.1 += 1;
        } else if bin.frequency_hz < 3000.0 {
            mid.0 += bin.magnitude_db;
            mid.1 += 1;
        } else if bin.frequency_hz < 10000.0 {
            high.0 += bin.magnitude_db;
            high.1 += 1;
        }
    }

    println!("\n  Average gain by band:");
    for (label, (sum, count)) in [
        ("Low  (<300 Hz):  ", low),
        ("Mid  (300-3k Hz):", mid),
        ("High (3k-10k Hz):", high),
    ] {
        if count > 0 {
            println!("    {} {:>6.1} dB", label, sum / count as f32);
        }
    }
}

fn write_json(response: &FrequencyResponse, path: &PathBuf) -> anyhow::Result<()> {
    let frequencies: Vec<f32> = response
        .spectrum
        .bins
        .iter()
        .map(|b| b.frequency_hz)
        .collect();
    let magnitude_db: Vec<f32> = response
        .spectrum
        .bins
        .iter()
        .map(|b| b.magnitude_db)
        .collect();
    let phase_deg: Vec<f32> = response.spectrum.bins.iter().map(|b| b.phase_deg).collect();

    let json = serde_json::json!({
        "fft_size": response.spectrum.fft_size,
        "sample_rate": response.spectrum.sample_rate,
        "num_bins": frequencies.len(),
        "reference_rms_db": response.reference_rms_db,
        "recorded_rms_db": response.recorded_rms_db,
        "frequencies": frequencies,
        "magnitude_db": magnitude_db,
        "phase_deg": phase_deg,
    });
    std::fs::write(path, serde_json::to_string_pretty(&json)?)?;
    Ok(())
}

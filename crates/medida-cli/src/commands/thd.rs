//! Harmonic distortion measurement command.

use clap::Args;
use medida_analysis::{HarmonicAnalyzer, HarmonicLevel, ThdAnalysis, export, linear_to_db};
use medida_io::read_wav;
use std::path::PathBuf;

#[derive(Args)]
pub struct ThdArgs {
    /// Input WAV file containing the recorded test tone
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Nominal fundamental frequency in Hz
    #[arg(long, default_value = "1000.0")]
    fundamental: f32,

    /// FFT size
    #[arg(long, default_value = "8192")]
    fft_size: usize,

    /// Highest harmonic order to analyze
    #[arg(long, default_value = "5")]
    harmonics: usize,

    /// Peak search tolerance in Hz
    #[arg(long, default_value = "50.0")]
    search_range: f32,

    /// Output JSON file (optional)
    #[arg(long)]
    json: Option<PathBuf>,
}

pub fn run(args: ThdArgs) -> anyhow::Result<()> {
    println!("Measuring THD of {}...", args.input.display());

    let (buffer, info) = read_wav(&args.input)?;
    println!(
        "  {} samples, {} Hz, {} bit",
        buffer.len(),
        buffer.sample_rate(),
        info.bits_per_sample
    );

    let analyzer = HarmonicAnalyzer::new(args.fft_size, args.harmonics)?
        .with_search_range(args.search_range);
    let analysis = analyzer.analyze(&buffer, args.fundamental)?;

    println!();
    print!("{}", export::thd_report(&analysis));

    if let Some(json_path) = &args.json {
        write_json(&analysis, json_path)?;
        println!("\nWrote report to {}", json_path.display());
    }

    Ok(())
}

fn write_json(analysis: &ThdAnalysis, path: &PathBuf) -> anyhow::Result<()> {
    let fund = &analysis.table.fundamental;
    let harmonics: Vec<_> = analysis
        .table
        .harmonics
        .iter()
        .map(|entry| match entry.level {
            HarmonicLevel::Measured {
                frequency_hz,
                magnitude,
            } => serde_json::json!({
                "order": entry.order,
                "target_hz": entry.target_hz,
                "frequency_hz": frequency_hz,
                "magnitude_dbfs": linear_to_db(magnitude),
                "relative_db": analysis.relative_db(entry),
            }),
            HarmonicLevel::AboveNyquist => serde_json::json!({
                "order": entry.order,
                "target_hz": entry.target_hz,
                "above_nyquist": true,
            }),
        })
        .collect();

    let json = serde_json::json!({
        "fundamental_expected_hz": fund.expected_hz,
        "fundamental_measured_hz": fund.measured_hz,
        "fundamental_dbfs": linear_to_db(fund.magnitude),
        "thd_ratio": analysis.thd_ratio,
        "thd_percent": analysis.thd_percent,
        "thd_db": analysis.thd_db,
        "harmonics": harmonics,
    });
    std::fs::write(path, serde_json::to_string_pretty(&json)?)?;
    Ok(())
}

//! Medida CLI - command-line interface for the medida measurement toolkit.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "medida")]
#[command(author, version, about = "Electro-acoustic measurement toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a logarithmic sweep stimulus
    Sweep(commands::sweep::SweepArgs),

    /// Estimate the power spectrum of an audio file
    Spectrum(commands::spectrum::SpectrumArgs),

    /// Estimate a frequency response from a reference and a recording
    Response(commands::response::ResponseArgs),

    /// Measure total harmonic distortion of a recorded tone
    Thd(commands::thd::ThdArgs),

    /// Run a live sweep measurement against audio hardware
    Measure(commands::measure::MeasureArgs),

    /// List available audio devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sweep(args) => commands::sweep::run(args),
        Commands::Spectrum(args) => commands::spectrum::run(args),
        Commands::Response(args) => commands::response::run(args),
        Commands::Thd(args) => commands::thd::run(args),
        Commands::Measure(args) => commands::measure::run(args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}

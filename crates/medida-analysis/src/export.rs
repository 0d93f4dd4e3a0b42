//! Export formats for measurement results.
//!
//! Downstream plotting scripts key on column order, not header text, so
//! the headers here are stable but presentational: two columns for a
//! dBFS spectrum, three for a frequency response with phase.

use crate::harmonic::{HarmonicLevel, ThdAnalysis};
use crate::level::linear_to_db;
use crate::spectrum::Spectrum;
use crate::transfer::FrequencyResponse;
use std::fmt::Write as _;
use std::path::Path;

/// Render a dBFS spectrum as two-column CSV.
pub fn spectrum_csv(spectrum: &Spectrum) -> String {
    let mut csv = String::from("\"Frequency (Hz)\",\"Magnitude (dBFS)\"\n");
    for bin in &spectrum.bins {
        let _ = writeln!(csv, "{:.2},{:.2}", bin.frequency_hz, bin.magnitude_db);
    }
    csv
}

/// Write a dBFS spectrum to a CSV file.
pub fn write_spectrum_csv(spectrum: &Spectrum, path: impl AsRef<Path>) -> std::io::Result<()> {
    std::fs::write(path, spectrum_csv(spectrum))
}

/// Render a frequency response as three-column CSV.
pub fn response_csv(response: &FrequencyResponse) -> String {
    let mut csv = String::from("Frequency_Hz,Magnitude_dB,Phase_deg\n");
    for bin in &response.spectrum.bins {
        let _ = writeln!(
            csv,
            "{:.2},{:.4},{:.4}",
            bin.frequency_hz, bin.magnitude_db, bin.phase_deg
        );
    }
    csv
}

/// Write a frequency response to a CSV file.
pub fn write_response_csv(
    response: &FrequencyResponse,
    path: impl AsRef<Path>,
) -> std::io::Result<()> {
    std::fs::write(path, response_csv(response))
}

/// Render a THD measurement as a human-readable report.
pub fn thd_report(analysis: &ThdAnalysis) -> String {
    let fund = &analysis.table.fundamental;
    let mut out = String::new();

    let _ = writeln!(out, "Fundamental:");
    let _ = writeln!(
        out,
        "  {:>10.1} Hz expected, {:>10.1} Hz measured, {:>7.1} dBFS",
        fund.expected_hz,
        fund.measured_hz,
        linear_to_db(fund.magnitude)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  {:>4}  {:>10}  {:>10}  {:>8}", "H", "Freq (Hz)", "dBFS", "re H1");
    let _ = writeln!(out, "  {:>4}  {:>10}  {:>10}  {:>8}", "--", "---------", "----", "-----");

    for entry in &analysis.table.harmonics {
        match entry.level {
            HarmonicLevel::Measured { frequency_hz, magnitude } => {
                let _ = writeln!(
                    out,
                    "  {:>4}  {:>10.1}  {:>10.1}  {:>8.1}",
                    entry.order,
                    frequency_hz,
                    linear_to_db(magnitude),
                    analysis.relative_db(entry)
                );
            }
            HarmonicLevel::AboveNyquist => {
                let _ = writeln!(
                    out,
                    "  {:>4}  {:>10.1}  {:>10}  {:>8}",
                    entry.order, entry.target_hz, "above Nyquist", "-"
                );
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "THD: {:.4}% ({:.1} dB)",
        analysis.thd_percent, analysis.thd_db
    );
    out
}

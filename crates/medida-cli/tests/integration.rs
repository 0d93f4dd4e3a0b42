//! Integration tests for medida-cli.
//!
//! Drives the `medida` binary end-to-end over temporary WAV files:
//! stimulus generation, spectrum export, response identity, and THD.

use std::f32::consts::PI;
use std::path::Path;
use std::process::Command;

/// Helper to get the `medida` binary built by cargo.
fn medida_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_medida"))
}

/// Write a mono float WAV with a pure sine tone.
fn write_tone(path: &Path, freq: f32, sample_rate: u32, num_samples: usize, amplitude: f32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..num_samples {
        let t = i as f32 / sample_rate as f32;
        writer.write_sample(amplitude * (2.0 * PI * freq * t).sin()).unwrap();
    }
    writer.finalize().unwrap();
}

// ---------------------------------------------------------------------------
// `medida sweep`
// ---------------------------------------------------------------------------

#[test]
fn sweep_writes_power_of_two_stimulus() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("sweep.wav");

    let output = medida_bin()
        .args([
            "sweep",
            out.to_str().unwrap(),
            "--duration",
            "0.1",
            "--lead-in-ms",
            "0",
        ])
        .output()
        .expect("failed to run medida sweep");

    assert!(output.status.success(), "sweep failed: {:?}", output);

    // 0.1 s at 48 kHz = 4800 samples, snapped down to 4096.
    let reader = hound::WavReader::open(&out).unwrap();
    assert_eq!(reader.len(), 4096);
    assert_eq!(reader.spec().sample_rate, 48000);

    let peak = reader
        .into_samples::<f32>()
        .map(|s| s.unwrap().abs())
        .fold(0.0f32, f32::max);
    // Default level is -6 dBFS.
    assert!(peak <= 0.502, "peak {peak} above -6 dBFS ceiling");
    assert!(peak > 0.4, "peak {peak} suspiciously low");
}

// ---------------------------------------------------------------------------
// `medida spectrum`
// ---------------------------------------------------------------------------

#[test]
fn spectrum_exports_two_column_csv() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    let csv_out = dir.path().join("spectrum.csv");
    write_tone(&input, 1000.0, 48000, 16384, 0.5);

    let output = medida_bin()
        .args([
            "spectrum",
            input.to_str().unwrap(),
            "--fft-size",
            "4096",
            "--output",
            csv_out.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run medida spectrum");

    assert!(output.status.success(), "spectrum failed: {:?}", output);

    let csv = std::fs::read_to_string(&csv_out).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("\"Frequency (Hz)\",\"Magnitude (dBFS)\"")
    );
    assert_eq!(csv.lines().count(), 1 + 4096 / 2 + 1);

    // The reported top peak should sit near 1 kHz.
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Top 10 frequency peaks"));
}

// ---------------------------------------------------------------------------
// `medida response`
// ---------------------------------------------------------------------------

#[test]
fn response_of_identical_files_is_flat_zero_db() {
    let dir = tempfile::tempdir().unwrap();
    let sweep = dir.path().join("sweep.wav");
    let csv_out = dir.path().join("response.csv");

    let status = medida_bin()
        .args(["sweep", sweep.to_str().unwrap(), "--duration", "0.5"])
        .status()
        .unwrap();
    assert!(status.success());

    let output = medida_bin()
        .args([
            "response",
            sweep.to_str().unwrap(),
            sweep.to_str().unwrap(),
            "--f-lo",
            "100",
            "--f-hi",
            "10000",
            "--output",
            csv_out.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run medida response");

    assert!(output.status.success(), "response failed: {:?}", output);

    let csv = std::fs::read_to_string(&csv_out).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Frequency_Hz,Magnitude_dB,Phase_deg"));

    for line in lines {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 3);
        let magnitude: f32 = fields[1].parse().unwrap();
        let phase: f32 = fields[2].parse().unwrap();
        assert!(magnitude.abs() < 0.05, "magnitude {magnitude} on line {line}");
        assert!(phase.abs() < 0.05, "phase {phase} on line {line}");
    }
}

#[test]
fn response_rejects_sample_rate_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.wav");
    let b = dir.path().join("b.wav");
    write_tone(&a, 1000.0, 48000, 8192, 0.5);
    write_tone(&b, 1000.0, 44100, 8192, 0.5);

    let output = medida_bin()
        .args(["response", a.to_str().unwrap(), b.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(!output.status.success(), "should fail on mismatched rates");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("sample rate mismatch"),
        "stderr: {stderr}"
    );
}

// ---------------------------------------------------------------------------
// `medida thd`
// ---------------------------------------------------------------------------

#[test]
fn thd_of_pure_tone_is_negligible() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    let json_out = dir.path().join("thd.json");
    write_tone(&input, 1000.0, 48000, 8192, 0.5);

    let output = medida_bin()
        .args([
            "thd",
            input.to_str().unwrap(),
            "--fundamental",
            "1000",
            "--harmonics",
            "5",
            "--json",
            json_out.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run medida thd");

    assert!(output.status.success(), "thd failed: {:?}", output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("THD:"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_out).unwrap()).unwrap();
    let thd_percent = report["thd_percent"].as_f64().unwrap();
    assert!(thd_percent < 0.1, "THD {thd_percent}% too high for a pure tone");

    let measured = report["fundamental_measured_hz"].as_f64().unwrap();
    assert!(
        (measured - 1000.0).abs() < 6.0,
        "fundamental measured at {measured} Hz"
    );
    assert_eq!(report["harmonics"].as_array().unwrap().len(), 4);
}

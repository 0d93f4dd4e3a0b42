//! Audio device listing command.

use clap::Args;
use medida_io::{default_device, list_devices};

#[derive(Args)]
pub struct DevicesArgs {}

pub fn run(_args: DevicesArgs) -> anyhow::Result<()> {
    let devices = list_devices()?;
    let (default_in, default_out) = default_device()?;

    if devices.is_empty() {
        println!("No audio devices found.");
        return Ok(());
    }

    println!("Available audio devices:");
    println!("  {:>3}  {:<40}  {:>5}  {:>6}  {:>9}", "#", "Name", "In", "Out", "Rate (Hz)");
    println!("  {:>3}  {:<40}  {:>5}  {:>6}  {:>9}", "--", "----", "--", "---", "---------");

    for (i, device) in devices.iter().enumerate() {
        let mut name = device.name.clone();
        if default_in.as_ref().is_some_and(|d| d.name == device.name) {
            name.push_str(" (default in)");
        }
        if default_out.as_ref().is_some_and(|d| d.name == device.name) {
            name.push_str(" (default out)");
        }

        println!(
            "  {:>3}  {:<40}  {:>5}  {:>6}  {:>9}",
            i,
            name,
            if device.is_input { "yes" } else { "-" },
            if device.is_output { "yes" } else { "-" },
            device.default_sample_rate,
        );
    }

    Ok(())
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use halo_capture::{convert_capture, CaptureFormat, StepLoader};

use crate::output::OutputFormat;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TargetFormat {
    Legacy,
    Split,
}

impl From<TargetFormat> for CaptureFormat {
    fn from(t: TargetFormat) -> Self {
        match t {
            TargetFormat::Legacy => CaptureFormat::Legacy,
            TargetFormat::Split => CaptureFormat::Split,
        }
    }
}

#[derive(Args)]
pub struct ConvertArgs {
    /// Source capture directory
    pub capture: PathBuf,

    /// Destination directory (created if missing, must not hold records)
    pub dest: PathBuf,

    /// Record format to write
    #[arg(long, value_enum, default_value = "split")]
    pub to: TargetFormat,
}

pub fn run(args: &ConvertArgs, output: OutputFormat) -> Result<()> {
    if !args.capture.is_dir() {
        anyhow::bail!("Capture directory does not exist: {}", args.capture.display());
    }
    if args.dest.exists() && has_entries(&args.dest)? {
        anyhow::bail!("Destination is not empty: {}", args.dest.display());
    }

    let loader = StepLoader::open(&args.capture)
        .with_context(|| format!("Failed to open capture {}", args.capture.display()))?;
    let format: CaptureFormat = args.to.into();
    let summary = convert_capture(&loader, &args.dest, format).context("Conversion failed")?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => {
            println!(
                "Converted {} -> {}: {} steps written ({} inert), {} skipped",
                loader.format(),
                format,
                summary.loaded + summary.inert,
                summary.inert,
                summary.skipped
            );
            println!("  {}", args.dest.display());
        }
    }
    Ok(())
}

fn has_entries(dir: &std::path::Path) -> Result<bool> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("Cannot read destination {}", dir.display()))?;
    Ok(entries.next().is_some())
}

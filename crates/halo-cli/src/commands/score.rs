use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use halo_capture::{load_token_set, StepLoader};
use halo_core::config::HaloConfig;
use halo_core::model::TokenSet;
use halo_scoring::{run_strategy, StrategyConfig, StrategyReport};

use crate::output::{format, write_report, OutputFormat};

/// Arguments shared by every command that scores a capture.
#[derive(Args)]
pub struct CaptureArgs {
    /// Capture directory (metadata.json plus token_*.json records)
    pub capture: PathBuf,

    /// Token export that replaces the prompt tokens of metadata.json
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// A capture opened for scoring: its step loader and active tokens.
pub struct OpenCapture {
    pub loader: StepLoader,
    pub tokens: TokenSet,
}

impl CaptureArgs {
    pub fn open(&self) -> Result<OpenCapture> {
        if !self.capture.is_dir() {
            anyhow::bail!("Capture directory does not exist: {}", self.capture.display());
        }
        if let Some(export) = &self.export {
            if !export.is_file() {
                anyhow::bail!("Export file does not exist: {}", export.display());
            }
        }
        let loader = StepLoader::open(&self.capture)
            .with_context(|| format!("Failed to open capture {}", self.capture.display()))?;
        let tokens = load_token_set(&self.capture, self.export.as_deref())
            .context("Failed to load capture tokens")?;
        if tokens.is_empty() {
            tracing::warn!(capture = %self.capture.display(), "capture has no active tokens");
        }
        Ok(OpenCapture { loader, tokens })
    }
}

/// Run one strategy over `capture` and return its report.
pub fn score(
    capture: &OpenCapture,
    config: StrategyConfig,
    settings: &HaloConfig,
) -> Result<StrategyReport> {
    let kind = config.kind();
    run_strategy(
        &capture.loader,
        &capture.tokens,
        config,
        settings.progress_interval,
    )
    .with_context(|| format!("{} failed", kind.name()))
}

/// Score, export the report pair, and print a summary.
pub fn run(
    args: &CaptureArgs,
    config: StrategyConfig,
    settings: &HaloConfig,
    output: OutputFormat,
) -> Result<()> {
    let capture = args.open()?;
    let report = score(&capture, config, settings)?;
    let results_dir = settings.capture_results_dir(&args.capture);
    let (md, json) = write_report(&results_dir, &report, chrono::Utc::now())?;
    print_run(&report, &md, &json, output)
}

pub fn print_run(report: &StrategyReport, md: &Path, json: &Path, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "metadata": report.metadata,
                "markdown": md,
                "json": json,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!("{}", format::run_summary_text(report));
            println!("  {}", md.display());
            println!("  {}", json.display());
        }
    }
    Ok(())
}

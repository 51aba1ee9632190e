use anyhow::{Context, Result};
use clap::Args;

use halo_core::config::HaloConfig;
use halo_scoring::{compare_rankings, StrategyConfig, StrategyKind, StrategyReport};

use super::score::{self, CaptureArgs};
use crate::output::{format, write_report, OutputFormat};

pub const COMPARISON_FILE: &str = "comparison_report.md";

#[derive(Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub capture: CaptureArgs,

    /// Ranking depth for the agreement analysis [default: config top_n]
    #[arg(long)]
    pub top: Option<usize>,
}

pub fn run(args: &CompareArgs, settings: &HaloConfig, output: OutputFormat) -> Result<()> {
    let top_n = args.top.unwrap_or(settings.top_n);
    if top_n == 0 {
        anyhow::bail!("--top must be at least 1");
    }

    let capture = args.capture.open()?;
    let results_dir = settings.capture_results_dir(&args.capture.capture);
    let generated_at = chrono::Utc::now();

    let mut reports: Vec<StrategyReport> = Vec::with_capacity(StrategyKind::ALL.len());
    for kind in StrategyKind::ALL {
        let report = score::score(&capture, StrategyConfig::default_for(kind), settings)?;
        write_report(&results_dir, &report, generated_at)?;
        reports.push(report);
    }

    let rankings: Vec<(&str, &[_])> = reports
        .iter()
        .map(|r| (r.kind.label(), r.sentences.as_slice()))
        .collect();
    let comparison = compare_rankings(&rankings, top_n);

    let path = results_dir.join(COMPARISON_FILE);
    std::fs::write(&path, format::comparison_markdown(&reports, &comparison))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    match output {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "results_dir": results_dir,
                "report": path,
                "strategies": reports.iter().map(|r| &r.metadata).collect::<Vec<_>>(),
                "agreement": comparison,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            for report in &reports {
                println!("{}", format::run_summary_text(report));
            }
            println!();
            println!(
                "In every top {top_n}: {} sentences",
                comparison.common.len()
            );
            for s in &comparison.common {
                println!("  T{}:S{} {}", s.turn_id, s.sentence_id, s.preview);
            }
            println!();
            println!("Comparison report written to: {}", path.display());
        }
    }
    Ok(())
}

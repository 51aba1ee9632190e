use anyhow::Result;
use clap::Args;

use halo_core::config::HaloConfig;
use halo_scoring::{PruningPlan, StrategyConfig, StrategyKind};

use super::score::{self, CaptureArgs};
use crate::output::{format, OutputFormat};

#[derive(Args)]
pub struct PruneArgs {
    #[command(flatten)]
    pub capture: CaptureArgs,

    /// voting, symmetric, magnitude, magnitude-bos or cumulative
    #[arg(long, default_value = "voting")]
    pub strategy: StrategyKind,

    /// Keep sentences whose peak score is above this [default: config keep_above]
    #[arg(long, allow_negative_numbers = true)]
    pub keep_above: Option<f64>,
}

pub fn run(args: &PruneArgs, settings: &HaloConfig, output: OutputFormat) -> Result<()> {
    let keep_above = args.keep_above.unwrap_or(settings.keep_above);
    if !keep_above.is_finite() {
        anyhow::bail!("--keep-above must be a finite number");
    }

    let capture = args.capture.open()?;
    let report = score::score(&capture, StrategyConfig::default_for(args.strategy), settings)?;
    let plan = PruningPlan::from_sentences(&report.sentences, keep_above);

    match output {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "strategy": report.metadata.key,
                "keep_above": plan.keep_above,
                "total_sentences": plan.total_sentences(),
                "total_tokens": plan.total_tokens(),
                "kept_tokens": plan.kept_tokens,
                "pruned_tokens": plan.pruned_tokens,
                "reduction_percent": plan.reduction_percent(),
                "kept": plan.kept,
                "pruned": plan.pruned,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => print!("{}", format::pruning_text(&plan, &report)),
    }
    Ok(())
}

use anyhow::Result;
use clap::Args;

use halo_core::config::HaloConfig;
use halo_scoring::strategy::SymmetricVotingConfig;
use halo_scoring::StrategyConfig;

use super::score::{self, CaptureArgs};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct SymmetricArgs {
    #[command(flatten)]
    pub capture: CaptureArgs,

    /// Compute the mean over non-BOS slots and never score BOS
    #[arg(long)]
    pub exclude_bos: bool,

    /// Clamp scores to [0, 255] after every update
    #[arg(long)]
    pub clamp: bool,
}

pub fn run(args: &SymmetricArgs, settings: &HaloConfig, format: OutputFormat) -> Result<()> {
    let config = StrategyConfig::SymmetricVoting(SymmetricVotingConfig {
        exclude_bos: args.exclude_bos,
        clamp: args.clamp,
    });
    score::run(&args.capture, config, settings, format)
}

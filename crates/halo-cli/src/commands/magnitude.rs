use anyhow::Result;
use clap::Args;

use halo_core::config::HaloConfig;
use halo_scoring::strategy::MagnitudeVotingConfig;
use halo_scoring::StrategyConfig;

use super::score::{self, CaptureArgs};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct MagnitudeArgs {
    #[command(flatten)]
    pub capture: CaptureArgs,

    /// Clamp scores to [0, 255] after every update
    #[arg(long)]
    pub clamp: bool,
}

pub fn run(args: &MagnitudeArgs, settings: &HaloConfig, format: OutputFormat) -> Result<()> {
    let config = StrategyConfig::MagnitudeVoting(MagnitudeVotingConfig { clamp: args.clamp });
    score::run(&args.capture, config, settings, format)
}

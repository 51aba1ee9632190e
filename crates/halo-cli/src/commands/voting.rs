use anyhow::Result;
use clap::Args;

use halo_core::config::HaloConfig;
use halo_scoring::strategy::RollingVotingConfig;
use halo_scoring::StrategyConfig;

use super::score::{self, CaptureArgs};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct VotingArgs {
    #[command(flatten)]
    pub capture: CaptureArgs,

    /// Slots closer than this to the generation head do not vote
    #[arg(long, default_value_t = 50)]
    pub min_distance: usize,
}

pub fn run(args: &VotingArgs, settings: &HaloConfig, format: OutputFormat) -> Result<()> {
    let config = StrategyConfig::Voting(RollingVotingConfig {
        min_distance: args.min_distance,
    });
    score::run(&args.capture, config, settings, format)
}

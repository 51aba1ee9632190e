use anyhow::Result;
use clap::Args;

use halo_core::config::HaloConfig;
use halo_scoring::strategy::{CumulativeConfig, DecayMode, DistanceMode};
use halo_scoring::StrategyConfig;

use super::score::{self, CaptureArgs};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct CumulativeArgs {
    #[command(flatten)]
    pub capture: CaptureArgs,

    #[arg(long, default_value_t = 0.001)]
    pub decay_rate: f64,

    /// none, additive or exponential
    #[arg(long, default_value = "additive")]
    pub decay_mode: DecayMode,

    /// none, threshold, linear, logarithmic or square_root
    #[arg(long, default_value = "logarithmic")]
    pub distance_mode: DistanceMode,

    /// Slots closer than this to the generation head get no weight
    #[arg(long, default_value_t = 20)]
    pub min_distance: usize,

    #[arg(long, default_value_t = 10.0)]
    pub distance_scale: f64,
}

pub fn run(args: &CumulativeArgs, settings: &HaloConfig, format: OutputFormat) -> Result<()> {
    let config = StrategyConfig::Cumulative(CumulativeConfig {
        decay_rate: args.decay_rate,
        decay_mode: args.decay_mode,
        distance_mode: args.distance_mode,
        min_distance: args.min_distance,
        distance_scale: args.distance_scale,
    });
    score::run(&args.capture, config, settings, format)
}

//! Magnitude-weighted voting: a token above the step threshold gains
//! `floor(attention / threshold)`, anything else loses 1. Tokens start at 255.
//!
//! Two thresholds are kept as separate strategies because they score
//! differently:
//! - [`MagnitudeVoting`] compares against the mean of the whole vector,
//!   BOS included.
//! - [`BosExcludedMagnitudeVoting`] uses `(1 - a[BOS]) / (n - 1)`, the mean of
//!   the non-BOS slots for a softmax-normalized vector, and never scores BOS.

use serde::{Deserialize, Serialize};

use halo_core::model::{ScoreMap, TokenSet, BOS_POSITION};

use super::{StepScorer, StrategyKind};
use crate::scoreboard::{ScoreBounds, Scoreboard};
use crate::threshold::{
    bos_excluded_threshold, local_mean, magnitude_delta, BosThreshold, MIN_THRESHOLD,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnitudeVotingConfig {
    /// Clamp every update to `[0, 255]`.
    pub clamp: bool,
}

impl MagnitudeVotingConfig {
    fn bounds(&self) -> Option<ScoreBounds> {
        self.clamp.then_some(ScoreBounds::BRIGHTNESS)
    }
}

#[derive(Debug, Clone)]
pub struct MagnitudeVoting {
    config: MagnitudeVotingConfig,
    board: Scoreboard,
}

impl MagnitudeVoting {
    pub fn new(config: MagnitudeVotingConfig, tokens: &TokenSet) -> Self {
        let initial = StrategyKind::MagnitudeVoting.initial_score();
        Self {
            board: Scoreboard::seeded(tokens.positions(), initial).with_bounds(config.bounds()),
            config,
        }
    }

    pub fn config(&self) -> &MagnitudeVotingConfig {
        &self.config
    }
}

impl StepScorer for MagnitudeVoting {
    fn apply_step(&mut self, aggregated: &[f64]) {
        let Some(mean) = local_mean(aggregated) else {
            return;
        };
        // A vanishing mean would turn every vote into a huge ratio.
        let mean = if mean.is_finite() && mean > MIN_THRESHOLD {
            mean
        } else {
            0.0
        };
        for (position, &value) in aggregated.iter().enumerate() {
            self.board.add(position, magnitude_delta(value, mean));
        }
    }

    fn finish(self) -> ScoreMap {
        self.board.finish()
    }
}

#[derive(Debug, Clone)]
pub struct BosExcludedMagnitudeVoting {
    config: MagnitudeVotingConfig,
    board: Scoreboard,
}

impl BosExcludedMagnitudeVoting {
    pub fn new(config: MagnitudeVotingConfig, tokens: &TokenSet) -> Self {
        let initial = StrategyKind::MagnitudeVotingBos.initial_score();
        let positions = tokens.positions().filter(|&p| p != BOS_POSITION);
        Self {
            board: Scoreboard::seeded(positions, initial).with_bounds(config.bounds()),
            config,
        }
    }

    pub fn config(&self) -> &MagnitudeVotingConfig {
        &self.config
    }
}

impl StepScorer for BosExcludedMagnitudeVoting {
    fn apply_step(&mut self, aggregated: &[f64]) {
        let threshold = match bos_excluded_threshold(aggregated) {
            BosThreshold::Inert => return,
            BosThreshold::Degenerate => {
                tracing::debug!(
                    bos = aggregated[BOS_POSITION],
                    "BOS holds all attention, no slot above threshold"
                );
                None
            }
            BosThreshold::Value(t) => Some(t),
        };

        for (position, &value) in aggregated.iter().enumerate().skip(BOS_POSITION + 1) {
            let delta = match threshold {
                Some(t) => magnitude_delta(value, t),
                None => -1.0,
            };
            self.board.add(position, delta);
        }
    }

    fn finish(self) -> ScoreMap {
        self.board.finish()
    }
}

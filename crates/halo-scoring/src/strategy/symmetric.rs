//! Symmetric voting: +1 above the step mean, -1 at or below it. Tokens start
//! at 255 and must keep being referenced to stay bright; an ignored token
//! reaches 0 after 255 steps and keeps falling.

use serde::{Deserialize, Serialize};

use halo_core::model::{ScoreMap, TokenSet, BOS_POSITION};

use super::{StepScorer, StrategyKind};
use crate::scoreboard::{ScoreBounds, Scoreboard};
use crate::threshold::{local_mean, local_mean_excluding_bos};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymmetricVotingConfig {
    /// Leave BOS out of the step mean and out of the scores.
    pub exclude_bos: bool,
    /// Clamp every update to `[0, 255]`.
    pub clamp: bool,
}

#[derive(Debug, Clone)]
pub struct SymmetricVoting {
    config: SymmetricVotingConfig,
    board: Scoreboard,
}

impl SymmetricVoting {
    pub fn new(config: SymmetricVotingConfig, tokens: &TokenSet) -> Self {
        let initial = StrategyKind::SymmetricVoting.initial_score();
        let positions = tokens
            .positions()
            .filter(|&p| !(config.exclude_bos && p == BOS_POSITION));
        let bounds = config.clamp.then_some(ScoreBounds::BRIGHTNESS);
        Self {
            board: Scoreboard::seeded(positions, initial).with_bounds(bounds),
            config,
        }
    }

    pub fn config(&self) -> &SymmetricVotingConfig {
        &self.config
    }
}

impl StepScorer for SymmetricVoting {
    fn apply_step(&mut self, aggregated: &[f64]) {
        let (mean, first) = if self.config.exclude_bos {
            (local_mean_excluding_bos(aggregated), BOS_POSITION + 1)
        } else {
            (local_mean(aggregated), 0)
        };
        let Some(mean) = mean else {
            return;
        };

        for (position, &value) in aggregated.iter().enumerate().skip(first) {
            let vote = if value > mean { 1.0 } else { -1.0 };
            self.board.add(position, vote);
        }
    }

    fn finish(self) -> ScoreMap {
        self.board.finish()
    }
}

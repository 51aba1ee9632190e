//! Rolling mean voting: +1 for every step a token is attended above the
//! step's mean. Scores are vote counts starting at 0.

use serde::{Deserialize, Serialize};

use halo_core::model::{ScoreMap, TokenSet};

use super::{StepScorer, StrategyKind};
use crate::scoreboard::Scoreboard;
use crate::threshold::local_mean;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollingVotingConfig {
    /// Slots closer than this to the generation head never vote, which keeps
    /// a fresh token's self-attention from counting.
    pub min_distance: usize,
}

impl Default for RollingVotingConfig {
    fn default() -> Self {
        Self { min_distance: 50 }
    }
}

#[derive(Debug, Clone)]
pub struct RollingVoting {
    config: RollingVotingConfig,
    board: Scoreboard,
}

impl RollingVoting {
    pub fn new(config: RollingVotingConfig, tokens: &TokenSet) -> Self {
        Self {
            config,
            board: Scoreboard::seeded(tokens.positions(), StrategyKind::Voting.initial_score()),
        }
    }

    pub fn config(&self) -> &RollingVotingConfig {
        &self.config
    }
}

impl StepScorer for RollingVoting {
    fn apply_step(&mut self, aggregated: &[f64]) {
        let Some(mean) = local_mean(aggregated) else {
            return;
        };
        let head = aggregated.len();
        for (position, &value) in aggregated.iter().enumerate() {
            if head - position < self.config.min_distance {
                continue;
            }
            if value > mean {
                self.board.add(position, 1.0);
            }
        }
    }

    fn finish(self) -> ScoreMap {
        self.board.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::*;
    use crate::strategy::{Strategy, StrategyConfig};

    fn run(min_distance: usize, steps: Vec<Vec<f32>>) -> ScoreMap {
        let max_len = steps.iter().map(Vec::len).max().unwrap_or(0);
        let config = StrategyConfig::Voting(RollingVotingConfig { min_distance });
        Strategy::new(config, &tokens(0..max_len))
            .unwrap()
            .compute_scores(steps.iter().enumerate().map(|(i, v)| step(i as u32, v)))
    }

    #[test]
    fn test_votes_above_mean_only() {
        let scores = run(0, vec![vec![0.5, 0.3, 0.1, 0.1], vec![0.4, 0.1, 0.4, 0.1]]);
        assert_eq!(scores.get(0), Some(2.0));
        assert_eq!(scores.get(1), Some(1.0));
        assert_eq!(scores.get(2), Some(1.0));
        assert_eq!(scores.get(3), Some(0.0));
    }

    #[test]
    fn test_min_distance_gates_recent_slots() {
        // Context of 4: distances are 4, 3, 2, 1.
        let scores = run(3, vec![vec![0.1, 0.1, 0.1, 0.7], vec![0.1, 0.6, 0.2, 0.1]]);
        assert_eq!(scores.get(3), Some(0.0), "distance 1 is gated");
        assert_eq!(scores.get(1), Some(1.0), "distance 3 votes");
        assert_eq!(scores.get(2), Some(0.0), "distance 2 is gated");
    }

    #[test]
    fn test_totals_are_order_invariant() {
        let steps = vec![
            vec![0.5, 0.2, 0.2, 0.1],
            vec![0.1, 0.6, 0.2, 0.1],
            vec![0.3, 0.1, 0.1, 0.5],
        ];
        let mut reversed = steps.clone();
        reversed.reverse();
        assert_eq!(run(0, steps), run(0, reversed));
    }
}

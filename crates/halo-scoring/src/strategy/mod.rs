pub mod cumulative;
pub mod magnitude;
pub mod rolling;
pub mod symmetric;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use halo_core::aggregate_attention;
use halo_core::model::{GenerationStep, ScoreMap, TokenSet};

use crate::error::ScoringError;

pub use cumulative::{CumulativeConfig, CumulativeStrategy, DecayMode, DistanceMode};
pub use magnitude::{BosExcludedMagnitudeVoting, MagnitudeVoting, MagnitudeVotingConfig};
pub use rolling::{RollingVoting, RollingVotingConfig};
pub use symmetric::{SymmetricVoting, SymmetricVotingConfig};

/// One step of a strategy's state machine: fold an aggregated attention
/// vector into the scoreboard.
pub trait StepScorer {
    fn apply_step(&mut self, aggregated: &[f64]);
    fn finish(self) -> ScoreMap;
}

/// The fixed family of scoring algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Voting,
    SymmetricVoting,
    MagnitudeVoting,
    MagnitudeVotingBos,
    Cumulative,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        Self::Voting,
        Self::Cumulative,
        Self::SymmetricVoting,
        Self::MagnitudeVoting,
        Self::MagnitudeVotingBos,
    ];

    /// Human-readable name used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Voting => "Rolling Mean Voting",
            Self::SymmetricVoting => "Symmetric Voting (±1)",
            Self::MagnitudeVoting => "Magnitude-Weighted Voting",
            Self::MagnitudeVotingBos => "Magnitude-Weighted Voting (BOS-excluded threshold)",
            Self::Cumulative => "Cumulative Brightness",
        }
    }

    /// Stem of the report files this strategy writes.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Voting => "voting_strategy",
            Self::SymmetricVoting => "symmetric_voting_strategy",
            Self::MagnitudeVoting => "magnitude_voting_strategy",
            Self::MagnitudeVotingBos => "magnitude_voting_bos_strategy",
            Self::Cumulative => "cumulative_strategy",
        }
    }

    /// Short label for comparison tables.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Voting => "Voting",
            Self::SymmetricVoting => "Symmetric Voting",
            Self::MagnitudeVoting => "Magnitude Voting",
            Self::MagnitudeVotingBos => "Magnitude Voting (BOS)",
            Self::Cumulative => "Cumulative",
        }
    }

    /// Score every token starts from.
    pub fn initial_score(&self) -> f64 {
        match self {
            Self::Voting | Self::Cumulative => 0.0,
            Self::SymmetricVoting | Self::MagnitudeVoting | Self::MagnitudeVotingBos => 255.0,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "voting" | "rolling" => Ok(Self::Voting),
            "symmetric" | "symmetric_voting" => Ok(Self::SymmetricVoting),
            "magnitude" | "magnitude_voting" => Ok(Self::MagnitudeVoting),
            "magnitude_bos" | "magnitude_voting_bos" => Ok(Self::MagnitudeVotingBos),
            "cumulative" => Ok(Self::Cumulative),
            _ => Err(ScoringError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Strategy selection plus its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyConfig {
    Voting(RollingVotingConfig),
    SymmetricVoting(SymmetricVotingConfig),
    MagnitudeVoting(MagnitudeVotingConfig),
    MagnitudeVotingBos(MagnitudeVotingConfig),
    Cumulative(CumulativeConfig),
}

impl StrategyConfig {
    /// Documented default parameters for `kind`.
    pub fn default_for(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Voting => Self::Voting(RollingVotingConfig::default()),
            StrategyKind::SymmetricVoting => Self::SymmetricVoting(SymmetricVotingConfig::default()),
            StrategyKind::MagnitudeVoting => Self::MagnitudeVoting(MagnitudeVotingConfig::default()),
            StrategyKind::MagnitudeVotingBos => {
                Self::MagnitudeVotingBos(MagnitudeVotingConfig::default())
            }
            StrategyKind::Cumulative => Self::Cumulative(CumulativeConfig::default()),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Voting(_) => StrategyKind::Voting,
            Self::SymmetricVoting(_) => StrategyKind::SymmetricVoting,
            Self::MagnitudeVoting(_) => StrategyKind::MagnitudeVoting,
            Self::MagnitudeVotingBos(_) => StrategyKind::MagnitudeVotingBos,
            Self::Cumulative(_) => StrategyKind::Cumulative,
        }
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        match self {
            Self::Cumulative(c) => c.validate(),
            _ => Ok(()),
        }
    }

    /// Parameters as a flat JSON object for reports.
    pub fn parameters(&self) -> serde_json::Value {
        let value = match self {
            Self::Voting(c) => serde_json::to_value(c),
            Self::SymmetricVoting(c) => serde_json::to_value(c),
            Self::MagnitudeVoting(c) | Self::MagnitudeVotingBos(c) => serde_json::to_value(c),
            Self::Cumulative(c) => serde_json::to_value(c),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}

/// A configured strategy bound to one capture's token set.
///
/// `compute_scores` consumes the strategy, so each instance scores exactly
/// one pass over the steps.
#[derive(Debug, Clone)]
pub enum Strategy {
    Voting(RollingVoting),
    SymmetricVoting(SymmetricVoting),
    MagnitudeVoting(MagnitudeVoting),
    MagnitudeVotingBos(BosExcludedMagnitudeVoting),
    Cumulative(CumulativeStrategy),
}

impl Strategy {
    pub fn new(config: StrategyConfig, tokens: &TokenSet) -> Result<Self, ScoringError> {
        config.validate()?;
        Ok(match config {
            StrategyConfig::Voting(c) => Self::Voting(RollingVoting::new(c, tokens)),
            StrategyConfig::SymmetricVoting(c) => {
                Self::SymmetricVoting(SymmetricVoting::new(c, tokens))
            }
            StrategyConfig::MagnitudeVoting(c) => {
                Self::MagnitudeVoting(MagnitudeVoting::new(c, tokens))
            }
            StrategyConfig::MagnitudeVotingBos(c) => {
                Self::MagnitudeVotingBos(BosExcludedMagnitudeVoting::new(c, tokens))
            }
            StrategyConfig::Cumulative(c) => Self::Cumulative(CumulativeStrategy::new(c, tokens)),
        })
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Voting(_) => StrategyKind::Voting,
            Self::SymmetricVoting(_) => StrategyKind::SymmetricVoting,
            Self::MagnitudeVoting(_) => StrategyKind::MagnitudeVoting,
            Self::MagnitudeVotingBos(_) => StrategyKind::MagnitudeVotingBos,
            Self::Cumulative(_) => StrategyKind::Cumulative,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn key(&self) -> &'static str {
        self.kind().key()
    }

    pub fn parameters(&self) -> serde_json::Value {
        self.config().parameters()
    }

    pub fn config(&self) -> StrategyConfig {
        match self {
            Self::Voting(s) => StrategyConfig::Voting(s.config().clone()),
            Self::SymmetricVoting(s) => StrategyConfig::SymmetricVoting(s.config().clone()),
            Self::MagnitudeVoting(s) => StrategyConfig::MagnitudeVoting(s.config().clone()),
            Self::MagnitudeVotingBos(s) => StrategyConfig::MagnitudeVotingBos(s.config().clone()),
            Self::Cumulative(s) => StrategyConfig::Cumulative(s.config().clone()),
        }
    }

    /// Score every step in order and return the finalized map.
    pub fn compute_scores<I>(self, steps: I) -> ScoreMap
    where
        I: IntoIterator<Item = GenerationStep>,
    {
        self.compute_scores_with_progress(steps, 0)
    }

    /// As [`compute_scores`](Self::compute_scores), logging progress every
    /// `progress_interval` scored steps (0 disables).
    pub fn compute_scores_with_progress<I>(mut self, steps: I, progress_interval: usize) -> ScoreMap
    where
        I: IntoIterator<Item = GenerationStep>,
    {
        let name = self.name();
        let mut scored = 0usize;

        for step in steps {
            let Some(attention) = step.attention else {
                continue;
            };
            let aggregated = aggregate_attention(&attention);
            self.apply_step(&aggregated);
            scored += 1;

            if progress_interval > 0 && scored % progress_interval == 0 {
                debug!(strategy = name, steps = scored, "scoring progress");
            }
        }

        let scores = self.finish();
        info!(
            strategy = name,
            steps = scored,
            tokens = scores.len(),
            "scoring complete"
        );
        scores
    }
}

impl StepScorer for Strategy {
    fn apply_step(&mut self, aggregated: &[f64]) {
        match self {
            Self::Voting(s) => s.apply_step(aggregated),
            Self::SymmetricVoting(s) => s.apply_step(aggregated),
            Self::MagnitudeVoting(s) => s.apply_step(aggregated),
            Self::MagnitudeVotingBos(s) => s.apply_step(aggregated),
            Self::Cumulative(s) => s.apply_step(aggregated),
        }
    }

    fn finish(self) -> ScoreMap {
        match self {
            Self::Voting(s) => s.finish(),
            Self::SymmetricVoting(s) => s.finish(),
            Self::MagnitudeVoting(s) => s.finish(),
            Self::MagnitudeVotingBos(s) => s.finish(),
            Self::Cumulative(s) => s.finish(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_no_steps_yields_initial_scores() {
        let set = tokens(0..4);
        for kind in StrategyKind::ALL {
            let strategy = Strategy::new(StrategyConfig::default_for(kind), &set).unwrap();
            let scores = strategy.compute_scores(Vec::new());
            let expected_len = if kind == StrategyKind::MagnitudeVotingBos { 3 } else { 4 };
            assert_eq!(scores.len(), expected_len, "{kind}");
            assert!(
                scores.values().all(|s| s == kind.initial_score()),
                "{kind}: {scores:?}"
            );
        }
    }

    #[test]
    fn test_inert_steps_change_nothing() {
        let set = tokens(0..3);
        for kind in StrategyKind::ALL {
            let strategy = Strategy::new(StrategyConfig::default_for(kind), &set).unwrap();
            let scores = strategy.compute_scores(vec![inert(0), inert(1)]);
            assert!(scores.values().all(|s| s == kind.initial_score()), "{kind}");
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("voting".parse::<StrategyKind>().unwrap(), StrategyKind::Voting);
        assert_eq!(
            "magnitude-bos".parse::<StrategyKind>().unwrap(),
            StrategyKind::MagnitudeVotingBos
        );
        assert!("softmax".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_config_carries_kind_and_parameters() {
        let config = StrategyConfig::default_for(StrategyKind::Cumulative);
        assert_eq!(config.kind(), StrategyKind::Cumulative);
        let params = config.parameters();
        assert_eq!(params["decay_mode"], "additive");
        assert_eq!(params["min_distance"], 20);

        let strategy = Strategy::new(config.clone(), &tokens(0..2)).unwrap();
        assert_eq!(strategy.config(), config);
        assert_eq!(strategy.name(), "Cumulative Brightness");
        assert_eq!(strategy.key(), "cumulative_strategy");
        assert_eq!(strategy.parameters()["distance_mode"], "logarithmic");
    }

    #[test]
    fn test_uncovered_tokens_keep_initial_score() {
        let set = tokens(0..6);
        let mut configs: Vec<StrategyConfig> =
            StrategyKind::ALL.into_iter().map(StrategyConfig::default_for).collect();
        configs.push(StrategyConfig::Cumulative(CumulativeConfig {
            decay_rate: 0.5,
            decay_mode: DecayMode::Exponential,
            min_distance: 0,
            ..CumulativeConfig::default()
        }));

        for config in configs {
            let kind = config.kind();
            let scores = Strategy::new(config, &set)
                .unwrap()
                .compute_scores(vec![step(0, &[0.5, 0.3, 0.2]), step(1, &[0.4, 0.3, 0.2, 0.1])]);
            assert_eq!(scores.get(4), Some(kind.initial_score()), "{kind}");
            assert_eq!(scores.get(5), Some(kind.initial_score()), "{kind}");
        }
    }

    #[test]
    fn test_slots_beyond_token_set_are_ignored() {
        let set = tokens(0..2);
        let config = StrategyConfig::SymmetricVoting(SymmetricVotingConfig::default());
        let scores = Strategy::new(config, &set)
            .unwrap()
            .compute_scores(vec![step(0, &[0.1, 0.1, 0.8])]);
        assert_eq!(scores.len(), 2);
        assert!(!scores.contains(2));
    }
}

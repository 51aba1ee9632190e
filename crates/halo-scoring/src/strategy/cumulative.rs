//! Cumulative brightness: each step adds distance-weighted attention and
//! subtracts decay, `s <- s + a * w(d) - decay(s)`. Tokens start at 0 and are
//! never clamped, so scores may go negative.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use halo_core::model::{ScoreMap, TokenSet};

use super::{StepScorer, StrategyKind};
use crate::error::ScoringError;
use crate::scoreboard::Scoreboard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayMode {
    None,
    #[default]
    Additive,
    Exponential,
}

impl DecayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Additive => "additive",
            Self::Exponential => "exponential",
        }
    }
}

impl fmt::Display for DecayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecayMode {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "additive" => Ok(Self::Additive),
            "exponential" => Ok(Self::Exponential),
            other => Err(ScoringError::InvalidConfig(format!(
                "unknown decay mode '{other}' (expected none, additive or exponential)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMode {
    None,
    Threshold,
    Linear,
    #[default]
    Logarithmic,
    SquareRoot,
}

impl DistanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Threshold => "threshold",
            Self::Linear => "linear",
            Self::Logarithmic => "logarithmic",
            Self::SquareRoot => "square_root",
        }
    }

    /// Whether the weight divides by `distance_scale`.
    pub fn is_scaled(&self) -> bool {
        matches!(self, Self::Linear | Self::Logarithmic | Self::SquareRoot)
    }
}

impl fmt::Display for DistanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMode {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "none" => Ok(Self::None),
            "threshold" => Ok(Self::Threshold),
            "linear" => Ok(Self::Linear),
            "logarithmic" | "log" => Ok(Self::Logarithmic),
            "square_root" | "sqrt" => Ok(Self::SquareRoot),
            _ => Err(ScoringError::InvalidConfig(format!(
                "unknown distance mode '{s}' (expected none, threshold, linear, logarithmic or square_root)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CumulativeConfig {
    pub decay_rate: f64,
    pub decay_mode: DecayMode,
    pub distance_mode: DistanceMode,
    /// Slots closer than this to the generation head get weight 0, in every
    /// distance mode.
    pub min_distance: usize,
    pub distance_scale: f64,
}

impl Default for CumulativeConfig {
    fn default() -> Self {
        Self {
            decay_rate: 0.001,
            decay_mode: DecayMode::Additive,
            distance_mode: DistanceMode::Logarithmic,
            min_distance: 20,
            distance_scale: 10.0,
        }
    }
}

impl CumulativeConfig {
    pub fn validate(&self) -> Result<(), ScoringError> {
        if !self.decay_rate.is_finite() {
            return Err(ScoringError::InvalidConfig(format!(
                "decay_rate must be finite, got {}",
                self.decay_rate
            )));
        }
        if self.distance_mode.is_scaled()
            && !(self.distance_scale.is_finite() && self.distance_scale > 0.0)
        {
            return Err(ScoringError::InvalidConfig(format!(
                "distance_scale must be > 0 for {} distance mode, got {}",
                self.distance_mode, self.distance_scale
            )));
        }
        Ok(())
    }

    /// Weight applied to attention at `distance` slots from the head.
    pub fn distance_weight(&self, distance: usize) -> f64 {
        if distance < self.min_distance {
            return 0.0;
        }
        let d = distance as f64;
        let scale = self.distance_scale;
        match self.distance_mode {
            DistanceMode::None | DistanceMode::Threshold => 1.0,
            DistanceMode::Linear => d / scale,
            DistanceMode::Logarithmic => (d + 1.0).ln() / (scale + 1.0).ln(),
            DistanceMode::SquareRoot => d.sqrt() / scale.sqrt(),
        }
    }

    /// Amount subtracted from `score` after one step.
    pub fn decay(&self, score: f64) -> f64 {
        match self.decay_mode {
            DecayMode::None => 0.0,
            DecayMode::Additive => self.decay_rate,
            DecayMode::Exponential => score * self.decay_rate,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CumulativeStrategy {
    config: CumulativeConfig,
    board: Scoreboard,
}

impl CumulativeStrategy {
    pub fn new(config: CumulativeConfig, tokens: &TokenSet) -> Self {
        Self {
            config,
            board: Scoreboard::seeded(tokens.positions(), StrategyKind::Cumulative.initial_score()),
        }
    }

    pub fn config(&self) -> &CumulativeConfig {
        &self.config
    }
}

impl StepScorer for CumulativeStrategy {
    fn apply_step(&mut self, aggregated: &[f64]) {
        let context_length = aggregated.len();
        let config = &self.config;
        for (position, &value) in aggregated.iter().enumerate() {
            let weight = config.distance_weight(context_length - position);
            self.board
                .update(position, |s| s + value * weight - config.decay(s));
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

    fn run(config: CumulativeConfig, positions: usize, steps: &[&[f32]]) -> ScoreMap {
        Strategy::new(StrategyConfig::Cumulative(config), &tokens(0..positions))
            .unwrap()
            .compute_scores(steps.iter().enumerate().map(|(i, v)| step(i as u32, v)))
    }

    fn plain() -> CumulativeConfig {
        CumulativeConfig {
            decay_rate: 0.0,
            decay_mode: DecayMode::None,
            distance_mode: DistanceMode::None,
            min_distance: 0,
            distance_scale: 10.0,
        }
    }

    #[test]
    fn test_defaults() {
        let config = CumulativeConfig::default();
        assert_eq!(config.decay_rate, 0.001);
        assert_eq!(config.decay_mode, DecayMode::Additive);
        assert_eq!(config.distance_mode, DistanceMode::Logarithmic);
        assert_eq!(config.min_distance, 20);
        assert_eq!(config.distance_scale, 10.0);
    }

    #[test]
    fn test_distance_weights() {
        let mut config = CumulativeConfig {
            min_distance: 0,
            ..CumulativeConfig::default()
        };
        assert!((config.distance_weight(10) - 1.0).abs() < 1e-12);
        assert!((config.distance_weight(0)).abs() < 1e-12);

        config.distance_mode = DistanceMode::Linear;
        assert!((config.distance_weight(25) - 2.5).abs() < 1e-12);

        config.distance_mode = DistanceMode::SquareRoot;
        assert!((config.distance_weight(40) - 2.0).abs() < 1e-12);

        config.distance_mode = DistanceMode::Threshold;
        assert_eq!(config.distance_weight(3), 1.0);
    }

    #[test]
    fn test_min_distance_zeroes_weight_in_every_mode() {
        for mode in [
            DistanceMode::None,
            DistanceMode::Threshold,
            DistanceMode::Linear,
            DistanceMode::Logarithmic,
            DistanceMode::SquareRoot,
        ] {
            let config = CumulativeConfig {
                distance_mode: mode,
                min_distance: 5,
                ..CumulativeConfig::default()
            };
            assert_eq!(config.distance_weight(4), 0.0, "{mode}");
            assert!(config.distance_weight(5) > 0.0, "{mode}");
        }
    }

    #[test]
    fn test_plain_accumulation() {
        let scores = run(plain(), 2, &[&[0.25, 0.75], &[0.5, 0.5]]);
        assert!((scores.get(0).unwrap() - 0.75).abs() < 1e-9);
        assert!((scores.get(1).unwrap() - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_additive_decay_drives_unattended_tokens_negative() {
        let config = CumulativeConfig {
            decay_rate: 0.5,
            decay_mode: DecayMode::Additive,
            ..plain()
        };
        let scores = run(config, 2, &[&[1.0, 0.0], &[1.0, 0.0]]);
        assert!((scores.get(0).unwrap() - 1.0).abs() < 1e-9);
        assert!((scores.get(1).unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_exponential_decay_is_order_sensitive() {
        let config = CumulativeConfig {
            decay_rate: 0.5,
            decay_mode: DecayMode::Exponential,
            ..plain()
        };
        let high: &[f32] = &[1.0];
        let low: &[f32] = &[0.0];

        // 1 - 0 = 1, then 1 + 0 - 0.5 = 0.5.
        let forward = run(config.clone(), 1, &[high, low]);
        // 0 - 0 = 0, then 0 + 1 - 0 = 1.
        let backward = run(config, 1, &[low, high]);
        assert!((forward.get(0).unwrap() - 0.5).abs() < 1e-9);
        assert!((backward.get(0).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_validation() {
        let bad_scale = CumulativeConfig {
            distance_scale: 0.0,
            ..CumulativeConfig::default()
        };
        assert!(bad_scale.validate().is_err());

        let unscaled = CumulativeConfig {
            distance_scale: 0.0,
            distance_mode: DistanceMode::Threshold,
            ..CumulativeConfig::default()
        };
        assert!(unscaled.validate().is_ok());

        let bad_rate = CumulativeConfig {
            decay_rate: f64::NAN,
            ..CumulativeConfig::default()
        };
        assert!(matches!(
            Strategy::new(StrategyConfig::Cumulative(bad_rate), &tokens(0..1)),
            Err(ScoringError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("square-root".parse::<DistanceMode>().unwrap(), DistanceMode::SquareRoot);
        assert_eq!("exponential".parse::<DecayMode>().unwrap(), DecayMode::Exponential);
        assert!("cubic".parse::<DistanceMode>().is_err());
    }
}

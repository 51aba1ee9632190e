use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use halo_core::model::ScoreMap;

/// Inclusive score range applied after every update when clamping is on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBounds {
    pub min: f64,
    pub max: f64,
}

impl ScoreBounds {
    /// The 8-bit brightness range the voting strategies start at the top of.
    pub const BRIGHTNESS: Self = Self {
        min: 0.0,
        max: 255.0,
    };

    pub fn clamp(&self, score: f64) -> f64 {
        score.clamp(self.min, self.max)
    }
}

/// Per-position running scores owned by one strategy for one run.
///
/// Only seeded positions are ever updated; updates for any other slot are
/// dropped.
#[derive(Debug, Clone)]
pub struct Scoreboard {
    scores: BTreeMap<usize, f64>,
    bounds: Option<ScoreBounds>,
}

impl Scoreboard {
    pub fn seeded(positions: impl IntoIterator<Item = usize>, initial: f64) -> Self {
        Self {
            scores: positions.into_iter().map(|p| (p, initial)).collect(),
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, bounds: Option<ScoreBounds>) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn contains(&self, position: usize) -> bool {
        self.scores.contains_key(&position)
    }

    pub fn get(&self, position: usize) -> Option<f64> {
        self.scores.get(&position).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Add `delta` to a seeded position. Returns whether the position exists.
    pub fn add(&mut self, position: usize, delta: f64) -> bool {
        self.update(position, |s| s + delta)
    }

    /// Replace a seeded position's score with `f(current)`.
    pub fn update(&mut self, position: usize, f: impl FnOnce(f64) -> f64) -> bool {
        let bounds = self.bounds;
        match self.scores.get_mut(&position) {
            Some(score) => {
                let next = f(*score);
                *score = match bounds {
                    Some(b) => b.clamp(next),
                    None => next,
                };
                true
            }
            None => false,
        }
    }

    pub fn finish(self) -> ScoreMap {
        ScoreMap::from(self.scores)
    }
}

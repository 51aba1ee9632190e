//! Brightness scoring for Halo.
//!
//! A [`Strategy`] consumes the generation steps of one capture in order and
//! yields a [`ScoreMap`](halo_core::model::ScoreMap). Sentence ranking,
//! pruning and cross-strategy comparison build on that map.

pub mod compare;
pub mod error;
pub mod pruning;
pub mod run;
pub mod scoreboard;
pub mod sentence;
pub mod strategy;
pub mod threshold;

pub use compare::{compare_rankings, RankingComparison, SentenceRef};
pub use error::ScoringError;
pub use pruning::PruningPlan;
pub use run::{run_strategy, ReportMetadata, StrategyReport};
pub use scoreboard::{ScoreBounds, Scoreboard};
pub use sentence::{rank_sentences, SentenceRanking};
pub use strategy::{Strategy, StrategyConfig, StrategyKind};

//! One strategy over one capture, end to end.

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use halo_capture::{LoadSummary, StepLoader};
use halo_core::model::{ScoreMap, ScoreStats, ScoredSentence, TokenSet};

use crate::error::ScoringError;
use crate::sentence::rank_sentences;
use crate::strategy::{Strategy, StrategyConfig, StrategyKind};

/// Report header shared by the Markdown and JSON renderings.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub strategy: String,
    pub key: String,
    pub parameters: serde_json::Value,
    pub capture_dir: PathBuf,
    pub total_sentences: usize,
    pub total_tokens: usize,
    pub score_stats: Option<ScoreStats>,
    pub load: LoadSummary,
}

/// Outcome of [`run_strategy`].
#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub metadata: ReportMetadata,
    #[serde(skip)]
    pub kind: StrategyKind,
    #[serde(skip)]
    pub scores: ScoreMap,
    pub sentences: Vec<ScoredSentence>,
}

/// Score every step of `loader` with a fresh strategy built from `config`,
/// then rank the resulting sentences.
pub fn run_strategy(
    loader: &StepLoader,
    tokens: &TokenSet,
    config: StrategyConfig,
    progress_interval: usize,
) -> Result<StrategyReport, ScoringError> {
    let strategy = Strategy::new(config, tokens)?;
    let kind = strategy.kind();
    let key = strategy.key().to_string();
    let parameters = strategy.parameters();

    info!(
        strategy = kind.name(),
        capture = %loader.capture_dir().display(),
        tokens = tokens.len(),
        "running strategy"
    );

    let mut steps = loader.steps()?;
    let scores = strategy.compute_scores_with_progress(steps.by_ref(), progress_interval);
    let load = steps.summary();
    if load.skipped > 0 {
        info!(skipped = load.skipped, "some records were skipped");
    }

    let ranking = rank_sentences(tokens, &scores);

    Ok(StrategyReport {
        metadata: ReportMetadata {
            strategy: kind.name().to_string(),
            key,
            parameters,
            capture_dir: loader.capture_dir().to_path_buf(),
            total_sentences: ranking.len(),
            total_tokens: scores.len(),
            score_stats: ranking.stats,
            load,
        },
        kind,
        scores,
        sentences: ranking.sentences,
    })
}

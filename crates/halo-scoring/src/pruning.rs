//! Keep/prune split of ranked sentences by peak score.

use serde::Serialize;

use halo_core::model::ScoredSentence;

/// Sentences split at a peak-score threshold, both halves in document order.
#[derive(Debug, Clone, Serialize)]
pub struct PruningPlan {
    pub keep_above: f64,
    pub kept: Vec<ScoredSentence>,
    pub pruned: Vec<ScoredSentence>,
    pub kept_tokens: usize,
    pub pruned_tokens: usize,
}

impl PruningPlan {
    /// A sentence survives when its peak is strictly above `keep_above`.
    pub fn from_sentences(sentences: &[ScoredSentence], keep_above: f64) -> Self {
        let mut ordered: Vec<&ScoredSentence> = sentences.iter().collect();
        ordered.sort_by_key(|s| (s.turn_id, s.sentence_id, s.first_position()));

        let (kept, pruned): (Vec<ScoredSentence>, Vec<ScoredSentence>) = ordered
            .into_iter()
            .cloned()
            .partition(|s| s.peak_score > keep_above);

        Self {
            keep_above,
            kept_tokens: kept.iter().map(|s| s.token_count).sum(),
            pruned_tokens: pruned.iter().map(|s| s.token_count).sum(),
            kept,
            pruned,
        }
    }

    pub fn total_sentences(&self) -> usize {
        self.kept.len() + self.pruned.len()
    }

    pub fn total_tokens(&self) -> usize {
        self.kept_tokens + self.pruned_tokens
    }

    /// Share of tokens removed, in percent. 0 for an empty plan.
    pub fn reduction_percent(&self) -> f64 {
        match self.total_tokens() {
            0 => 0.0,
            total => self.pruned_tokens as f64 / total as f64 * 100.0,
        }
    }

    pub fn kept_percent(&self) -> f64 {
        match self.total_tokens() {
            0 => 0.0,
            total => self.kept_tokens as f64 / total as f64 * 100.0,
        }
    }
}

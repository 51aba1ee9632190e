//! Sentence-level view of a score map.

use std::collections::BTreeMap;

use serde::Serialize;

use halo_core::model::{
    ScoreMap, ScoreStats, ScoredSentence, SentenceKey, SentenceToken, TokenSet,
};

/// Sentences of one run, brightest first, plus statistics over the raw map.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SentenceRanking {
    pub sentences: Vec<ScoredSentence>,
    pub stats: Option<ScoreStats>,
}

impl SentenceRanking {
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// Group the scored tokens of `tokens` into sentences keyed by
/// `(turn_id, sentence_id, role)` and rank them by peak score.
///
/// Tokens without a score (BOS under the BOS-excluded strategy) are left out.
/// Ties keep `(turn_id, sentence_id)` order.
pub fn rank_sentences(tokens: &TokenSet, scores: &ScoreMap) -> SentenceRanking {
    let mut groups: BTreeMap<SentenceKey, Vec<SentenceToken>> = BTreeMap::new();
    for token in tokens.iter() {
        let Some(score) = scores.get(token.position) else {
            continue;
        };
        let key = SentenceKey {
            turn_id: token.turn_id,
            sentence_id: token.sentence_id,
            role: token.message_role.clone(),
        };
        groups.entry(key).or_default().push(SentenceToken {
            position: token.position,
            text: token.text.clone(),
            score,
        });
    }

    let mut sentences: Vec<ScoredSentence> = groups
        .into_iter()
        .filter_map(|(key, tokens)| ScoredSentence::new(key, tokens))
        .collect();
    // Stable sort: BTreeMap order already breaks ties by (turn, sentence).
    sentences.sort_by(|a, b| b.peak_score.total_cmp(&a.peak_score));

    SentenceRanking {
        sentences,
        stats: scores.stats(),
    }
}

use serde::{Deserialize, Serialize};

use super::token::MessageRole;

/// Grouping key for a sentence. Sentence ids restart every turn, so the turn
/// is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SentenceKey {
    pub turn_id: u32,
    pub sentence_id: u32,
    pub role: MessageRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceToken {
    pub position: usize,
    pub text: String,
    pub score: f64,
}

/// A sentence reconstructed from scored tokens, carrying its peak score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSentence {
    pub turn_id: u32,
    pub sentence_id: u32,
    pub role: MessageRole,
    pub peak_score: f64,
    pub token_count: usize,
    pub text: String,
    pub tokens: Vec<SentenceToken>,
}

impl ScoredSentence {
    /// Build a sentence from its tokens in any order. Returns `None` when
    /// `tokens` is empty.
    pub fn new(key: SentenceKey, mut tokens: Vec<SentenceToken>) -> Option<Self> {
        tokens.sort_by_key(|t| t.position);
        let peak_score = tokens.iter().map(|t| t.score).reduce(f64::max)?;
        let text = tokens.iter().map(|t| t.text.as_str()).collect();

        Some(Self {
            turn_id: key.turn_id,
            sentence_id: key.sentence_id,
            role: key.role,
            peak_score,
            token_count: tokens.len(),
            text,
            tokens,
        })
    }

    /// Lowest token position, used to restore document order.
    pub fn first_position(&self) -> usize {
        self.tokens.first().map(|t| t.position).unwrap_or(usize::MAX)
    }
}

//! Agreement between the top-N sentences of several strategies.

use std::collections::BTreeSet;

use serde::Serialize;

use halo_core::model::ScoredSentence;

/// Width of sentence previews in comparison output, in characters.
pub const PREVIEW_CHARS: usize = 60;

/// A sentence identified by `(turn_id, sentence_id)` with a short preview.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SentenceRef {
    pub turn_id: u32,
    pub sentence_id: u32,
    pub preview: String,
}

/// Top-N overlap between rankings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankingComparison {
    pub top_n: usize,
    /// Sentences in every ranking's top N.
    pub common: Vec<SentenceRef>,
    /// Per ranking label, sentences in its top N and in no other.
    pub unique: Vec<(String, Vec<SentenceRef>)>,
}

/// Single-line preview of `text`, cut to `max_chars` with a `...` suffix.
pub fn sentence_preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    if flat.chars().count() <= max_chars {
        return flat.to_string();
    }
    let mut cut: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

type Key = (u32, u32);

fn top_keys(sentences: &[ScoredSentence], top_n: usize) -> BTreeSet<Key> {
    sentences
        .iter()
        .take(top_n)
        .map(|s| (s.turn_id, s.sentence_id))
        .collect()
}

fn to_refs(keys: &BTreeSet<Key>, source: &[ScoredSentence]) -> Vec<SentenceRef> {
    keys.iter()
        .filter_map(|&(turn_id, sentence_id)| {
            source
                .iter()
                .find(|s| s.turn_id == turn_id && s.sentence_id == sentence_id)
                .map(|s| SentenceRef {
                    turn_id,
                    sentence_id,
                    preview: sentence_preview(&s.text, PREVIEW_CHARS),
                })
        })
        .collect()
}

/// Compare labelled rankings (each brightest first) by their top `top_n`.
///
/// Fewer than two rankings yields no common or unique sets.
pub fn compare_rankings(rankings: &[(&str, &[ScoredSentence])], top_n: usize) -> RankingComparison {
    if rankings.len() < 2 {
        return RankingComparison {
            top_n,
            ..RankingComparison::default()
        };
    }

    let tops: Vec<BTreeSet<Key>> = rankings
        .iter()
        .map(|(_, sentences)| top_keys(sentences, top_n))
        .collect();

    let mut common = tops[0].clone();
    for other in &tops[1..] {
        common.retain(|k| other.contains(k));
    }

    let unique = rankings
        .iter()
        .enumerate()
        .map(|(i, (label, sentences))| {
            let mut only = tops[i].clone();
            for (j, other) in tops.iter().enumerate() {
                if i != j {
                    only.retain(|k| !other.contains(k));
                }
            }
            (label.to_string(), to_refs(&only, sentences))
        })
        .collect();

    RankingComparison {
        top_n,
        common: to_refs(&common, rankings[0].1),
        unique,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_core::model::{MessageRole, SentenceKey, SentenceToken};

    fn sentence(turn_id: u32, sentence_id: u32, text: &str) -> ScoredSentence {
        ScoredSentence::new(
            SentenceKey {
                turn_id,
                sentence_id,
                role: MessageRole::Assistant,
            },
            vec![SentenceToken {
                position: (turn_id * 100 + sentence_id) as usize,
                text: text.to_string(),
                score: 1.0,
            }],
        )
        .unwrap()
    }

    #[test]
    fn test_common_and_unique_top_sets() {
        let a = vec![sentence(0, 0, "alpha"), sentence(0, 1, "beta"), sentence(1, 0, "gamma")];
        let b = vec![sentence(0, 1, "beta"), sentence(2, 0, "delta"), sentence(0, 0, "alpha")];
        let cmp = compare_rankings(&[("A", a.as_slice()), ("B", b.as_slice())], 2);

        assert_eq!(cmp.common.len(), 1);
        assert_eq!((cmp.common[0].turn_id, cmp.common[0].sentence_id), (0, 1));
        assert_eq!(cmp.common[0].preview, "beta");

        assert_eq!(cmp.unique[0].0, "A");
        assert_eq!(cmp.unique[0].1[0].preview, "alpha");
        assert_eq!(cmp.unique[1].0, "B");
        assert_eq!(cmp.unique[1].1[0].preview, "delta");
    }

    #[test]
    fn test_single_ranking_has_no_agreement_sets() {
        let a = vec![sentence(0, 0, "alpha")];
        let cmp = compare_rankings(&[("A", a.as_slice())], 10);
        assert!(cmp.common.is_empty());
        assert!(cmp.unique.is_empty());
    }

    #[test]
    fn test_preview_is_char_aware() {
        assert_eq!(sentence_preview("  two\nlines ", 60), "two lines");
        let long = "é".repeat(70);
        let preview = sentence_preview(&long, 60);
        assert_eq!(preview.chars().count(), 60);
        assert!(preview.ends_with("..."));
    }
}

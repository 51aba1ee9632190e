pub mod score;
pub mod sentence;
pub mod step;
pub mod token;

pub use score::{ScoreMap, ScoreStats};
pub use sentence::{ScoredSentence, SentenceKey, SentenceToken};
pub use step::{Attention, AttentionShape, GenerationStep};
pub use token::{MessageRole, PromptToken, TokenSet, BOS_POSITION};

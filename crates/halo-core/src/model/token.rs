use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Context position of the begin-of-sequence token.
pub const BOS_POSITION: usize = 0;

/// Role of the message a token belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    Tool,
    #[default]
    Unknown,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
            Self::Tool => "tool",
            Self::Unknown => "unknown",
        }
    }
}

impl From<String> for MessageRole {
    fn from(s: String) -> Self {
        match s.as_str() {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "system" => Self::System,
            "tool" => Self::Tool,
            _ => Self::Unknown,
        }
    }
}

impl From<MessageRole> for String {
    fn from(role: MessageRole) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One token of the model's context, as recorded in `metadata.json` or an
/// external token export.
///
/// The role is read from `message_role`, falling back to `role`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPromptToken")]
pub struct PromptToken {
    pub position: usize,
    pub text: String,
    pub turn_id: u32,
    pub sentence_id: u32,
    pub message_role: MessageRole,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

#[derive(Deserialize)]
struct RawPromptToken {
    position: usize,
    #[serde(default)]
    text: String,
    #[serde(default)]
    turn_id: u32,
    #[serde(default)]
    sentence_id: u32,
    #[serde(default)]
    message_role: Option<MessageRole>,
    #[serde(default)]
    role: Option<MessageRole>,
    #[serde(default)]
    deleted: bool,
}

impl From<RawPromptToken> for PromptToken {
    fn from(raw: RawPromptToken) -> Self {
        Self {
            position: raw.position,
            text: raw.text,
            turn_id: raw.turn_id,
            sentence_id: raw.sentence_id,
            message_role: raw.message_role.or(raw.role).unwrap_or_default(),
            deleted: raw.deleted,
        }
    }
}

/// The active tokens of a capture, ordered by position.
///
/// Deleted tokens never enter the set. Context slot `i` of an aggregated
/// attention vector refers to the token at position `i`, if any.
#[derive(Debug, Clone, Default)]
pub struct TokenSet {
    tokens: Vec<PromptToken>,
    by_position: BTreeMap<usize, usize>,
}

impl TokenSet {
    pub fn new(tokens: impl IntoIterator<Item = PromptToken>) -> Self {
        let mut active: Vec<PromptToken> = tokens.into_iter().filter(|t| !t.deleted).collect();
        active.sort_by_key(|t| t.position);

        let mut kept = Vec::with_capacity(active.len());
        let mut by_position = BTreeMap::new();
        for token in active {
            if by_position.contains_key(&token.position) {
                tracing::warn!(position = token.position, "duplicate token position, keeping first");
                continue;
            }
            by_position.insert(token.position, kept.len());
            kept.push(token);
        }

        Self {
            tokens: kept,
            by_position,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PromptToken> {
        self.tokens.iter()
    }

    pub fn get(&self, position: usize) -> Option<&PromptToken> {
        self.by_position.get(&position).map(|&i| &self.tokens[i])
    }

    pub fn contains(&self, position: usize) -> bool {
        self.by_position.contains_key(&position)
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.tokens.iter().map(|t| t.position)
    }
}

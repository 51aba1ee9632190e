use std::path::Path;

use serde::{Deserialize, Serialize};

use halo_core::model::{Attention, AttentionShape, GenerationStep};

use crate::error::CaptureError;

/// `token_<n>.json`: one step with its attention embedded.
#[derive(Debug, Serialize, Deserialize)]
pub struct LegacyRecord {
    #[serde(default)]
    pub token_id: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub step: Option<u32>,
    #[serde(default)]
    pub attention: Option<LegacyAttention>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LegacyAttention {
    #[serde(default)]
    pub shape: Option<AttentionShape>,
    #[serde(default)]
    pub data: Vec<f32>,
}

pub fn read_record(path: &Path, index: u32) -> Result<GenerationStep, CaptureError> {
    let content = std::fs::read_to_string(path)?;
    parse_record(&content, index)
}

pub fn parse_record(content: &str, index: u32) -> Result<GenerationStep, CaptureError> {
    let record: LegacyRecord = serde_json::from_str(content)?;

    // An absent or empty attention block marks a non-generation record.
    let attention = match record.attention {
        Some(LegacyAttention { data, .. }) if data.is_empty() => None,
        Some(LegacyAttention {
            shape: Some(shape),
            data,
        }) => Some(Attention::new(shape, data)?),
        Some(LegacyAttention { shape: None, .. }) => {
            return Err(CaptureError::Malformed(
                "attention data present without a shape".into(),
            ))
        }
        None => None,
    };

    Ok(GenerationStep {
        index,
        step: record.step,
        token_id: record.token_id,
        text: record.text.unwrap_or_default(),
        attention,
    })
}

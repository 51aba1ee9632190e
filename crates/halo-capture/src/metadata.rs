use std::path::Path;

use serde::{Deserialize, Serialize};

use halo_core::model::{PromptToken, TokenSet};

use crate::error::CaptureError;

pub const METADATA_FILE: &str = "metadata.json";

/// `metadata.json` of a capture. Fields other than `prompt_tokens` are kept
/// so a converted capture carries them over unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureMetadata {
    #[serde(default)]
    pub prompt_tokens: Vec<PromptToken>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CaptureMetadata {
    pub fn load(capture_dir: &Path) -> Result<Self, CaptureError> {
        if !capture_dir.is_dir() {
            return Err(CaptureError::CaptureNotFound(capture_dir.to_path_buf()));
        }
        let path = capture_dir.join(METADATA_FILE);
        if !path.is_file() {
            return Err(CaptureError::MetadataMissing(path));
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// An external full-token export. It may include generated tokens and
/// tokens flagged `deleted`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExport {
    pub tokens: Vec<PromptToken>,
}

impl TokenExport {
    pub fn load(path: &Path) -> Result<Self, CaptureError> {
        if !path.is_file() {
            return Err(CaptureError::ExportNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Resolve the token set for a capture: the export's tokens when an export is
/// given, otherwise the prompt tokens of `metadata.json`. The metadata file is
/// required either way.
pub fn load_token_set(capture_dir: &Path, export: Option<&Path>) -> Result<TokenSet, CaptureError> {
    let metadata = CaptureMetadata::load(capture_dir)?;

    let tokens = match export {
        Some(path) => {
            let export = TokenExport::load(path)?;
            tracing::info!(
                tokens = export.tokens.len(),
                export = %path.display(),
                "loaded tokens from export"
            );
            export.tokens
        }
        None => {
            tracing::info!(
                tokens = metadata.prompt_tokens.len(),
                "loaded prompt tokens from metadata"
            );
            metadata.prompt_tokens
        }
    };

    Ok(TokenSet::new(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const METADATA: &str = r#"{
        "model": "test-model",
        "prompt_tokens": [
            {"position": 0, "text": "<s>", "turn_id": 0, "sentence_id": 0, "message_role": "system"},
            {"position": 1, "text": "Hi", "turn_id": 1, "sentence_id": 0, "message_role": "user"}
        ]
    }"#;

    #[test]
    fn test_load_prompt_tokens() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(METADATA_FILE), METADATA).unwrap();

        let meta = CaptureMetadata::load(tmp.path()).unwrap();
        assert_eq!(meta.prompt_tokens.len(), 2);
        assert_eq!(meta.extra["model"], "test-model");

        let set = load_token_set(tmp.path(), None).unwrap();
        assert_eq!(set.positions().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_export_supersedes_and_drops_deleted() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(METADATA_FILE), METADATA).unwrap();
        let export = tmp.path().join("export.json");
        std::fs::write(
            &export,
            r#"{"tokens": [
                {"position": 0, "text": "<s>", "turn_id": 0, "sentence_id": 0, "message_role": "system"},
                {"position": 1, "text": "Hi", "turn_id": 1, "sentence_id": 0, "message_role": "user", "deleted": true},
                {"position": 2, "text": "Hello", "turn_id": 2, "sentence_id": 0, "message_role": "assistant"}
            ]}"#,
        )
        .unwrap();

        let set = load_token_set(tmp.path(), Some(&export)).unwrap();
        assert_eq!(set.positions().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_missing_capture_and_metadata_are_fatal() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            load_token_set(&tmp.path().join("nope"), None),
            Err(CaptureError::CaptureNotFound(_))
        ));
        assert!(matches!(
            load_token_set(tmp.path(), None),
            Err(CaptureError::MetadataMissing(_))
        ));
    }

    #[test]
    fn test_missing_export_is_fatal() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(METADATA_FILE), METADATA).unwrap();
        assert!(matches!(
            load_token_set(tmp.path(), Some(&tmp.path().join("missing.json"))),
            Err(CaptureError::ExportNotFound(_))
        ));
    }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use halo_core::model::{Attention, AttentionShape, GenerationStep};

use crate::error::CaptureError;

const META_SUFFIX: &str = "_meta.json";
const ATTN_SUFFIX: &str = "_attn.bin";

/// `token_<n>_meta.json`: the step envelope without its tensor.
#[derive(Debug, Serialize, Deserialize)]
pub struct SplitMeta {
    #[serde(default)]
    pub token_id: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub step: Option<u32>,
    #[serde(default)]
    pub attention_shape: Option<AttentionShape>,
}

/// Sibling `_attn.bin` path for a `_meta.json` path.
pub fn payload_path(meta_path: &Path) -> PathBuf {
    let name = meta_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(META_SUFFIX).unwrap_or(&name);
    meta_path.with_file_name(format!("{stem}{ATTN_SUFFIX}"))
}

pub fn read_record(meta_path: &Path, index: u32) -> Result<GenerationStep, CaptureError> {
    let meta: SplitMeta = serde_json::from_str(&std::fs::read_to_string(meta_path)?)?;
    let bin_path = payload_path(meta_path);

    let attention = match meta.attention_shape {
        Some(shape) if bin_path.is_file() => {
            let bytes = std::fs::read(&bin_path)?;
            let data = decode_f32_le(&bytes).ok_or(CaptureError::Truncated {
                path: bin_path,
                bytes: bytes.len(),
            })?;
            Some(Attention::new(shape, data)?)
        }
        _ => None,
    };

    Ok(GenerationStep {
        index,
        step: meta.step,
        token_id: meta.token_id,
        text: meta.text.unwrap_or_default(),
        attention,
    })
}

/// Decode raw little-endian `f32` values bit for bit. `None` if the byte
/// count is not a multiple of four.
pub fn decode_f32_le(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

pub fn encode_f32_le(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_meta(dir: &Path, index: u32, shape: Option<[usize; 3]>) -> PathBuf {
        let path = dir.join(format!("token_{index:05}_meta.json"));
        let json = serde_json::json!({
            "token_id": 7,
            "text": "hi",
            "step": index,
            "attention_shape": shape,
        });
        std::fs::write(&path, json.to_string()).unwrap();
        path
    }

    #[test]
    fn test_payload_path() {
        assert_eq!(
            payload_path(Path::new("/c/token_00004_meta.json")),
            PathBuf::from("/c/token_00004_attn.bin")
        );
    }

    #[test]
    fn test_decode_preserves_bits() {
        let values = [0.1f32, f32::MIN_POSITIVE, 1.0 / 3.0, -0.0];
        let decoded = decode_f32_le(&encode_f32_le(&values)).unwrap();
        for (a, b) in values.iter().zip(&decoded) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        assert!(decode_f32_le(&[0, 0, 0]).is_none());
    }

    #[test]
    fn test_read_split_record() {
        let tmp = TempDir::new().unwrap();
        let meta = write_meta(tmp.path(), 1, Some([1, 1, 3]));
        std::fs::write(payload_path(&meta), encode_f32_le(&[0.5, 0.3, 0.2])).unwrap();

        let step = read_record(&meta, 1).unwrap();
        assert_eq!(step.token_id, Some(7));
        assert_eq!(step.attention.unwrap().data(), &[0.5f32, 0.3, 0.2]);
    }

    #[test]
    fn test_missing_payload_is_inert() {
        let tmp = TempDir::new().unwrap();
        let meta = write_meta(tmp.path(), 0, Some([1, 1, 3]));
        assert!(read_record(&meta, 0).unwrap().is_inert());

        let no_shape = write_meta(tmp.path(), 1, None);
        std::fs::write(payload_path(&no_shape), encode_f32_le(&[1.0])).unwrap();
        assert!(read_record(&no_shape, 1).unwrap().is_inert());
    }

    #[test]
    fn test_length_mismatch_and_truncation_are_errors() {
        let tmp = TempDir::new().unwrap();
        let meta = write_meta(tmp.path(), 0, Some([2, 1, 3]));
        std::fs::write(payload_path(&meta), encode_f32_le(&[0.5, 0.3, 0.2])).unwrap();
        assert!(matches!(read_record(&meta, 0), Err(CaptureError::Core(_))));

        std::fs::write(payload_path(&meta), [0u8; 7]).unwrap();
        assert!(matches!(
            read_record(&meta, 0),
            Err(CaptureError::Truncated { bytes: 7, .. })
        ));
    }
}

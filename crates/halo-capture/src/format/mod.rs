pub mod legacy;
pub mod split;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use halo_core::model::GenerationStep;

use crate::error::CaptureError;

/// On-disk representation of a capture's step records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureFormat {
    /// `token_<n>.json` with the attention tensor embedded as JSON numbers.
    Legacy,
    /// `token_<n>_meta.json` plus a sibling `token_<n>_attn.bin` of raw
    /// little-endian `f32` values.
    Split,
}

impl CaptureFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Split => "split",
        }
    }

    /// File name of the record file for step `index`.
    pub fn record_file_name(&self, index: u32) -> String {
        match self {
            Self::Legacy => format!("token_{index:05}.json"),
            Self::Split => format!("token_{index:05}_meta.json"),
        }
    }

    /// Parse a step index out of a record file name of this format.
    pub fn parse_record_name(&self, name: &str) -> Option<u32> {
        let rest = name.strip_prefix("token_")?;
        let digits = match self {
            Self::Legacy => rest.strip_suffix(".json")?,
            Self::Split => rest.strip_suffix("_meta.json")?,
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl fmt::Display for CaptureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A step record discovered on disk, not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRef {
    pub index: u32,
    pub format: CaptureFormat,
    pub path: PathBuf,
}

impl RecordRef {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Read and normalize the record.
    pub fn read(&self) -> Result<GenerationStep, CaptureError> {
        match self.format {
            CaptureFormat::Legacy => legacy::read_record(&self.path, self.index),
            CaptureFormat::Split => split::read_record(&self.path, self.index),
        }
    }
}

/// Split records win whenever at least one `_meta.json` file exists.
pub fn detect_format(capture_dir: &Path) -> Result<CaptureFormat, CaptureError> {
    for entry in std::fs::read_dir(capture_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if CaptureFormat::Split
            .parse_record_name(&name.to_string_lossy())
            .is_some()
        {
            return Ok(CaptureFormat::Split);
        }
    }
    Ok(CaptureFormat::Legacy)
}

/// List the records of `format` in ascending step-index order.
pub fn list_records(
    capture_dir: &Path,
    format: CaptureFormat,
) -> Result<Vec<RecordRef>, CaptureError> {
    let mut records = Vec::new();
    for entry in std::fs::read_dir(capture_dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(index) = format.parse_record_name(&entry.file_name().to_string_lossy()) else {
            continue;
        };
        if path.is_file() {
            records.push(RecordRef {
                index,
                format,
                path,
            });
        }
    }
    records.sort_by_key(|r| r.index);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_record_names() {
        assert_eq!(
            CaptureFormat::Legacy.parse_record_name("token_00012.json"),
            Some(12)
        );
        assert_eq!(
            CaptureFormat::Legacy.parse_record_name("token_00012_meta.json"),
            None
        );
        assert_eq!(
            CaptureFormat::Split.parse_record_name("token_00012_meta.json"),
            Some(12)
        );
        assert_eq!(
            CaptureFormat::Split.parse_record_name("token_00012_attn.bin"),
            None
        );
        assert_eq!(CaptureFormat::Legacy.parse_record_name("metadata.json"), None);
        assert_eq!(CaptureFormat::Legacy.parse_record_name("token_.json"), None);
    }

    #[test]
    fn test_record_file_name_is_zero_padded() {
        assert_eq!(CaptureFormat::Legacy.record_file_name(7), "token_00007.json");
        assert_eq!(
            CaptureFormat::Split.record_file_name(123456),
            "token_123456_meta.json"
        );
    }

    #[test]
    fn test_list_orders_numerically_not_lexically() {
        let tmp = TempDir::new().unwrap();
        for name in ["token_10.json", "token_9.json", "token_00002.json", "notes.txt"] {
            std::fs::write(tmp.path().join(name), "{}").unwrap();
        }
        let records = list_records(tmp.path(), CaptureFormat::Legacy).unwrap();
        let indices: Vec<u32> = records.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![2, 9, 10]);
    }

    #[test]
    fn test_detect_prefers_split() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("token_00000.json"), "{}").unwrap();
        assert_eq!(detect_format(tmp.path()).unwrap(), CaptureFormat::Legacy);

        std::fs::write(tmp.path().join("token_00000_meta.json"), "{}").unwrap();
        assert_eq!(detect_format(tmp.path()).unwrap(), CaptureFormat::Split);
    }
}

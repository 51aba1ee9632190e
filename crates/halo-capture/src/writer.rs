use std::path::{Path, PathBuf};

use tracing::info;

use halo_core::model::GenerationStep;

use crate::error::CaptureError;
use crate::format::legacy::{LegacyAttention, LegacyRecord};
use crate::format::split::{encode_f32_le, payload_path, SplitMeta};
use crate::format::CaptureFormat;
use crate::loader::{LoadSummary, StepLoader};
use crate::metadata::{CaptureMetadata, METADATA_FILE};

/// Writes a capture directory in either record format.
#[derive(Debug, Clone)]
pub struct CaptureWriter {
    dir: PathBuf,
    format: CaptureFormat,
}

impl CaptureWriter {
    pub fn create(dir: &Path, format: CaptureFormat) -> Result<Self, CaptureError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            format,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write_metadata(&self, metadata: &CaptureMetadata) -> Result<(), CaptureError> {
        let json = serde_json::to_string_pretty(metadata)?;
        std::fs::write(self.dir.join(METADATA_FILE), json)?;
        Ok(())
    }

    /// Write one step under its own index. Returns the record file path.
    pub fn write_step(&self, step: &GenerationStep) -> Result<PathBuf, CaptureError> {
        let path = self.dir.join(self.format.record_file_name(step.index));
        match self.format {
            CaptureFormat::Legacy => {
                let record = LegacyRecord {
                    token_id: step.token_id,
                    text: Some(step.text.clone()),
                    step: step.step,
                    attention: step.attention.as_ref().map(|a| LegacyAttention {
                        shape: Some(a.shape()),
                        data: a.data().to_vec(),
                    }),
                };
                std::fs::write(&path, serde_json::to_vec(&record)?)?;
            }
            CaptureFormat::Split => {
                let meta = SplitMeta {
                    token_id: step.token_id,
                    text: Some(step.text.clone()),
                    step: step.step,
                    attention_shape: step.attention.as_ref().map(|a| a.shape()),
                };
                std::fs::write(&path, serde_json::to_vec(&meta)?)?;
                if let Some(attention) = &step.attention {
                    std::fs::write(payload_path(&path), encode_f32_le(attention.data()))?;
                }
            }
        }
        Ok(path)
    }
}

/// Copy a capture into `dest` using `format`. `metadata.json` is validated,
/// then copied byte for byte; malformed source records are skipped the same
/// way scoring skips them.
pub fn convert_capture(
    source: &StepLoader,
    dest: &Path,
    format: CaptureFormat,
) -> Result<LoadSummary, CaptureError> {
    CaptureMetadata::load(source.capture_dir())?;
    let writer = CaptureWriter::create(dest, format)?;
    std::fs::copy(
        source.capture_dir().join(METADATA_FILE),
        writer.dir().join(METADATA_FILE),
    )?;

    let mut steps = source.steps()?;
    for step in steps.by_ref() {
        writer.write_step(&step)?;
    }

    let summary = steps.summary();
    info!(
        from = %source.format(),
        to = %format,
        written = summary.loaded + summary.inert,
        skipped = summary.skipped,
        "converted capture"
    );
    Ok(summary)
}

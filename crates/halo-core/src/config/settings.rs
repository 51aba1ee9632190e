use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Run-wide settings, read from an optional JSON config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HaloConfig {
    /// Reports land in `<results_dir>/<capture name>/`.
    pub results_dir: PathBuf,
    /// Log progress every N processed steps (0 disables).
    pub progress_interval: usize,
    /// Ranking depth used by the comparison agreement analysis.
    pub top_n: usize,
    /// Sentences whose peak score exceeds this are kept when pruning.
    pub keep_above: f64,
}

impl Default for HaloConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("test_results"),
            progress_interval: 50,
            top_n: 10,
            keep_above: 0.0,
        }
    }
}

impl HaloConfig {
    /// Read config from a JSON file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, CoreError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.keep_above.is_finite() {
            return Err(CoreError::Config("keep_above must be finite".into()));
        }
        if self.top_n == 0 {
            return Err(CoreError::Config("top_n must be at least 1".into()));
        }
        Ok(())
    }

    /// Directory holding the reports for one capture.
    pub fn capture_results_dir(&self, capture_dir: &Path) -> PathBuf {
        let name = capture_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "capture".to_string());
        self.results_dir.join(name)
    }
}

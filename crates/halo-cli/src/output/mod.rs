pub mod format;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use halo_scoring::StrategyReport;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Write `<key>.md` and `<key>.json` for one report into `dir`.
pub fn write_report(
    dir: &Path,
    report: &StrategyReport,
    generated_at: DateTime<Utc>,
) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create results directory {}", dir.display()))?;

    let md_path = dir.join(format!("{}.md", report.metadata.key));
    std::fs::write(&md_path, format::report_markdown(report, generated_at))
        .with_context(|| format!("Failed to write {}", md_path.display()))?;

    let json_path = dir.join(format!("{}.json", report.metadata.key));
    let json = serde_json::to_string_pretty(&format::report_json(report, generated_at))?;
    std::fs::write(&json_path, json)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;

    tracing::info!(md = %md_path.display(), json = %json_path.display(), "exported report");
    Ok((md_path, json_path))
}

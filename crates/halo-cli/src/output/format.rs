use chrono::{DateTime, Utc};

use halo_core::model::{ScoreStats, ScoredSentence};
use halo_scoring::{PruningPlan, RankingComparison, StrategyReport};

const RULE: &str = "================================================================================";

/// Rows in the comparison rank table.
pub const RANK_TABLE_ROWS: usize = 20;
/// Sentences listed per strategy in the comparison detail section.
pub const DETAIL_ROWS: usize = 30;

fn capture_name(report: &StrategyReport) -> String {
    report
        .metadata
        .capture_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| report.metadata.capture_dir.display().to_string())
}

fn parameter_lines(out: &mut String, parameters: &serde_json::Value) {
    if let Some(map) = parameters.as_object() {
        for (key, value) in map {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out.push_str(&format!("- `{key}`: {value}\n"));
        }
    }
}

fn sentence_block(out: &mut String, rank: usize, s: &ScoredSentence, with_role: bool) {
    out.push_str(&format!(
        "**Rank {rank} - Turn {}, Sentence {}** (Score: {:.2}, {} tokens",
        s.turn_id, s.sentence_id, s.peak_score, s.token_count
    ));
    if with_role {
        out.push_str(&format!(", {}", s.role));
    }
    out.push_str(&format!(")\n```\n{}\n```\n\n", s.text));
}

/// Human-readable report for one strategy run.
pub fn report_markdown(report: &StrategyReport, generated_at: DateTime<Utc>) -> String {
    let m = &report.metadata;
    let mut out = String::new();

    out.push_str(&format!("# {} - Results\n\n", m.strategy));
    out.push_str(&format!("**Capture:** `{}`\n\n", capture_name(report)));
    out.push_str(&format!(
        "**Generated:** {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    out.push_str("**Parameters:**\n");
    parameter_lines(&mut out, &m.parameters);

    out.push_str("\n**Statistics:**\n");
    out.push_str(&format!("- Total sentences: {}\n", m.total_sentences));
    out.push_str(&format!("- Total tokens: {}\n", m.total_tokens));
    match &m.score_stats {
        Some(stats) => {
            out.push_str(&format!("- Score range: {:.2} to {:.2}\n", stats.min, stats.max));
            out.push_str(&format!("- Mean score: {:.2}\n", stats.mean));
            out.push_str(&format!("- Median score: {:.2}\n", stats.median));
        }
        None => out.push_str("- No scored tokens\n"),
    }
    out.push_str(&format!(
        "- Steps: {} loaded, {} inert, {} skipped ({} format)\n",
        m.load.loaded, m.load.inert, m.load.skipped, m.load.format
    ));

    out.push_str(&format!("\n{RULE}\n## Sentence Rankings (Highest to Lowest)\n{RULE}\n\n"));
    for (i, sentence) in report.sentences.iter().enumerate() {
        sentence_block(&mut out, i + 1, sentence, true);
    }
    out
}

/// Machine-readable report: `{metadata, sentences}`.
pub fn report_json(report: &StrategyReport, generated_at: DateTime<Utc>) -> serde_json::Value {
    let mut value = serde_json::to_value(report).unwrap_or(serde_json::Value::Null);
    if let Some(meta) = value.get_mut("metadata").and_then(|m| m.as_object_mut()) {
        meta.insert(
            "generated_at".to_string(),
            serde_json::Value::String(generated_at.to_rfc3339()),
        );
    }
    value
}

/// One-line summary printed after a strategy run.
pub fn run_summary_text(report: &StrategyReport) -> String {
    let m = &report.metadata;
    let mut out = format!(
        "{}: {} tokens, {} sentences",
        m.strategy, m.total_tokens, m.total_sentences
    );
    if let Some(ScoreStats { min, max, mean, .. }) = m.score_stats {
        out.push_str(&format!(", scores {min:.2}..{max:.2} (mean {mean:.2})"));
    }
    if m.load.skipped > 0 {
        out.push_str(&format!(", {} records skipped", m.load.skipped));
    }
    out
}

/// Side-by-side report for several strategies over one capture.
pub fn comparison_markdown(reports: &[StrategyReport], comparison: &RankingComparison) -> String {
    let mut out = String::new();
    out.push_str("# Strategy Comparison Report\n\n");

    let labels: Vec<&str> = reports.iter().map(|r| r.kind.label()).collect();
    out.push_str(&format!("**Strategies compared:** {}\n\n", labels.join(", ")));
    if let Some(first) = reports.first() {
        out.push_str(&format!("**Capture:** `{}`\n\n", capture_name(first)));
    }

    out.push_str("## Strategy Parameters\n\n");
    for report in reports {
        out.push_str(&format!("**{}:**\n", report.kind.label()));
        parameter_lines(&mut out, &report.metadata.parameters);
        out.push('\n');
    }

    out.push_str("## Score Statistics\n\n");
    out.push_str("| Strategy | Min | Max | Mean | Median |\n");
    out.push_str("|----------|-----|-----|------|--------|\n");
    for report in reports {
        match &report.metadata.score_stats {
            Some(s) => {
                out.push_str(&format!(
                    "| {} | {:.2} | {:.2} | {:.2} | {:.2} |\n",
                    report.kind.label(),
                    s.min,
                    s.max,
                    s.mean,
                    s.median
                ));
            }
            None => {
                out.push_str(&format!("| {} | - | - | - | - |\n", report.kind.label()));
            }
        }
    }

    out.push_str(&format!("\n## Top {RANK_TABLE_ROWS} Sentence Rankings\n\n"));
    out.push_str(&format!("| Rank | {} |\n", labels.join(" | ")));
    out.push_str(&format!("|------|{}|\n", vec!["---"; labels.len()].join("|")));
    for rank in 0..RANK_TABLE_ROWS {
        let cells: Vec<String> = reports
            .iter()
            .map(|r| match r.sentences.get(rank) {
                Some(s) => format!("T{}:S{} ({:.1})", s.turn_id, s.sentence_id, s.peak_score),
                None => "-".to_string(),
            })
            .collect();
        out.push_str(&format!("| {} | {} |\n", rank + 1, cells.join(" | ")));
    }

    out.push_str(&format!("\n{RULE}\n## Detailed Rankings by Strategy\n{RULE}\n\n"));
    for report in reports {
        out.push_str(&format!("### {}\n\n", report.kind.label()));
        for (i, sentence) in report.sentences.iter().take(DETAIL_ROWS).enumerate() {
            sentence_block(&mut out, i + 1, sentence, false);
        }
    }

    if reports.len() > 1 {
        out.push_str(&format!("\n{RULE}\n## Agreement Analysis\n{RULE}\n\n"));
        out.push_str(&format!(
            "**Sentences in ALL strategies' top {}:**\n\n",
            comparison.top_n
        ));
        if comparison.common.is_empty() {
            out.push_str("None - strategies disagree significantly!\n");
        }
        for s in &comparison.common {
            out.push_str(&format!(
                "- Turn {}, Sentence {}: `{}`\n",
                s.turn_id, s.sentence_id, s.preview
            ));
        }

        out.push_str(&format!("\n**Unique to each strategy's top {}:**\n\n", comparison.top_n));
        for (label, refs) in &comparison.unique {
            out.push_str(&format!("**{label} only:**\n"));
            if refs.is_empty() {
                out.push_str("None\n");
            }
            for s in refs {
                out.push_str(&format!(
                    "- Turn {}, Sentence {}: `{}`\n",
                    s.turn_id, s.sentence_id, s.preview
                ));
            }
            out.push('\n');
        }
    }
    out
}

fn article_section(out: &mut String, sentences: &[ScoredSentence]) {
    let mut current_turn = None;
    for s in sentences {
        if current_turn != Some(s.turn_id) {
            if current_turn.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", s.role.as_str().to_uppercase()));
            current_turn = Some(s.turn_id);
        }
        out.push_str(&s.text);
    }
}

/// The pruned article: what the model keeps seeing and what gets dropped.
pub fn pruning_text(plan: &PruningPlan, report: &StrategyReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{RULE}\nPRUNING ANALYSIS ({})\n{RULE}\n", report.metadata.strategy));
    out.push_str(&format!("Total sentences: {}\n", plan.total_sentences()));
    out.push_str(&format!("Total tokens: {}\n", plan.total_tokens()));
    out.push_str(&format!(
        "\nKEPT (peak > {}): {} sentences, {} tokens ({:.1}%)\n",
        plan.keep_above,
        plan.kept.len(),
        plan.kept_tokens,
        plan.kept_percent()
    ));
    out.push_str(&format!(
        "PRUNED (peak <= {}): {} sentences, {} tokens ({:.1}%)\n",
        plan.keep_above,
        plan.pruned.len(),
        plan.pruned_tokens,
        plan.reduction_percent()
    ));
    out.push_str(&format!(
        "\nGeneration steps analyzed: {}\n{RULE}\n",
        report.metadata.load.loaded
    ));

    out.push_str(&format!("\n{RULE}\nAFTER PRUNING - WHAT THE MODEL SEES:\n{RULE}\n\n"));
    article_section(&mut out, &plan.kept);

    out.push_str(&format!("\n\n{RULE}\nWHAT GOT PRUNED:\n{RULE}\n\n"));
    article_section(&mut out, &plan.pruned);

    out.push_str(&format!("\n\n{RULE}\nSUMMARY\n{RULE}\n"));
    out.push_str(&format!(
        "Compression ratio: {:.1}% reduction\n",
        plan.reduction_percent()
    ));
    out.push_str(&format!("Context saved: {} tokens\n{RULE}\n", plan.pruned_tokens));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_capture::{CaptureFormat, LoadSummary};
    use halo_core::model::{MessageRole, ScoreMap, SentenceKey, SentenceToken};
    use halo_scoring::{compare_rankings, ReportMetadata, StrategyKind};

    fn sentence(turn_id: u32, sentence_id: u32, text: &str, peak: f64) -> ScoredSentence {
        ScoredSentence::new(
            SentenceKey {
                turn_id,
                sentence_id,
                role: MessageRole::User,
            },
            vec![SentenceToken {
                position: (turn_id * 10 + sentence_id) as usize,
                text: text.to_string(),
                score: peak,
            }],
        )
        .unwrap()
    }

    fn report(kind: StrategyKind, sentences: Vec<ScoredSentence>) -> StrategyReport {
        StrategyReport {
            metadata: ReportMetadata {
                strategy: kind.name().to_string(),
                key: kind.key().to_string(),
                parameters: serde_json::json!({"min_distance": 50}),
                capture_dir: "/captures/run_1".into(),
                total_sentences: sentences.len(),
                total_tokens: sentences.len(),
                score_stats: ScoreStats::from_values(sentences.iter().map(|s| s.peak_score)),
                load: LoadSummary::new(CaptureFormat::Legacy),
            },
            kind,
            scores: ScoreMap::default(),
            sentences,
        }
    }

    #[test]
    fn test_report_markdown_sections() {
        let r = report(
            StrategyKind::Voting,
            vec![sentence(0, 1, "Bright.", 9.0), sentence(0, 0, "Dim.", 1.0)],
        );
        let md = report_markdown(&r, Utc::now());
        assert!(md.starts_with("# Rolling Mean Voting - Results"));
        assert!(md.contains("**Capture:** `run_1`"));
        assert!(md.contains("- `min_distance`: 50"));
        assert!(md.contains("- Score range: 1.00 to 9.00"));
        assert!(md.contains("**Rank 1 - Turn 0, Sentence 1** (Score: 9.00, 1 tokens, user)"));
    }

    #[test]
    fn test_report_json_has_timestamp_and_no_raw_scores() {
        let r = report(StrategyKind::Cumulative, vec![sentence(0, 0, "x", 0.5)]);
        let json = report_json(&r, Utc::now());
        assert!(json["metadata"]["generated_at"].is_string());
        assert_eq!(json["metadata"]["key"], "cumulative_strategy");
        assert_eq!(json["sentences"].as_array().unwrap().len(), 1);
        assert!(json.get("scores").is_none());
    }

    #[test]
    fn test_comparison_markdown() {
        let a = report(
            StrategyKind::Voting,
            vec![sentence(0, 0, "shared", 5.0), sentence(0, 1, "only voting", 4.0)],
        );
        let b = report(
            StrategyKind::SymmetricVoting,
            vec![sentence(0, 0, "shared", 260.0), sentence(1, 0, "only symmetric", 258.0)],
        );
        let cmp = compare_rankings(
            &[
                (a.kind.label(), a.sentences.as_slice()),
                (b.kind.label(), b.sentences.as_slice()),
            ],
            10,
        );
        let md = comparison_markdown(&[a, b], &cmp);
        assert!(md.contains("**Strategies compared:** Voting, Symmetric Voting"));
        assert!(md.contains("| 1 | T0:S0 (5.0) | T0:S0 (260.0) |"));
        assert!(md.contains("| 3 | - | - |"));
        assert!(md.contains("- Turn 0, Sentence 0: `shared`"));
        assert!(md.contains("**Voting only:**\n- Turn 0, Sentence 1: `only voting`"));
    }

    #[test]
    fn test_pruning_text() {
        let r = report(
            StrategyKind::Voting,
            vec![sentence(0, 1, "Kept. ", 3.0), sentence(0, 0, "Gone. ", 0.0)],
        );
        let plan = PruningPlan::from_sentences(&r.sentences, 0.0);
        let text = pruning_text(&plan, &r);
        assert!(text.contains("KEPT (peak > 0): 1 sentences, 1 tokens (50.0%)"));
        assert!(text.contains("[USER]\nKept. "));
        assert!(text.contains("Compression ratio: 50.0% reduction"));
    }
}

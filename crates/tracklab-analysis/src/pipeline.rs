//! The daily-analysis pipeline: transcript → prompt → Ollama → report → upsert.

use tracklab_core::error::Result;
use tracklab_core::types::{AnalysisReport, DailySummary, WorkLog};
use tracklab_db::Database;

use crate::ollama::OllamaClient;
use crate::parse::parse_reply;

/// Longest raw-reply prefix kept as the summary of a degraded result.
const DEGRADED_SUMMARY_CHARS: usize = 1000;

/// Format work logs into the transcript embedded in the prompt. One block
/// per entry, deterministic, human-readable.
pub fn format_transcript(logs: &[WorkLog]) -> String {
    let blocks: Vec<String> = logs
        .iter()
        .map(|log| {
            let project = log.project_name.as_deref().unwrap_or("Unknown Project");
            let activity = log.activity_name.as_deref().unwrap_or("Ad-hoc / Unplanned");
            let when = log.timestamp.get(..16).unwrap_or(&log.timestamp);
            format!(
                "  {when}  |  {project} → {activity}\n    Comment:  {}\n    Duration: {} min",
                log.comment, log.duration_minutes
            )
        })
        .collect();
    blocks.join("\n\n")
}

/// Compose the full analysis prompt for a date.
pub fn build_prompt(date: &str, logs: &[WorkLog]) -> String {
    format!(
        "You are analyzing a researcher's daily work log. Today is {date}.\n\
         \n\
         Work Log:\n\
         {transcript}\n\
         \n\
         Analyze the work log and respond with ONLY valid JSON — no markdown fences, \
         no preamble, no text outside the JSON object.\n\
         \n\
         JSON format:\n\
         {{\n\
         \x20 \"summary\": \"2-3 sentence overview of today's accomplishments\",\n\
         \x20 \"blockers\": [\n\
         \x20   {{\"issue\": \"description\", \"frequency\": 1, \"suggestion\": \"how to resolve\"}}\n\
         \x20 ],\n\
         \x20 \"highlights\": [\n\
         \x20   \"key accomplishment 1\",\n\
         \x20   \"key accomplishment 2\"\n\
         \x20 ],\n\
         \x20 \"suggestions\": [\n\
         \x20   {{\"project\": \"project name\", \"next_step\": \"recommended action\", \"rationale\": \"why\"}}\n\
         \x20 ],\n\
         \x20 \"patterns\": [\n\
         \x20   \"observed work pattern 1\"\n\
         \x20 ]\n\
         }}\n",
        transcript = format_transcript(logs),
    )
}

/// A structurally valid stand-in for a reply that could not be parsed.
fn degraded(raw: &str) -> AnalysisReport {
    let summary = if raw.is_empty() {
        "Analysis complete (unparseable response).".to_string()
    } else {
        raw.chars().take(DEGRADED_SUMMARY_CHARS).collect()
    };
    AnalysisReport::empty(summary)
}

/// Analyze one day's logs.
///
/// Disabled analysis and an empty log set both short-circuit to an
/// empty-but-valid report. A reply that arrives but cannot be parsed
/// degrades to a raw-text summary. Only transport failures return `Err`.
pub async fn analyze(
    client: &OllamaClient,
    date: &str,
    logs: &[WorkLog],
    enabled: bool,
) -> Result<AnalysisReport> {
    if !enabled {
        tracing::info!("Ollama analysis disabled — skipping.");
        return Ok(AnalysisReport::empty("Analysis is disabled in configuration."));
    }
    if logs.is_empty() {
        return Ok(AnalysisReport::empty(format!("No activity logs for {date}.")));
    }

    let prompt = build_prompt(date, logs);
    tracing::info!(
        "Sending {} log(s) to Ollama ({}) for date {date}",
        logs.len(),
        client.model()
    );

    let raw = client.generate(&prompt).await?;
    tracing::debug!("Raw Ollama response: {} chars", raw.len());

    match parse_reply(&raw) {
        Some(report) => {
            tracing::info!("Ollama analysis for {date} completed successfully.");
            Ok(report)
        }
        None => {
            tracing::warn!("Could not parse Ollama JSON for {date} — storing raw summary.");
            Ok(degraded(&raw))
        }
    }
}

/// Load the date's logs, analyze them, and upsert the result keyed by date.
/// Transport failures propagate so the caller can decide what record to
/// leave behind.
pub async fn run_daily_analysis(
    db: &Database,
    client: &OllamaClient,
    date: &str,
    enabled: bool,
) -> Result<DailySummary> {
    let logs = db.list_work_logs(Some(date), None, None)?;
    let report = analyze(client, date, &logs, enabled).await?;
    let plan_id = db.active_plan()?.map(|p| p.id);
    db.upsert_daily_summary(plan_id, date, &report)
}

//! Backend transcript retrieval: `interview report`.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

use interview_orchestrator::api::{HttpSessionApi, ReportResponse, SessionApi, SessionId};
use interview_orchestrator::config::InterviewConfig;

pub async fn cmd_report(
    config: &InterviewConfig,
    session_id: &str,
    output: Option<&Path>,
) -> Result<()> {
    let session_id = session_id.trim();
    if session_id.is_empty() {
        anyhow::bail!("Session id must not be empty");
    }

    let api = HttpSessionApi::new(&config.base_url(), config.request_timeout())
        .context("Failed to create backend client")?;
    let report = api
        .fetch_report(&SessionId::new(session_id))
        .await
        .with_context(|| format!("Failed to fetch report for session {}", session_id))?;

    let text = render_report(session_id, &report);
    match output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("Report written to {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Plain-text rendering of the backend's view of a session.
pub fn render_report(session_id: &str, report: &ReportResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Session: {}", session_id);
    let status = if report.done { "complete" } else { "in progress" };
    let _ = writeln!(out, "Status: {}", status);
    if let Some(error) = &report.error {
        let _ = writeln!(out, "Error: {}", error);
    }
    let _ = writeln!(out);

    if report.transcript.is_empty() {
        let _ = writeln!(out, "No answers recorded yet.");
    }
    for (i, entry) in report.transcript.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, entry.question);
        let _ = writeln!(out, "   Answer: {}", entry.answer);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_orchestrator::api::TranscriptEntry;

    #[test]
    fn test_render_report_lists_entries() {
        let report = ReportResponse {
            done: true,
            error: None,
            transcript: vec![
                TranscriptEntry {
                    question: "Introduce yourself".into(),
                    answer: "I audit ledgers".into(),
                },
                TranscriptEntry {
                    question: "Explain accruals".into(),
                    answer: "[skipped]".into(),
                },
            ],
        };
        let text = render_report("abc123", &report);
        assert!(text.starts_with("Session: abc123\nStatus: complete\n"));
        assert!(text.contains("2. Explain accruals\n   Answer: [skipped]"));
    }

    #[test]
    fn test_render_report_shows_error_and_empty_state() {
        let report = ReportResponse {
            done: false,
            error: Some("generation failed".into()),
            transcript: Vec::new(),
        };
        let text = render_report("abc123", &report);
        assert!(text.contains("Status: in progress"));
        assert!(text.contains("Error: generation failed"));
        assert!(text.contains("No answers recorded yet."));
    }
}

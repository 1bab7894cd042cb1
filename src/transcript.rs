//! Plain-text interview report built from the local answer log.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::path::Path;

use crate::phase::{Answer, Phase, PhaseMachine, SlotKey};
use crate::session::Session;

/// One question position and what was recorded for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptItem {
    pub phase: Phase,
    pub index: usize,
    pub question: Option<String>,
    pub answer: Option<Answer>,
}

/// A rendered-on-demand report of one session.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub role: String,
    pub candidate_name: Option<String>,
    pub session_id: String,
    pub generated_at: DateTime<Utc>,
    pub phase: Phase,
    pub items: Vec<TranscriptItem>,
}

impl Transcript {
    pub fn from_machine(
        session: &Session,
        machine: &PhaseMachine,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let items = Phase::QUESTIONED
            .iter()
            .flat_map(|&phase| {
                (0..phase.target_count()).map(move |index| (phase, index))
            })
            .map(|(phase, index)| {
                let key = SlotKey::new(phase, index);
                TranscriptItem {
                    phase,
                    index,
                    question: machine.slots().question(key).map(str::to_string),
                    answer: machine.answers().get(key).cloned(),
                }
            })
            .collect();

        Self {
            role: session.role.clone(),
            candidate_name: session.candidate_name.clone(),
            session_id: session.id.to_string(),
            generated_at,
            phase: machine.phase(),
            items,
        }
    }

    /// Number of answered (including skipped) slots.
    pub fn answered(&self) -> usize {
        self.items.iter().filter(|i| i.answer.is_some()).count()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "INTERVIEW REPORT");
        let _ = writeln!(out, "================");
        let _ = writeln!(out, "Role: {}", self.role);
        let _ = writeln!(
            out,
            "Candidate: {}",
            self.candidate_name.as_deref().unwrap_or("Anonymous")
        );
        let _ = writeln!(out, "Session: {}", self.session_id);
        let _ = writeln!(out, "Date: {}", self.generated_at.format("%Y-%m-%d %H:%M UTC"));
        let _ = writeln!(
            out,
            "Phase reached: {} ({}/{})",
            self.phase.label(),
            self.phase.number(),
            Phase::ALL.len()
        );

        for phase in Phase::QUESTIONED {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", section_title(phase));
            let _ = writeln!(out, "{}", "-".repeat(section_title(phase).len()));
            for item in self.items.iter().filter(|i| i.phase == phase) {
                let _ = writeln!(
                    out,
                    "{}. {}",
                    item.index + 1,
                    item.question.as_deref().unwrap_or("(question not yet asked)")
                );
                let answer = item
                    .answer
                    .as_ref()
                    .map(Answer::as_str)
                    .unwrap_or("Not answered");
                let _ = writeln!(out, "   Answer: {}", answer);
            }
        }
        out
    }

    /// `interview_<role>_<date>.txt`, with the role reduced to filename-safe characters.
    pub fn default_file_name(&self) -> String {
        let role: String = self
            .role
            .trim()
            .chars()
            .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        let role = role.trim_matches('_');
        let role = if role.is_empty() { "interview" } else { role };
        format!(
            "interview_{}_{}.txt",
            role,
            self.generated_at.format("%Y-%m-%d")
        )
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create directory {}", parent.display())
            })?;
        }
        std::fs::write(path, self.render())
            .with_context(|| format!("Failed to write transcript to {}", path.display()))
    }
}

fn section_title(phase: Phase) -> &'static str {
    match phase {
        Phase::Intro => "INTRODUCTION",
        Phase::Technical => "TECHNICAL QUESTIONS",
        Phase::SoftSkills => "SOFT SKILLS QUESTIONS",
        Phase::Conclusion => "CONCLUSION",
    }
}

impl std::fmt::Display for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

//! Session orchestration.
//!
//! [`Orchestrator`] is the composition root: it owns the session id, the
//! phase machine, the pending question and the in-flight flag, and sequences
//! start → fetch → answer → submit → advance → fetch until conclusion.

mod orchestrator;

pub use orchestrator::Orchestrator;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::SessionId;
use crate::phase::Phase;

/// One candidate's run, created on a successful start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub role: String,
    pub candidate_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A question handed to the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveredQuestion {
    pub phase: Phase,
    pub index: usize,
    pub text: String,
}

/// Why an operation was a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    NoConsent,
    Busy,
    NoSession,
    NoPendingQuestion,
    QuestionPending,
    Concluded,
}

impl std::fmt::Display for Ignored {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Ignored::NoConsent => "consent is required to start the interview",
            Ignored::Busy => "another operation is still in progress",
            Ignored::NoSession => "no interview has been started",
            Ignored::NoPendingQuestion => "there is no question to answer yet",
            Ignored::QuestionPending => "a question is already waiting for an answer",
            Ignored::Concluded => "the interview has concluded",
        };
        f.write_str(msg)
    }
}

/// What an orchestrator operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A new question is pending.
    Question(DeliveredQuestion),
    /// The interview reached `Conclusion`.
    Concluded,
    /// Guard rejected the call; nothing was sent.
    Ignored(Ignored),
    /// A restart happened while the call was outstanding; its result was dropped.
    Discarded,
}

/// Owned view of the orchestrator's state for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub session: Option<Session>,
    pub phase: Phase,
    pub index: usize,
    pub phase_number: u8,
    pub progress: u8,
    pub pending_question: Option<String>,
    pub busy: bool,
    pub last_error: Option<String>,
    pub answered: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_messages_are_distinct() {
        let all = [
            Ignored::NoConsent,
            Ignored::Busy,
            Ignored::NoSession,
            Ignored::NoPendingQuestion,
            Ignored::QuestionPending,
            Ignored::Concluded,
        ];
        let mut messages: Vec<String> = all.iter().map(|i| i.to_string()).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), all.len());
    }
}

//! Question polling: classify one backend poll into an [`Outcome`].
//!
//! `retry` holds the bounded loop that repeats polls; the orchestrator
//! combines the two with its own staleness and duplicate checks.

pub mod retry;

pub use retry::{Exhausted, PollStep, RetryPolicy, poll_until};

use crate::api::{QuestionResponse, SessionApi, SessionId};

/// Message used when the backend reports an error without one.
pub const DEFAULT_BACKEND_ERROR: &str = "unknown backend error";

/// Classification of a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A question with non-empty text.
    Question(String),
    /// Not ready yet.
    Waiting,
    /// The backend has concluded the interview.
    Done,
    /// Backend-reported or transport failure.
    Error(String),
}

impl Outcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Question(_) => "question",
            Outcome::Waiting => "waiting",
            Outcome::Done => "done",
            Outcome::Error(_) => "error",
        }
    }
}

impl From<QuestionResponse> for Outcome {
    fn from(resp: QuestionResponse) -> Self {
        match resp {
            QuestionResponse::Waiting => Outcome::Waiting,
            // A question status without usable text is treated as not ready.
            QuestionResponse::Question { question } => match question {
                Some(text) if !text.trim().is_empty() => Outcome::Question(text),
                _ => Outcome::Waiting,
            },
            QuestionResponse::Done => Outcome::Done,
            QuestionResponse::Error { message } => Outcome::Error(
                message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_BACKEND_ERROR.to_string()),
            ),
        }
    }
}

/// Single-shot question fetcher over any [`SessionApi`].
#[derive(Debug, Clone)]
pub struct PollingClient<A> {
    api: A,
}

impl<A: SessionApi> PollingClient<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Poll once. Transport and decode failures become `Outcome::Error`.
    pub async fn fetch_next_question(&self, session_id: &SessionId) -> Outcome {
        match self.api.fetch_question(session_id).await {
            Ok(resp) => {
                let outcome = Outcome::from(resp);
                tracing::trace!(session = %session_id, outcome = outcome.kind(), "polled question");
                outcome
            }
            Err(e) => {
                tracing::warn!(session = %session_id, error = %e, "question poll failed");
                Outcome::Error(e.to_string())
            }
        }
    }
}

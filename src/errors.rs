//! Typed error hierarchy for the interview orchestrator.
//!
//! Three enums cover the three layers:
//! - `ApiError`: a single call to the backend session API failed
//! - `PhaseError`: the phase state machine rejected an operation
//! - `SessionError`: orchestrator-level failures, surfaced to the candidate

use thiserror::Error;

use crate::phase::Phase;

/// Errors from one request against the backend session API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid backend base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Backend returned HTTP {status} for {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    #[error("Backend did not acknowledge the answer for session {session_id}")]
    NotAcknowledged { session_id: String },
}

/// Errors from the phase state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("Invalid phase transition from {from} to {to}")]
    InvalidTransition { from: Phase, to: Phase },

    #[error("The interview has concluded; no further questions or answers are accepted")]
    Concluded,

    #[error("Phase {phase} is not accessible yet")]
    Inaccessible { phase: Phase },

    #[error("Unknown phase '{0}'. Valid values: intro, technical, soft-skills, conclusion")]
    UnknownPhase(String),
}

/// Errors surfaced at the orchestrator boundary.
///
/// The `Display` output is the message shown to the candidate.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Could not start the interview: {0}")]
    StartFailure(#[source] ApiError),

    #[error("No new question after {attempts} attempts; the interviewer may still be preparing it")]
    PollTimeout { attempts: u32 },

    #[error("The interview backend reported an error: {message}")]
    BackendError { message: String },

    #[error("Your answer could not be submitted: {0}")]
    SubmissionFailure(#[source] ApiError),

    #[error("Could not fetch the interview report: {0}")]
    ReportFailure(#[source] ApiError),

    #[error("No active interview session")]
    NoSession,

    #[error("Another operation is already in progress for this session")]
    Busy,

    #[error(transparent)]
    Phase(#[from] PhaseError),
}

impl SessionError {
    /// Whether the flow can continue on the same session after this error.
    ///
    /// Only a failed start requires a fresh, user-initiated start.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SessionError::StartFailure(_))
    }
}

//! In-memory `SessionApi` driven by queued responses, for unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::{
    AnswerResponse, QuestionResponse, ReportResponse, SessionApi, SessionId, StartRequest,
    StartResponse, TranscriptEntry,
};
use crate::errors::ApiError;

/// A recorded call against the scripted API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Start(String),
    Question(String),
    Answer(String, String),
    Report(String),
}

#[derive(Default)]
struct Script {
    starts: VecDeque<Result<StartResponse, ApiError>>,
    questions: VecDeque<Result<QuestionResponse, ApiError>>,
    answers: VecDeque<Result<AnswerResponse, ApiError>>,
    calls: Vec<Call>,
}

/// Pops scripted responses in order. Empty queues fall back to a session
/// `abc123`, `waiting` and `{ok: true}`.
#[derive(Default)]
pub struct ScriptedApi {
    script: Mutex<Script>,
    submit_gate: Option<Arc<Notify>>,
    start_gate: Option<Arc<Notify>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block every `submit_answer` until the gate is notified.
    pub fn with_submit_gate(mut self, gate: Arc<Notify>) -> Self {
        self.submit_gate = Some(gate);
        self
    }

    /// Block every `start_session` until the gate is notified.
    pub fn with_start_gate(mut self, gate: Arc<Notify>) -> Self {
        self.start_gate = Some(gate);
        self
    }

    pub fn push_start(&self, response: Result<StartResponse, ApiError>) -> &Self {
        self.lock().starts.push_back(response);
        self
    }

    pub fn push_question(&self, text: &str) -> &Self {
        self.push_question_response(Ok(QuestionResponse::Question {
            question: Some(text.to_string()),
        }))
    }

    pub fn push_waiting(&self, times: usize) -> &Self {
        for _ in 0..times {
            self.push_question_response(Ok(QuestionResponse::Waiting));
        }
        self
    }

    pub fn push_question_response(&self, response: Result<QuestionResponse, ApiError>) -> &Self {
        self.lock().questions.push_back(response);
        self
    }

    pub fn push_answer(&self, response: Result<AnswerResponse, ApiError>) -> &Self {
        self.lock().answers.push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn question_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Question(_)))
            .count()
    }

    pub fn submitted_answers(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Answer(_, answer) => Some(answer),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }
}

pub fn unavailable(endpoint: &str) -> ApiError {
    ApiError::Status {
        endpoint: endpoint.to_string(),
        status: 503,
        body: "unavailable".to_string(),
    }
}

#[async_trait]
impl SessionApi for ScriptedApi {
    async fn start_session(&self, request: &StartRequest) -> Result<StartResponse, ApiError> {
        self.lock()
            .calls
            .push(Call::Start(request.role_title.clone()));
        if let Some(gate) = &self.start_gate {
            gate.notified().await;
        }
        self.lock().starts.pop_front().unwrap_or_else(|| {
            Ok(StartResponse {
                session_id: SessionId::new("abc123"),
            })
        })
    }

    async fn fetch_question(&self, session_id: &SessionId) -> Result<QuestionResponse, ApiError> {
        let mut script = self.lock();
        script.calls.push(Call::Question(session_id.to_string()));
        script
            .questions
            .pop_front()
            .unwrap_or(Ok(QuestionResponse::Waiting))
    }

    async fn submit_answer(
        &self,
        session_id: &SessionId,
        answer: &str,
    ) -> Result<AnswerResponse, ApiError> {
        self.lock()
            .calls
            .push(Call::Answer(session_id.to_string(), answer.to_string()));
        if let Some(gate) = &self.submit_gate {
            gate.notified().await;
        }
        self.lock()
            .answers
            .pop_front()
            .unwrap_or(Ok(AnswerResponse { ok: true }))
    }

    async fn fetch_report(&self, session_id: &SessionId) -> Result<ReportResponse, ApiError> {
        let mut script = self.lock();
        script.calls.push(Call::Report(session_id.to_string()));
        let transcript = script
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Answer(_, answer) => Some(TranscriptEntry {
                    question: String::new(),
                    answer: answer.clone(),
                }),
                _ => None,
            })
            .collect();
        Ok(ReportResponse {
            done: false,
            error: None,
            transcript,
        })
    }
}

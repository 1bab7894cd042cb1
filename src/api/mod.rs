//! Backend session API: wire types and the `SessionApi` seam.
//!
//! The backend owns question generation. This crate only starts a session,
//! polls for the next question, submits answers and reads back the report.
//! `http::HttpSessionApi` is the production implementation.

pub mod http;
#[cfg(test)]
pub(crate) mod scripted;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::ApiError;

pub use http::HttpSessionApi;

/// Opaque backend-issued session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /start`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRequest {
    pub role_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_experience_level: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub offer_tech_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_education: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub offer_soft_skills: Vec<String>,
}

impl StartRequest {
    pub fn new(role_title: impl Into<String>) -> Self {
        Self {
            role_title: role_title.into(),
            ..Default::default()
        }
    }

    /// Attach the candidate's name. Blank names are dropped.
    pub fn with_candidate_name(mut self, name: Option<String>) -> Self {
        self.candidate_name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self
    }
}

/// Body returned by `POST /start`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StartResponse {
    pub session_id: SessionId,
}

/// Body returned by `GET /{id}/question`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QuestionResponse {
    Waiting,
    Question {
        #[serde(default)]
        question: Option<String>,
    },
    Done,
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

/// Body of `POST /{id}/answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRequest {
    pub answer: String,
}

/// Body returned by `POST /{id}/answer`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnswerResponse {
    pub ok: bool,
}

/// One exchange in the backend's view of the interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub question: String,
    pub answer: String,
}

/// Body returned by `GET /{id}/report`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResponse {
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub transcript: Vec<TranscriptEntry>,
}

/// The backend session API, one method per endpoint.
#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn start_session(&self, request: &StartRequest) -> Result<StartResponse, ApiError>;

    async fn fetch_question(&self, session_id: &SessionId) -> Result<QuestionResponse, ApiError>;

    async fn submit_answer(
        &self,
        session_id: &SessionId,
        answer: &str,
    ) -> Result<AnswerResponse, ApiError>;

    async fn fetch_report(&self, session_id: &SessionId) -> Result<ReportResponse, ApiError>;
}

#[async_trait]
impl<T: SessionApi + ?Sized> SessionApi for &T {
    async fn start_session(&self, request: &StartRequest) -> Result<StartResponse, ApiError> {
        (**self).start_session(request).await
    }

    async fn fetch_question(&self, session_id: &SessionId) -> Result<QuestionResponse, ApiError> {
        (**self).fetch_question(session_id).await
    }

    async fn submit_answer(
        &self,
        session_id: &SessionId,
        answer: &str,
    ) -> Result<AnswerResponse, ApiError> {
        (**self).submit_answer(session_id, answer).await
    }

    async fn fetch_report(&self, session_id: &SessionId) -> Result<ReportResponse, ApiError> {
        (**self).fetch_report(session_id).await
    }
}

#[async_trait]
impl<T: SessionApi + ?Sized> SessionApi for Arc<T> {
    async fn start_session(&self, request: &StartRequest) -> Result<StartResponse, ApiError> {
        (**self).start_session(request).await
    }

    async fn fetch_question(&self, session_id: &SessionId) -> Result<QuestionResponse, ApiError> {
        (**self).fetch_question(session_id).await
    }

    async fn submit_answer(
        &self,
        session_id: &SessionId,
        answer: &str,
    ) -> Result<AnswerResponse, ApiError> {
        (**self).submit_answer(session_id, answer).await
    }

    async fn fetch_report(&self, session_id: &SessionId) -> Result<ReportResponse, ApiError> {
        (**self).fetch_report(session_id).await
    }
}

//! reqwest-backed implementation of [`SessionApi`].

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{
    AnswerRequest, AnswerResponse, QuestionResponse, ReportResponse, SessionApi, SessionId,
    StartRequest, StartResponse,
};
use crate::errors::ApiError;

/// Talks to the interview backend rooted at `base_url`
/// (e.g. `http://localhost:8000/api/interview`).
#[derive(Debug, Clone)]
pub struct HttpSessionApi {
    client: Client,
    base_url: Url,
}

impl HttpSessionApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn decode<T: DeserializeOwned>(endpoint: &Url, resp: Response) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                endpoint: endpoint.path().to_string(),
                status: status.as_u16(),
                body,
            });
        }
        resp.json::<T>().await.map_err(|source| ApiError::Decode {
            endpoint: endpoint.path().to_string(),
            source,
        })
    }

    fn transport(endpoint: &Url, source: reqwest::Error) -> ApiError {
        ApiError::Transport {
            endpoint: endpoint.path().to_string(),
            source,
        }
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn start_session(&self, request: &StartRequest) -> Result<StartResponse, ApiError> {
        let url = self.endpoint(&["start"]);
        tracing::debug!(url = %url, role = %request.role_title, "starting interview session");

        let resp = self
            .client
            .post(url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| Self::transport(&url, e))?;
        let started: StartResponse = Self::decode(&url, resp).await?;

        if started.session_id.as_str().trim().is_empty() {
            return Err(ApiError::InvalidResponse {
                endpoint: url.path().to_string(),
                reason: "empty session_id".to_string(),
            });
        }
        Ok(started)
    }

    async fn fetch_question(&self, session_id: &SessionId) -> Result<QuestionResponse, ApiError> {
        let url = self.endpoint(&[session_id.as_str(), "question"]);
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Self::transport(&url, e))?;
        Self::decode(&url, resp).await
    }

    async fn submit_answer(
        &self,
        session_id: &SessionId,
        answer: &str,
    ) -> Result<AnswerResponse, ApiError> {
        let url = self.endpoint(&[session_id.as_str(), "answer"]);
        tracing::debug!(session = %session_id, chars = answer.len(), "submitting answer");

        let body = AnswerRequest {
            answer: answer.to_string(),
        };
        let resp = self
            .client
            .post(url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::transport(&url, e))?;
        Self::decode(&url, resp).await
    }

    async fn fetch_report(&self, session_id: &SessionId) -> Result<ReportResponse, ApiError> {
        let url = self.endpoint(&[session_id.as_str(), "report"]);
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Self::transport(&url, e))?;
        Self::decode(&url, resp).await
    }
}

//! In-process mock of the interview backend, served by axum on a dynamic port.
#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};

/// One scripted reply of the question endpoint.
#[derive(Debug, Clone)]
pub enum Reply {
    Question(String),
    Waiting,
    Done,
    Error(String),
}

#[derive(Debug, Default)]
pub struct SessionLog {
    pub role: String,
    pub current_question: Option<String>,
    pub answers: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub sessions: HashMap<String, SessionLog>,
    pub replies: VecDeque<Reply>,
    pub start_bodies: Vec<Value>,
    pub fail_start: bool,
    pub failing_answers: u32,
    pub question_calls: u32,
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<Mutex<MockState>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        let state = Arc::new(Mutex::new(MockState::default()));
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = router(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api/interview", self.addr)
    }

    pub async fn push(&self, reply: Reply) {
        self.state.lock().await.replies.push_back(reply);
    }

    pub async fn push_questions(&self, texts: &[&str]) {
        let mut state = self.state.lock().await;
        for text in texts {
            state.replies.push_back(Reply::Question(text.to_string()));
        }
    }

    pub async fn fail_start(&self) {
        self.state.lock().await.fail_start = true;
    }

    pub async fn fail_next_answers(&self, n: u32) {
        self.state.lock().await.failing_answers = n;
    }

    pub async fn answers(&self, session_id: &str) -> Vec<(String, String)> {
        self.state
            .lock()
            .await
            .sessions
            .get(session_id)
            .map(|s| s.answers.clone())
            .unwrap_or_default()
    }

    pub async fn question_calls(&self) -> u32 {
        self.state.lock().await.question_calls
    }

    pub async fn start_bodies(&self) -> Vec<Value> {
        self.state.lock().await.start_bodies.clone()
    }

    /// Create a session directly, bypassing HTTP.
    pub async fn seed_session(&self, id: &str, answers: &[(&str, &str)]) {
        let log = SessionLog {
            role: "Accountant".to_string(),
            current_question: None,
            answers: answers
                .iter()
                .map(|(q, a)| (q.to_string(), a.to_string()))
                .collect(),
        };
        self.state
            .lock()
            .await
            .sessions
            .insert(id.to_string(), log);
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

type Shared = Arc<Mutex<MockState>>;

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/interview/start", post(start))
        .route("/api/interview/{id}/question", get(question))
        .route("/api/interview/{id}/answer", post(answer))
        .route("/api/interview/{id}/report", get(report))
        .with_state(state)
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Session not found" }))).into_response()
}

async fn start(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().await;
    state.start_bodies.push(body.clone());
    if state.fail_start {
        return (StatusCode::INTERNAL_SERVER_ERROR, "start failed").into_response();
    }
    let id = uuid::Uuid::new_v4().to_string();
    let role = body["role_title"].as_str().unwrap_or_default().to_string();
    state.sessions.insert(
        id.clone(),
        SessionLog {
            role,
            ..Default::default()
        },
    );
    Json(json!({ "session_id": id })).into_response()
}

async fn question(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = state.lock().await;
    if !state.sessions.contains_key(&id) {
        return not_found();
    }
    state.question_calls += 1;
    let reply = state.replies.pop_front().unwrap_or(Reply::Waiting);
    let body = match reply {
        Reply::Question(text) => {
            if let Some(session) = state.sessions.get_mut(&id) {
                session.current_question = Some(text.clone());
            }
            json!({ "status": "question", "question": text })
        }
        Reply::Waiting => json!({ "status": "waiting" }),
        Reply::Done => json!({ "status": "done" }),
        Reply::Error(message) => json!({ "status": "error", "message": message }),
    };
    Json(body).into_response()
}

#[derive(Deserialize)]
struct AnswerBody {
    answer: String,
}

async fn answer(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<AnswerBody>,
) -> Response {
    let mut state = state.lock().await;
    if state.failing_answers > 0 {
        state.failing_answers -= 1;
        return (StatusCode::SERVICE_UNAVAILABLE, "try again").into_response();
    }
    let Some(session) = state.sessions.get_mut(&id) else {
        return not_found();
    };
    let question = session.current_question.take().unwrap_or_default();
    session.answers.push((question, body.answer));
    Json(json!({ "ok": true })).into_response()
}

async fn report(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let state = state.lock().await;
    let Some(session) = state.sessions.get(&id) else {
        return not_found();
    };
    let transcript: Vec<Value> = session
        .answers
        .iter()
        .map(|(q, a)| json!({ "question": q, "answer": a }))
        .collect();
    Json(json!({
        "done": session.answers.len() >= 11,
        "error": null,
        "transcript": transcript,
    }))
    .into_response()
}

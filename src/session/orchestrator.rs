use chrono::Utc;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{DeliveredQuestion, Ignored, Session, SessionSnapshot, Step};
use crate::api::{ReportResponse, SessionApi, SessionId, StartRequest};
use crate::errors::{ApiError, PhaseError, SessionError};
use crate::phase::{Answer, Phase, PhaseMachine, PhaseView};
use crate::poll::{Exhausted, Outcome, PollStep, PollingClient, RetryPolicy, poll_until};
use crate::transcript::Transcript;

/// Mutable state of the single session an orchestrator drives.
#[derive(Debug, Default)]
struct SessionState {
    session: Option<Session>,
    machine: PhaseMachine,
    pending: Option<String>,
    last_delivered: Option<String>,
    in_flight: bool,
    /// Bumped by `restart`; operations started under an older value are stale.
    generation: u64,
    last_error: Option<String>,
}

impl SessionState {
    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    fn fail(&mut self, err: SessionError) -> SessionError {
        tracing::warn!(error = %err, phase = %self.machine.phase(), "session operation failed");
        self.last_error = Some(err.to_string());
        err
    }
}

/// Clears the in-flight flag when an operation ends, unless a restart has
/// already handed the session to a newer operation.
struct InFlightGuard<'a> {
    state: &'a Mutex<SessionState>,
    generation: u64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.is_current(self.generation) {
            state.in_flight = false;
        }
    }
}

/// Result of one retry-loop run, before it is applied to state.
enum Fetched {
    Question(String),
    Done,
    Failed(String),
    Stale,
}

/// Drives one interview session against a [`SessionApi`].
///
/// At most one network operation runs at a time: `start`, `submit_answer`,
/// `skip`, `resume` and `fetch_report` set the in-flight flag on entry and
/// a concurrent call returns `Step::Ignored(Ignored::Busy)` without touching
/// the backend.
pub struct Orchestrator<A> {
    client: PollingClient<A>,
    policy: RetryPolicy,
    state: Mutex<SessionState>,
}

impl<A: SessionApi> Orchestrator<A> {
    pub fn new(api: A, policy: RetryPolicy) -> Self {
        Self {
            client: PollingClient::new(api),
            policy,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn guard(&self, generation: u64) -> InFlightGuard<'_> {
        InFlightGuard {
            state: &self.state,
            generation,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock_state().is_current(generation)
    }

    fn is_duplicate(&self, text: &str) -> bool {
        self.lock_state().last_delivered.as_deref() == Some(text)
    }

    /// Start a backend session and fetch the first question.
    ///
    /// A no-op without consent or while another operation is in flight.
    /// On success any previous local state is replaced.
    pub async fn start(&self, consent: bool, request: StartRequest) -> Result<Step, SessionError> {
        if !consent {
            return Ok(Step::Ignored(Ignored::NoConsent));
        }
        let generation = {
            let mut state = self.lock_state();
            if state.in_flight {
                return Ok(Step::Ignored(Ignored::Busy));
            }
            state.in_flight = true;
            state.generation
        };
        let _guard = self.guard(generation);

        tracing::info!(role = %request.role_title, "starting interview");
        let result = self.client.api().start_session(&request).await;

        {
            let mut state = self.lock_state();
            if !state.is_current(generation) {
                tracing::debug!("discarding start response after restart");
                return Ok(Step::Discarded);
            }
            let started = match result {
                Ok(started) => started,
                Err(e) => return Err(state.fail(SessionError::StartFailure(e))),
            };

            tracing::info!(session = %started.session_id, "interview session started");
            let mut machine = PhaseMachine::new();
            machine.mark_started();
            state.machine = machine;
            state.session = Some(Session {
                id: started.session_id,
                role: request.role_title,
                candidate_name: request.candidate_name,
                created_at: Utc::now(),
            });
            state.pending = None;
            state.last_delivered = None;
            state.last_error = None;
        }

        self.fetch_and_deliver(generation).await
    }

    /// Submit the candidate's answer to the pending question.
    pub async fn submit_answer(&self, text: impl Into<String>) -> Result<Step, SessionError> {
        self.answer(Answer::Text(text.into())).await
    }

    /// Skip the pending question. Counts toward phase completion.
    pub async fn skip(&self) -> Result<Step, SessionError> {
        self.answer(Answer::Skipped).await
    }

    async fn answer(&self, answer: Answer) -> Result<Step, SessionError> {
        let (generation, session_id) = {
            let mut state = self.lock_state();
            if state.in_flight {
                return Ok(Step::Ignored(Ignored::Busy));
            }
            let Some(session_id) = state.session.as_ref().map(|s| s.id.clone()) else {
                return Ok(Step::Ignored(Ignored::NoSession));
            };
            if state.machine.phase().is_terminal() {
                return Ok(Step::Ignored(Ignored::Concluded));
            }
            if state.pending.is_none() {
                return Ok(Step::Ignored(Ignored::NoPendingQuestion));
            }
            state.in_flight = true;
            (state.generation, session_id)
        };
        let _guard = self.guard(generation);

        tracing::debug!(session = %session_id, skipped = answer.is_skipped(), "submitting answer");
        let result = self
            .client
            .api()
            .submit_answer(&session_id, answer.as_str())
            .await;

        let advance = {
            let mut state = self.lock_state();
            if !state.is_current(generation) {
                tracing::debug!("discarding answer response after restart");
                return Ok(Step::Discarded);
            }
            match result {
                Ok(resp) if resp.ok => {}
                Ok(_) => {
                    let err = ApiError::NotAcknowledged {
                        session_id: session_id.to_string(),
                    };
                    return Err(state.fail(SessionError::SubmissionFailure(err)));
                }
                Err(e) => return Err(state.fail(SessionError::SubmissionFailure(e))),
            }

            let advance = state.machine.record_answer(answer)?;
            state.pending = None;
            state.last_error = None;
            advance
        };

        if advance.changed_phase() {
            tracing::info!(from = %advance.from, to = %advance.to, "phase advanced");
        }
        if advance.to.is_terminal() {
            tracing::info!(session = %session_id, "interview concluded");
            return Ok(Step::Concluded);
        }

        self.fetch_and_deliver(generation).await
    }

    /// Re-run the fetch loop when no question is pending, e.g. after a
    /// `PollTimeout` or `BackendError` that followed a confirmed answer.
    pub async fn resume(&self) -> Result<Step, SessionError> {
        let generation = {
            let mut state = self.lock_state();
            if state.in_flight {
                return Ok(Step::Ignored(Ignored::Busy));
            }
            if state.session.is_none() {
                return Ok(Step::Ignored(Ignored::NoSession));
            }
            if state.machine.phase().is_terminal() {
                return Ok(Step::Ignored(Ignored::Concluded));
            }
            if state.pending.is_some() {
                return Ok(Step::Ignored(Ignored::QuestionPending));
            }
            state.in_flight = true;
            state.generation
        };
        let _guard = self.guard(generation);

        self.fetch_and_deliver(generation).await
    }

    /// Discard all local state and return to `Intro` with empty slots.
    ///
    /// The backend is not notified. Operations still awaiting a response
    /// see a different generation and drop their results.
    pub fn restart(&self) {
        let mut state = self.lock_state();
        let generation = state.generation.wrapping_add(1);
        if let Some(session) = &state.session {
            tracing::info!(session = %session.id, "abandoning interview session");
        }
        *state = SessionState {
            generation,
            ..SessionState::default()
        };
    }

    /// Fetch the backend's report for the current session.
    pub async fn fetch_report(&self) -> Result<ReportResponse, SessionError> {
        let (generation, session_id) = {
            let mut state = self.lock_state();
            if state.in_flight {
                return Err(SessionError::Busy);
            }
            let Some(session_id) = state.session.as_ref().map(|s| s.id.clone()) else {
                return Err(SessionError::NoSession);
            };
            state.in_flight = true;
            (state.generation, session_id)
        };
        let _guard = self.guard(generation);

        self.client
            .api()
            .fetch_report(&session_id)
            .await
            .map_err(SessionError::ReportFailure)
    }

    /// Poll until a new question, completion, error or exhaustion, then
    /// apply the result. Caller holds the in-flight flag.
    async fn fetch_and_deliver(&self, generation: u64) -> Result<Step, SessionError> {
        let session_id: SessionId = {
            let state = self.lock_state();
            if !state.is_current(generation) {
                return Ok(Step::Discarded);
            }
            match &state.session {
                Some(session) => session.id.clone(),
                None => return Ok(Step::Ignored(Ignored::NoSession)),
            }
        };

        let sid = &session_id;
        let result = poll_until(&self.policy, move |attempt| async move {
            if !self.is_current(generation) {
                return PollStep::Ready(Fetched::Stale);
            }
            let outcome = self.client.fetch_next_question(sid).await;
            tracing::debug!(attempt, outcome = outcome.kind(), "poll attempt");
            match outcome {
                Outcome::Question(text) if self.is_duplicate(&text) => {
                    tracing::debug!(attempt, "suppressing repeated question");
                    PollStep::Pending
                }
                Outcome::Question(text) => PollStep::Ready(Fetched::Question(text)),
                Outcome::Waiting => PollStep::Pending,
                Outcome::Done => PollStep::Ready(Fetched::Done),
                Outcome::Error(message) => PollStep::Ready(Fetched::Failed(message)),
            }
        })
        .await;

        let mut state = self.lock_state();
        if !state.is_current(generation) {
            tracing::debug!("discarding poll result after restart");
            return Ok(Step::Discarded);
        }

        match result {
            Ok(Fetched::Question(text)) => {
                let slot = state.machine.assign_question(text.clone())?;
                tracing::info!(phase = %slot.phase, index = slot.index, "question delivered");
                state.pending = Some(text.clone());
                state.last_delivered = Some(text.clone());
                state.last_error = None;
                Ok(Step::Question(DeliveredQuestion {
                    phase: slot.phase,
                    index: slot.index,
                    text,
                }))
            }
            Ok(Fetched::Done) => {
                let advance = state.machine.conclude()?;
                tracing::info!(from = %advance.from, "backend concluded the interview");
                state.pending = None;
                Ok(Step::Concluded)
            }
            Ok(Fetched::Failed(message)) => Err(state.fail(SessionError::BackendError { message })),
            Ok(Fetched::Stale) => Ok(Step::Discarded),
            Err(Exhausted { attempts }) => Err(state.fail(SessionError::PollTimeout { attempts })),
        }
    }

    /// Owned copy of the state for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock_state();
        SessionSnapshot {
            session: state.session.clone(),
            phase: state.machine.phase(),
            index: state.machine.index(),
            phase_number: state.machine.phase().number(),
            progress: state.machine.progress_percentage(),
            pending_question: state.pending.clone(),
            busy: state.in_flight,
            last_error: state.last_error.clone(),
            answered: state.machine.answers().len(),
        }
    }

    pub fn can_access_phase(&self, phase: Phase) -> bool {
        self.lock_state().machine.can_access_phase(phase)
    }

    /// Read-only review of an accessible phase.
    pub fn view_phase(&self, phase: Phase) -> Result<PhaseView, PhaseError> {
        self.lock_state().machine.view(phase)
    }

    /// Local transcript of the current session, if one exists.
    pub fn transcript(&self) -> Option<Transcript> {
        let state = self.lock_state();
        let session = state.session.as_ref()?;
        Some(Transcript::from_machine(session, &state.machine, Utc::now()))
    }
}

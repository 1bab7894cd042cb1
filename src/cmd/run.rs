//! Interactive interview session: `interview run`.

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::future::Future;
use std::path::PathBuf;

use interview_orchestrator::api::{HttpSessionApi, StartRequest};
use interview_orchestrator::config::InterviewConfig;
use interview_orchestrator::errors::{PhaseError, SessionError};
use interview_orchestrator::phase::Phase;
use interview_orchestrator::session::{Orchestrator, Step};
use interview_orchestrator::ui::InterviewUI;

const CONSENT_PROMPT: &str = "This interview is conducted by an AI interviewer and your answers are recorded. Do you consent?";

const HELP: &str = "\
Commands:
  :skip           skip the current question
  :retry          fetch the next question again after a failure
  :restart        discard this interview and start over
  :progress       show overall progress
  :phase <name>   review an accessible phase (intro, technical, soft-skills, conclusion)
  :quit           leave the interview
Anything else is submitted as your answer. Start with '::' to answer with a leading ':'.";

/// Options for `interview run` beyond the shared configuration.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub yes: bool,
    pub output: Option<PathBuf>,
    pub experience_level: Option<String>,
    pub tech_skills: Vec<String>,
    pub education: Option<String>,
    pub soft_skills: Vec<String>,
}

/// A line typed at the answer prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Answer(String),
    Skip,
    Retry,
    Restart,
    Progress,
    Phase(String),
    Quit,
    Help,
    Empty,
    Unknown(String),
}

pub fn parse_input(line: &str) -> InputCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return InputCommand::Empty;
    }
    if let Some(escaped) = trimmed.strip_prefix("::") {
        return InputCommand::Answer(format!(":{}", escaped));
    }
    let Some(command) = trimmed.strip_prefix(':') else {
        return InputCommand::Answer(trimmed.to_string());
    };

    let mut parts = command.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::trim).unwrap_or_default();
    match name.as_str() {
        "skip" | "s" => InputCommand::Skip,
        "retry" | "r" => InputCommand::Retry,
        "restart" => InputCommand::Restart,
        "progress" | "p" => InputCommand::Progress,
        "phase" if !arg.is_empty() => InputCommand::Phase(arg.to_string()),
        "quit" | "q" | "exit" => InputCommand::Quit,
        "help" | "h" | "?" => InputCommand::Help,
        _ => InputCommand::Unknown(trimmed.to_string()),
    }
}

pub async fn cmd_run(config: &InterviewConfig, opts: RunOptions) -> Result<()> {
    let theme = ColorfulTheme::default();

    let role = match config.role() {
        Some(role) => role,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Role you are interviewing for")
            .interact_text()
            .context("Failed to read role")?,
    };

    let consent = opts.yes
        || Confirm::with_theme(&theme)
            .with_prompt(CONSENT_PROMPT)
            .default(false)
            .interact()
            .context("Failed to read consent")?;
    if !consent {
        println!("Consent is required to take the interview. Nothing was sent.");
        return Ok(());
    }

    let request = build_request(config, &role, &opts);
    let api = HttpSessionApi::new(&config.base_url(), config.request_timeout())
        .context("Failed to create backend client")?;
    tracing::debug!(base_url = %api.base_url(), "using interview backend");
    let orchestrator = Orchestrator::new(api, config.retry_policy());
    let ui = InterviewUI::new();

    drive(
        &ui,
        "Starting interview...",
        orchestrator.start(consent, request.clone()),
    )
    .await;

    loop {
        let snapshot = orchestrator.snapshot();
        ui.update_progress(&snapshot);
        if snapshot.phase.is_terminal() {
            break;
        }

        if snapshot.session.is_none() {
            let again = ui.suspend(|| {
                Confirm::with_theme(&theme)
                    .with_prompt("Start a new interview?")
                    .default(true)
                    .interact()
            })?;
            if !again {
                break;
            }
            drive(
                &ui,
                "Starting interview...",
                orchestrator.start(consent, request.clone()),
            )
            .await;
            continue;
        }

        let line = ui.suspend(|| {
            Input::<String>::with_theme(&theme)
                .with_prompt("Your answer")
                .allow_empty(true)
                .interact_text()
        })?;

        match parse_input(&line) {
            InputCommand::Answer(text) => {
                drive(&ui, "Submitting answer...", orchestrator.submit_answer(text)).await
            }
            InputCommand::Skip => {
                ui.show_skipped();
                drive(&ui, "Waiting for the next question...", orchestrator.skip()).await
            }
            InputCommand::Retry => {
                drive(&ui, "Waiting for the next question...", orchestrator.resume()).await
            }
            InputCommand::Restart => {
                orchestrator.restart();
                ui.show_restarted();
            }
            InputCommand::Progress => ui.show_progress(&snapshot),
            InputCommand::Phase(name) => match name.parse::<Phase>() {
                Ok(phase) => match orchestrator.view_phase(phase) {
                    Ok(view) => ui.show_phase_view(&view),
                    Err(PhaseError::Inaccessible { phase }) => ui.show_locked(phase),
                    Err(e) => ui.show_notice(&e.to_string()),
                },
                Err(e) => ui.show_notice(&e.to_string()),
            },
            InputCommand::Quit => break,
            InputCommand::Help => ui.show_notice(HELP),
            InputCommand::Empty => ui.show_notice("Type your answer, or :help for commands."),
            InputCommand::Unknown(cmd) => {
                ui.show_notice(&format!("Unknown command '{}'. Type :help for commands.", cmd))
            }
        }
    }

    let concluded = orchestrator.snapshot().phase.is_terminal();
    if concluded {
        ui.show_concluded();
    }

    if let Some(transcript) = orchestrator.transcript() {
        if concluded {
            ui.show_transcript(&transcript);
        }
        if let Some(path) = &opts.output {
            let path = if path.is_dir() {
                path.join(transcript.default_file_name())
            } else {
                path.clone()
            };
            transcript.save(&path)?;
            ui.show_success(&format!("Transcript saved to {}", path.display()));
        }
        if let Some(session) = orchestrator.snapshot().session {
            ui.show_notice(&format!(
                "Fetch the backend report later with: interview report {}",
                session.id
            ));
        }
    }

    ui.finish();
    Ok(())
}

fn build_request(config: &InterviewConfig, role: &str, opts: &RunOptions) -> StartRequest {
    let mut request = config.start_request(role);
    request.offer_experience_level = opts.experience_level.clone();
    request.offer_tech_skills = opts.tech_skills.clone();
    request.offer_education = opts.education.clone();
    request.offer_soft_skills = opts.soft_skills.clone();
    request
}

/// Await one orchestrator operation under the spinner and render its result.
async fn drive<F>(ui: &InterviewUI, wait_msg: &str, operation: F)
where
    F: Future<Output = Result<Step, SessionError>>,
{
    ui.start_wait(wait_msg);
    let result = operation.await;
    ui.finish_wait("");

    match result {
        Ok(Step::Question(question)) => ui.show_question(&question),
        Ok(Step::Concluded) | Ok(Step::Discarded) => {}
        Ok(Step::Ignored(reason)) => ui.show_notice(&format!("Nothing to do: {}.", reason)),
        Err(e) => ui.show_error(&e),
    }
}

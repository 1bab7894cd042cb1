use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;
use terminal_size::{Width, terminal_size};

use crate::errors::SessionError;
use crate::phase::{Phase, PhaseView};
use crate::session::{DeliveredQuestion, SessionSnapshot};
use crate::transcript::Transcript;
use crate::ui::icons::{
    CHECK, CROSS, LOCK, PROGRESS, QUESTION, REPORT, RESTART, SKIP, SPARKLE, WARN,
};

/// Width used when the terminal size cannot be determined.
const FALLBACK_WIDTH: usize = 80;
/// Indentation of question and answer text.
const INDENT: &str = "   ";

/// Terminal UI for an interview, rendered via `indicatif`.
///
/// Two bars are stacked vertically:
/// - Progress bar: overall interview progress in percent, with the phase in its message
/// - Status spinner: ticks while a backend call is suspended
pub struct InterviewUI {
    multi: MultiProgress,
    progress_bar: ProgressBar,
    status_bar: ProgressBar,
}

impl Default for InterviewUI {
    fn default() -> Self {
        Self::new()
    }
}

impl InterviewUI {
    pub fn new() -> Self {
        let multi = MultiProgress::new();

        let progress_style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .expect("progress bar template is a valid static string")
            .progress_chars("█▓▒░");

        let progress_bar = multi.add(ProgressBar::new(100));
        progress_bar.set_style(progress_style);
        progress_bar.set_prefix("Interview");

        let status_style = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {msg}")
            .expect("progress bar template is a valid static string");

        let status_bar = multi.add(ProgressBar::new_spinner());
        status_bar.set_style(status_style);
        status_bar.set_prefix("   Status");

        Self {
            multi,
            progress_bar,
            status_bar,
        }
    }

    /// Print a line via `MultiProgress`, falling back to `eprintln!` if the rich UI fails.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    /// Run `f` (typically a `dialoguer` prompt) with the bars hidden.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.multi.suspend(f)
    }

    /// Start the spinner for a suspended backend call.
    pub fn start_wait(&self, msg: &str) {
        self.status_bar.set_message(style(msg.to_string()).dim().to_string());
        self.status_bar.enable_steady_tick(Duration::from_millis(100));
    }

    /// Stop the spinner and leave `msg` in its place.
    pub fn finish_wait(&self, msg: &str) {
        self.status_bar.disable_steady_tick();
        self.status_bar.set_message(msg.to_string());
        self.status_bar.tick();
    }

    /// Refresh the progress bar from a snapshot.
    pub fn update_progress(&self, snapshot: &SessionSnapshot) {
        self.progress_bar.set_position(u64::from(snapshot.progress));
        self.progress_bar.set_message(status_line(snapshot));
    }

    pub fn show_question(&self, question: &DeliveredQuestion) {
        self.print_line("");
        self.print_line(format!(
            "{}{}",
            QUESTION,
            style(question_heading(question.phase, question.index)).bold()
        ));
        for line in wrap(&question.text, wrap_width()) {
            self.print_line(format!("{}{}", INDENT, style(line).cyan()));
        }
    }

    pub fn show_error(&self, err: &SessionError) {
        self.print_line(format!("{}{}", CROSS, style(err.to_string()).red().bold()));
        if err.is_recoverable() {
            self.print_line(format!(
                "{}{}",
                INDENT,
                style("Type :retry to fetch again or :restart to begin anew.").dim()
            ));
        }
    }

    pub fn show_notice(&self, msg: &str) {
        self.print_line(format!("{}{}", WARN, style(msg).yellow()));
    }

    pub fn show_skipped(&self) {
        self.print_line(format!("{}{}", SKIP, style("Skipping question").dim()));
    }

    pub fn show_restarted(&self) {
        self.print_line(format!(
            "{}{}",
            RESTART,
            style("Interview discarded. Local answers were cleared.").yellow()
        ));
    }

    pub fn show_success(&self, msg: &str) {
        self.print_line(format!("{}{}", CHECK, style(msg).green()));
    }

    pub fn show_progress(&self, snapshot: &SessionSnapshot) {
        self.print_line(format!(
            "{}{} {}",
            PROGRESS,
            style(format!("{}%", snapshot.progress)).cyan().bold(),
            status_line(snapshot)
        ));
    }

    /// Print a read-only phase review.
    pub fn show_phase_view(&self, view: &PhaseView) {
        self.print_line("");
        self.print_line(format!(
            "{} {}",
            style(format!("Phase {}/{}:", view.phase.number(), Phase::ALL.len())).dim(),
            style(view.phase.label()).bold()
        ));
        if view.questions.is_empty() {
            self.print_line(format!("{}{}", INDENT, style("No questions in this phase.").dim()));
        }
        for (i, (question, answer)) in view.questions.iter().zip(&view.answers).enumerate() {
            let question = question.as_deref().unwrap_or("(not yet asked)");
            self.print_line(format!("{}{}. {}", INDENT, i + 1, question));
            let answer = answer
                .as_ref()
                .map(|a| a.as_str().to_string())
                .unwrap_or_else(|| "Not answered".to_string());
            self.print_line(format!("{}   {}", INDENT, style(answer).dim()));
        }
    }

    pub fn show_locked(&self, phase: Phase) {
        self.print_line(format!(
            "{}{}",
            LOCK,
            style(format!("{} is not accessible yet.", phase.label())).yellow()
        ));
    }

    pub fn show_concluded(&self) {
        self.progress_bar.set_position(100);
        self.progress_bar
            .finish_with_message(format!("{}{}", SPARKLE, Phase::Conclusion.label()));
        self.print_line("");
        self.print_line(format!(
            "{}{}",
            SPARKLE,
            style("The interview is complete. Thank you!").green().bold()
        ));
    }

    pub fn show_transcript(&self, transcript: &Transcript) {
        self.print_line("");
        self.print_line(format!("{}{}", REPORT, style("Transcript").bold()));
        for line in transcript.render().lines() {
            self.print_line(format!("{}{}", INDENT, line));
        }
    }

    /// Stop both bars, e.g. on quit.
    pub fn finish(&self) {
        self.status_bar.finish_and_clear();
        self.progress_bar.abandon();
    }
}

/// `Phase 2/4: Technical questions, question 3/5`
pub fn status_line(snapshot: &SessionSnapshot) -> String {
    let phase = snapshot.phase;
    let mut line = format!(
        "Phase {}/{}: {}",
        snapshot.phase_number,
        Phase::ALL.len(),
        phase.label()
    );
    if phase.target_count() > 0 {
        line.push_str(&format!(
            ", question {}/{}",
            (snapshot.index + 1).min(phase.target_count()),
            phase.target_count()
        ));
    }
    line
}

fn question_heading(phase: Phase, index: usize) -> String {
    format!(
        "{} {}/{}",
        phase.label(),
        index + 1,
        phase.target_count()
    )
}

fn wrap_width() -> usize {
    let width = terminal_size()
        .map(|(Width(w), _)| usize::from(w))
        .unwrap_or(FALLBACK_WIDTH);
    width.saturating_sub(INDENT.len() + 2).max(20)
}

/// Wrap `text` to `width` columns.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    textwrap::wrap(text, width)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(phase: Phase, index: usize) -> SessionSnapshot {
        SessionSnapshot {
            session: None,
            phase,
            index,
            phase_number: phase.number(),
            progress: 0,
            pending_question: None,
            busy: false,
            last_error: None,
            answered: 0,
        }
    }

    #[test]
    fn test_status_line_for_questioned_phase() {
        assert_eq!(
            status_line(&snapshot(Phase::Technical, 2)),
            "Phase 2/4: Technical questions, question 3/5"
        );
    }

    #[test]
    fn test_status_line_for_conclusion() {
        assert_eq!(
            status_line(&snapshot(Phase::Conclusion, 0)),
            "Phase 4/4: Conclusion"
        );
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "Describe a time you had to reconcile two ledgers that disagreed";
        let lines = wrap(text, 20);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_skip_and_restart_notices_print() {
        let ui = InterviewUI::new();
        ui.show_skipped();
        ui.show_restarted();
        ui.finish();
    }

    #[test]
    fn test_question_heading() {
        assert_eq!(question_heading(Phase::Intro, 0), "Introduction 1/1");
    }
}

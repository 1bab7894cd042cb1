//! Phase state machine for an interview session.
//!
//! This module provides:
//! - `Phase`, the closed, forward-only set of interview stages
//! - The transition table (`allowed_transitions` / `validate_transition`)
//! - `PhaseSlots` and `AnswerLog`, the per-phase question and answer records
//! - `PhaseMachine`, which advances on confirmed answers and answers the
//!   accessibility and progress queries

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::PhaseError;

/// Number of questions asked in the introduction.
pub const INTRO_QUESTIONS: usize = 1;
/// Number of questions asked in the technical phase.
pub const TECHNICAL_QUESTIONS: usize = 5;
/// Number of questions asked in the soft-skills phase.
pub const SOFT_SKILLS_QUESTIONS: usize = 5;

/// Flat progress reported while in the introduction.
const INTRO_PROGRESS: usize = 10;
/// Share of the progress bar covered by each of the technical and soft-skills phases.
/// Tied to the 1/5/5 split; revisit together with the question counts.
const QUESTIONED_PHASE_WEIGHT: usize = 40;

/// Text recorded (and sent to the backend) for a skipped question.
pub const SKIPPED_SENTINEL: &str = "[skipped]";

/// One of the ordered interview stages.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    Intro,
    Technical,
    SoftSkills,
    /// Terminal: no question is ever requested for it.
    Conclusion,
}

impl Phase {
    /// All phases in interview order.
    pub const ALL: [Phase; 4] = [
        Phase::Intro,
        Phase::Technical,
        Phase::SoftSkills,
        Phase::Conclusion,
    ];

    /// Phases that carry questions.
    pub const QUESTIONED: [Phase; 3] = [Phase::Intro, Phase::Technical, Phase::SoftSkills];

    /// Number of questions asked in this phase.
    pub fn target_count(self) -> usize {
        match self {
            Phase::Intro => INTRO_QUESTIONS,
            Phase::Technical => TECHNICAL_QUESTIONS,
            Phase::SoftSkills => SOFT_SKILLS_QUESTIONS,
            Phase::Conclusion => 0,
        }
    }

    /// The phase that follows this one, if any.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Intro => Some(Phase::Technical),
            Phase::Technical => Some(Phase::SoftSkills),
            Phase::SoftSkills => Some(Phase::Conclusion),
            Phase::Conclusion => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Conclusion
    }

    /// 1-based ordinal, for "Phase 2/4" style display.
    pub fn number(self) -> u8 {
        match self {
            Phase::Intro => 1,
            Phase::Technical => 2,
            Phase::SoftSkills => 3,
            Phase::Conclusion => 4,
        }
    }

    /// Human-readable heading.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Intro => "Introduction",
            Phase::Technical => "Technical questions",
            Phase::SoftSkills => "Soft skills",
            Phase::Conclusion => "Conclusion",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Intro => write!(f, "intro"),
            Phase::Technical => write!(f, "technical"),
            Phase::SoftSkills => write!(f, "soft-skills"),
            Phase::Conclusion => write!(f, "conclusion"),
        }
    }
}

impl std::str::FromStr for Phase {
    type Err = PhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "intro" | "introduction" => Ok(Phase::Intro),
            "technical" => Ok(Phase::Technical),
            "soft-skills" | "soft_skills" | "softskills" => Ok(Phase::SoftSkills),
            "conclusion" => Ok(Phase::Conclusion),
            _ => Err(PhaseError::UnknownPhase(s.to_string())),
        }
    }
}

/// Phases reachable from `from` in a single transition.
///
/// Every questioned phase may also jump straight to `Conclusion`, which is
/// how a backend-signalled completion is applied.
pub fn allowed_transitions(from: Phase) -> &'static [Phase] {
    match from {
        Phase::Intro => &[Phase::Technical, Phase::Conclusion],
        Phase::Technical => &[Phase::SoftSkills, Phase::Conclusion],
        Phase::SoftSkills => &[Phase::Conclusion],
        Phase::Conclusion => &[],
    }
}

/// Validate a phase transition against the table.
pub fn validate_transition(from: Phase, to: Phase) -> Result<(), PhaseError> {
    if from.is_terminal() {
        return Err(PhaseError::Concluded);
    }
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(PhaseError::InvalidTransition { from, to })
    }
}

/// A candidate's answer to one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Answer {
    Text(String),
    Skipped,
}

impl Answer {
    /// The text recorded in the transcript and sent to the backend.
    pub fn as_str(&self) -> &str {
        match self {
            Answer::Text(text) => text,
            Answer::Skipped => SKIPPED_SENTINEL,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Answer::Skipped)
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of one question position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub phase: Phase,
    pub index: usize,
}

impl SlotKey {
    pub fn new(phase: Phase, index: usize) -> Self {
        Self { phase, index }
    }
}

/// Fixed-length question positions for each questioned phase, filled lazily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSlots {
    slots: BTreeMap<Phase, Vec<Option<String>>>,
}

impl Default for PhaseSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseSlots {
    /// Empty slots sized to each phase's target count.
    pub fn new() -> Self {
        let slots = Phase::QUESTIONED
            .iter()
            .map(|phase| (*phase, vec![None; phase.target_count()]))
            .collect();
        Self { slots }
    }

    /// The positions of one phase (empty for `Conclusion`).
    pub fn get(&self, phase: Phase) -> &[Option<String>] {
        self.slots.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The question at a position, if it has arrived.
    pub fn question(&self, key: SlotKey) -> Option<&str> {
        self.get(key.phase).get(key.index)?.as_deref()
    }

    fn fill(&mut self, key: SlotKey, text: String) -> bool {
        match self
            .slots
            .get_mut(&key.phase)
            .and_then(|slots| slots.get_mut(key.index))
        {
            Some(slot) => {
                *slot = Some(text);
                true
            }
            None => false,
        }
    }
}

/// Append-only record of answers keyed by slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerLog {
    entries: BTreeMap<SlotKey, Answer>,
}

impl AnswerLog {
    /// Record an answer. An existing entry is never overwritten; returns
    /// `false` if the slot was already answered.
    pub fn record(&mut self, key: SlotKey, answer: Answer) -> bool {
        match self.entries.entry(key) {
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(answer);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, key: SlotKey) -> Option<&Answer> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: SlotKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Answers in interview order.
    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &Answer)> {
        self.entries.iter()
    }
}

/// Result of advancing the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub from: Phase,
    pub to: Phase,
    /// Index now active in `to`.
    pub index: usize,
}

impl Advance {
    pub fn changed_phase(&self) -> bool {
        self.from != self.to
    }
}

/// Read-only view of one phase, for manual review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseView {
    pub phase: Phase,
    pub questions: Vec<Option<String>>,
    pub answers: Vec<Option<Answer>>,
}

/// Tracks the active phase and index, the question slots and the answer log.
#[derive(Debug, Clone, Default)]
pub struct PhaseMachine {
    phase: Phase,
    index: usize,
    started: bool,
    slots: PhaseSlots,
    answers: AnswerLog,
}

impl PhaseMachine {
    /// A fresh machine at `Intro`, index 0, with empty slots.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Record that a backend session exists.
    pub fn mark_started(&mut self) {
        self.started = true;
    }

    pub fn slots(&self) -> &PhaseSlots {
        &self.slots
    }

    pub fn answers(&self) -> &AnswerLog {
        &self.answers
    }

    /// The active slot address.
    pub fn current_slot(&self) -> SlotKey {
        SlotKey::new(self.phase, self.index)
    }

    /// The question filled into the active slot, if any.
    pub fn current_question(&self) -> Option<&str> {
        self.slots.question(self.current_slot())
    }

    /// Fill the active slot with a newly delivered question.
    pub fn assign_question(&mut self, text: String) -> Result<SlotKey, PhaseError> {
        if self.phase.is_terminal() {
            return Err(PhaseError::Concluded);
        }
        let key = self.current_slot();
        self.slots.fill(key, text);
        Ok(key)
    }

    /// Record a confirmed answer at the active slot and advance.
    ///
    /// The index increments; when it reaches the phase's target the machine
    /// moves to the next phase with the index reset to 0. Completing
    /// `SoftSkills` lands on `Conclusion`.
    pub fn record_answer(&mut self, answer: Answer) -> Result<Advance, PhaseError> {
        if self.phase.is_terminal() {
            return Err(PhaseError::Concluded);
        }
        let from = self.phase;
        self.answers.record(self.current_slot(), answer);

        let next_index = self.index + 1;
        if next_index < from.target_count() {
            self.index = next_index;
        } else {
            let to = from.next().ok_or(PhaseError::Concluded)?;
            self.transition(to)?;
        }

        Ok(Advance {
            from,
            to: self.phase,
            index: self.index,
        })
    }

    /// Jump to `Conclusion` because the backend reported completion.
    pub fn conclude(&mut self) -> Result<Advance, PhaseError> {
        let from = self.phase;
        self.transition(Phase::Conclusion)?;
        Ok(Advance {
            from,
            to: Phase::Conclusion,
            index: 0,
        })
    }

    fn transition(&mut self, to: Phase) -> Result<(), PhaseError> {
        validate_transition(self.phase, to)?;
        self.phase = to;
        self.index = 0;
        Ok(())
    }

    /// A phase is complete iff its last slot has an answer.
    pub fn is_phase_complete(&self, phase: Phase) -> bool {
        match phase.target_count() {
            0 => self.phase.is_terminal(),
            target => self.answers.contains(SlotKey::new(phase, target - 1)),
        }
    }

    /// Whether manual navigation to `phase` is allowed.
    pub fn can_access_phase(&self, phase: Phase) -> bool {
        match phase {
            Phase::Intro => true,
            Phase::Technical => self.started,
            Phase::SoftSkills => self.is_phase_complete(Phase::Technical),
            Phase::Conclusion => self.is_phase_complete(Phase::SoftSkills),
        }
    }

    /// Overall progress in percent.
    pub fn progress_percentage(&self) -> u8 {
        let within = |phase: Phase| {
            let target = phase.target_count();
            (self.index * QUESTIONED_PHASE_WEIGHT + target / 2) / target
        };
        let pct = match self.phase {
            Phase::Intro => INTRO_PROGRESS,
            Phase::Technical => INTRO_PROGRESS + within(Phase::Technical),
            Phase::SoftSkills => {
                INTRO_PROGRESS + QUESTIONED_PHASE_WEIGHT + within(Phase::SoftSkills)
            }
            Phase::Conclusion => 100,
        };
        pct.min(100) as u8
    }

    /// Read-only view of an accessible phase. Never moves the active phase.
    pub fn view(&self, phase: Phase) -> Result<PhaseView, PhaseError> {
        if !self.can_access_phase(phase) {
            return Err(PhaseError::Inaccessible { phase });
        }
        let questions = self.slots.get(phase).to_vec();
        let answers = (0..phase.target_count())
            .map(|index| self.answers.get(SlotKey::new(phase, index)).cloned())
            .collect();
        Ok(PhaseView {
            phase,
            questions,
            answers,
        })
    }
}

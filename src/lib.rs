//! Client-side orchestrator for phased AI interviews.
//!
//! A candidate moves through four ordered phases (intro, technical,
//! soft-skills, conclusion) while questions are produced asynchronously by
//! a backend the client does not control. The [`session::Orchestrator`]
//! polls for each question, submits answers, and advances the
//! [`phase::PhaseMachine`] only after the backend confirms them.

pub mod api;
pub mod config;
pub mod errors;
pub mod logging;
pub mod phase;
pub mod poll;
pub mod session;
pub mod transcript;
pub mod ui;

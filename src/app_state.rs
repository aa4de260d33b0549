use serde::Serialize;
use tracing::{debug, error, info};

use crate::constants::GENERATION_FAILED_MESSAGE;
use crate::gemini::GenerationError;
use crate::schema::LogicResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Error,
}

/// Outcome of handing a prompt to the workbench.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The trimmed prompt to send; the workbench is now loading.
    Accepted(String),
    EmptyPrompt,
    /// A generation is already in flight.
    Busy,
}

/// The single piece of UI state: the last prompt and what came back for it.
#[derive(Debug, Default)]
pub struct Workbench {
    prompt: String,
    loading: bool,
    result: Option<LogicResponse>,
    error: Option<String>,
}

impl Workbench {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Error
        } else if self.result.is_some() {
            Phase::Success
        } else {
            Phase::Idle
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn result(&self) -> Option<&LogicResponse> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Starts a generation unless the prompt is blank or one is already running.
    ///
    /// On acceptance the previous result and error are dropped.
    pub fn submit(&mut self, prompt: &str) -> Submission {
        if self.loading {
            info!("Generation already in progress, ignoring submission");
            return Submission::Busy;
        }
        let trimmed = prompt.trim();
        if trimmed.is_empty() {
            debug!("Ignoring empty prompt");
            return Submission::EmptyPrompt;
        }

        self.prompt = prompt.to_string();
        self.loading = true;
        self.result = None;
        self.error = None;
        Submission::Accepted(trimmed.to_string())
    }

    /// Records the outcome of the generation started by [`Workbench::submit`].
    pub fn complete(&mut self, outcome: Result<LogicResponse, GenerationError>) {
        self.loading = false;
        match outcome {
            Ok(logic) => {
                self.result = Some(logic);
            }
            Err(e) => {
                error!(error = %e, "Generation failed");
                self.error = Some(GENERATION_FAILED_MESSAGE.to_string());
            }
        }
    }
}

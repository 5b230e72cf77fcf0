//! Lifecycle of a single create or delete action.

use tracing::{info, warn};

use crate::error::{Failure, Result};
use crate::remote::Ack;

/// Exactly one state holds per form instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight,
    Succeeded(String),
    Failed(Failure),
}

/// Result of settling an in-flight submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Succeeded(String),
    Failed(Failure),
    /// A submission was already running; nothing was sent
    Ignored,
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Succeeded(_))
    }
}

#[derive(Debug, Default)]
pub struct Submission {
    state: SubmissionState,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// The triggering control is disabled while this is true
    pub fn is_busy(&self) -> bool {
        self.state == SubmissionState::InFlight
    }

    /// Move to `InFlight`.
    ///
    /// Returns false, leaving the state untouched, when a submission is
    /// already in flight. A terminal state is replaced by the new submit.
    pub fn begin(&mut self) -> bool {
        if self.is_busy() {
            warn!("submit ignored while a request is in flight");
            return false;
        }
        self.state = SubmissionState::InFlight;
        true
    }

    /// Settle the in-flight submission with the remote answer
    pub fn finish(&mut self, result: Result<Ack>) -> SubmissionOutcome {
        if !self.is_busy() {
            return SubmissionOutcome::Ignored;
        }
        match result {
            Ok(ack) => {
                info!(message = %ack.message, "submission succeeded");
                self.state = SubmissionState::Succeeded(ack.message.clone());
                SubmissionOutcome::Succeeded(ack.message)
            }
            Err(err) => {
                let failure = err.to_failure();
                warn!(kind = %failure.kind, reason = %failure.reason, "submission failed");
                self.state = SubmissionState::Failed(failure.clone());
                SubmissionOutcome::Failed(failure)
            }
        }
    }

    /// Record a failure raised before any request, e.g. form validation
    pub fn reject(&mut self, failure: Failure) -> SubmissionOutcome {
        if self.is_busy() {
            return SubmissionOutcome::Ignored;
        }
        self.state = SubmissionState::Failed(failure.clone());
        SubmissionOutcome::Failed(failure)
    }

    /// Dismiss the notification of a terminal state
    pub fn dismiss(&mut self) {
        if !self.is_busy() {
            self.state = SubmissionState::Idle;
        }
    }
}

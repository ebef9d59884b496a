// ticketflow/src/core/control.rs

//! Flow signals returned by handlers and the outcome of a whole run.

/// Returned by every handler to say whether the run goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Run the remaining handlers of this step, then the following steps.
  Continue,
  /// Halt the run. Nothing after the current handler executes.
  Stop,
}

/// How a pipeline run that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
  /// Every step that was not skipped ran to the end.
  Completed,
  /// A handler returned `StepControl::Stop`.
  Stopped,
}

impl RunOutcome {
  pub fn is_completed(self) -> bool {
    matches!(self, RunOutcome::Completed)
  }
}

// ticketflow/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures raised by the engine itself, as opposed to failures of the handlers it runs.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Step not found in pipeline '{pipeline}': {step_name}")]
  StepNotFound { pipeline: String, step_name: String },

  #[error("Step already defined in pipeline '{pipeline}': {step_name}")]
  DuplicateStep { pipeline: String, step_name: String },

  #[error("Handler missing for required step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No pipeline registered for context type {context_type}")]
  NoPipelineRegistered { context_type: String },

  #[error("Context type mismatch while dispatching (expected {expected_type})")]
  TypeMismatch { expected_type: String },

  #[error("Handler failed. Source: {source}")]
  Handler {
    #[source]
    source: AnyhowError,
  },
}

impl From<AnyhowError> for FlowError {
  fn from(source: AnyhowError) -> Self {
    FlowError::Handler { source }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;

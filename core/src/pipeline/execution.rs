// ticketflow/src/pipeline/execution.rs

//! `Pipeline::run`, which walks the steps and their handlers in order.

use crate::core::context_data::ContextData;
use crate::core::control::{RunOutcome, StepControl};
use crate::core::step::Phase;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, info_span, instrument, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Executes every step against `ctx_data`.
  ///
  /// For each step: evaluate `skip_if`, then run the `before`, `on` and `after`
  /// handlers in registration order. The first handler error aborts the run and
  /// is returned as is. A required step with no handler at all fails with
  /// `FlowError::HandlerMissing`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(pipeline = %self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<RunOutcome, Err> {
    event!(Level::DEBUG, "Pipeline run starting.");

    for (step_index, step) in self.steps.iter().enumerate() {
      let step_name = step.name.as_str();

      if let Some(skip_if) = &step.skip_if {
        if ctx_data.with(|data| skip_if(data)) {
          event!(Level::DEBUG, step_name, "Step skipped by its condition.");
          continue;
        }
      }

      if self.handler_count(step_name) == 0 {
        if step.optional {
          event!(Level::DEBUG, step_name, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(Level::ERROR, step_name, "Required step has no handlers.");
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step.name.clone(),
        }));
      }

      for phase in Phase::ALL {
        let Some(handlers) = self.handlers.get(&(step.name.clone(), phase)) else {
          continue;
        };
        for (handler_index, handler) in handlers.iter().enumerate() {
          let span = info_span!(
            "pipeline_step",
            step_name,
            step_index,
            phase = phase.as_str(),
            handler_index
          );
          match handler(ctx_data.clone()).instrument(span).await {
            Ok(StepControl::Continue) => {}
            Ok(StepControl::Stop) => {
              event!(Level::INFO, step_name, phase = phase.as_str(), "Pipeline stopped by a handler.");
              return Ok(RunOutcome::Stopped);
            }
            Err(e) => {
              event!(Level::WARN, step_name, phase = phase.as_str(), error = %e, "Handler failed.");
              return Err(e);
            }
          }
        }
      }
    }

    event!(Level::DEBUG, "Pipeline run completed.");
    Ok(RunOutcome::Completed)
  }
}

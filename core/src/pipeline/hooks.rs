// ticketflow/src/pipeline/hooks.rs

//! Registration of `before`, `on` and `after` handlers.

use crate::core::context_data::ContextData;
use crate::core::control::StepControl;
use crate::core::step::{Handler, Phase};
use crate::error::{FlowError, FlowResult};
use crate::pipeline::definition::Pipeline;
use std::future::Future;
use tracing::{event, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs ahead of the step's `on` handlers. Typical use: guards and logging.
  pub fn before<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> FlowResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.attach(step_name, Phase::Before, handler_fn)
  }

  /// The step's main work.
  pub fn on<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> FlowResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.attach(step_name, Phase::On, handler_fn)
  }

  /// Runs once the `on` handlers have finished without stopping.
  pub fn after<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> FlowResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.attach(step_name, Phase::After, handler_fn)
  }

  fn attach<F, HandlerErr>(
    &mut self,
    step_name: &str,
    phase: Phase,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> FlowResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.step_index(step_name)?;
    let boxed: Handler<TData, Err> = Box::new(move |ctx_data| {
      let fut = handler_fn(ctx_data);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    self
      .handlers
      .entry((step_name.to_string(), phase))
      .or_default()
      .push(boxed);
    event!(Level::TRACE, pipeline = %self.name, %step_name, phase = phase.as_str(), "Handler attached.");
    Ok(self)
  }
}

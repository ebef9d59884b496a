// ticketflow/src/registry.rs

//! A registry of pipelines keyed by their context type.
//!
//! Callers hand in a `ContextData<TData>` and the registry runs whichever
//! pipeline was registered for `TData`, so a web handler only needs the
//! registry and never the pipeline values themselves.

use crate::core::context_data::ContextData;
use crate::core::control::RunOutcome;
use crate::error::FlowError;
use crate::pipeline::Pipeline;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
trait ErasedRunner<AppErr>: Send + Sync {
  fn pipeline_name(&self) -> &str;

  /// `ctx` must hold a `ContextData<TData>` for the wrapped pipeline's `TData`.
  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<RunOutcome, AppErr>;
}

struct Registered<TData, HandlerErr, AppErr>
where
  TData: Send + Sync + 'static,
  HandlerErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pipeline: Pipeline<TData, HandlerErr>,
  _app_err: PhantomData<fn() -> AppErr>,
}

#[async_trait]
impl<TData, HandlerErr, AppErr> ErasedRunner<AppErr> for Registered<TData, HandlerErr, AppErr>
where
  TData: Send + Sync + 'static,
  HandlerErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
  AppErr: From<HandlerErr> + From<FlowError> + Send + 'static,
{
  fn pipeline_name(&self) -> &str {
    self.pipeline.name()
  }

  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<RunOutcome, AppErr> {
    let ctx_data = match ctx.downcast::<ContextData<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<ContextData<TData>>().to_string();
        event!(Level::ERROR, %expected_type, "Context handed to the wrong pipeline.");
        return Err(AppErr::from(FlowError::TypeMismatch { expected_type }));
      }
    };
    self.pipeline.run(ctx_data).await.map_err(AppErr::from)
  }
}

/// Holds at most one pipeline per context type.
///
/// `AppErr` is what `run` returns; it must absorb both the engine's own
/// errors and the error type of every registered pipeline.
pub struct Registry<AppErr = FlowError> {
  pipelines: RwLock<HashMap<TypeId, Arc<dyn ErasedRunner<AppErr>>>>,
}

impl<AppErr> Default for Registry<AppErr>
where
  AppErr: From<FlowError> + Send + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<AppErr> Registry<AppErr>
where
  AppErr: From<FlowError> + Send + 'static,
{
  pub fn new() -> Self {
    Self {
      pipelines: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `pipeline` for its context type, replacing an earlier one.
  pub fn register<TData, HandlerErr>(&self, pipeline: Pipeline<TData, HandlerErr>)
  where
    TData: Send + Sync + 'static,
    HandlerErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
    AppErr: From<HandlerErr>,
  {
    let name = pipeline.name().to_string();
    let runner: Arc<dyn ErasedRunner<AppErr>> = Arc::new(Registered::<TData, HandlerErr, AppErr> {
      pipeline,
      _app_err: PhantomData,
    });
    let previous = self.pipelines.write().insert(TypeId::of::<TData>(), runner);
    match previous {
      Some(old) => event!(
        Level::WARN,
        pipeline = %name,
        replaced = %old.pipeline_name(),
        "Pipeline replaced an earlier registration."
      ),
      None => event!(Level::DEBUG, pipeline = %name, context_type = %std::any::type_name::<TData>(), "Pipeline registered."),
    }
  }

  pub fn is_registered<TData: Send + Sync + 'static>(&self) -> bool {
    self.pipelines.read().contains_key(&TypeId::of::<TData>())
  }

  pub fn len(&self) -> usize {
    self.pipelines.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.pipelines.read().is_empty()
  }

  /// Runs the pipeline registered for `TData` against `ctx_data`.
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<RunOutcome, AppErr>
  where
    TData: Send + Sync + 'static,
  {
    let runner = self
      .pipelines
      .read()
      .get(&TypeId::of::<TData>())
      .cloned()
      .ok_or_else(|| {
        let context_type = std::any::type_name::<TData>().to_string();
        event!(Level::ERROR, %context_type, "No pipeline registered.");
        AppErr::from(FlowError::NoPipelineRegistered { context_type })
      })?;
    runner.run_erased(Box::new(ctx_data)).await
  }
}

// event_ticketing/src/pipelines/mod.rs

//! The ticketflow pipelines behind every state-changing operation.
//!
//! Each public operation opens one unit of work, runs its pipeline through the
//! registry and commits when the run succeeds. Any error rolls the unit of
//! work back before it reaches the caller.

use crate::db::UnitOfWork;
use crate::errors::{AppError, Result as AppResult};
use crate::state::AppState;
use ticketflow::{ContextData, Registry, RunOutcome};
use tracing::{event, Level};

pub mod confirmation_pipeline;
pub mod contexts;
pub mod payment_pipeline;
pub mod registration_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

pub use confirmation_pipeline::send_confirmation;
pub use payment_pipeline::{complete_stub_payment, record_payment};
pub use registration_pipeline::{check_registration, initiate_registration};
pub use signin_pipeline::sign_in;
pub use signup_pipeline::{seed_admin, sign_up};

/// Registers every application pipeline. Called once while building `AppState`.
pub fn register_all_pipelines(registry: &Registry<AppError>) -> AppResult<()> {
  registry.register(registration_pipeline::build()?);
  registry.register(payment_pipeline::build()?);
  registry.register(confirmation_pipeline::build()?);
  registry.register(signup_pipeline::build()?);
  registry.register(signin_pipeline::build()?);
  event!(Level::INFO, pipelines = registry.len(), "Application pipelines registered.");
  Ok(())
}

/// Runs the pipeline for `TData` inside a fresh unit of work.
///
/// `make_ctx` receives the unit of work to embed in the context; `finish` turns
/// the final context into the operation's result. The unit of work commits only
/// if both the run and `finish` succeed.
pub(crate) async fn run_in_unit_of_work<TData, R>(
  state: &AppState,
  make_ctx: impl FnOnce(UnitOfWork) -> TData,
  finish: impl FnOnce(RunOutcome, &TData) -> AppResult<R>,
) -> AppResult<R>
where
  TData: Send + Sync + 'static,
{
  let uow = UnitOfWork::begin(state.store.as_ref()).await?;
  let ctx = ContextData::new(make_ctx(uow.clone()));

  let result = match state.flows.run(ctx.clone()).await {
    Ok(outcome) => ctx.with(|data| finish(outcome, data)),
    Err(err) => Err(err),
  };
  drop(ctx);

  match result {
    Ok(value) => {
      uow.commit().await?;
      Ok(value)
    }
    Err(err) => {
      if let Err(rollback_err) = uow.rollback().await {
        event!(Level::ERROR, error = %rollback_err, "Rollback failed after pipeline error.");
      }
      Err(err)
    }
  }
}

/// Value a previous step should have stored in the context.
pub(crate) fn loaded<T: Clone>(value: &Option<T>, what: &str) -> AppResult<T> {
  value
    .clone()
    .ok_or_else(|| AppError::Internal(format!("Pipeline step ran before {} was loaded.", what)))
}

/// For operations whose pipelines never stop on purpose.
pub(crate) fn expect_completed(outcome: RunOutcome, operation: &str) -> AppResult<()> {
  if outcome.is_completed() {
    Ok(())
  } else {
    event!(Level::WARN, operation, "Pipeline stopped before completing.");
    Err(AppError::Internal(format!("{} was halted by an internal step.", operation)))
  }
}
